use macroquad::math::IVec2;

use crate::geom::PixelRect;
use crate::surface::{AtlasId, Surface};

/// Handle to an animation strip owned by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StripId(pub(crate) usize);

impl StripId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Direction frames advance in within the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripAxis {
    Horizontal,
    Vertical,
}

/// A run of equally sized frames laid out in a line inside an atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationStrip {
    pub atlas: AtlasId,
    pub frame_size: IVec2,
    /// Top-left pixel of frame 1.
    pub initial_offset: IVec2,
    pub axis: StripAxis,
    pub frame_count: i32,
}

impl AnimationStrip {
    /// Source rectangle of a 1-based frame. Out of range frame numbers give
    /// rectangles outside the strip; blits clip whatever misses the atlas.
    pub fn frame_rect(&self, frame: i32) -> PixelRect {
        let mut origin = self.initial_offset;
        match self.axis {
            StripAxis::Horizontal => origin.x += self.frame_size.x * (frame - 1),
            StripAxis::Vertical => origin.y += self.frame_size.y * (frame - 1),
        }
        PixelRect::from_origin(origin, self.frame_size)
    }

    /// Draws `frame` into `dest_rect` of `dst`, scaled to fit.
    pub fn draw(&self, frame: i32, atlas: &Surface, dest_rect: PixelRect, dst: &mut Surface) {
        dst.blit(atlas, self.frame_rect(frame), dest_rect);
    }

    /// Renders one frame into a new surface of frame size.
    pub fn frame_surface(&self, frame: i32, atlas: &Surface) -> Surface {
        let mut out = Surface::new(self.frame_size);
        self.draw(frame, atlas, PixelRect::sized(self.frame_size), &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(axis: StripAxis) -> AnimationStrip {
        AnimationStrip {
            atlas: AtlasId(0),
            frame_size: IVec2::new(16, 8),
            initial_offset: IVec2::new(4, 2),
            axis,
            frame_count: 3,
        }
    }

    #[test]
    fn horizontal_strip_shifts_x_only() {
        let s = strip(StripAxis::Horizontal);
        assert_eq!(s.frame_rect(1), PixelRect::new(4, 2, 16, 8));
        assert_eq!(s.frame_rect(3), PixelRect::new(36, 2, 16, 8));
    }

    #[test]
    fn vertical_strip_shifts_y_only() {
        let s = strip(StripAxis::Vertical);
        assert_eq!(s.frame_rect(2), PixelRect::new(4, 10, 16, 8));
    }

    #[test]
    fn frame_surface_copies_the_frame() {
        let s = AnimationStrip {
            atlas: AtlasId(0),
            frame_size: IVec2::new(2, 2),
            initial_offset: IVec2::ZERO,
            axis: StripAxis::Horizontal,
            frame_count: 2,
        };
        let mut atlas = Surface::filled(IVec2::new(4, 2), [10, 10, 10, 255]);
        atlas.fill_rect(PixelRect::new(2, 0, 2, 2), [200, 0, 0, 255]);

        let second = s.frame_surface(2, &atlas);
        assert_eq!(second.size(), IVec2::new(2, 2));
        assert_eq!(second.pixel(1, 1), Some([200, 0, 0, 255]));
    }
}

//! CPU pixel surfaces backed by macroquad's `Image`.
//!
//! Transparency is color-keyed: a pixel with alpha 0 is never copied by
//! [`Surface::blit`]. Loading an atlas keys its transparent color by zeroing
//! the alpha of every matching pixel.

use std::path::{Path, PathBuf};

use macroquad::color::Color;
use macroquad::math::IVec2;
use macroquad::texture::Image;

use crate::error::EngineError;
use crate::geom::PixelRect;

/// RGB color treated as transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorKey {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorKey {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        ColorKey { r, g, b }
    }

    #[inline]
    fn matches(&self, px: [u8; 4]) -> bool {
        px[0] == self.r && px[1] == self.g && px[2] == self.b
    }

    /// Key color with zero alpha, as written by transparent fills.
    #[inline]
    pub fn clear_pixel(&self) -> [u8; 4] {
        [self.r, self.g, self.b, 0]
    }

    pub fn to_color(&self) -> Color {
        Color::from_rgba(self.r, self.g, self.b, 255)
    }
}

/// Handle to an atlas image owned by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasId(pub(crate) usize);

impl AtlasId {
    /// Position in the world's atlas list.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// RGBA8 pixel buffer.
#[derive(Clone)]
pub struct Surface {
    image: Image,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.image.width)
            .field("height", &self.image.height)
            .finish()
    }
}

fn dimension(v: i32) -> u16 {
    v.clamp(0, u16::MAX as i32) as u16
}

impl Surface {
    /// Fully transparent surface. Sizes are clamped to `0..=u16::MAX`.
    pub fn new(size: IVec2) -> Self {
        let width = dimension(size.x);
        let height = dimension(size.y);
        Surface {
            image: Image {
                bytes: vec![0; width as usize * height as usize * 4],
                width,
                height,
            },
        }
    }

    /// Opaque surface of one color.
    pub fn filled(size: IVec2, px: [u8; 4]) -> Self {
        let mut surface = Surface::new(size);
        for p in surface.image.get_image_data_mut() {
            *p = px;
        }
        surface
    }

    pub fn from_image(image: Image) -> Self {
        Surface { image }
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.image.width as i32
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.image.height as i32
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width(), self.height())
    }

    #[inline]
    pub fn bounds(&self) -> PixelRect {
        PixelRect::sized(self.size())
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        Some(y as usize * self.image.width as usize + x as usize)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        self.offset(x, y).map(|i| self.image.get_image_data()[i])
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, px: [u8; 4]) {
        if let Some(i) = self.offset(x, y) {
            self.image.get_image_data_mut()[i] = px;
        }
    }

    /// Writes `px` over `rect`, clipped to the surface.
    pub fn fill_rect(&mut self, rect: PixelRect, px: [u8; 4]) {
        let Some(area) = rect.intersect(&self.bounds()) else {
            return;
        };
        let stride = self.image.width as usize;
        let data = self.image.get_image_data_mut();
        for y in area.y..area.bottom() {
            let row = y as usize * stride;
            for x in area.x..area.right() {
                data[row + x as usize] = px;
            }
        }
    }

    pub fn fill(&mut self, px: [u8; 4]) {
        self.fill_rect(self.bounds(), px);
    }

    /// Clears the whole surface to the transparent key.
    pub fn fill_transparent(&mut self, key: ColorKey) {
        self.fill(key.clear_pixel());
    }

    /// Zeroes the alpha of every pixel whose color equals `key`.
    pub fn make_transparent(&mut self, key: ColorKey) {
        for px in self.image.get_image_data_mut() {
            if key.matches(*px) {
                px[3] = 0;
            }
        }
    }

    /// Copies `src_rect` of `src` into `dest_rect` of this surface, scaling
    /// with nearest-neighbour sampling. Destination pixels outside this
    /// surface and source pixels outside `src` are skipped, as are
    /// transparent source pixels.
    pub fn blit(&mut self, src: &Surface, src_rect: PixelRect, dest_rect: PixelRect) {
        if src_rect.is_empty() || dest_rect.is_empty() {
            return;
        }
        let Some(area) = dest_rect.intersect(&self.bounds()) else {
            return;
        };

        let stride = self.image.width as usize;
        let src_w = src_rect.w as i64;
        let src_h = src_rect.h as i64;
        let dst_w = dest_rect.w as i64;
        let dst_h = dest_rect.h as i64;

        for y in area.y..area.bottom() {
            let sy = src_rect.y + ((y - dest_rect.y) as i64 * src_h / dst_h) as i32;
            for x in area.x..area.right() {
                let sx = src_rect.x + ((x - dest_rect.x) as i64 * src_w / dst_w) as i32;
                let Some(px) = src.pixel(sx, sy) else {
                    continue;
                };
                if px[3] == 0 {
                    continue;
                }
                self.image.get_image_data_mut()[y as usize * stride + x as usize] = px;
            }
        }
    }
}

/// Source of atlas images for the level loader.
pub trait ImageLoader {
    fn load_image(&mut self, path: &str) -> Result<Surface, EngineError>;
}

impl<F> ImageLoader for F
where
    F: FnMut(&str) -> Result<Surface, EngineError>,
{
    fn load_image(&mut self, path: &str) -> Result<Surface, EngineError> {
        self(path)
    }
}

/// Decodes image files relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsImageLoader { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageLoader for FsImageLoader {
    fn load_image(&mut self, path: &str) -> Result<Surface, EngineError> {
        let full = self.root.join(path);
        let bytes = std::fs::read(&full).map_err(|source| EngineError::Io {
            path: full.clone(),
            source,
        })?;
        let image = Image::from_file_with_format(&bytes, None).map_err(|e| EngineError::Image {
            path: full.clone(),
            reason: format!("{e:?}"),
        })?;
        log::debug!("Loaded image {} ({}x{})", full.display(), image.width, image.height);
        Ok(Surface::from_image(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn blit_scales_with_nearest_neighbour() {
        let mut src = Surface::filled(IVec2::new(2, 1), RED);
        src.set_pixel(1, 0, BLUE);

        let mut dst = Surface::new(IVec2::new(4, 2));
        dst.blit(&src, PixelRect::new(0, 0, 2, 1), PixelRect::new(0, 0, 4, 2));

        assert_eq!(dst.pixel(0, 0), Some(RED));
        assert_eq!(dst.pixel(1, 1), Some(RED));
        assert_eq!(dst.pixel(2, 0), Some(BLUE));
        assert_eq!(dst.pixel(3, 1), Some(BLUE));
    }

    #[test]
    fn blit_skips_keyed_pixels() {
        let key = ColorKey::new(255, 0, 255);
        let mut src = Surface::filled(IVec2::new(2, 2), [255, 0, 255, 255]);
        src.set_pixel(0, 0, RED);
        src.make_transparent(key);

        let mut dst = Surface::filled(IVec2::new(2, 2), BLUE);
        dst.blit(&src, src.bounds(), dst.bounds());

        assert_eq!(dst.pixel(0, 0), Some(RED));
        assert_eq!(dst.pixel(1, 1), Some(BLUE));
    }

    #[test]
    fn blit_clips_source_and_destination() {
        let src = Surface::filled(IVec2::new(2, 2), RED);
        let mut dst = Surface::new(IVec2::new(3, 3));

        // Source rect hangs off the right of the source surface, destination
        // rect hangs off the bottom of the destination.
        dst.blit(&src, PixelRect::new(1, 0, 2, 2), PixelRect::new(0, 2, 2, 2));

        assert_eq!(dst.pixel(0, 2), Some(RED));
        assert_eq!(dst.pixel(1, 2), Some([0, 0, 0, 0]));
        assert_eq!(dst.pixel(0, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn closures_act_as_image_loaders() {
        let mut loader =
            |_: &str| -> Result<Surface, EngineError> { Ok(Surface::new(IVec2::new(8, 4))) };
        let surface = loader.load_image("any.png").expect("load");
        assert_eq!(surface.size(), IVec2::new(8, 4));
    }

    #[test]
    fn fs_loader_reports_missing_files() {
        let mut loader = FsImageLoader::new(std::env::temp_dir());
        let err = loader
            .load_image("definitely_missing_atlas.png")
            .expect_err("missing file");
        assert!(matches!(err, EngineError::Io { .. }));
    }
}

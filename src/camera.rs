use macroquad::math::{IVec2, IVec3};

use crate::geom::PixelRect;
use crate::surface::Surface;

/// Pseudo-3D projection used when drawing through a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraStyle {
    #[default]
    Standard,
    /// Deeper things are pushed right by their depth.
    ShearLeft,
    /// Deeper things are pushed left by their depth.
    ShearRight,
}

impl CameraStyle {
    /// Parses the level-file style code (`S`, `L` or `R`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(CameraStyle::Standard),
            "L" => Some(CameraStyle::ShearLeft),
            "R" => Some(CameraStyle::ShearRight),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CameraStyle::Standard => "S",
            CameraStyle::ShearLeft => "L",
            CameraStyle::ShearRight => "R",
        }
    }

    /// Horizontal offset applied to something drawn at depth `z`.
    #[inline]
    pub fn shear(&self, z: i32) -> i32 {
        match self {
            CameraStyle::Standard => 0,
            CameraStyle::ShearLeft => z,
            CameraStyle::ShearRight => -z,
        }
    }
}

/// A viewport into the world with its own render surface.
#[derive(Debug, Clone)]
pub struct Camera {
    pub offset: IVec3,
    surface: Surface,
    /// Where the host should present the surface.
    pub draw_rect: PixelRect,
    /// First Z layer drawn.
    pub start_z: i32,
    /// Z layers up to, but not including, this one are drawn.
    pub end_z: i32,
    pub style: CameraStyle,
    pub show_background: bool,
}

impl Camera {
    pub fn new(resolution: IVec2, draw_rect: PixelRect, style: CameraStyle) -> Self {
        Camera::with_offset(IVec3::ZERO, resolution, draw_rect, style)
    }

    pub fn with_offset(
        offset: IVec3,
        resolution: IVec2,
        draw_rect: PixelRect,
        style: CameraStyle,
    ) -> Self {
        Camera {
            offset,
            surface: Surface::new(resolution),
            draw_rect,
            start_z: 0,
            end_z: 20,
            style,
            show_background: true,
        }
    }

    pub fn move_absolute(&mut self, offset: IVec3) {
        self.offset = offset;
    }

    pub fn move_relative(&mut self, delta: IVec3) {
        self.offset += delta;
    }

    /// Reallocates the render surface; previous contents are lost.
    pub fn resize(&mut self, resolution: IVec2) {
        self.surface = Surface::new(resolution);
    }

    pub fn set_z_range(&mut self, start_z: i32, end_z: i32) {
        self.start_z = start_z;
        self.end_z = end_z;
    }

    #[inline]
    pub fn viewport_size(&self) -> IVec2 {
        self.surface.size()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Screen position of a world point seen through this camera.
    pub fn project(&self, world: IVec3) -> IVec2 {
        IVec2::new(
            world.x - self.offset.x + self.style.shear(world.z),
            world.y - self.offset.y,
        )
    }
}

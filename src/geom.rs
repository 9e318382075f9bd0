use macroquad::math::{IVec2, IVec3};

/// Integer pixel rectangle. `x`/`y` is the top-left corner; `w`/`h` may be
/// zero or negative, in which case the rectangle covers no pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    /// Width; zero or less is empty.
    pub w: i32,
    /// Height; zero or less is empty.
    pub h: i32,
}

impl PixelRect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        PixelRect { x, y, w, h }
    }

    #[inline]
    pub fn from_origin(origin: IVec2, size: IVec2) -> Self {
        PixelRect::new(origin.x, origin.y, size.x, size.y)
    }

    /// Rectangle at (0, 0) covering `size`.
    #[inline]
    pub fn sized(size: IVec2) -> Self {
        PixelRect::new(0, 0, size.x, size.y)
    }

    #[inline]
    pub fn origin(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.w, self.h)
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Strict overlap; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        if r <= x || b <= y {
            return None;
        }
        Some(PixelRect::new(x, y, r - x, b - y))
    }
}

/// Drops the depth component of a world point.
#[inline]
pub fn flatten(p: IVec3) -> IVec2 {
    IVec2::new(p.x, p.y)
}

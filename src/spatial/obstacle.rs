use std::fmt;

use macroquad::math::{IVec2, IVec3};

use crate::geom::PixelRect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObstacleMapError {
    /// The level holds more cells than the grid can index.
    TooLarge { width: i32, height: i32 },
    /// Fewer digits than cells.
    Truncated { expected: usize, found: usize },
}

impl fmt::Display for ObstacleMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObstacleMapError::TooLarge { width, height } => {
                write!(f, "obstacle grid of {}x{} cells is too large", width, height)
            }
            ObstacleMapError::Truncated { expected, found } => write!(
                f,
                "obstacle map needs {} cells, found {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for ObstacleMapError {}

/// Grid dimensions covering `level_size`, zero when a cell dimension is not
/// positive.
fn grid_dimensions(cell_size: IVec2, level_size: IVec2) -> (i32, i32) {
    if cell_size.x > 0 && cell_size.y > 0 {
        ((level_size.x / cell_size.x).max(0), (level_size.y / cell_size.y).max(0))
    } else {
        (0, 0)
    }
}

/// Cell count, kept within `i32` so row-major indices never overflow.
fn cell_count(width: i32, height: i32) -> Result<usize, ObstacleMapError> {
    (width as usize)
        .checked_mul(height as usize)
        .filter(|&n| n <= i32::MAX as usize)
        .ok_or(ObstacleMapError::TooLarge { width, height })
}

/// Coarse blocked/passable grid laid over the level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleGrid {
    cell_size: IVec2,
    width: i32,
    height: i32,
    blocked: Vec<bool>,
}

impl ObstacleGrid {
    /// All-passable grid sized to cover `level_size`.
    pub fn try_new(cell_size: IVec2, level_size: IVec2) -> Result<Self, ObstacleMapError> {
        let (width, height) = grid_dimensions(cell_size, level_size);
        let count = cell_count(width, height)?;
        Ok(ObstacleGrid {
            cell_size,
            width,
            height,
            blocked: vec![false; count],
        })
    }

    /// Like [`ObstacleGrid::try_new`], falling back to an empty (all
    /// passable) grid when the level is too large to index.
    pub fn new(cell_size: IVec2, level_size: IVec2) -> Self {
        ObstacleGrid::try_new(cell_size, level_size).unwrap_or_else(|e| {
            log::warn!("{}, using an empty obstacle grid", e);
            ObstacleGrid {
                cell_size,
                width: 0,
                height: 0,
                blocked: Vec::new(),
            }
        })
    }

    /// Grid from row-major digits; `'0'` is passable, anything else blocked.
    /// The digit count is checked before the grid is allocated.
    pub fn from_digits(
        cell_size: IVec2,
        level_size: IVec2,
        digits: &str,
    ) -> Result<Self, ObstacleMapError> {
        let (width, height) = grid_dimensions(cell_size, level_size);
        let expected = cell_count(width, height)?;
        let bytes = digits.trim_end().as_bytes();
        if bytes.len() < expected {
            return Err(ObstacleMapError::Truncated {
                expected,
                found: bytes.len(),
            });
        }
        let mut grid = ObstacleGrid::try_new(cell_size, level_size)?;
        for (cell, &digit) in grid.blocked.iter_mut().zip(bytes) {
            *cell = digit != b'0';
        }
        Ok(grid)
    }

    #[inline]
    pub fn cell_size(&self) -> IVec2 {
        self.cell_size
    }

    /// Grid dimensions in cells.
    #[inline]
    pub fn dimensions(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    /// Cell containing a pixel. Meaningless when a cell dimension is zero.
    #[inline]
    pub fn cell_of(&self, point: IVec2) -> IVec2 {
        IVec2::new(
            point.x.div_euclid(self.cell_size.x.max(1)),
            point.y.div_euclid(self.cell_size.y.max(1)),
        )
    }

    /// Cells outside the grid are passable.
    pub fn is_blocked_cell(&self, cell: IVec2) -> bool {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width || cell.y >= self.height {
            return false;
        }
        self.blocked[(cell.y * self.width + cell.x) as usize]
    }

    pub fn set_blocked(&mut self, cell: IVec2, blocked: bool) {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width || cell.y >= self.height {
            return;
        }
        self.blocked[(cell.y * self.width + cell.x) as usize] = blocked;
    }

    /// Whether the cell under a world pixel is blocked.
    pub fn is_blocked_at(&self, point: IVec2) -> bool {
        if self.cell_size.x <= 0 || self.cell_size.y <= 0 {
            return false;
        }
        self.is_blocked_cell(self.cell_of(point))
    }

    /// Point tested after a gravity step: the edge of `bounds` facing the
    /// pull on each axis, or its centre on an axis without pull.
    pub fn gravity_contact_point(bounds: PixelRect, gravity: IVec3) -> IVec2 {
        let lead = |start: i32, len: i32, pull: i32| match pull.signum() {
            0 => start + len / 2,
            1 => start + (len - 1).max(0),
            _ => start,
        };
        IVec2::new(
            lead(bounds.x, bounds.w, gravity.x),
            lead(bounds.y, bounds.h, gravity.y),
        )
    }

    /// Tests the two corners of `bounds` on its leading edge. Horizontal
    /// travel uses the leading vertical edge, otherwise vertical travel uses
    /// the leading horizontal edge; with no travel the top-left and
    /// bottom-right corners are tested. Corners are the outermost occupied
    /// pixels.
    pub fn leading_corners_blocked(&self, bounds: PixelRect, travel: IVec2) -> bool {
        let left = bounds.x;
        let top = bounds.y;
        let right = bounds.x + (bounds.w - 1).max(0);
        let bottom = bounds.y + (bounds.h - 1).max(0);

        let (a, b) = if travel.x != 0 {
            let x = if travel.x > 0 { right } else { left };
            (IVec2::new(x, top), IVec2::new(x, bottom))
        } else if travel.y != 0 {
            let y = if travel.y > 0 { bottom } else { top };
            (IVec2::new(left, y), IVec2::new(right, y))
        } else {
            (IVec2::new(left, top), IVec2::new(right, bottom))
        };

        self.is_blocked_at(a) || self.is_blocked_at(b)
    }
}

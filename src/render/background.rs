//! A single tile layer: compact tile-map codec plus a lazily built
//! full-layer surface.

use std::fmt;

use macroquad::math::IVec2;

use crate::geom::PixelRect;
use crate::surface::{AtlasId, ColorKey, Surface};

/// Symbols used by tile maps; a symbol's position is its value.
pub const TILE_ALPHABET: [u8; 16] = *b"0123456789ABCDEF";

#[inline]
fn symbol_value(symbol: u8) -> u8 {
    TILE_ALPHABET
        .iter()
        .position(|&s| s == symbol)
        .map_or(0, |i| i as u8)
}

#[inline]
fn value_symbol(value: u8) -> char {
    TILE_ALPHABET
        .get(value as usize)
        .map_or('0', |&s| s as char)
}

/// Atlas cell coordinates for one grid square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileCell {
    pub x: u8,
    pub y: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileMapError {
    /// The map text has fewer symbols than the grid needs.
    Truncated { expected: usize, found: usize },
}

impl fmt::Display for TileMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileMapError::Truncated { expected, found } => write!(
                f,
                "tile map has {} symbols, grid needs {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for TileMapError {}

/// Row-major grid of tile cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<TileCell>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        TileGrid {
            width,
            height,
            cells: vec![TileCell::default(); width * height],
        }
    }

    /// Decodes two symbols per cell, row-major. Unknown symbols read as 0;
    /// symbols beyond what the grid needs are ignored.
    pub fn decode(text: &str, width: usize, height: usize) -> Result<Self, TileMapError> {
        let bytes = text.trim_end().as_bytes();
        let expected = width.saturating_mul(height).saturating_mul(2);
        if bytes.len() < expected {
            return Err(TileMapError::Truncated {
                expected,
                found: bytes.len(),
            });
        }
        if bytes.len() > expected {
            log::warn!(
                "Tile map has {} trailing symbols past a {}x{} grid",
                bytes.len() - expected,
                width,
                height
            );
        }

        let cells = bytes[..expected]
            .chunks_exact(2)
            .map(|pair| TileCell {
                x: symbol_value(pair[0]),
                y: symbol_value(pair[1]),
            })
            .collect();

        Ok(TileGrid {
            width,
            height,
            cells,
        })
    }

    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() * 2);
        for cell in &self.cells {
            out.push(value_symbol(cell.x));
            out.push(value_symbol(cell.y));
        }
        out
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<TileCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    pub fn set(&mut self, x: usize, y: usize, cell: TileCell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }
}

/// Header fields of a background record.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub name: String,
    pub atlas_name: String,
    /// Full pixel size of the layer.
    pub size: IVec2,
    pub cell_size: IVec2,
    pub key: ColorKey,
    pub z: i32,
}

/// One scrollable background or foreground layer.
#[derive(Debug, Clone)]
pub struct TileLayer {
    spec: LayerSpec,
    atlas: AtlasId,
    grid: TileGrid,
    cache: Option<Surface>,
}

impl TileLayer {
    /// Grid dimensions are `size / cell_size`, truncated.
    pub fn grid_dimensions(size: IVec2, cell_size: IVec2) -> (usize, usize) {
        if cell_size.x <= 0 || cell_size.y <= 0 {
            return (0, 0);
        }
        (
            (size.x / cell_size.x).max(0) as usize,
            (size.y / cell_size.y).max(0) as usize,
        )
    }

    pub fn new(spec: LayerSpec, atlas: AtlasId, map: &str) -> Result<Self, TileMapError> {
        if spec.cell_size.x > 0
            && spec.cell_size.y > 0
            && (spec.size.x % spec.cell_size.x != 0 || spec.size.y % spec.cell_size.y != 0)
        {
            log::warn!(
                "Layer '{}' size {}x{} is not a multiple of its {}x{} cells",
                spec.name,
                spec.size.x,
                spec.size.y,
                spec.cell_size.x,
                spec.cell_size.y
            );
        }
        let (w, h) = Self::grid_dimensions(spec.size, spec.cell_size);
        let grid = TileGrid::decode(map, w, h)?;
        Ok(TileLayer {
            spec,
            atlas,
            grid,
            cache: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn atlas(&self) -> AtlasId {
        self.atlas
    }

    pub fn spec(&self) -> &LayerSpec {
        &self.spec
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        self.spec.size
    }

    #[inline]
    pub fn z(&self) -> i32 {
        self.spec.z
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Changing cells drops the cached surface.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: TileCell) {
        self.grid.set(x, y, cell);
        self.cache = None;
    }

    pub fn encode(&self) -> String {
        self.grid.encode()
    }

    /// The header record this layer was loaded from.
    pub fn header_line(&self) -> String {
        let s = &self.spec;
        format!(
            "{},{},{},{},{},{},{},{},{},{}",
            s.name,
            s.atlas_name,
            s.size.x,
            s.size.y,
            s.cell_size.x,
            s.cell_size.y,
            s.key.r,
            s.key.g,
            s.key.b,
            s.z
        )
    }

    pub fn is_materialized(&self) -> bool {
        self.cache.is_some()
    }

    /// Builds the full-layer surface if it does not exist yet. Cells that
    /// point past the atlas read from atlas cell 0 on that axis.
    pub fn materialize(&mut self, atlas: &Surface) -> &Surface {
        let spec = &self.spec;
        let grid = &self.grid;
        self.cache.get_or_insert_with(|| {
            let cell = spec.cell_size;
            let mut image = Surface::new(spec.size);
            image.fill_transparent(spec.key);

            let (cols, rows) = TileLayer::grid_dimensions(atlas.size(), cell);
            for gy in 0..grid.height() {
                for gx in 0..grid.width() {
                    let Some(tile) = grid.get(gx, gy) else {
                        continue;
                    };
                    let ax = if (tile.x as usize) < cols { tile.x as i32 } else { 0 };
                    let ay = if (tile.y as usize) < rows { tile.y as i32 } else { 0 };
                    image.blit(
                        atlas,
                        PixelRect::new(ax * cell.x, ay * cell.y, cell.x, cell.y),
                        PixelRect::new(gx as i32 * cell.x, gy as i32 * cell.y, cell.x, cell.y),
                    );
                }
            }
            image.make_transparent(spec.key);
            log::debug!("Materialized layer '{}' ({}x{})", spec.name, spec.size.x, spec.size.y);
            image
        })
    }

    /// Copies `src_rect` of the layer into a new surface of the same size.
    pub fn draw(&mut self, atlas: &Surface, src_rect: PixelRect) -> Surface {
        let mut out = Surface::new(src_rect.size());
        out.fill_transparent(self.spec.key);
        let layer = self.materialize(atlas);
        out.blit(layer, src_rect, PixelRect::sized(src_rect.size()));
        out
    }

    /// Clears `dest_rect` of `dst` to the transparent key, then copies
    /// `src_rect` of the layer into it.
    pub fn draw_into(
        &mut self,
        atlas: &Surface,
        src_rect: PixelRect,
        dst: &mut Surface,
        dest_rect: PixelRect,
    ) {
        dst.fill_rect(dest_rect, self.spec.key.clear_pixel());
        self.overlay_into(atlas, src_rect, dst, dest_rect);
    }

    /// Copies `src_rect` of the layer over whatever `dst` already holds.
    pub fn overlay_into(
        &mut self,
        atlas: &Surface,
        src_rect: PixelRect,
        dst: &mut Surface,
        dest_rect: PixelRect,
    ) {
        let layer = self.materialize(atlas);
        dst.blit(layer, src_rect, dest_rect);
    }
}

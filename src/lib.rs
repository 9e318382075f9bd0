//! Tile and sprite world for Macroquad: text level loading, entity motion
//! against an obstacle grid, and parallax compositing into camera surfaces.

mod camera;
mod config;
mod entity;
mod error;
mod events;
mod geom;
mod loader {
    pub mod level_loader;
}
mod render {
    pub mod background;
    pub mod parallax;
    pub mod strip;
}
mod spatial {
    pub mod obstacle;
}
mod surface;
mod world;

pub use camera::{Camera, CameraStyle};
pub use config::EngineConfig;
pub use entity::{DirectionTable, Entity, EntityId, Lifecycle, Movement, Step};
pub use error::EngineError;
pub use events::{walls_crossed, EventLog, Wall, WorldEvent, WorldListener};
pub use geom::PixelRect;
pub use loader::level_loader::load_level;
pub use render::background::{LayerSpec, TileCell, TileGrid, TileLayer, TileMapError, TILE_ALPHABET};
pub use render::parallax::{scroll_ratio, source_rect, ParallaxStack};
pub use render::strip::{AnimationStrip, StripAxis, StripId};
pub use spatial::obstacle::{ObstacleGrid, ObstacleMapError};
pub use surface::{AtlasId, ColorKey, FsImageLoader, ImageLoader, Surface};
pub use world::{clamp_camera_offset, World};

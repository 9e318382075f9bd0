use macroquad::math::{IVec2, IVec3};

use crate::camera::{Camera, CameraStyle};
use crate::geom::PixelRect;
use crate::render::background::TileLayer;
use crate::surface::Surface;

/// How far a layer scrolls per pixel of camera movement on one axis.
/// Zero when the level is exactly one viewport wide on that axis.
pub fn scroll_ratio(layer: i32, viewport: i32, level: i32) -> f64 {
    let span = level - viewport;
    if span == 0 {
        return 0.0;
    }
    (layer - viewport) as f64 / span as f64
}

/// Region of `layer` visible through a camera at `offset` with the given
/// viewport and shear.
pub fn source_rect(
    layer_size: IVec2,
    layer_z: i32,
    offset: IVec3,
    viewport: IVec2,
    level_size: IVec2,
    style: CameraStyle,
) -> PixelRect {
    let rx = scroll_ratio(layer_size.x, viewport.x, level_size.x);
    let ry = scroll_ratio(layer_size.y, viewport.y, level_size.y);
    PixelRect::new(
        (rx * offset.x as f64).round_ties_even() as i32 + style.shear(layer_z),
        (ry * offset.y as f64).round_ties_even() as i32,
        viewport.x,
        viewport.y,
    )
}

/// Back-to-front stack of tile layers.
#[derive(Debug, Clone, Default)]
pub struct ParallaxStack {
    layers: Vec<TileLayer>,
}

impl ParallaxStack {
    pub fn new() -> Self {
        ParallaxStack { layers: Vec::new() }
    }

    /// Adds a layer in front of the existing ones.
    pub fn push(&mut self, layer: TileLayer) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [TileLayer] {
        &mut self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Draws every layer onto the camera surface, farthest first.
    /// Layers whose atlas is missing from `atlases` are skipped.
    pub fn composite(&mut self, camera: &mut Camera, level_size: IVec2, atlases: &[Surface]) {
        let viewport = camera.viewport_size();
        let style = camera.style;
        let offset = camera.offset;
        let dest = PixelRect::sized(viewport);

        for layer in &mut self.layers {
            let Some(atlas) = atlases.get(layer.atlas().index()) else {
                log::warn!("Layer '{}' has no atlas, skipped", layer.name());
                continue;
            };
            let src = source_rect(layer.size(), layer.z(), offset, viewport, level_size, style);
            layer.overlay_into(atlas, src, camera.surface_mut(), dest);
        }
    }
}

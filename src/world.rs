//! The world: owns every entity, camera, layer and asset, and runs the
//! per-tick passes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use macroquad::math::{IVec2, IVec3};

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::entity::{Entity, EntityId};
use crate::events::{walls_crossed, WorldListener};
use crate::geom::flatten;
use crate::loader::level_loader::load_level;
use crate::render::parallax::ParallaxStack;
use crate::render::strip::{AnimationStrip, StripId};
use crate::spatial::obstacle::ObstacleGrid;
use crate::surface::{AtlasId, FsImageLoader, Surface};

/// Owns a level's assets, entities, cameras and layers.
pub struct World {
    level_size: IVec2,
    depth: i32,
    obstacles: ObstacleGrid,
    atlases: Vec<Surface>,
    atlas_names: HashMap<String, AtlasId>,
    strips: Vec<AnimationStrip>,
    strip_names: HashMap<String, StripId>,
    entities: Vec<Entity>,
    cameras: Vec<Camera>,
    background: ParallaxStack,
    foreground: ParallaxStack,
    listeners: Vec<Box<dyn WorldListener>>,
    next_id: u32,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("level_size", &self.level_size)
            .field("depth", &self.depth)
            .field("entities", &self.entities.len())
            .field("cameras", &self.cameras.len())
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Empty world with an all-passable 32x32 obstacle grid.
    pub fn new(level_size: IVec2, depth: i32) -> Self {
        World {
            level_size,
            depth,
            obstacles: ObstacleGrid::new(IVec2::new(32, 32), level_size),
            atlases: Vec::new(),
            atlas_names: HashMap::new(),
            strips: Vec::new(),
            strip_names: HashMap::new(),
            entities: Vec::new(),
            cameras: Vec::new(),
            background: ParallaxStack::new(),
            foreground: ParallaxStack::new(),
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// Reads a level file and builds its world. Atlas paths resolve against
    /// `config.image_dir` next to the level file.
    pub fn load<P: AsRef<Path>>(path: P, config: &EngineConfig) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Reading level file {}", path.display()))?;

        let level_dir = path
            .parent()
            .map(|d| d.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./"));
        let mut images = FsImageLoader::new(level_dir.join(&config.image_dir));

        load_level(&text, &mut images, config)
            .with_context(|| format!("Loading level {}", path.display()))
    }

    /// Level size in pixels.
    #[inline]
    pub fn level_size(&self) -> IVec2 {
        self.level_size
    }

    #[inline]
    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn obstacles(&self) -> &ObstacleGrid {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut ObstacleGrid {
        &mut self.obstacles
    }

    pub fn set_obstacles(&mut self, grid: ObstacleGrid) {
        self.obstacles = grid;
    }

    /// Registers an atlas image; re-using a name replaces the mapping.
    pub fn add_atlas(&mut self, name: impl Into<String>, surface: Surface) -> AtlasId {
        let id = AtlasId(self.atlases.len());
        self.atlases.push(surface);
        self.atlas_names.insert(name.into(), id);
        id
    }

    pub fn atlas_id(&self, name: &str) -> Option<AtlasId> {
        self.atlas_names.get(name).copied()
    }

    pub fn atlas(&self, id: AtlasId) -> Option<&Surface> {
        self.atlases.get(id.index())
    }

    pub fn add_strip(&mut self, name: impl Into<String>, strip: AnimationStrip) -> StripId {
        let id = StripId(self.strips.len());
        self.strips.push(strip);
        self.strip_names.insert(name.into(), id);
        id
    }

    pub fn strip_id(&self, name: &str) -> Option<StripId> {
        self.strip_names.get(name).copied()
    }

    pub fn strip(&self, id: StripId) -> Option<&AnimationStrip> {
        self.strips.get(id.index())
    }

    /// Adds an entity, giving it a fresh id and its initial frame count and
    /// size.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.set_id(id);
        if let Some(strip) = self.strips.get(entity.animation().index()) {
            entity.resolve_frames(strip);
        }
        self.entities.push(entity);
        id
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn add_camera(&mut self, camera: Camera) {
        self.cameras.push(camera);
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut [Camera] {
        &mut self.cameras
    }

    pub fn background(&self) -> &ParallaxStack {
        &self.background
    }

    pub fn background_mut(&mut self) -> &mut ParallaxStack {
        &mut self.background
    }

    pub fn foreground(&self) -> &ParallaxStack {
        &self.foreground
    }

    pub fn foreground_mut(&mut self) -> &mut ParallaxStack {
        &mut self.foreground
    }

    pub fn add_listener(&mut self, listener: Box<dyn WorldListener>) {
        self.listeners.push(listener);
    }

    /// Sets gravity on every entity in `group` (all groups for `None`),
    /// skipping ghosts unless `include_ghosts`.
    pub fn set_gravity(&mut self, group: Option<&str>, include_ghosts: bool, gravity: IVec3) {
        for entity in &mut self.entities {
            if entity.ghost && !include_ghosts {
                continue;
            }
            if group.map_or(true, |g| entity.group == g) {
                entity.gravity = gravity;
            }
        }
    }

    /// Runs the simulation passes in their intended order.
    pub fn tick(&mut self) {
        self.animate_items();
        self.gravity_move_items();
        self.move_items();
        self.check_collisions();
    }

    /// Advances every entity one animation frame.
    pub fn animate_items(&mut self) {
        for entity in &mut self.entities {
            if entity.advance_frame() {
                for listener in &mut self.listeners {
                    listener.animation_complete(entity);
                }
            }
        }
    }

    /// Pulls every entity by its gravity. A step into a blocked cell is
    /// undone for non-ghosts. Every entity outside the level is reported,
    /// with or without gravity, and none is pushed back.
    pub fn gravity_move_items(&mut self) {
        let level = self.level_size;
        for entity in &mut self.entities {
            if entity.gravity != IVec3::ZERO {
                let before = entity.position;
                entity.position += entity.gravity;

                let contact = ObstacleGrid::gravity_contact_point(entity.bounds(), entity.gravity);
                if !entity.ghost && self.obstacles.is_blocked_at(contact) {
                    entity.position = before;
                    for listener in &mut self.listeners {
                        listener.gravity_touched_bump_map(entity);
                    }
                }
            }

            for wall in walls_crossed(entity.bounds(), level) {
                for listener in &mut self.listeners {
                    listener.wall_collision(entity, wall);
                }
            }
        }
    }

    /// Moves every entity by its own movement policy.
    pub fn move_items(&mut self) {
        let level = self.level_size;
        for entity in &mut self.entities {
            let before = entity.position;
            let had_reached = entity.reached_target;

            let delta = entity.apply_movement();
            if !entity.ghost && self.obstacles.leading_corners_blocked(entity.bounds(), flatten(delta))
            {
                entity.position = before;
                if let Some(target) = entity.target() {
                    entity.reached_target = entity.position == target;
                }
                for listener in &mut self.listeners {
                    listener.touched_bump_map(entity);
                }
            }

            if entity.reached_target && !had_reached {
                for listener in &mut self.listeners {
                    listener.reached_target(entity);
                }
            }

            for wall in walls_crossed(entity.bounds(), level) {
                for listener in &mut self.listeners {
                    listener.wall_collision(entity, wall);
                }
            }
        }
    }

    /// Reports each overlapping pair of live, solid entities once, then
    /// removes every entity marked for removal. Quadratic in entity count.
    pub fn check_collisions(&mut self) {
        let count = self.entities.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (head, tail) = self.entities.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];
                if a.ghost || b.ghost || a.is_dead() || b.is_dead() {
                    continue;
                }
                if a.bounds().overlaps(&b.bounds()) {
                    for listener in &mut self.listeners {
                        listener.object_collision(a, b);
                    }
                }
            }
        }

        let before = self.entities.len();
        self.entities.retain(|e| !e.is_dead());
        let removed = before - self.entities.len();
        if removed > 0 {
            log::debug!("Removed {} dead entities", removed);
        }
    }

    /// Renders the world into every camera's surface.
    pub fn frame(&mut self) {
        let level = self.level_size;
        for camera in &mut self.cameras {
            camera.move_absolute(clamp_camera_offset(camera.offset, camera.viewport_size(), level));
            camera.surface_mut().fill([0, 0, 0, 0]);

            if camera.show_background {
                self.background.composite(camera, level, &self.atlases);
            }

            for z in camera.start_z..camera.end_z {
                for entity in &mut self.entities {
                    if entity.position.z != z {
                        continue;
                    }
                    let Some(strip) = self.strips.get(entity.animation().index()) else {
                        continue;
                    };
                    let Some(atlas) = self.atlases.get(strip.atlas.index()) else {
                        continue;
                    };
                    entity.render(camera, strip, atlas);
                }
            }

            self.foreground.composite(camera, level, &self.atlases);
        }
    }
}

/// Keeps a viewport inside the level. An offset past the level's far edge
/// wraps to 0; one that only lets the viewport overhang is pulled back to
/// `level - viewport`. Negative offsets are left alone.
pub fn clamp_camera_offset(offset: IVec3, viewport: IVec2, level: IVec2) -> IVec3 {
    let axis = |o: i32, view: i32, size: i32| {
        if o > size {
            0
        } else if o + view > size {
            (size - view).max(0)
        } else {
            o
        }
    };
    IVec3::new(
        axis(offset.x, viewport.x, level.x),
        axis(offset.y, viewport.y, level.y),
        offset.z,
    )
}

//! Simulated entities: movement policy and animation state.

use macroquad::math::{IVec2, IVec3};

use crate::camera::Camera;
use crate::geom::PixelRect;
use crate::render::strip::{AnimationStrip, StripId};
use crate::surface::Surface;

/// Identity of an entity within its world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Sign of a per-axis step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Toward negative coordinates (left or up).
    Back,
    Still,
    /// Toward positive coordinates (right or down).
    Forward,
}

impl Step {
    /// Sign of `delta`.
    #[inline]
    pub fn of(delta: i32) -> Self {
        match delta.signum() {
            -1 => Step::Back,
            0 => Step::Still,
            _ => Step::Forward,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        match self {
            Step::Back => 0,
            Step::Still => 1,
            Step::Forward => 2,
        }
    }
}

/// Animation per direction of travel. Rows are vertical steps (up, none,
/// down), columns horizontal steps (left, none, right).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionTable([[StripId; 3]; 3]);

impl DirectionTable {
    /// Builds the table from nine strips in reading order: top-left, top,
    /// top-right, left, stay, right, bottom-left, bottom, bottom-right.
    pub fn new(slots: [StripId; 9]) -> Self {
        let [tl, t, tr, l, c, r, bl, b, br] = slots;
        DirectionTable([[tl, t, tr], [l, c, r], [bl, b, br]])
    }

    /// The same strip in every direction.
    pub fn uniform(strip: StripId) -> Self {
        DirectionTable([[strip; 3]; 3])
    }

    #[inline]
    pub fn get(&self, dx: Step, dy: Step) -> StripId {
        self.0[dy.slot()][dx.slot()]
    }

    /// Strip used when not moving.
    pub fn stay(&self) -> StripId {
        self.get(Step::Still, Step::Still)
    }
}

/// What drives an entity's own movement each pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Movement {
    /// Moves by its velocity every pass.
    #[default]
    Idle,
    /// Walks toward a point using the velocity magnitudes as step sizes.
    SeekingTarget(IVec3),
}

/// Whether an entity is still part of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Alive,
    /// Removed at the end of the next collision pass.
    PendingRemoval,
}

/// Steps `current` toward `target` by `step`, never passing it.
#[inline]
fn approach(current: i32, target: i32, step: i32) -> i32 {
    if current < target {
        (current + step).min(target)
    } else if current > target {
        (current - step).max(target)
    } else {
        current
    }
}

/// A simulated object: position, motion and the animation it shows.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    /// Object type from the level file; used to address groups.
    pub group: String,
    directions: DirectionTable,
    animation: StripId,
    /// Top-left corner in world pixels; `z` picks the draw layer.
    pub position: IVec3,
    /// Per-pass movement, or per-axis step size while seeking.
    pub velocity: IVec3,
    /// Added every gravity pass.
    pub gravity: IVec3,
    movement: Movement,
    size: IVec2,
    /// When set, `size` follows the current animation's frame size.
    pub track_animation_size: bool,
    current_frame: i32,
    max_frame: i32,
    /// Ignored by obstacle and pairwise collision.
    pub ghost: bool,
    pub lifecycle: Lifecycle,
    /// Switch animation with direction of travel.
    pub auto_animation: bool,
    /// Raise `animation_complete` each time the strip wraps.
    pub report_animation_end: bool,
    pub animation_complete: bool,
    pub reached_target: bool,
    /// Free values for game code.
    pub value1: i32,
    pub value2: i32,
}

impl Entity {
    /// Entity with an animation for each of the nine directions.
    pub fn directional(
        group: impl Into<String>,
        directions: DirectionTable,
        position: IVec3,
        velocity: IVec3,
        ghost: bool,
    ) -> Self {
        Entity {
            id: EntityId(0),
            group: group.into(),
            directions,
            animation: directions.stay(),
            position,
            velocity,
            gravity: IVec3::ZERO,
            movement: Movement::Idle,
            size: IVec2::ZERO,
            track_animation_size: true,
            current_frame: 1,
            max_frame: 0,
            ghost,
            lifecycle: Lifecycle::Alive,
            auto_animation: true,
            report_animation_end: false,
            animation_complete: false,
            reached_target: false,
            value1: 1,
            value2: 0,
        }
    }

    /// Entity with one animation regardless of direction.
    pub fn single(
        group: impl Into<String>,
        strip: StripId,
        position: IVec3,
        velocity: IVec3,
        ghost: bool,
    ) -> Self {
        let mut entity =
            Entity::directional(group, DirectionTable::uniform(strip), position, velocity, ghost);
        entity.auto_animation = false;
        entity
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    pub fn directions(&self) -> &DirectionTable {
        &self.directions
    }

    #[inline]
    pub fn animation(&self) -> StripId {
        self.animation
    }

    #[inline]
    pub fn current_frame(&self) -> i32 {
        self.current_frame
    }

    #[inline]
    pub fn max_frame(&self) -> i32 {
        self.max_frame
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        self.size
    }

    /// Fixes the size and stops it following the animation.
    pub fn pin_size(&mut self, size: IVec2) {
        self.size = size;
        self.track_animation_size = false;
    }

    #[inline]
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    pub fn movement(&self) -> Movement {
        self.movement
    }

    /// Point being sought, if any.
    pub fn target(&self) -> Option<IVec3> {
        match self.movement {
            Movement::Idle => None,
            Movement::SeekingTarget(t) => Some(t),
        }
    }

    /// Starts walking toward `target`.
    pub fn seek(&mut self, target: IVec3) {
        self.movement = Movement::SeekingTarget(target);
        self.reached_target = false;
    }

    /// Returns to velocity movement.
    pub fn stop_seeking(&mut self) {
        self.movement = Movement::Idle;
        self.reached_target = false;
    }

    pub fn set_position(&mut self, position: IVec3) {
        self.position = position;
    }

    pub fn offset_position(&mut self, delta: IVec3) {
        self.position += delta;
    }

    /// Marks the entity for removal at the end of the next collision pass.
    pub fn kill(&mut self) {
        self.lifecycle = Lifecycle::PendingRemoval;
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.lifecycle == Lifecycle::PendingRemoval
    }

    /// Moves to the next frame, wrapping to 1 after the last. Returns true
    /// when the wrap was reported through `animation_complete`.
    ///
    /// With the frame count still unresolved (`max_frame == 0`) the frame
    /// wraps silently.
    pub fn advance_frame(&mut self) -> bool {
        self.current_frame += 1;
        if self.current_frame <= self.max_frame {
            return false;
        }
        self.current_frame = 1;
        if self.max_frame > 0 && self.report_animation_end {
            self.animation_complete = true;
            return true;
        }
        false
    }

    /// Applies the movement policy once and returns the displacement.
    pub fn apply_movement(&mut self) -> IVec3 {
        let before = self.position;
        match self.movement {
            Movement::Idle => {
                self.position += self.velocity;
            }
            Movement::SeekingTarget(target) => {
                let step = self.velocity.abs();
                self.position = IVec3::new(
                    approach(self.position.x, target.x, step.x),
                    approach(self.position.y, target.y, step.y),
                    approach(self.position.z, target.z, step.z),
                );
                self.reached_target = self.position == target;
            }
        }
        let delta = self.position - before;
        let (dx, dy) = match self.movement {
            Movement::Idle => (Step::of(self.velocity.x), Step::of(self.velocity.y)),
            Movement::SeekingTarget(_) => (Step::of(delta.x), Step::of(delta.y)),
        };
        self.select_animation(dx, dy);
        delta
    }

    /// Switches to the animation for a direction bucket when auto
    /// switching is on. A switch restarts the strip and forces its frame
    /// count and size to be resolved again at the next render.
    pub fn select_animation(&mut self, dx: Step, dy: Step) {
        if !self.auto_animation {
            return;
        }
        let next = self.directions.get(dx, dy);
        if next != self.animation {
            self.animation = next;
            self.current_frame = 0;
            self.max_frame = 0;
        }
    }

    #[inline]
    pub fn needs_frame_resolution(&self) -> bool {
        self.max_frame == 0
    }

    /// Takes frame count and, when tracking, size from `strip`.
    pub fn resolve_frames(&mut self, strip: &AnimationStrip) {
        self.max_frame = strip.frame_count;
        if self.track_animation_size {
            self.size = strip.frame_size;
        }
    }

    /// Draws the current frame through `camera`.
    pub fn render(&mut self, camera: &mut Camera, strip: &AnimationStrip, atlas: &Surface) {
        if self.needs_frame_resolution() {
            self.resolve_frames(strip);
        }
        let origin = camera.project(self.position);
        let dest = PixelRect::from_origin(origin, self.size);
        strip.draw(self.current_frame.max(1), atlas, dest, camera.surface_mut());
    }
}

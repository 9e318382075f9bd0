//! World events and the listener interface they are delivered through.

use std::cell::RefCell;
use std::rc::Rc;

use macroquad::math::IVec2;

use crate::entity::{Entity, EntityId};
use crate::geom::PixelRect;

/// Level edge crossed by an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Top,
    Left,
    Right,
    Bottom,
}

impl Wall {
    pub const ALL: [Wall; 4] = [Wall::Top, Wall::Left, Wall::Right, Wall::Bottom];

    /// Whether `bounds` pokes through this edge of a level of `level_size`.
    pub fn violated_by(self, bounds: PixelRect, level_size: IVec2) -> bool {
        match self {
            Wall::Top => bounds.y < 0,
            Wall::Left => bounds.x < 0,
            Wall::Right => bounds.right() > level_size.x,
            Wall::Bottom => bounds.bottom() > level_size.y,
        }
    }
}

/// Edges of the level `bounds` crosses, in `Wall::ALL` order.
pub fn walls_crossed(bounds: PixelRect, level_size: IVec2) -> impl Iterator<Item = Wall> {
    Wall::ALL
        .into_iter()
        .filter(move |wall| wall.violated_by(bounds, level_size))
}

/// Receives world events while a pass runs. Handlers may change the
/// entities they are given, including calling [`Entity::kill`].
///
/// Every method defaults to doing nothing.
pub trait WorldListener {
    /// The entity's strip wrapped with end reporting on.
    fn animation_complete(&mut self, _entity: &mut Entity) {}
    /// A gravity step hit a blocked cell and was undone.
    fn gravity_touched_bump_map(&mut self, _entity: &mut Entity) {}
    /// A movement step hit a blocked cell and was undone.
    fn touched_bump_map(&mut self, _entity: &mut Entity) {}
    /// The entity arrived at its target during this pass.
    fn reached_target(&mut self, _entity: &mut Entity) {}
    /// The entity extends past `wall`. Raised once per crossed edge.
    fn wall_collision(&mut self, _entity: &mut Entity, _wall: Wall) {}
    /// Two solid entities overlap. Raised once per pair.
    fn object_collision(&mut self, _a: &mut Entity, _b: &mut Entity) {}
}

/// Record of a raised event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    AnimationComplete(EntityId),
    GravityTouchedBumpMap(EntityId),
    TouchedBumpMap(EntityId),
    ReachedTarget(EntityId),
    WallCollision(EntityId, Wall),
    ObjectCollision(EntityId, EntityId),
}

/// Listener that appends every event to a shared list. Clones share the
/// same list, so one clone can be registered and the other read.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<WorldEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WorldEvent> {
        self.events.borrow().clone()
    }

    /// Returns and clears the recorded events.
    pub fn drain(&self) -> Vec<WorldEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    fn push(&self, event: WorldEvent) {
        log::trace!("{:?}", event);
        self.events.borrow_mut().push(event);
    }
}

impl WorldListener for EventLog {
    fn animation_complete(&mut self, entity: &mut Entity) {
        self.push(WorldEvent::AnimationComplete(entity.id()));
    }
    fn gravity_touched_bump_map(&mut self, entity: &mut Entity) {
        self.push(WorldEvent::GravityTouchedBumpMap(entity.id()));
    }
    fn touched_bump_map(&mut self, entity: &mut Entity) {
        self.push(WorldEvent::TouchedBumpMap(entity.id()));
    }
    fn reached_target(&mut self, entity: &mut Entity) {
        self.push(WorldEvent::ReachedTarget(entity.id()));
    }
    fn wall_collision(&mut self, entity: &mut Entity, wall: Wall) {
        self.push(WorldEvent::WallCollision(entity.id(), wall));
    }
    fn object_collision(&mut self, a: &mut Entity, b: &mut Entity) {
        self.push(WorldEvent::ObjectCollision(a.id(), b.id()));
    }
}

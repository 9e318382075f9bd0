// tests/world_tests.rs

use macroquad::math::{IVec2, IVec3};
use parallax_world::{
    AnimationStrip, AtlasId, Entity, EntityId, EventLog, ObstacleGrid, StripAxis, StripId, Surface,
    Wall, World, WorldEvent, WorldListener,
};

const RED: [u8; 4] = [255, 0, 0, 255];

/// 100x100 level with one 10x10, two-frame strip and a 10px obstacle grid.
fn world() -> (World, StripId, EventLog) {
    let mut world = World::new(IVec2::new(100, 100), 1);
    let atlas: AtlasId = world.add_atlas("sheet", Surface::filled(IVec2::new(32, 32), RED));
    let strip = world.add_strip(
        "blob",
        AnimationStrip {
            atlas,
            frame_size: IVec2::new(10, 10),
            initial_offset: IVec2::ZERO,
            axis: StripAxis::Horizontal,
            frame_count: 2,
        },
    );
    world.set_obstacles(ObstacleGrid::new(IVec2::new(10, 10), IVec2::new(100, 100)));
    let log = EventLog::new();
    world.add_listener(Box::new(log.clone()));
    (world, strip, log)
}

fn spawn(world: &mut World, strip: StripId, group: &str, pos: IVec3, vel: IVec3) -> EntityId {
    world.spawn(Entity::single(group, strip, pos, vel, false))
}

#[test]
fn seeking_reaches_target_in_ten_steps_without_overshoot() {
    let (mut world, strip, log) = world();
    let id = spawn(&mut world, strip, "bat", IVec3::ZERO, IVec3::new(5, 0, 0));
    world.entity_mut(id).unwrap().seek(IVec3::new(50, 0, 0));

    for _ in 0..10 {
        world.move_items();
        assert!(world.entity(id).unwrap().position.x <= 50);
    }
    let bat = world.entity(id).unwrap();
    assert_eq!(bat.position.x, 50);
    assert!(bat.reached_target);
    assert_eq!(log.drain(), vec![WorldEvent::ReachedTarget(id)]);

    // Parked on the target: no further reports.
    world.move_items();
    assert_eq!(world.entity(id).unwrap().position.x, 50);
    assert!(log.drain().is_empty());
}

#[test]
fn blocked_move_is_reverted_and_reported() {
    let (mut world, strip, log) = world();
    world.obstacles_mut().set_blocked(IVec2::new(3, 0), true);
    let id = spawn(&mut world, strip, "hero", IVec3::new(20, 0, 0), IVec3::new(5, 0, 0));

    world.move_items();
    assert_eq!(world.entity(id).unwrap().position, IVec3::new(20, 0, 0));
    assert_eq!(log.drain(), vec![WorldEvent::TouchedBumpMap(id)]);
}

#[test]
fn ghosts_pass_through_obstacles() {
    let (mut world, strip, log) = world();
    world.obstacles_mut().set_blocked(IVec2::new(3, 0), true);
    let id = world.spawn(Entity::single(
        "ghost",
        strip,
        IVec3::new(20, 0, 0),
        IVec3::new(5, 0, 0),
        true,
    ));

    world.move_items();
    assert_eq!(world.entity(id).unwrap().position, IVec3::new(25, 0, 0));
    assert!(log.drain().is_empty());
}

#[test]
fn gravity_step_into_obstacle_is_reverted() {
    let (mut world, strip, log) = world();
    world.obstacles_mut().set_blocked(IVec2::new(0, 5), true);
    let solid = spawn(&mut world, strip, "rock", IVec3::new(0, 40, 0), IVec3::ZERO);
    let ghost = world.spawn(Entity::single("mist", strip, IVec3::new(0, 40, 0), IVec3::ZERO, true));
    world.set_gravity(None, true, IVec3::new(0, 4, 0));

    world.gravity_move_items();
    assert_eq!(world.entity(solid).unwrap().position.y, 40);
    assert_eq!(world.entity(ghost).unwrap().position.y, 44);
    assert_eq!(log.drain(), vec![WorldEvent::GravityTouchedBumpMap(solid)]);
}

#[test]
fn walls_are_reported_per_edge_without_clamping() {
    let (mut world, strip, log) = world();
    let id = spawn(&mut world, strip, "crate", IVec3::new(-4, 95, 0), IVec3::ZERO);
    world.entity_mut(id).unwrap().gravity = IVec3::new(0, 1, 0);

    world.gravity_move_items();
    assert_eq!(world.entity(id).unwrap().position, IVec3::new(-4, 96, 0));
    assert_eq!(
        log.drain(),
        vec![
            WorldEvent::WallCollision(id, Wall::Left),
            WorldEvent::WallCollision(id, Wall::Bottom),
        ]
    );
}

#[test]
fn walls_are_checked_for_entities_without_gravity() {
    let (mut world, strip, log) = world();
    let mut crate_ = Entity::single("crate", strip, IVec3::new(-4, 50, 0), IVec3::ZERO, false);
    crate_.pin_size(IVec2::new(10, 10));
    let id = world.spawn(crate_);

    world.gravity_move_items();
    assert_eq!(world.entity(id).unwrap().position, IVec3::new(-4, 50, 0));
    assert_eq!(log.drain(), vec![WorldEvent::WallCollision(id, Wall::Left)]);
}

#[test]
fn animation_completion_is_reported_on_wrap() {
    let (mut world, strip, log) = world();
    let id = spawn(&mut world, strip, "coin", IVec3::ZERO, IVec3::ZERO);
    world.entity_mut(id).unwrap().report_animation_end = true;

    world.animate_items();
    assert!(log.drain().is_empty());
    world.animate_items();
    assert_eq!(log.drain(), vec![WorldEvent::AnimationComplete(id)]);
    assert_eq!(world.entity(id).unwrap().current_frame(), 1);
}

/// Kills every "coin" involved in a collision.
struct CoinCollector;

impl WorldListener for CoinCollector {
    fn object_collision(&mut self, a: &mut Entity, b: &mut Entity) {
        for e in [a, b] {
            if e.group == "coin" {
                e.kill();
            }
        }
    }
}

#[test]
fn collisions_report_each_pair_once_and_remove_the_dead() {
    let (mut world, strip, log) = world();
    world.add_listener(Box::new(CoinCollector));
    let hero = spawn(&mut world, strip, "hero", IVec3::new(10, 10, 0), IVec3::ZERO);
    let coin = spawn(&mut world, strip, "coin", IVec3::new(15, 15, 0), IVec3::ZERO);
    let rock = spawn(&mut world, strip, "rock", IVec3::new(12, 12, 0), IVec3::ZERO);
    let far = spawn(&mut world, strip, "rock", IVec3::new(60, 60, 0), IVec3::ZERO);

    world.check_collisions();
    // The coin is dead by the time the coin/rock pair comes up.
    assert_eq!(
        log.drain(),
        vec![
            WorldEvent::ObjectCollision(hero, coin),
            WorldEvent::ObjectCollision(hero, rock),
        ]
    );
    let ids: Vec<EntityId> = world.entities().iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![hero, rock, far]);
}

#[test]
fn touching_edges_do_not_collide() {
    let (mut world, strip, log) = world();
    spawn(&mut world, strip, "a", IVec3::new(0, 0, 0), IVec3::ZERO);
    spawn(&mut world, strip, "b", IVec3::new(10, 0, 0), IVec3::ZERO);
    world.check_collisions();
    assert!(log.drain().is_empty());
}

#[test]
fn ghosts_never_collide() {
    let (mut world, strip, log) = world();
    spawn(&mut world, strip, "a", IVec3::ZERO, IVec3::ZERO);
    world.spawn(Entity::single("b", strip, IVec3::ZERO, IVec3::ZERO, true));
    world.check_collisions();
    assert!(log.drain().is_empty());
}

#[test]
fn killed_entities_survive_until_the_collision_pass() {
    let (mut world, strip, _log) = world();
    let id = spawn(&mut world, strip, "a", IVec3::ZERO, IVec3::ZERO);
    world.entity_mut(id).unwrap().kill();
    world.move_items();
    assert!(world.entity(id).is_some());
    world.check_collisions();
    assert!(world.entity(id).is_none());
}

#[test]
fn tick_runs_all_simulation_passes() {
    let (mut world, strip, log) = world();
    let id = spawn(&mut world, strip, "hero", IVec3::new(10, 10, 0), IVec3::new(2, 0, 0));
    world.entity_mut(id).unwrap().gravity = IVec3::new(0, 1, 0);

    world.tick();
    let hero = world.entity(id).unwrap();
    assert_eq!(hero.position, IVec3::new(12, 11, 0));
    assert_eq!(hero.current_frame(), 2);
    assert!(log.events().is_empty());
}

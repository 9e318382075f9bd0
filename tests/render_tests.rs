// tests/render_tests.rs

use macroquad::math::{IVec2, IVec3};
use parallax_world::{
    AnimationStrip, Camera, CameraStyle, ColorKey, Entity, LayerSpec, PixelRect, StripAxis,
    StripId, Surface, TileLayer, World,
};

const CLEAR: [u8; 4] = [0, 0, 0, 0];
const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const KEY: ColorKey = ColorKey::new(255, 0, 255);

/// 100x100 level. Atlas "sprites" is solid red; atlas "tiles" holds three
/// 10x10 cells: blue, green and the magenta key.
fn world() -> (World, StripId) {
    let mut world = World::new(IVec2::new(100, 100), 1);
    let sprites = world.add_atlas("sprites", Surface::filled(IVec2::new(10, 10), RED));

    let mut tiles = Surface::filled(IVec2::new(30, 10), BLUE);
    tiles.fill_rect(PixelRect::new(10, 0, 10, 10), GREEN);
    tiles.fill_rect(PixelRect::new(20, 0, 10, 10), [255, 0, 255, 255]);
    tiles.make_transparent(KEY);
    world.add_atlas("tiles", tiles);

    let strip = world.add_strip(
        "dot",
        AnimationStrip {
            atlas: sprites,
            frame_size: IVec2::new(10, 10),
            initial_offset: IVec2::ZERO,
            axis: StripAxis::Horizontal,
            frame_count: 1,
        },
    );
    world.add_camera(Camera::new(
        IVec2::new(20, 20),
        PixelRect::new(0, 0, 20, 20),
        CameraStyle::Standard,
    ));
    (world, strip)
}

fn layer(world: &World, name: &str, size: IVec2, map: &str) -> TileLayer {
    let spec = LayerSpec {
        name: name.to_string(),
        atlas_name: "tiles".to_string(),
        size,
        cell_size: IVec2::new(10, 10),
        key: KEY,
        z: 0,
    };
    TileLayer::new(spec, world.atlas_id("tiles").unwrap(), map).unwrap()
}

fn pixel(world: &World, x: i32, y: i32) -> [u8; 4] {
    world.cameras()[0].surface().pixel(x, y).unwrap()
}

#[test]
fn entities_are_drawn_at_their_projected_position() {
    let (mut world, strip) = world();
    world.spawn(Entity::single("dot", strip, IVec3::new(5, 5, 0), IVec3::ZERO, false));

    world.frame();
    assert_eq!(pixel(&world, 5, 5), RED);
    assert_eq!(pixel(&world, 14, 14), RED);
    assert_eq!(pixel(&world, 4, 4), CLEAR);
    assert_eq!(pixel(&world, 15, 15), CLEAR);
}

#[test]
fn each_frame_starts_from_a_transparent_surface() {
    let (mut world, strip) = world();
    world.cameras_mut()[0].surface_mut().fill(GREEN);
    let id = world.spawn(Entity::single("dot", strip, IVec3::new(0, 0, 0), IVec3::ZERO, false));

    world.frame();
    assert_eq!(pixel(&world, 0, 0), RED);
    assert_eq!(pixel(&world, 19, 19), CLEAR);

    world.entity_mut(id).unwrap().set_position(IVec3::new(10, 10, 0));
    world.frame();
    assert_eq!(pixel(&world, 0, 0), CLEAR);
    assert_eq!(pixel(&world, 10, 10), RED);
}

#[test]
fn frame_clamps_camera_inside_the_level() {
    let (mut world, strip) = world();
    world.spawn(Entity::single("dot", strip, IVec3::new(85, 5, 0), IVec3::ZERO, false));
    world.cameras_mut()[0].move_absolute(IVec3::new(95, 0, 0));

    world.frame();
    assert_eq!(world.cameras()[0].offset, IVec3::new(80, 0, 0));
    assert_eq!(pixel(&world, 5, 5), RED);
}

#[test]
fn only_the_camera_z_range_is_drawn() {
    let (mut world, strip) = world();
    world.spawn(Entity::single("far", strip, IVec3::new(0, 0, 20), IVec3::ZERO, false));
    world.spawn(Entity::single("near", strip, IVec3::new(10, 10, 19), IVec3::ZERO, false));

    world.frame();
    assert_eq!(pixel(&world, 0, 0), CLEAR);
    assert_eq!(pixel(&world, 10, 10), RED);
}

#[test]
fn sheared_cameras_offset_by_depth() {
    let (mut world, strip) = world();
    world.cameras_mut()[0].style = CameraStyle::ShearLeft;
    world.spawn(Entity::single("dot", strip, IVec3::new(0, 0, 3), IVec3::ZERO, false));

    world.frame();
    assert_eq!(pixel(&world, 2, 0), CLEAR);
    assert_eq!(pixel(&world, 3, 0), RED);
}

#[test]
fn background_scrolls_by_parallax_ratio() {
    let (mut world, _) = world();
    // 40x20 layer: blue in columns 0..20, green in 20..40. Ratio 0.25.
    let sky = layer(&world, "sky", IVec2::new(40, 20), "0000101000001010");
    world.background_mut().push(sky);

    world.frame();
    assert_eq!(pixel(&world, 0, 0), BLUE);
    assert_eq!(pixel(&world, 19, 19), BLUE);

    world.cameras_mut()[0].move_absolute(IVec3::new(80, 0, 0));
    world.frame();
    assert_eq!(pixel(&world, 0, 0), GREEN);
    assert_eq!(pixel(&world, 19, 0), GREEN);
}

#[test]
fn hidden_background_is_not_drawn() {
    let (mut world, _) = world();
    let sky = layer(&world, "sky", IVec2::new(40, 20), "0000101000001010");
    world.background_mut().push(sky);
    world.cameras_mut()[0].show_background = false;

    world.frame();
    assert_eq!(pixel(&world, 0, 0), CLEAR);
}

#[test]
fn foreground_covers_entities_except_where_keyed() {
    let (mut world, strip) = world();
    let map = format!("00{}", "20".repeat(99));
    let fog = layer(&world, "fog", IVec2::new(100, 100), &map);
    world.foreground_mut().push(fog);
    world.spawn(Entity::single("dot", strip, IVec3::new(5, 5, 0), IVec3::ZERO, false));

    world.frame();
    assert_eq!(pixel(&world, 5, 5), BLUE);
    assert_eq!(pixel(&world, 12, 12), RED);
    assert_eq!(pixel(&world, 18, 18), CLEAR);
}

#[test]
fn layer_header_round_trips() {
    let (world, _) = world();
    let sky = layer(&world, "sky", IVec2::new(40, 20), "0000101000001010");
    assert_eq!(sky.header_line(), "sky,tiles,40,20,10,10,255,0,255,0");
    assert_eq!(sky.encode(), "0000101000001010");
}

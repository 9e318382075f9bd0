use anyhow::Context;
use macroquad::prelude::*;
use parallax_world::{EngineConfig, EventLog, World};

fn window_conf() -> Conf {
    Conf {
        window_title: "Run Level".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

/// `run_level <level file> [config.json]`
fn load_world() -> anyhow::Result<World> {
    let mut args = std::env::args().skip(1);
    let level = args.next().unwrap_or_else(|| "assets/level1.txt".to_string());
    let config = match args.next() {
        Some(path) => EngineConfig::load_from_file(&path)
            .with_context(|| format!("Reading config {}", path))?,
        None => EngineConfig::default(),
    };
    World::load(&level, &config)
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let mut world = match load_world() {
        Ok(world) => world,
        Err(e) => {
            log::error!("{:#}", e);
            return;
        }
    };
    let events = EventLog::new();
    world.add_listener(Box::new(events.clone()));

    let textures: Vec<Texture2D> = world
        .cameras()
        .iter()
        .map(|cam| {
            let texture = Texture2D::from_image(cam.surface().image());
            texture.set_filter(FilterMode::Nearest);
            texture
        })
        .collect();

    loop {
        clear_background(BLACK);

        let mut scroll = IVec3::ZERO;
        if is_key_down(KeyCode::Left) {
            scroll.x -= 4;
        }
        if is_key_down(KeyCode::Right) {
            scroll.x += 4;
        }
        if is_key_down(KeyCode::Up) {
            scroll.y -= 4;
        }
        if is_key_down(KeyCode::Down) {
            scroll.y += 4;
        }
        if let Some(cam) = world.cameras_mut().first_mut() {
            cam.move_relative(scroll);
        }

        world.tick();
        world.frame();
        for event in events.drain() {
            log::trace!("{:?}", event);
        }

        for (cam, texture) in world.cameras().iter().zip(&textures) {
            texture.update(cam.surface().image());
            let r = cam.draw_rect;
            draw_texture_ex(
                texture,
                r.x as f32,
                r.y as f32,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(r.w as f32, r.h as f32)),
                    ..Default::default()
                },
            );
        }

        draw_text(
            &format!("FPS: {}  objects: {}", get_fps(), world.entities().len()),
            20.0,
            30.0,
            30.0,
            RED,
        );

        next_frame().await;
    }
}

//! Line-oriented level file reader.
//!
//! A level is a sequence of comma-separated records grouped in sections, each
//! section closed by a sentinel line:
//!
//! ```text
//! width,height[,depth]
//! name,path,r,g,b                          ... ENDGRAPHICS
//! name,atlas,ox,oy,fw,fh,frames,Y|N        ... ENDANIMATIONS
//! name,atlas,w,h,cw,ch,r,g,b,z  + tile map ... ENDBACKGROUNDS
//! cw,ch,<0/1 digits>
//! group,<9 or 1 animations>,x,y,z,vx,vy,vz,Y|N ... ENDOBJECTS
//! rw,rh,dx,dy,dw,dh,S|L|R                  ... ENDCAMERAS
//! ```

use std::str::FromStr;

use macroquad::math::{IVec2, IVec3};

use crate::camera::{Camera, CameraStyle};
use crate::config::EngineConfig;
use crate::entity::{DirectionTable, Entity};
use crate::error::EngineError;
use crate::geom::PixelRect;
use crate::render::background::{LayerSpec, TileLayer};
use crate::render::strip::{AnimationStrip, StripAxis, StripId};
use crate::spatial::obstacle::ObstacleGrid;
use crate::surface::{ColorKey, ImageLoader};
use crate::world::World;

const END_GRAPHICS: &str = "ENDGRAPHICS";
const END_ANIMATIONS: &str = "ENDANIMATIONS";
const END_BACKGROUNDS: &str = "ENDBACKGROUNDS";
const END_OBJECTS: &str = "ENDOBJECTS";
const END_CAMERAS: &str = "ENDCAMERAS";

/// Record reader tracking 1-based line numbers.
struct LineReader<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        LineReader {
            lines: text.lines(),
            line_no: 0,
        }
    }

    /// Next line, or a format error naming `section` at end of input.
    fn next(&mut self, section: &str) -> Result<(usize, &'a str), EngineError> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok((self.line_no, line.trim_end_matches('\r').trim()))
            }
            None => Err(EngineError::format(
                self.line_no + 1,
                format!("unexpected end of input in {} section", section),
            )),
        }
    }

    /// Records of a section up to (and consuming) its sentinel.
    fn records(
        &mut self,
        section: &str,
        sentinel: &str,
        mut each: impl FnMut(usize, Vec<&'a str>) -> Result<(), EngineError>,
    ) -> Result<usize, EngineError> {
        let mut count = 0;
        loop {
            let (line_no, line) = self.next(section)?;
            if line == sentinel {
                return Ok(count);
            }
            each(line_no, fields(line))?;
            count += 1;
        }
    }
}

fn fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn expect_fields(line: usize, fields: &[&str], n: usize, what: &str) -> Result<(), EngineError> {
    if fields.len() != n {
        return Err(EngineError::format(
            line,
            format!("{} record needs {} fields, found {}", what, n, fields.len()),
        ));
    }
    Ok(())
}

fn number<T: FromStr>(line: usize, value: &str, what: &str) -> Result<T, EngineError> {
    value
        .parse()
        .map_err(|_| EngineError::format(line, format!("{} '{}' is not a valid number", what, value)))
}

fn flag(line: usize, value: &str, what: &str) -> Result<bool, EngineError> {
    match value {
        "Y" => Ok(true),
        "N" => Ok(false),
        other => Err(EngineError::format(
            line,
            format!("{} must be Y or N, found '{}'", what, other),
        )),
    }
}

fn color_key(line: usize, r: &str, g: &str, b: &str) -> Result<ColorKey, EngineError> {
    Ok(ColorKey::new(
        number(line, r, "red")?,
        number(line, g, "green")?,
        number(line, b, "blue")?,
    ))
}

fn ivec2(line: usize, x: &str, y: &str, what: &str) -> Result<IVec2, EngineError> {
    Ok(IVec2::new(number(line, x, what)?, number(line, y, what)?))
}

fn ivec3(line: usize, x: &str, y: &str, z: &str, what: &str) -> Result<IVec3, EngineError> {
    Ok(IVec3::new(
        number(line, x, what)?,
        number(line, y, what)?,
        number(line, z, what)?,
    ))
}

fn strip_named(world: &World, line: usize, name: &str) -> Result<StripId, EngineError> {
    world.strip_id(name).ok_or_else(|| EngineError::UnknownAnimation {
        line,
        name: name.to_string(),
    })
}

/// Builds a world from level text. Atlas paths are handed to `images` as
/// written in the file.
pub fn load_level(
    text: &str,
    images: &mut dyn ImageLoader,
    config: &EngineConfig,
) -> Result<World, EngineError> {
    let mut reader = LineReader::new(text);

    // Header
    let (line, header) = reader.next("header")?;
    let header = fields(header);
    if header.len() != 2 && header.len() != 3 {
        return Err(EngineError::format(
            line,
            format!("header needs 2 or 3 fields, found {}", header.len()),
        ));
    }
    let level_size = ivec2(line, header[0], header[1], "level size")?;
    let depth = match header.get(2) {
        Some(d) => number(line, d, "level depth")?,
        None => {
            log::debug!("No level depth given, using level width {}", level_size.x);
            level_size.x
        }
    };
    let mut world = World::new(level_size, depth);

    // Atlas images
    let atlases = reader.records("graphics", END_GRAPHICS, |line, f| {
        expect_fields(line, &f, 5, "graphics")?;
        let key = color_key(line, f[2], f[3], f[4])?;
        let mut surface = images.load_image(f[1])?;
        surface.make_transparent(key);
        world.add_atlas(f[0], surface);
        Ok(())
    })?;
    log::debug!("Loaded {} atlas images", atlases);

    // Animation strips
    let strips = reader.records("animations", END_ANIMATIONS, |line, f| {
        expect_fields(line, &f, 8, "animation")?;
        let atlas = world.atlas_id(f[1]).ok_or_else(|| EngineError::UnknownAtlas {
            line,
            name: f[1].to_string(),
        })?;
        let axis = if flag(line, f[7], "vertical flag")? {
            StripAxis::Vertical
        } else {
            StripAxis::Horizontal
        };
        let strip = AnimationStrip {
            atlas,
            initial_offset: ivec2(line, f[2], f[3], "frame offset")?,
            frame_size: ivec2(line, f[4], f[5], "frame size")?,
            frame_count: number(line, f[6], "frame count")?,
            axis,
        };
        world.add_strip(f[0], strip);
        Ok(())
    })?;
    log::debug!("Loaded {} animation strips", strips);

    // Background layers, each header followed by its tile map
    let mut layers = 0;
    loop {
        let (line, text) = reader.next("backgrounds")?;
        if text == END_BACKGROUNDS {
            break;
        }
        let f = fields(text);
        expect_fields(line, &f, 10, "background")?;
        let atlas = world.atlas_id(f[1]).ok_or_else(|| EngineError::UnknownAtlas {
            line,
            name: f[1].to_string(),
        })?;
        let spec = LayerSpec {
            name: f[0].to_string(),
            atlas_name: f[1].to_string(),
            size: ivec2(line, f[2], f[3], "layer size")?,
            cell_size: ivec2(line, f[4], f[5], "cell size")?,
            key: color_key(line, f[6], f[7], f[8])?,
            z: number(line, f[9], "layer z")?,
        };
        if spec.cell_size.x <= 0 || spec.cell_size.y <= 0 {
            return Err(EngineError::format(line, "layer cell size must be positive"));
        }
        let (map_line, map) = reader.next("backgrounds")?;
        let layer = TileLayer::new(spec, atlas, map)
            .map_err(|e| EngineError::format(map_line, e.to_string()))?;
        world.background_mut().push(layer);
        layers += 1;
    }
    log::debug!("Loaded {} background layers", layers);

    // Obstacle grid
    let (line, text) = reader.next("obstacle map")?;
    let f: Vec<&str> = text.splitn(3, ',').map(str::trim).collect();
    if f.len() < 2 {
        return Err(EngineError::format(line, "obstacle map needs cell width and height"));
    }
    let cell_size = ivec2(line, f[0], f[1], "obstacle cell size")?;
    if cell_size.x <= 0 || cell_size.y <= 0 {
        return Err(EngineError::format(line, "obstacle cell size must be positive"));
    }
    let digits = f.get(2).copied().unwrap_or("");
    let grid = ObstacleGrid::from_digits(cell_size, level_size, digits)
        .map_err(|e| EngineError::format(line, e.to_string()))?;
    world.set_obstacles(grid);

    // Entities
    let entities = reader.records("objects", END_OBJECTS, |line, f| {
        let (mut entity, tail) = match f.len() {
            17 => {
                let mut slots = [StripId(0); 9];
                for (slot, name) in slots.iter_mut().zip(&f[1..10]) {
                    *slot = strip_named(&world, line, name)?;
                }
                let table = DirectionTable::new(slots);
                (Entity::directional(f[0], table, IVec3::ZERO, IVec3::ZERO, false), &f[10..])
            }
            9 => {
                let strip = strip_named(&world, line, f[1])?;
                (Entity::single(f[0], strip, IVec3::ZERO, IVec3::ZERO, false), &f[2..])
            }
            n => {
                return Err(EngineError::format(
                    line,
                    format!("object record needs 17 or 9 fields, found {}", n),
                ))
            }
        };
        entity.position = ivec3(line, tail[0], tail[1], tail[2], "position")?;
        entity.velocity = ivec3(line, tail[3], tail[4], tail[5], "speed")?;
        entity.ghost = flag(line, tail[6], "ghost flag")?;
        entity.track_animation_size = config.track_animation_size;
        world.spawn(entity);
        Ok(())
    })?;
    log::debug!("Loaded {} objects", entities);

    // Cameras
    let cameras = reader.records("cameras", END_CAMERAS, |line, f| {
        expect_fields(line, &f, 7, "camera")?;
        let resolution = ivec2(line, f[0], f[1], "camera resolution")?;
        let draw_rect = PixelRect::new(
            number(line, f[2], "draw x")?,
            number(line, f[3], "draw y")?,
            number(line, f[4], "draw width")?,
            number(line, f[5], "draw height")?,
        );
        let style = CameraStyle::from_code(f[6]).ok_or_else(|| {
            EngineError::format(line, format!("camera style must be S, L or R, found '{}'", f[6]))
        })?;
        let mut camera = Camera::new(resolution, draw_rect, style);
        let [start_z, end_z] = config.camera_z_range;
        camera.set_z_range(start_z, end_z);
        camera.show_background = config.camera_show_background;
        world.add_camera(camera);
        Ok(())
    })?;

    log::info!(
        "Level {}x{} loaded: {} atlases, {} strips, {} layers, {} objects, {} cameras",
        level_size.x,
        level_size.y,
        atlases,
        strips,
        layers,
        entities,
        cameras
    );
    Ok(world)
}

//! Engine configuration, read from an optional JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}
fn default_z_range() -> [i32; 2] {
    [0, 20]
}
fn default_true() -> bool {
    true
}

/// Settings applied while building a world from a level file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory that atlas paths in the level file are relative to,
    /// itself relative to the level file's directory.
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
    /// Default `[start, end)` Z draw range for loaded cameras.
    #[serde(default = "default_z_range")]
    pub camera_z_range: [i32; 2],
    /// Whether loaded cameras draw the background stack.
    #[serde(default = "default_true")]
    pub camera_show_background: bool,
    /// Whether loaded entities take their size from the current animation.
    #[serde(default = "default_true")]
    pub track_animation_size: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            image_dir: default_image_dir(),
            camera_z_range: default_z_range(),
            camera_show_background: true,
            track_animation_size: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&txt).map_err(|source| EngineError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }
}

//! Startup configuration with defaults and optional RON overrides

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory at startup
pub const CONFIG_FILE: &str = "planet_renderer.ron";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub shadow: ShadowConfig,
    /// Default `env_logger` filter; `RUST_LOG` takes precedence
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

/// Asset locations. Texture names are relative to `texture_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub shader_dir: PathBuf,
    pub texture_dir: PathBuf,
    /// OBJ sphere shared by every draw; a generated UV sphere when unset
    pub mesh: Option<PathBuf>,
    pub stars: String,
    pub earth_day: String,
    pub earth_specular: String,
    pub earth_night: String,
    pub earth_clouds: String,
    pub moon: String,
    pub moons_moon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShadowConfig {
    /// Width and height of the shadow target in texels
    pub map_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetConfig::default(),
            shadow: ShadowConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Planet Renderer".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        Self {
            shader_dir: root.join("shaders"),
            texture_dir: root.join("assets").join("textures"),
            mesh: Some(root.join("assets").join("meshes").join("sphere_5k.obj")),
            stars: "2k_stars_milky_way.jpg".to_string(),
            earth_day: "2k_earth_daymap.jpg".to_string(),
            earth_specular: "2k_earth_specular_map.png".to_string(),
            earth_night: "2k_earth_nightmap_alpha.png".to_string(),
            earth_clouds: "2k_earth_clouds_alpha.png".to_string(),
            moon: "2k_moon.jpg".to_string(),
            moons_moon: "2k_jupiter.jpg".to_string(),
        }
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self { map_size: 2048 }
    }
}

impl AssetConfig {
    pub fn shader(&self, name: &str) -> PathBuf {
        self.shader_dir.join(name)
    }

    pub fn texture(&self, name: &str) -> PathBuf {
        self.texture_dir.join(name)
    }
}

impl AppConfig {
    /// Parse a RON document; missing fields keep their defaults
    pub fn from_ron(source: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        Self::from_ron(&contents).with_context(|| format!("Failed to parse config: {:?}", path))
    }

    /// Load `path` when it exists, otherwise defaults. A malformed file is
    /// replaced by defaults so the window still opens; the error is returned
    /// for reporting once logging is up.
    pub fn load_or_default(path: &Path) -> (Self, Option<anyhow::Error>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
}

//! Scene configuration, loadable from a RON file.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SkyResult;
use crate::field::FieldConfig;
use crate::presets;
use crate::scene::SkyCamera;
use crate::shooting_star::ShootingStarConfig;

/// Environment variable naming the config file the binary loads.
pub const CONFIG_ENV_VAR: &str = "AMBIENT_SKY_CONFIG";
/// Config path used when [`CONFIG_ENV_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "assets/sky.ron";

/// Everything needed to build a sky scene.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct SkyConfig {
    /// Fixed RNG seed; `None` draws one at startup.
    pub seed: Option<u64>,
    pub max_pixel_ratio: f32,
    pub camera: SkyCamera,
    /// Particle fields, drawn in order.
    pub layers: Vec<FieldConfig>,
    pub shooting_stars: ShootingStarConfig,
    /// Size of the shooting-star pool; 0 disables shooting stars.
    pub shooting_star_count: usize,
}

impl Default for SkyConfig {
    fn default() -> Self {
        presets::night_sky()
    }
}

impl SkyConfig {
    /// Parse a config from RON text.
    pub fn from_ron(contents: &str) -> SkyResult<Self> {
        Ok(ron::from_str(contents)?)
    }

    pub fn to_ron(&self) -> SkyResult<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load from `path`, falling back to `default` when the file is missing
    /// or unusable.
    pub fn load_or(path: impl AsRef<Path>, default: SkyConfig) -> Self {
        let path = path.as_ref();
        if !path.is_file() {
            return default;
        }

        let Ok(contents) = std::fs::read_to_string(path) else {
            warn!("Failed to read sky config file: {:?}", path);
            return default;
        };

        match Self::from_ron(&contents) {
            Ok(config) => {
                info!("Loaded sky config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Failed to parse sky config {:?}: {}", path, e);
                default
            }
        }
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load_or(path, Self::default())
    }

    /// Write as pretty RON, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> SkyResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        info!("Saved sky config to {:?}", path);
        Ok(())
    }

    /// Seed to use for this run.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| fastrand::u64(..))
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, genome::Genotype};

pub const SIM_HZ: f32 = 60.0;
pub const RENDER_HZ: f32 = 30.0;
pub const DT: f32 = 1.0 / SIM_HZ;

pub const ARENA_WIDTH: f64 = 800.0;
pub const ARENA_HEIGHT: f64 = 600.0;

pub const ACCELERATION_STEP: f64 = 1.0;
pub const DRAG: f64 = 0.98;

pub const SPEED_CAP: f64 = 5.0;
pub const SPEED_DAMPING: f64 = 0.95;

pub const DEFAULT_SIZE: f64 = 10.0;
pub const DEFAULT_ECCENTRICITY: f64 = 0.3;

pub const HP_PER_SIZE: f64 = 10.0;
pub const ATTACK_BASE: f64 = 5.0;

pub const KEY_HOLD_MS: u64 = 150;

pub const CURVE_SEGMENTS: usize = 20;
pub const FLAGELLUM_STRETCH: f64 = 1.5;

/// Arena bounds the controller clamps positions into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

/// Scene description loaded from YAML. Every field is optional.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub arena: ArenaConfig,
    pub genes: Genotype,
}

impl SceneConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ArenaConfig { width, height } = self.arena;
        if !(width.is_finite() && width > 0.0) {
            return Err(ConfigError::Arena("width must be positive and finite".into()));
        }
        if !(height.is_finite() && height > 0.0) {
            return Err(ConfigError::Arena("height must be positive and finite".into()));
        }
        Ok(())
    }
}

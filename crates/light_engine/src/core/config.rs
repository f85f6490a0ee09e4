//! # Lighting Configuration
//!
//! Configuration structures for the lighting subsystem: light-count limits,
//! shadow-pass defaults, and shading-model selection. Supports TOML and RON
//! config files with format chosen by file extension.

use serde::{Deserialize, Serialize};

use crate::shading::ShadingModelKind;

/// Configuration trait for loadable/saveable config structures
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        if !path.ends_with(".toml") && !path.ends_with(".ron") {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Shadow-pass defaults applied to newly enabled shadow casters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadowConfig {
    /// Depth-target resolution used when the caller does not specify one
    pub default_resolution: u32,
    /// Near plane of the shadow frustum
    pub near: f32,
    /// Far plane of the shadow frustum
    pub far: f32,
    /// Lower bound for the slope-scaled depth-bias factor
    pub bias_floor: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            default_resolution: 1024,
            near: 0.05,
            far: 4000.0,
            bias_floor: 0.2,
        }
    }
}

/// Subsystem-wide lighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingConfig {
    /// Number of light slots allocated per context
    pub max_lights: usize,
    /// Shading model used by contexts created from this config
    pub shading_model: ShadingModelKind,
    /// Shadow-pass defaults
    pub shadow: ShadowConfig,
    /// How strongly sampled occlusion dampens direct lighting (0 = none)
    pub occlusion_light_blend: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            max_lights: 4,
            shading_model: ShadingModelKind::BlinnPhong,
            shadow: ShadowConfig::default(),
            occlusion_light_blend: 0.6,
        }
    }
}

impl Config for LightingConfig {}

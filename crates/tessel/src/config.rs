//! # Engine Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! document is a valid configuration.
//!
//! ```toml
//! [world]
//! max_entities = 4096
//!
//! [physics]
//! skip_static_pairs = true
//! broad_phase_square_prefilter = true
//! emit_events = true
//!
//! [game_loop]
//! fixed_timestep = 0.016666668
//! max_steps_per_frame = 5
//! warn_on_slow_frames = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tessel_shared::{DEFAULT_FIXED_TIMESTEP, MAX_ENTITIES};
use thiserror::Error;

/// Errors raised while loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Entity store settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of entity slots.
    pub max_entities: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: MAX_ENTITIES,
        }
    }
}

/// Collision settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Never test two static colliders against each other.
    pub skip_static_pairs: bool,
    /// Run the axis-aligned square check before the radius check.
    pub broad_phase_square_prefilter: bool,
    /// Queue [`crate::ContactEvent`]s next to the callbacks.
    pub emit_events: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            skip_static_pairs: true,
            broad_phase_square_prefilter: true,
            emit_events: true,
        }
    }
}

/// Fixed-step loop settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameLoopConfig {
    /// Simulation step in seconds.
    pub fixed_timestep: f32,
    /// Steps allowed per frame before the backlog is dropped.
    pub max_steps_per_frame: u32,
    /// Log a warning when a frame hits the step limit.
    pub warn_on_slow_frames: bool,
}

impl Default for GameLoopConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            max_steps_per_frame: 5,
            warn_on_slow_frames: true,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Entity store.
    pub world: WorldConfig,
    /// Collision.
    pub physics: PhysicsConfig,
    /// Game loop.
    pub game_loop: GameLoopConfig,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed documents, [`ConfigError::Invalid`]
    /// for out-of-range values.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`EngineConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.world.max_entities == 0 || self.world.max_entities > u32::MAX as usize {
            return Err(ConfigError::Invalid(format!(
                "world.max_entities must be in 1..={}, got {}",
                u32::MAX,
                self.world.max_entities
            )));
        }
        let step = self.game_loop.fixed_timestep;
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "game_loop.fixed_timestep must be positive, got {step}"
            )));
        }
        if self.game_loop.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "game_loop.max_steps_per_frame must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

//! Pool configuration.
//!
//! All fields have defaults that match the toy's intended feel: a 60 Hz
//! nominal tick, 2% velocity loss per tick, and fixed-rate decay. Configs can
//! be built in code or loaded from JSON:
//!
//! ```json
//! {
//!     "assumed_frame_rate": 60.0,
//!     "drag": 0.98,
//!     "decay_mode": "per_tick",
//!     "drag_mode": "per_tick",
//!     "seed": 1234
//! }
//! ```
//!
//! Missing fields take their defaults.

use crate::error::ConfigError;
use crate::lifecycle::{DecayMode, DragMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Nominal ticks per second used to turn lifetimes into per-tick decay.
pub const DEFAULT_FRAME_RATE: f32 = 60.0;

/// Velocity multiplier applied once per tick.
pub const DEFAULT_DRAG: f32 = 0.98;

/// Tunables for a [`ParticlePool`](crate::ParticlePool).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Nominal ticks per second; `decay = 1 / (lifetime * assumed_frame_rate)`.
    pub assumed_frame_rate: f32,
    /// Velocity multiplier per tick, in `(0, 1]`.
    pub drag: f32,
    pub decay_mode: DecayMode,
    pub drag_mode: DragMode,
    /// Seed for the emitter RNG. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Group slots to reserve up front.
    pub initial_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            assumed_frame_rate: DEFAULT_FRAME_RATE,
            drag: DEFAULT_DRAG,
            decay_mode: DecayMode::PerTick,
            drag_mode: DragMode::PerTick,
            seed: None,
            initial_capacity: 16,
        }
    }
}

impl PoolConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.assumed_frame_rate.is_finite() && self.assumed_frame_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "assumed_frame_rate must be positive, got {}",
                self.assumed_frame_rate
            )));
        }
        if !(self.drag > 0.0 && self.drag <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "drag must be in (0, 1], got {}",
                self.drag
            )));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_decay_mode(mut self, mode: DecayMode) -> Self {
        self.decay_mode = mode;
        self
    }

    pub fn with_drag_mode(mut self, mode: DragMode) -> Self {
        self.drag_mode = mode;
        self
    }
}

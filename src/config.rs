//! Game configuration.
//!
//! Every field has a default matching the reference hardware build, so an
//! empty or missing file yields a playable configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::{GameError, Result};
use crate::input::{Command, StickSample};

/// Advance cadences and how they speed up with score.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub projectile_interval_ms: u64,
    pub asteroid_interval_ms: u64,
    /// Score at which the cadences start to speed up.
    pub speedup_threshold: u32,
    /// Milliseconds shaved off the projectile interval per point.
    pub projectile_step_ms: u64,
    /// Milliseconds shaved off the asteroid interval per point.
    pub asteroid_step_ms: u64,
    pub min_projectile_interval_ms: u64,
    pub min_asteroid_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            projectile_interval_ms: 500,
            asteroid_interval_ms: 1000,
            speedup_threshold: 10,
            projectile_step_ms: 1,
            asteroid_step_ms: 2,
            min_projectile_interval_ms: 50,
            min_asteroid_interval_ms: 100,
        }
    }
}

/// ADC thresholds for the analog stick (10-bit readings, centre ≈ 512).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JoystickConfig {
    pub left_below: u16,
    pub right_above: u16,
    pub fire_below: u16,
    pub fire_above: u16,
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            left_below: 515,
            right_above: 530,
            fire_below: 500,
            fire_above: 520,
        }
    }
}

impl JoystickConfig {
    /// Horizontal deflection as a move command, if any.
    pub fn horizontal(&self, sample: StickSample) -> Option<Command> {
        if sample.x < self.left_below {
            Some(Command::MoveLeft)
        } else if sample.x > self.right_above {
            Some(Command::MoveRight)
        } else {
            None
        }
    }

    /// True if the vertical deflection asks for a shot.
    pub fn fires(&self, sample: StickSample) -> bool {
        sample.y < self.fire_below || sample.y > self.fire_above
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub joystick: JoystickConfig,
    /// Delay between the frames of the explosion and base-hit animations.
    pub animation_step_ms: u64,
    /// Fixed RNG seed; random when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            joystick: JoystickConfig::default(),
            animation_step_ms: 40,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.timing;
        if t.min_projectile_interval_ms == 0 || t.min_asteroid_interval_ms == 0 {
            return Err(GameError::InvalidConfig(
                "minimum intervals must be positive".to_string(),
            ));
        }
        if t.projectile_interval_ms < t.min_projectile_interval_ms {
            return Err(GameError::InvalidConfig(format!(
                "projectile_interval_ms ({}) is below its minimum ({})",
                t.projectile_interval_ms, t.min_projectile_interval_ms
            )));
        }
        if t.asteroid_interval_ms < t.min_asteroid_interval_ms {
            return Err(GameError::InvalidConfig(format!(
                "asteroid_interval_ms ({}) is below its minimum ({})",
                t.asteroid_interval_ms, t.min_asteroid_interval_ms
            )));
        }
        let j = &self.joystick;
        if j.left_below > j.right_above || j.fire_below > j.fire_above {
            return Err(GameError::InvalidConfig(
                "joystick dead zones must not be inverted".to_string(),
            ));
        }
        Ok(())
    }
}

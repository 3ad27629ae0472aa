//! Configuration for the reactive behaviors
//!
//! Loaded from a TOML file. Every field has a default matching the tuned
//! firmware values, so an empty file (or a missing section) is valid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level behavior configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReflexConfig {
    #[serde(default)]
    pub avoidance: AvoidanceConfig,
    #[serde(default)]
    pub stuck: StuckConfig,
    #[serde(default)]
    pub manual: ManualConfig,
}

/// Bump-avoidance timing and command magnitudes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AvoidanceConfig {
    /// Time spent reversing straight back after a bump (ms).
    #[serde(default = "default_reverse_ms")]
    pub reverse_ms: u64,

    /// Time spent turning in place after reversing (ms).
    #[serde(default = "default_turn_ms")]
    pub turn_ms: u64,

    /// Time spent holding still before resuming (ms).
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Velocity while reversing (negative = backward).
    #[serde(default = "default_reverse_velocity")]
    pub reverse_velocity: i8,

    /// Rotation magnitude while turning; sign comes from the escape direction.
    #[serde(default = "default_turn_rotation")]
    pub turn_rotation: i8,
}

/// Stuck-detection (local minimum) escalation parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StuckConfig {
    /// Interval between agitation decay steps (ms).
    #[serde(default = "default_decay_interval_ms")]
    pub decay_interval_ms: u64,

    /// Agitation removed per decay step.
    #[serde(default = "default_decay_step")]
    pub decay_step: u32,

    /// Agitation added per bump event.
    #[serde(default = "default_bump_increment")]
    pub bump_increment: u32,

    /// Escalate once agitation exceeds `bump_increment * escalation_bumps`.
    #[serde(default = "default_escalation_bumps")]
    pub escalation_bumps: u32,

    /// Duration of the escape turn (ms).
    #[serde(default = "default_escape_ms")]
    pub escape_ms: u64,

    /// Rotation during the escape turn.
    #[serde(default = "default_escape_rotation")]
    pub escape_rotation: i8,

    /// Agitation at startup.
    #[serde(default = "default_initial_agitation")]
    pub initial_agitation: u32,
}

/// Manual override parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManualConfig {
    /// Velocity when forward motion is toggled on.
    #[serde(default = "default_forward_velocity")]
    pub forward_velocity: i8,
}

fn default_reverse_ms() -> u64 {
    2500
}

fn default_turn_ms() -> u64 {
    1500
}

fn default_settle_ms() -> u64 {
    1000
}

fn default_reverse_velocity() -> i8 {
    -5
}

fn default_turn_rotation() -> i8 {
    6
}

fn default_decay_interval_ms() -> u64 {
    50 // 20 Hz drain
}

fn default_decay_step() -> u32 {
    1
}

fn default_bump_increment() -> u32 {
    50
}

fn default_escalation_bumps() -> u32 {
    5
}

fn default_escape_ms() -> u64 {
    4000
}

fn default_escape_rotation() -> i8 {
    -5
}

fn default_initial_agitation() -> u32 {
    default_bump_increment()
}

fn default_forward_velocity() -> i8 {
    5
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            reverse_ms: default_reverse_ms(),
            turn_ms: default_turn_ms(),
            settle_ms: default_settle_ms(),
            reverse_velocity: default_reverse_velocity(),
            turn_rotation: default_turn_rotation(),
        }
    }
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            decay_interval_ms: default_decay_interval_ms(),
            decay_step: default_decay_step(),
            bump_increment: default_bump_increment(),
            escalation_bumps: default_escalation_bumps(),
            escape_ms: default_escape_ms(),
            escape_rotation: default_escape_rotation(),
            initial_agitation: default_initial_agitation(),
        }
    }
}

impl Default for ManualConfig {
    fn default() -> Self {
        Self {
            forward_velocity: default_forward_velocity(),
        }
    }
}

impl AvoidanceConfig {
    /// Check that every timed state has a bounded, non-zero dwell.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("reverse_ms", self.reverse_ms),
            ("turn_ms", self.turn_ms),
            ("settle_ms", self.settle_ms),
        ] {
            if value == 0 {
                return Err(Error::InvalidParameter(format!(
                    "avoidance.{} must be > 0",
                    name
                )));
            }
        }
        if self.reverse_velocity >= 0 {
            return Err(Error::InvalidParameter(format!(
                "avoidance.reverse_velocity must be negative, got {}",
                self.reverse_velocity
            )));
        }
        if self.turn_rotation <= 0 {
            return Err(Error::InvalidParameter(format!(
                "avoidance.turn_rotation must be positive, got {}",
                self.turn_rotation
            )));
        }
        Ok(())
    }
}

impl StuckConfig {
    /// Agitation level that must be exceeded to escalate.
    pub fn threshold(&self) -> u32 {
        self.bump_increment.saturating_mul(self.escalation_bumps)
    }

    /// Check that the counter drains and the escape terminates.
    pub fn validate(&self) -> Result<()> {
        if self.decay_interval_ms == 0 {
            return Err(Error::InvalidParameter(
                "stuck.decay_interval_ms must be > 0".to_string(),
            ));
        }
        if self.decay_step == 0 {
            return Err(Error::InvalidParameter(
                "stuck.decay_step must be > 0".to_string(),
            ));
        }
        if self.bump_increment == 0 {
            return Err(Error::InvalidParameter(
                "stuck.bump_increment must be > 0".to_string(),
            ));
        }
        if self.escalation_bumps == 0 {
            return Err(Error::InvalidParameter(
                "stuck.escalation_bumps must be > 0".to_string(),
            ));
        }
        // Threshold must stay below the saturated counter
        if !matches!(
            self.bump_increment.checked_mul(self.escalation_bumps),
            Some(threshold) if threshold < u32::MAX
        ) {
            return Err(Error::InvalidParameter(format!(
                "stuck.bump_increment * stuck.escalation_bumps overflows ({} * {})",
                self.bump_increment, self.escalation_bumps
            )));
        }
        if self.escape_ms == 0 {
            return Err(Error::InvalidParameter(
                "stuck.escape_ms must be > 0".to_string(),
            ));
        }
        if self.escape_rotation == 0 {
            return Err(Error::InvalidParameter(
                "stuck.escape_rotation must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl ManualConfig {
    /// Forward motion must actually move forward.
    pub fn validate(&self) -> Result<()> {
        if self.forward_velocity <= 0 {
            return Err(Error::InvalidParameter(format!(
                "manual.forward_velocity must be positive, got {}",
                self.forward_velocity
            )));
        }
        Ok(())
    }
}

impl ReflexConfig {
    /// Load configuration from a TOML file
    ///
    /// The loaded configuration is validated before it is returned.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ReflexConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Validate all sections
    pub fn validate(&self) -> Result<()> {
        self.avoidance.validate()?;
        self.stuck.validate()?;
        self.manual.validate()?;
        Ok(())
    }
}

//! Manual override: user-toggled forward motion.

use log::info;

use super::{Behavior, Cycle};
use crate::command::Command;
use crate::config::ManualConfig;

/// User-driven command source, independent of sensing.
///
/// Always enabled. [`ManualOverride::toggle`] flips between standing still
/// and driving forward.
#[derive(Clone, Debug)]
pub struct ManualOverride {
    config: ManualConfig,
    command: Command,
}

impl ManualOverride {
    /// Create a stationary override
    pub fn new(config: ManualConfig) -> Self {
        Self {
            config,
            command: Command::halt(),
        }
    }

    /// Whether forward motion is currently requested
    pub fn is_moving(&self) -> bool {
        self.command.velocity > 0
    }

    /// Start or stop forward motion
    pub fn toggle(&mut self) {
        self.command.velocity = if self.is_moving() {
            0
        } else {
            self.config.forward_velocity
        };
        info!("[Manual] Forward motion {}", if self.is_moving() { "on" } else { "off" });
    }
}

impl Default for ManualOverride {
    fn default() -> Self {
        Self::new(ManualConfig::default())
    }
}

impl Behavior for ManualOverride {
    fn name(&self) -> &'static str {
        "manual_override"
    }

    fn service(&mut self, _cycle: &Cycle) {}

    fn command(&self) -> Command {
        self.command
    }
}

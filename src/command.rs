//! Motion command shared by every behavior.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Desired motion produced by a behavior once per control cycle.
///
/// `enabled == false` means the behavior has no opinion this cycle and the
/// arbiter must ignore `velocity` and `rotation`. Use [`Command::velocity`]
/// and [`Command::rotation`] to read the values only when they are meaningful.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Whether this behavior wants control this cycle.
    pub enabled: bool,
    /// Linear speed, positive forward.
    pub velocity: i8,
    /// In-place turn rate, sign gives direction.
    pub rotation: i8,
}

impl Command {
    /// No opinion this cycle.
    pub const DISABLED: Command = Command {
        enabled: false,
        velocity: 0,
        rotation: 0,
    };

    /// Enabled command with the given velocity and rotation.
    #[inline]
    pub const fn drive(velocity: i8, rotation: i8) -> Self {
        Self {
            enabled: true,
            velocity,
            rotation,
        }
    }

    /// Enabled command that holds the robot still.
    #[inline]
    pub const fn halt() -> Self {
        Self::drive(0, 0)
    }

    /// Velocity, if the command is enabled.
    #[inline]
    pub fn velocity(&self) -> Option<i8> {
        self.enabled.then_some(self.velocity)
    }

    /// Rotation, if the command is enabled.
    #[inline]
    pub fn rotation(&self) -> Option<i8> {
        self.enabled.then_some(self.rotation)
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::DISABLED
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enabled {
            write!(f, "v={} r={}", self.velocity, self.rotation)
        } else {
            write!(f, "disabled")
        }
    }
}

//! Obstruction sensing interface.
//!
//! Hardware drivers (bumpers, front infrared, virtual bumpers) live outside
//! this crate. They classify raw signals into an [`ObstructionReading`]; the
//! behaviors only consume that classification.

mod scripted;

pub use scripted::ScriptedSensor;

use crate::error::Result;

/// Direction of an in-place turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnDirection {
    /// Counter-clockwise as seen by the drive (negative rotation).
    Left,
    /// Clockwise as seen by the drive (positive rotation).
    Right,
}

impl TurnDirection {
    /// Sign applied to a rotation magnitude for this direction.
    pub fn rotation_sign(&self) -> i8 {
        match self {
            TurnDirection::Left => -1,
            TurnDirection::Right => 1,
        }
    }

    /// Name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            TurnDirection::Left => "Left",
            TurnDirection::Right => "Right",
        }
    }
}

/// One cycle's obstruction snapshot.
///
/// Only valid for the cycle in which it was sampled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObstructionReading {
    /// Left side blocked.
    pub left: bool,
    /// Right side blocked.
    pub right: bool,
    /// Blocked straight ahead (or on both sides at once).
    pub center: bool,
    /// Obstruction present but not localized to a side.
    pub unlocalized: bool,
}

impl ObstructionReading {
    /// Nothing blocked.
    pub const CLEAR: ObstructionReading = ObstructionReading {
        left: false,
        right: false,
        center: false,
        unlocalized: false,
    };

    /// Create a reading from directional flags.
    pub const fn new(left: bool, right: bool, center: bool) -> Self {
        Self {
            left,
            right,
            center,
            unlocalized: false,
        }
    }

    /// Obstruction reported without any direction.
    ///
    /// No escape direction resolves from such a reading, so bump avoidance
    /// stays idle.
    pub const fn unlocalized() -> Self {
        Self {
            left: false,
            right: false,
            center: false,
            unlocalized: true,
        }
    }

    /// Reading from a two-bumper robot. Both bumpers pressed counts as center.
    pub fn from_bumpers(left: bool, right: bool) -> Self {
        Self {
            left,
            right,
            center: left && right,
            unlocalized: false,
        }
    }

    /// Any obstruction present.
    #[inline]
    pub fn any(&self) -> bool {
        self.left || self.right || self.center || self.unlocalized
    }

    /// Left side blocked.
    #[inline]
    pub fn left_blocked(&self) -> bool {
        self.left
    }

    /// Right side blocked.
    #[inline]
    pub fn right_blocked(&self) -> bool {
        self.right
    }

    /// Center blocked, or both sides at once.
    #[inline]
    pub fn center_or_both_blocked(&self) -> bool {
        self.center || (self.left && self.right)
    }

    /// Direction to turn after reversing away from this obstruction.
    ///
    /// Priority: center-or-both turns left, then a blocked left side turns
    /// right, then a blocked right side turns left. `None` when no direction
    /// resolves.
    pub fn escape_direction(&self) -> Option<TurnDirection> {
        if self.center_or_both_blocked() {
            Some(TurnDirection::Left)
        } else if self.left_blocked() {
            Some(TurnDirection::Right)
        } else if self.right_blocked() {
            Some(TurnDirection::Left)
        } else {
            None
        }
    }

    /// Union of two readings.
    pub fn merge(self, other: ObstructionReading) -> Self {
        Self {
            left: self.left || other.left,
            right: self.right || other.right,
            center: self.center || other.center,
            unlocalized: self.unlocalized || other.unlocalized,
        }
    }
}

/// Source of per-cycle obstruction snapshots.
///
/// `sample` must be called exactly once per control cycle; the behavior
/// that owns the sensor takes care of that.
pub trait ObstructionSensor: Send {
    /// One-time initialisation, called from the owning behavior's `begin`.
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// Poll the hardware and return this cycle's snapshot.
    fn sample(&mut self) -> ObstructionReading;
}

impl<S: ObstructionSensor + ?Sized> ObstructionSensor for Box<S> {
    fn begin(&mut self) -> Result<()> {
        (**self).begin()
    }

    fn sample(&mut self) -> ObstructionReading {
        (**self).sample()
    }
}

//! Reactive behaviors.
//!
//! Each behavior is a self-contained controller that produces one
//! [`Command`] per control cycle. The external arbiter reads every
//! behavior's command after servicing and decides what reaches the motors.
//!
//! | Behavior | Input | Output |
//! |----------|-------|--------|
//! | [`BumpAvoidance`] | obstruction sensor | reverse / turn / settle, bump event |
//! | [`StuckDetector`] | bump event | escape turn when bumps recur too fast |
//! | [`ManualOverride`] | user toggle | forward motion on/off |

mod avoidance;
mod manual;
mod stuck;

pub use avoidance::{AvoidanceState, BumpAvoidance};
pub use manual::ManualOverride;
pub use stuck::{StuckDetector, StuckState};

use crate::command::Command;
use crate::error::Result;
use crate::time::Timestamp;

/// Inputs shared by every behavior for one control cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cycle {
    /// Time sampled once at the top of the cycle.
    pub now: Timestamp,
    /// Whether bump avoidance started reversing this cycle.
    ///
    /// Only meaningful after the avoidance behavior has been serviced.
    pub bumped: bool,
}

impl Cycle {
    /// Cycle at `now` with no bump event.
    pub fn at(now: Timestamp) -> Self {
        Self { now, bumped: false }
    }

    /// Same cycle carrying the avoidance behavior's bump event.
    pub fn with_bump(self, bumped: bool) -> Self {
        Self { bumped, ..self }
    }
}

/// A reactive controller serviced once per control cycle.
pub trait Behavior: Send {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// One-time initialisation before the first cycle.
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// Advance by one control cycle.
    ///
    /// Never blocks; all state transitions for the cycle complete before
    /// returning.
    fn service(&mut self, cycle: &Cycle);

    /// Command left by the most recent `service`.
    fn command(&self) -> Command;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_builders() {
        let cycle = Cycle::at(Timestamp(120));
        assert!(!cycle.bumped);
        let bumped = cycle.with_bump(true);
        assert_eq!(bumped.now, Timestamp(120));
        assert!(bumped.bumped);
    }

    #[test]
    fn test_behavior_is_object_safe() {
        let mut behaviors: Vec<Box<dyn Behavior>> = vec![
            Box::new(ManualOverride::default()),
            Box::new(StuckDetector::default()),
        ];
        for behavior in behaviors.iter_mut() {
            behavior.begin().unwrap();
            behavior.service(&Cycle::at(Timestamp(10)));
        }
        assert!(behaviors[0].command().enabled);
        assert!(!behaviors[1].command().enabled);
    }
}

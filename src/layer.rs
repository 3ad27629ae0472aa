//! Services the reactive behaviors in dependency order.
//!
//! Each cycle bump avoidance runs first; its bump event is then handed to
//! the stuck detector explicitly. Every behavior's command is returned
//! untouched. Choosing or blending among them belongs to the arbiter.

use crate::behavior::{Behavior, BumpAvoidance, Cycle, ManualOverride, StuckDetector};
use crate::command::Command;
use crate::config::ReflexConfig;
use crate::error::Result;
use crate::sensor::ObstructionSensor;
use crate::time::Timestamp;

/// Commands produced by one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerOutput {
    /// Time the cycle was serviced at.
    pub now: Timestamp,
    /// Bump event passed from avoidance to the stuck detector.
    pub bumped: bool,
    /// Bump avoidance command.
    pub avoidance: Command,
    /// Stuck detector command.
    pub stuck: Command,
    /// Manual override command.
    pub manual: Command,
}

/// The collision-avoidance behavior set.
pub struct ReflexLayer<S> {
    avoidance: BumpAvoidance<S>,
    stuck: StuckDetector,
    manual: ManualOverride,
}

impl<S: ObstructionSensor> ReflexLayer<S> {
    /// Build all behaviors from one configuration.
    pub fn new(sensor: S, config: ReflexConfig) -> Self {
        Self {
            avoidance: BumpAvoidance::new(sensor, config.avoidance),
            stuck: StuckDetector::new(config.stuck),
            manual: ManualOverride::new(config.manual),
        }
    }

    /// Build with default configuration.
    pub fn with_defaults(sensor: S) -> Self {
        Self::new(sensor, ReflexConfig::default())
    }

    /// Begin every behavior; stops at the first failure.
    pub fn begin(&mut self) -> Result<()> {
        for behavior in self.behaviors_mut() {
            behavior.begin()?;
        }
        Ok(())
    }

    /// Service one control cycle at `now`.
    pub fn service(&mut self, now: Timestamp) -> LayerOutput {
        let cycle = Cycle::at(now);

        self.avoidance.service(&cycle);
        let cycle = cycle.with_bump(self.avoidance.just_bumped());
        self.stuck.service(&cycle);
        self.manual.service(&cycle);

        LayerOutput {
            now,
            bumped: cycle.bumped,
            avoidance: self.avoidance.command(),
            stuck: self.stuck.command(),
            manual: self.manual.command(),
        }
    }

    /// Bump avoidance behavior
    pub fn avoidance(&self) -> &BumpAvoidance<S> {
        &self.avoidance
    }

    /// Mutable bump avoidance behavior (sensor access)
    pub fn avoidance_mut(&mut self) -> &mut BumpAvoidance<S> {
        &mut self.avoidance
    }

    /// Stuck detector
    pub fn stuck(&self) -> &StuckDetector {
        &self.stuck
    }

    /// Manual override
    pub fn manual(&self) -> &ManualOverride {
        &self.manual
    }

    /// Mutable manual override, for toggling
    pub fn manual_mut(&mut self) -> &mut ManualOverride {
        &mut self.manual
    }

    /// All behaviors, for an arbiter that treats them uniformly.
    pub fn behaviors(&self) -> [&dyn Behavior; 3] {
        [&self.avoidance, &self.stuck, &self.manual]
    }

    fn behaviors_mut(&mut self) -> [&mut dyn Behavior; 3] {
        [&mut self.avoidance, &mut self.stuck, &mut self.manual]
    }
}

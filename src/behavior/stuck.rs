//! Stuck detection: escape a local minimum when bumps recur too quickly.
//!
//! The agitation counter is a leaky bucket. Every bump event pours in a
//! fixed amount and the bucket drains one step per decay interval. A robot
//! that bumps occasionally never fills it; one that keeps bumping faster
//! than it drains is assumed wedged and performs a long escape turn.

use log::{debug, info, trace};

use super::{Behavior, Cycle};
use crate::command::Command;
use crate::config::StuckConfig;
use crate::time::Timestamp;

/// Stuck detector state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StuckState {
    /// Watching bump frequency; no opinion on motion.
    Idle,
    /// Performing the escape turn.
    Escaping,
}

impl StuckState {
    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            StuckState::Idle => "Idle",
            StuckState::Escaping => "Escaping",
        }
    }
}

/// Local-minimum escape behavior
///
/// Only consumes the bump event handed in through [`Cycle::bumped`]; it has
/// no knowledge of the avoidance behavior that produced it.
#[derive(Clone, Debug)]
pub struct StuckDetector {
    config: StuckConfig,
    state: StuckState,
    agitation: u32,
    /// Time of the last decay step
    decayed_at: Timestamp,
    /// Time the current escape started
    escalated_at: Timestamp,
    escalations: usize,
    command: Command,
}

impl StuckDetector {
    /// Create a new stuck detector
    pub fn new(config: StuckConfig) -> Self {
        Self {
            agitation: config.initial_agitation,
            config,
            state: StuckState::Idle,
            decayed_at: Timestamp::EPOCH,
            escalated_at: Timestamp::EPOCH,
            escalations: 0,
            command: Command::DISABLED,
        }
    }

    /// Get current state
    pub fn state(&self) -> StuckState {
        self.state
    }

    /// Get configuration
    pub fn config(&self) -> &StuckConfig {
        &self.config
    }

    /// Current agitation counter
    pub fn agitation(&self) -> u32 {
        self.agitation
    }

    /// Agitation level that must be exceeded to escalate
    pub fn threshold(&self) -> u32 {
        self.config.threshold()
    }

    /// Number of escapes started since construction
    pub fn escalations(&self) -> usize {
        self.escalations
    }

    /// Time the current (or last) escape started
    pub fn escalated_at(&self) -> Timestamp {
        self.escalated_at
    }

    /// Service one cycle at `now` with this cycle's bump event.
    pub fn step(&mut self, now: Timestamp, bumped: bool) {
        self.update_agitation(now, bumped);

        match self.state {
            StuckState::Idle => {
                if self.agitation > self.threshold() {
                    info!(
                        "[Stuck] Local minimum: agitation {} > {}, escaping for {}ms",
                        self.agitation,
                        self.threshold(),
                        self.config.escape_ms
                    );
                    self.state = StuckState::Escaping;
                    self.escalated_at = now;
                    self.escalations += 1;
                }
            }
            StuckState::Escaping => {
                if now.since(self.escalated_at) >= self.config.escape_ms {
                    info!(
                        "[Stuck] Escape finished, discarding agitation {}",
                        self.agitation
                    );
                    self.state = StuckState::Idle;
                    self.agitation = 0;
                }
            }
        }

        self.command = match self.state {
            StuckState::Idle => Command::DISABLED,
            StuckState::Escaping => Command::drive(0, self.config.escape_rotation),
        };
    }

    /// Bumps saturate at `u32::MAX`; a validated threshold is always below it.
    fn update_agitation(&mut self, now: Timestamp, bumped: bool) {
        if bumped {
            self.agitation = self.agitation.saturating_add(self.config.bump_increment);
            debug!("[Stuck] Bump, agitation = {}", self.agitation);
        } else if self.agitation > 0
            && now.since(self.decayed_at) >= self.config.decay_interval_ms
        {
            self.agitation = self.agitation.saturating_sub(self.config.decay_step);
            self.decayed_at = now;
            if self.agitation == 0 {
                debug!("[Stuck] Agitation drained");
            } else {
                trace!("[Stuck] Decay, agitation = {}", self.agitation);
            }
        }
    }
}

impl Default for StuckDetector {
    fn default() -> Self {
        Self::new(StuckConfig::default())
    }
}

impl Behavior for StuckDetector {
    fn name(&self) -> &'static str {
        "stuck_detector"
    }

    fn service(&mut self, cycle: &Cycle) {
        self.step(cycle.now, cycle.bumped);
    }

    fn command(&self) -> Command {
        self.command
    }
}

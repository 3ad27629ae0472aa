//! Bump avoidance: reverse away from an obstruction, turn, settle, resume.

use log::{debug, info};

use super::{Behavior, Cycle};
use crate::command::Command;
use crate::config::AvoidanceConfig;
use crate::error::Result;
use crate::sensor::{ObstructionReading, ObstructionSensor, TurnDirection};
use crate::time::Timestamp;

/// Transitions allowed within one cycle.
///
/// Timed transitions land in a state whose own timer has just been reset, so
/// the only chain longer than one is Settling -> Idle -> Reversing when the
/// robot is still touching something as it finishes settling.
const MAX_TRANSITIONS_PER_CYCLE: usize = 2;

/// Bump avoidance state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AvoidanceState {
    /// Nothing sensed; no opinion on motion.
    Idle,

    /// Backing straight away from the obstruction.
    Reversing {
        /// Turn to take once reversing finishes
        escape: TurnDirection,
    },

    /// Turning in place away from the obstruction.
    Turning(TurnDirection),

    /// Holding still before handing control back.
    Settling,
}

impl AvoidanceState {
    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            AvoidanceState::Idle => "Idle",
            AvoidanceState::Reversing { .. } => "Reversing",
            AvoidanceState::Turning(TurnDirection::Left) => "TurningLeft",
            AvoidanceState::Turning(TurnDirection::Right) => "TurningRight",
            AvoidanceState::Settling => "Settling",
        }
    }

    /// Is the behavior driving the robot?
    pub fn is_active(&self) -> bool {
        !matches!(self, AvoidanceState::Idle)
    }
}

/// Bump avoidance behavior
///
/// Owns the obstruction sensor and samples it exactly once per cycle. When
/// an obstruction is sensed from Idle it reverses, turns toward the escape
/// direction chosen at the moment of contact, settles and returns to Idle.
/// Contact while already maneuvering is ignored.
pub struct BumpAvoidance<S> {
    sensor: S,
    config: AvoidanceConfig,
    state: AvoidanceState,
    /// Time of the most recent transition
    changed_at: Timestamp,
    just_changed: bool,
    just_bumped: bool,
    last_reading: ObstructionReading,
    command: Command,
}

impl<S: ObstructionSensor> BumpAvoidance<S> {
    /// Create a new bump avoidance behavior
    pub fn new(sensor: S, config: AvoidanceConfig) -> Self {
        Self {
            sensor,
            config,
            state: AvoidanceState::Idle,
            changed_at: Timestamp::EPOCH,
            just_changed: false,
            just_bumped: false,
            last_reading: ObstructionReading::CLEAR,
            command: Command::DISABLED,
        }
    }

    /// Create with default timing
    pub fn with_defaults(sensor: S) -> Self {
        Self::new(sensor, AvoidanceConfig::default())
    }

    /// Get current state
    pub fn state(&self) -> AvoidanceState {
        self.state
    }

    /// Get configuration
    pub fn config(&self) -> &AvoidanceConfig {
        &self.config
    }

    /// Time of the most recent transition
    pub fn changed_at(&self) -> Timestamp {
        self.changed_at
    }

    /// Whether any transition fired during the last cycle.
    pub fn just_changed(&self) -> bool {
        self.just_changed
    }

    /// Bump event: true only on the cycle Idle -> Reversing fired.
    pub fn just_bumped(&self) -> bool {
        self.just_bumped
    }

    /// Snapshot sampled during the last cycle
    pub fn last_reading(&self) -> ObstructionReading {
        self.last_reading
    }

    /// Access the owned sensor
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Mutable access to the owned sensor
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Service one cycle at `now` and return the bump event.
    pub fn step(&mut self, now: Timestamp) -> bool {
        let reading = self.sensor.sample();
        self.last_reading = reading;
        self.just_changed = false;
        self.just_bumped = false;

        for _ in 0..MAX_TRANSITIONS_PER_CYCLE {
            let Some(next) = self.next_state(now, &reading) else {
                break;
            };
            self.enter(next, now);
        }

        self.command = self.resident_command();
        self.just_bumped
    }

    /// Transition due from the current state, if any.
    fn next_state(&self, now: Timestamp, reading: &ObstructionReading) -> Option<AvoidanceState> {
        let elapsed = now.since(self.changed_at);
        match self.state {
            AvoidanceState::Idle => {
                if !reading.any() {
                    return None;
                }
                // An obstruction with no resolvable side leaves us idle
                reading
                    .escape_direction()
                    .map(|escape| AvoidanceState::Reversing { escape })
            }
            AvoidanceState::Reversing { escape } => {
                (elapsed >= self.config.reverse_ms).then_some(AvoidanceState::Turning(escape))
            }
            AvoidanceState::Turning(_) => {
                (elapsed >= self.config.turn_ms).then_some(AvoidanceState::Settling)
            }
            AvoidanceState::Settling => {
                (elapsed >= self.config.settle_ms).then_some(AvoidanceState::Idle)
            }
        }
    }

    fn enter(&mut self, next: AvoidanceState, now: Timestamp) {
        let previous = self.state;
        if previous == AvoidanceState::Idle
            && let AvoidanceState::Reversing { escape } = next
        {
            self.just_bumped = true;
            info!(
                "[Avoid] Bump at {}: {:?}, escaping {}",
                now,
                self.last_reading,
                escape.name()
            );
        }
        debug!("[Avoid] {} -> {}", previous.name(), next.name());

        self.state = next;
        self.changed_at = now;
        self.just_changed = true;
    }

    fn resident_command(&self) -> Command {
        match self.state {
            AvoidanceState::Idle => Command::DISABLED,
            // Reverse straight regardless of the escape side
            AvoidanceState::Reversing { .. } => Command::drive(self.config.reverse_velocity, 0),
            AvoidanceState::Turning(direction) => {
                let rotation = self
                    .config
                    .turn_rotation
                    .saturating_mul(direction.rotation_sign());
                Command::drive(0, rotation)
            }
            AvoidanceState::Settling => Command::halt(),
        }
    }
}

impl<S: ObstructionSensor> Behavior for BumpAvoidance<S> {
    fn name(&self) -> &'static str {
        "bump_avoidance"
    }

    fn begin(&mut self) -> Result<()> {
        self.sensor.begin()?;
        info!("[Avoid] Sensor ready");
        Ok(())
    }

    fn service(&mut self, cycle: &Cycle) {
        self.step(cycle.now);
    }

    fn command(&self) -> Command {
        self.command
    }
}

//! Scenario harness for simulation and integration testing
//!
//! A scenario describes obstruction contact windows on a timeline. The
//! harness turns them into a [`ScriptedSensor`], drives a [`ReflexLayer`] at
//! a fixed cycle period and records what every behavior did each cycle.
//!
//! # Scenario format
//!
//! ```toml
//! name = "corner_trap"
//! cycle_ms = 10
//! duration_ms = 12000
//! manual_toggles_ms = [0]
//!
//! [config.stuck]
//! escape_ms = 3000
//!
//! [[contact]]
//! from_ms = 0
//! until_ms = 20
//! center = true
//! ```

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::behavior::{AvoidanceState, StuckState};
use crate::config::ReflexConfig;
use crate::error::{Error, Result};
use crate::layer::{LayerOutput, ReflexLayer};
use crate::sensor::{ObstructionReading, ScriptedSensor};
use crate::time::Timestamp;

/// A timed obstruction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactWindow {
    /// First millisecond the obstruction is sensed
    pub from_ms: u64,
    /// Obstruction is gone from this millisecond on
    pub until_ms: u64,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub center: bool,
    /// Sensed, but without a direction
    #[serde(default)]
    pub unlocalized: bool,
}

impl ContactWindow {
    /// Is the window active at `t`?
    pub fn active_at(&self, t: u64) -> bool {
        self.from_ms <= t && t < self.until_ms
    }

    /// Reading reported while the window is active
    pub fn reading(&self) -> ObstructionReading {
        ObstructionReading {
            left: self.left,
            right: self.right,
            center: self.center,
            unlocalized: self.unlocalized,
        }
    }
}

/// Scenario description loaded from TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name (used in logs)
    pub name: String,

    /// Control cycle period (ms)
    #[serde(default = "default_cycle_ms")]
    pub cycle_ms: u64,

    /// Simulated time; the last cycle runs at or before this (ms)
    pub duration_ms: u64,

    /// Behavior configuration
    #[serde(default)]
    pub config: ReflexConfig,

    /// Obstruction timeline
    #[serde(default, rename = "contact")]
    pub contacts: Vec<ContactWindow>,

    /// Times at which the manual override is toggled (ms)
    #[serde(default)]
    pub manual_toggles_ms: Vec<u64>,
}

/// Longest timeline a scenario may describe, in cycles.
pub const MAX_SCENARIO_CYCLES: u64 = 10_000_000;

fn default_cycle_ms() -> u64 {
    10
}

impl Scenario {
    /// Empty scenario with default configuration
    pub fn new(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            cycle_ms: default_cycle_ms(),
            duration_ms,
            config: ReflexConfig::default(),
            contacts: Vec::new(),
            manual_toggles_ms: Vec::new(),
        }
    }

    /// Builder-style setter for the cycle period
    pub fn with_cycle_ms(mut self, cycle_ms: u64) -> Self {
        self.cycle_ms = cycle_ms;
        self
    }

    /// Builder-style setter for the behavior configuration
    pub fn with_config(mut self, config: ReflexConfig) -> Self {
        self.config = config;
        self
    }

    /// Add an obstruction window
    pub fn with_contact(mut self, window: ContactWindow) -> Self {
        self.contacts.push(window);
        self
    }

    /// Parse a scenario from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check timeline and configuration
    pub fn validate(&self) -> Result<()> {
        if self.cycle_ms == 0 {
            return Err(Error::InvalidParameter(format!(
                "scenario '{}': cycle_ms must be > 0",
                self.name
            )));
        }
        let cycles = self.duration_ms / self.cycle_ms;
        if cycles >= MAX_SCENARIO_CYCLES {
            return Err(Error::InvalidParameter(format!(
                "scenario '{}': {} cycles exceeds limit of {}",
                self.name, cycles, MAX_SCENARIO_CYCLES
            )));
        }
        if let Some(window) = self.contacts.iter().find(|w| w.from_ms >= w.until_ms) {
            return Err(Error::InvalidParameter(format!(
                "scenario '{}': empty contact window {}..{}",
                self.name, window.from_ms, window.until_ms
            )));
        }
        self.config.validate()
    }

    /// Union of all contact windows active at `t`
    pub fn reading_at(&self, t: u64) -> ObstructionReading {
        self.contacts
            .iter()
            .filter(|w| w.active_at(t))
            .fold(ObstructionReading::CLEAR, |acc, w| acc.merge(w.reading()))
    }
}

/// Load a scenario from a TOML file
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario> {
    let contents = fs::read_to_string(path)?;
    Scenario::from_toml_str(&contents)
}

/// What happened during one cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleRecord {
    /// Sensor snapshot fed to avoidance
    pub reading: ObstructionReading,
    /// Avoidance state after the cycle
    pub avoidance_state: AvoidanceState,
    /// Stuck detector state after the cycle
    pub stuck_state: StuckState,
    /// Agitation after the cycle
    pub agitation: u32,
    /// Commands and bump event
    pub output: LayerOutput,
}

impl CycleRecord {
    /// Cycle time
    pub fn now(&self) -> Timestamp {
        self.output.now
    }
}

/// Recorded run of a scenario
#[derive(Clone, Debug)]
pub struct Trace {
    /// Scenario name
    pub name: String,
    /// One record per serviced cycle
    pub records: Vec<CycleRecord>,
}

impl Trace {
    /// Number of bump events
    pub fn bump_count(&self) -> usize {
        self.records.iter().filter(|r| r.output.bumped).count()
    }

    /// Times at which the stuck detector started escaping
    pub fn escalations(&self) -> Vec<Timestamp> {
        let mut previous = StuckState::Idle;
        let mut times = Vec::new();
        for record in &self.records {
            if previous == StuckState::Idle && record.stuck_state == StuckState::Escaping {
                times.push(record.now());
            }
            previous = record.stuck_state;
        }
        times
    }

    /// First cycle whose avoidance state satisfies `pred`
    pub fn first_avoidance<F>(&self, pred: F) -> Option<&CycleRecord>
    where
        F: Fn(AvoidanceState) -> bool,
    {
        self.records.iter().find(|r| pred(r.avoidance_state))
    }

    /// Record at exactly `t`, if a cycle ran then
    pub fn at(&self, t: u64) -> Option<&CycleRecord> {
        self.records.iter().find(|r| r.now() == Timestamp(t))
    }

    /// Last record
    pub fn last(&self) -> Option<&CycleRecord> {
        self.records.last()
    }

    /// Highest agitation seen
    pub fn peak_agitation(&self) -> u32 {
        self.records.iter().map(|r| r.agitation).max().unwrap_or(0)
    }
}

/// Run a scenario from t = 0 to `duration_ms`
pub fn run_scenario(scenario: &Scenario) -> Result<Trace> {
    scenario.validate()?;

    let sensor = ScriptedSensor::new();
    let feed = sensor.clone();
    let mut layer = ReflexLayer::new(sensor, scenario.config.clone());
    layer.begin()?;

    let mut toggles = scenario.manual_toggles_ms.clone();
    toggles.sort_unstable();
    let mut next_toggle = 0;

    info!(
        "[Harness] Running '{}': {}ms at {}ms/cycle, {} contact windows",
        scenario.name,
        scenario.duration_ms,
        scenario.cycle_ms,
        scenario.contacts.len()
    );

    let capacity = (scenario.duration_ms / scenario.cycle_ms + 1) as usize;
    let mut records = Vec::with_capacity(capacity);
    let mut t = 0;
    while t <= scenario.duration_ms {
        while next_toggle < toggles.len() && toggles[next_toggle] <= t {
            layer.manual_mut().toggle();
            next_toggle += 1;
        }

        let reading = scenario.reading_at(t);
        feed.push(reading);
        let output = layer.service(Timestamp(t));

        records.push(CycleRecord {
            reading,
            avoidance_state: layer.avoidance().state(),
            stuck_state: layer.stuck().state(),
            agitation: layer.stuck().agitation(),
            output,
        });
        let Some(next) = t.checked_add(scenario.cycle_ms) else {
            break;
        };
        t = next;
    }

    let trace = Trace {
        name: scenario.name.clone(),
        records,
    };
    debug!(
        "[Harness] '{}' done: {} cycles, {} bumps, {} escalations",
        trace.name,
        trace.records.len(),
        trace.bump_count(),
        trace.escalations().len()
    );
    Ok(trace)
}

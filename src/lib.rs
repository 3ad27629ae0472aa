//! Pratikriya - reactive collision behaviors for a robot vacuum
//!
//! Turns per-cycle obstruction classification (left / right / center
//! blocked) into motion commands through small timer-driven state machines.
//! An external arbiter picks or blends the commands; this crate never
//! combines them.
//!
//! ## Behaviors
//!
//! - [`BumpAvoidance`]: reverse, turn away, settle, resume. Emits a bump
//!   event on the cycle it starts reversing.
//! - [`StuckDetector`]: leaky-bucket count of bump events; escalates to a
//!   long escape turn when bumps arrive faster than the bucket drains.
//! - [`ManualOverride`]: user-toggled forward motion.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pratikriya::{MonotonicClock, ReflexConfig, ReflexLayer};
//!
//! let config = ReflexConfig::load("pratikriya.toml")?;
//! let mut layer = ReflexLayer::new(bumper_driver, config);
//! layer.begin()?;
//!
//! let clock = MonotonicClock::new();
//! loop {
//!     let out = layer.service(clock.now());
//!     arbiter.submit(&[out.stuck, out.avoidance, out.manual]);
//! }
//! ```

pub mod behavior;
pub mod command;
pub mod config;
pub mod error;
pub mod harness;
pub mod layer;
pub mod sensor;
pub mod time;

// Re-export commonly used types
pub use behavior::{
    AvoidanceState, Behavior, BumpAvoidance, Cycle, ManualOverride, StuckDetector, StuckState,
};
pub use command::Command;
pub use config::{AvoidanceConfig, ManualConfig, ReflexConfig, StuckConfig};
pub use error::{Error, Result};
pub use layer::{LayerOutput, ReflexLayer};
pub use sensor::{ObstructionReading, ObstructionSensor, ScriptedSensor, TurnDirection};
pub use time::{MonotonicClock, Timestamp};

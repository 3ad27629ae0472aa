//! Scripted obstruction sensor for simulation and tests

use super::{ObstructionReading, ObstructionSensor};
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Replays queued readings, one per `sample`, then falls back to a
/// resting reading.
///
/// Cloning yields another handle to the same queue, so a test can keep
/// injecting readings after the sensor has been moved into a behavior.
#[derive(Clone, Default)]
pub struct ScriptedSensor {
    inner: Arc<Mutex<ScriptedInner>>,
}

#[derive(Default)]
struct ScriptedInner {
    queue: VecDeque<ObstructionReading>,
    resting: ObstructionReading,
    samples: usize,
    begun: bool,
    fail_begin: Option<String>,
}

impl ScriptedSensor {
    /// Create a sensor that reports nothing until readings are queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sensor preloaded with `readings`.
    pub fn with_readings<I>(readings: I) -> Self
    where
        I: IntoIterator<Item = ObstructionReading>,
    {
        let sensor = Self::new();
        sensor.lock().queue.extend(readings);
        sensor
    }

    fn lock(&self) -> MutexGuard<'_, ScriptedInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a reading for a future cycle.
    pub fn push(&self, reading: ObstructionReading) {
        self.lock().queue.push_back(reading);
    }

    /// Queue the same reading for `cycles` cycles.
    pub fn push_repeated(&self, reading: ObstructionReading, cycles: usize) {
        let mut inner = self.lock();
        inner.queue.extend(std::iter::repeat_n(reading, cycles));
    }

    /// Reading returned once the queue is empty.
    pub fn set_resting(&self, reading: ObstructionReading) {
        self.lock().resting = reading;
    }

    /// Make the next `begin` fail with `reason`.
    pub fn fail_begin(&self, reason: impl Into<String>) {
        self.lock().fail_begin = Some(reason.into());
    }

    /// Number of readings still queued.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Total number of `sample` calls so far.
    pub fn samples(&self) -> usize {
        self.lock().samples
    }

    /// Whether `begin` has completed.
    pub fn is_begun(&self) -> bool {
        self.lock().begun
    }
}

impl ObstructionSensor for ScriptedSensor {
    fn begin(&mut self) -> Result<()> {
        let mut inner = self.lock();
        if let Some(reason) = inner.fail_begin.take() {
            return Err(Error::Sensor(reason));
        }
        inner.begun = true;
        Ok(())
    }

    fn sample(&mut self) -> ObstructionReading {
        let mut inner = self.lock();
        inner.samples += 1;
        let resting = inner.resting;
        inner.queue.pop_front().unwrap_or(resting)
    }
}

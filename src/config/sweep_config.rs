use super::ConfigError;
use crate::instrument::Direction;
use serde::Serialize;
use std::time::Duration;

/// Step count, step slew time and jog direction of one kind of sweep.
///
/// `step_corrections` scales the commanded slew time of step `i`; steps
/// without an entry use a factor of 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepConfig {
    steps: u32,
    slew_time: Duration,
    direction: Direction,
    step_corrections: Vec<f64>,
}

impl SweepConfig {
    pub fn new(steps: u32, slew_time_s: f64, direction: Direction) -> Result<Self, ConfigError> {
        if steps == 0 {
            return Err(ConfigError::invalid("steps", "at least one step is required"));
        }
        if !(slew_time_s.is_finite() && slew_time_s > 0.0) {
            return Err(ConfigError::invalid("slew_time_s", "must be positive"));
        }
        let slew_time = Duration::try_from_secs_f64(slew_time_s)
            .map_err(|e| ConfigError::invalid("slew_time_s", e.to_string()))?;
        Ok(Self {
            steps,
            slew_time,
            direction,
            step_corrections: Vec::new(),
        })
    }

    pub fn with_step_corrections(mut self, corrections: Vec<f64>) -> Result<Self, ConfigError> {
        if corrections.iter().any(|c| !(c.is_finite() && *c > 0.0)) {
            return Err(ConfigError::invalid("step_corrections", "factors must be positive"));
        }
        for c in &corrections {
            Duration::try_from_secs_f64(self.slew_time.as_secs_f64() * c)
                .map_err(|e| ConfigError::invalid("step_corrections", format!("corrected slew time {e}")))?;
        }
        self.step_corrections = corrections;
        Ok(self)
    }

    pub fn steps(&self) -> u32 { self.steps }
    pub fn slew_time(&self) -> Duration { self.slew_time }
    pub fn direction(&self) -> Direction { self.direction }

    pub fn correction(&self, step: usize) -> f64 {
        self.step_corrections.get(step).copied().unwrap_or(1.0)
    }

    /// Commanded slew time of `step`, including its calibration factor. Every
    /// corrected time was checked to fit a [`Duration`] when the factors were set.
    pub fn step_slew_time(&self, step: usize) -> Duration {
        self.slew_time.mul_f64(self.correction(step))
    }
}

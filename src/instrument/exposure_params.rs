use crate::config::ConfigError;
use num::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Acquisition settings of the photodiode ammeter.
///
/// The sample count is derived from the exposure time, the integration time
/// in power line cycles and the line frequency. It is recomputed by every
/// setter and is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureParams {
    exposure_time_s: f64,
    exposure_time: Duration,
    nplc: f64,
    line_frequency_hz: f64,
    initial_range: f64,
    sample_count: u32,
}

impl ExposureParams {
    pub const DEF_LINE_FREQUENCY_HZ: f64 = 50.0;

    pub fn new(
        exposure_time_s: f64,
        nplc: f64,
        line_frequency_hz: f64,
        initial_range: f64,
    ) -> Result<Self, ConfigError> {
        if !(initial_range.is_finite() && initial_range > 0.0) {
            return Err(ConfigError::invalid("photodiode.initial_range", "must be positive"));
        }
        if !(line_frequency_hz.is_finite() && line_frequency_hz > 0.0) {
            return Err(ConfigError::invalid("photodiode.line_frequency_hz", "must be positive"));
        }
        let mut params = Self {
            exposure_time_s,
            exposure_time: Duration::ZERO,
            nplc,
            line_frequency_hz,
            initial_range,
            sample_count: 0,
        };
        params.set_timing(exposure_time_s, nplc)?;
        Ok(params)
    }

    /// Number of samples fitting into `exposure_time_s` at `nplc` power line cycles each,
    /// `None` if that count does not fit the sensor's counter.
    pub fn sample_count_for(exposure_time_s: f64, nplc: f64, line_frequency_hz: f64) -> Option<u32> {
        (exposure_time_s * line_frequency_hz / nplc).floor().to_u32()
    }

    pub fn set_exposure_time(&mut self, exposure_time_s: f64) -> Result<(), ConfigError> {
        self.set_timing(exposure_time_s, self.nplc)
    }

    pub fn set_nplc(&mut self, nplc: f64) -> Result<(), ConfigError> {
        self.set_timing(self.exposure_time_s, nplc)
    }

    fn set_timing(&mut self, exposure_time_s: f64, nplc: f64) -> Result<(), ConfigError> {
        if !(exposure_time_s.is_finite() && exposure_time_s > 0.0) {
            return Err(ConfigError::invalid("photodiode.exposure_time_s", "must be positive"));
        }
        if !(nplc.is_finite() && nplc > 0.0) {
            return Err(ConfigError::invalid("photodiode.nplc", "must be positive"));
        }
        let exposure_time = Duration::try_from_secs_f64(exposure_time_s)
            .map_err(|e| ConfigError::invalid("photodiode.exposure_time_s", e.to_string()))?;
        let sample_count = Self::sample_count_for(exposure_time_s, nplc, self.line_frequency_hz)
            .ok_or_else(|| ConfigError::invalid("photodiode.exposure_time_s", "too many samples for one exposure"))?;
        if sample_count == 0 {
            return Err(ConfigError::invalid(
                "photodiode.exposure_time_s",
                "shorter than a single integration period",
            ));
        }
        self.exposure_time_s = exposure_time_s;
        self.exposure_time = exposure_time;
        self.nplc = nplc;
        self.sample_count = sample_count;
        Ok(())
    }

    pub fn exposure_time_s(&self) -> f64 { self.exposure_time_s }
    pub fn exposure_time(&self) -> Duration { self.exposure_time }
    pub fn nplc(&self) -> f64 { self.nplc }
    pub fn line_frequency_hz(&self) -> f64 { self.line_frequency_hz }
    pub fn initial_range(&self) -> f64 { self.initial_range }
    pub fn sample_count(&self) -> u32 { self.sample_count }
}

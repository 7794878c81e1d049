use super::{ConfigError, SweepConfig};
use crate::instrument::{Direction, ExposureParams};
use chrono::{DateTime, Utc};

/// Mutable configuration surface of the monitor, filled in before a map run.
///
/// The sweep blocks stay `None` until their setter is called; operations that
/// need them fail with [`ConfigError::Missing`] instead of guessing.
#[derive(Debug, Clone)]
pub struct ObservationPlan {
    filter: String,
    exposure: ExposureParams,
    azimuth: Option<SweepConfig>,
    elevation: Option<SweepConfig>,
}

impl ObservationPlan {
    /// Direction a forward azimuth sweep jogs in, from 0° towards -180°.
    pub const AZIMUTH_FORWARD: Direction = Direction::Left;
    pub const ELEVATION_SWEEP: Direction = Direction::Down;

    pub fn new(filter: impl Into<String>, exposure: ExposureParams) -> Self {
        Self { filter: filter.into(), exposure, azimuth: None, elevation: None }
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) { self.filter = filter.into(); }

    pub fn set_photodiode_params(
        &mut self,
        exposure_time_s: f64,
        nplc: f64,
        initial_range: f64,
    ) -> Result<(), ConfigError> {
        self.exposure = ExposureParams::new(
            exposure_time_s,
            nplc,
            self.exposure.line_frequency_hz(),
            initial_range,
        )?;
        Ok(())
    }

    pub fn set_azimuth_sweep_params(&mut self, steps: u32, slew_time_s: f64) -> Result<(), ConfigError> {
        self.azimuth = Some(SweepConfig::new(steps, slew_time_s, Self::AZIMUTH_FORWARD)?);
        Ok(())
    }

    pub fn set_elevation_sweep_params(&mut self, steps: u32, slew_time_s: f64) -> Result<(), ConfigError> {
        self.elevation = Some(SweepConfig::new(steps, slew_time_s, Self::ELEVATION_SWEEP)?);
        Ok(())
    }

    pub fn set_elevation_step_corrections(&mut self, corrections: Vec<f64>) -> Result<(), ConfigError> {
        let updated = self.elevation()?.clone().with_step_corrections(corrections)?;
        self.elevation = Some(updated);
        Ok(())
    }

    pub fn filter(&self) -> &str { &self.filter }
    pub fn exposure(&self) -> &ExposureParams { &self.exposure }

    pub fn azimuth(&self) -> Result<&SweepConfig, ConfigError> {
        self.azimuth.as_ref().ok_or(ConfigError::Missing("azimuth parameters"))
    }

    pub fn elevation(&self) -> Result<&SweepConfig, ConfigError> {
        self.elevation.as_ref().ok_or(ConfigError::Missing("elevation parameters"))
    }

    /// Freezes the plan for one map run. Fails if any sweep block is unset.
    pub fn session(&self) -> Result<MapSession, ConfigError> {
        Ok(MapSession {
            filter: self.filter.clone(),
            exposure: self.exposure,
            azimuth: self.azimuth()?.clone(),
            elevation: self.elevation()?.clone(),
            started_at: Utc::now(),
        })
    }
}

/// Immutable snapshot of the plan for the duration of one map run.
#[derive(Debug, Clone)]
pub struct MapSession {
    filter: String,
    exposure: ExposureParams,
    azimuth: SweepConfig,
    elevation: SweepConfig,
    started_at: DateTime<Utc>,
}

impl MapSession {
    pub fn filter(&self) -> &str { &self.filter }
    pub fn exposure(&self) -> &ExposureParams { &self.exposure }
    pub fn azimuth(&self) -> &SweepConfig { &self.azimuth }
    pub fn elevation(&self) -> &SweepConfig { &self.elevation }
    pub fn started_at(&self) -> DateTime<Utc> { self.started_at }
}

use crate::instrument::{
    ExposureParams, InstrumentError, MeasureMode, Measurement, Photodiode, Range, SensorSettings,
};
use async_trait::async_trait;
use num::ToPrimitive;
use rand::random_range;
use std::time::Duration;
use tokio::time::sleep;

/// Ammeter reading a steady twilight sky current with a little shot noise.
pub struct SimulatedPhotodiode {
    connected: bool,
    remote: bool,
    input_enabled: bool,
    mode: MeasureMode,
    range: Range,
    nplc: f64,
    sample_count: u32,
    acquisition_time: Option<f64>,
    sky_current: f64,
}

impl SimulatedPhotodiode {
    pub const SKY_CURRENT: f64 = 2.0e-9;
    pub const NOISE: f64 = 0.02;
    /// Ranges the ammeter can switch between, in amperes.
    const RANGES: [f64; 8] = [2e-9, 20e-9, 200e-9, 2e-6, 20e-6, 200e-6, 2e-3, 20e-3];

    /// A photodiode that is `connected` or fails every command as unreachable.
    pub fn new(connected: bool) -> Self {
        Self {
            connected,
            remote: false,
            input_enabled: false,
            mode: MeasureMode::Current,
            range: Range::Fixed(20e-6),
            nplc: 1.0,
            sample_count: 1,
            acquisition_time: None,
            sky_current: Self::SKY_CURRENT,
        }
    }

    fn link(&self) -> Result<(), InstrumentError> {
        if self.connected {
            Ok(())
        } else {
            Err(InstrumentError::Unavailable("photodiode disabled".to_string()))
        }
    }

    fn integration_time(&self) -> f64 {
        self.acquisition_time
            .unwrap_or(f64::from(self.sample_count) * self.nplc / ExposureParams::DEF_LINE_FREQUENCY_HZ)
    }

    fn sample(&self) -> f64 { self.sky_current * (1.0 + random_range(-Self::NOISE..=Self::NOISE)) }
}

#[async_trait]
impl Photodiode for SimulatedPhotodiode {
    async fn probe(&mut self) -> Result<(), InstrumentError> { self.link() }

    async fn set_remote(&mut self) -> Result<(), InstrumentError> {
        self.link()?;
        self.remote = true;
        Ok(())
    }

    async fn enable_input(&mut self) -> Result<(), InstrumentError> {
        self.link()?;
        self.input_enabled = true;
        Ok(())
    }

    async fn set_mode(&mut self, mode: MeasureMode) -> Result<(), InstrumentError> {
        self.link()?;
        self.mode = mode;
        Ok(())
    }

    async fn set_range(&mut self, range: Range) -> Result<(), InstrumentError> {
        self.link()?;
        self.range = range;
        Ok(())
    }

    async fn set_integration_cycles(&mut self, nplc: f64) -> Result<(), InstrumentError> {
        self.link()?;
        self.nplc = nplc;
        self.acquisition_time = None;
        Ok(())
    }

    async fn set_sample_count(&mut self, count: u32) -> Result<(), InstrumentError> {
        self.link()?;
        self.sample_count = count;
        self.acquisition_time = None;
        Ok(())
    }

    async fn set_acquisition_time(&mut self, seconds: f64) -> Result<(), InstrumentError> {
        self.link()?;
        self.acquisition_time = Some(seconds);
        Ok(())
    }

    async fn measure(&mut self) -> Result<Measurement, InstrumentError> {
        self.link()?;
        if !self.remote {
            return Err(InstrumentError::Rejected { command: "READ?", reason: "not in remote mode".to_string() });
        }
        let effective_s = self.integration_time();
        sleep(Duration::from_secs_f64(effective_s)).await;

        let count = (effective_s * ExposureParams::DEF_LINE_FREQUENCY_HZ / self.nplc)
            .floor()
            .to_usize()
            .unwrap_or(0)
            .max(1);
        let raw_samples: Vec<f64> = (0..count).map(|_| self.sample()).collect();
        let n = raw_samples.len().to_f64().unwrap_or(1.0);
        let mean = raw_samples.iter().sum::<f64>() / n;
        let std = (raw_samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();
        Ok(Measurement { effective_s, mean, std, raw_samples })
    }

    async fn auto_range(&mut self, initial_range: f64) -> Result<f64, InstrumentError> {
        self.link()?;
        if !self.input_enabled {
            return Err(InstrumentError::Rejected { command: "RANG:AUTO", reason: "input disabled".to_string() });
        }
        sleep(Duration::from_secs_f64(self.integration_time())).await;
        let peak = self.sky_current * (1.0 + Self::NOISE);
        let selected = Self::RANGES
            .iter()
            .copied()
            .find(|r| *r >= peak)
            .unwrap_or(initial_range);
        self.range = Range::Fixed(selected);
        Ok(selected)
    }

    async fn read_settings(&mut self) -> Result<SensorSettings, InstrumentError> {
        self.link()?;
        Ok(SensorSettings {
            mode: self.mode,
            range: self.range,
            nplc: self.nplc,
            sample_count: self.sample_count,
        })
    }
}

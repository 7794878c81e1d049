use super::error::InstrumentError;
use async_trait::async_trait;
use std::fmt;
use strum_macros::Display;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
pub enum MeasureMode {
    #[strum(serialize = "CURR")]
    Current,
    #[strum(serialize = "VOLT")]
    Voltage,
    #[strum(serialize = "CHAR")]
    Charge,
}

/// Measurement range of the ammeter in amperes.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Range {
    Fixed(f64),
    Auto,
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Range::Fixed(amps) => write!(f, "{amps:.0e}"),
            Range::Auto => write!(f, "AUTO"),
        }
    }
}

/// Result of one blocking measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Integration time the sensor actually spent, in seconds.
    pub effective_s: f64,
    pub mean: f64,
    pub std: f64,
    pub raw_samples: Vec<f64>,
}

/// Settings the sensor reports back.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSettings {
    pub mode: MeasureMode,
    pub range: Range,
    pub nplc: f64,
    pub sample_count: u32,
}

impl fmt::Display for SensorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode {}, range {}, nplc {}, {} samples",
            self.mode, self.range, self.nplc, self.sample_count
        )
    }
}

/// Capability of the photodiode ammeter.
#[async_trait]
pub trait Photodiode: Send {
    /// Checks that the sensor answers. A failing probe degrades the session to
    /// motion-only operation.
    async fn probe(&mut self) -> Result<(), InstrumentError>;
    async fn set_remote(&mut self) -> Result<(), InstrumentError>;
    async fn enable_input(&mut self) -> Result<(), InstrumentError>;
    async fn set_mode(&mut self, mode: MeasureMode) -> Result<(), InstrumentError>;
    async fn set_range(&mut self, range: Range) -> Result<(), InstrumentError>;
    async fn set_integration_cycles(&mut self, nplc: f64) -> Result<(), InstrumentError>;
    async fn set_sample_count(&mut self, count: u32) -> Result<(), InstrumentError>;
    async fn set_acquisition_time(&mut self, seconds: f64) -> Result<(), InstrumentError>;
    /// Blocks for the configured acquisition time.
    async fn measure(&mut self) -> Result<Measurement, InstrumentError>;
    /// Converges the range starting from `initial_range` and returns the selected range.
    async fn auto_range(&mut self, initial_range: f64) -> Result<f64, InstrumentError>;
    async fn read_settings(&mut self) -> Result<SensorSettings, InstrumentError>;
}

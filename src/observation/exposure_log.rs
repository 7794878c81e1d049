use super::{ExposureRecord, LogError};
use crate::sequencer::SweepResult;

/// Append-only store of everything a map run produces.
///
/// Writers are expected to hand every append to the OS before returning from
/// [`ExposureLog::flush`], so a crash loses at most the record in flight.
pub trait ExposureLog: Send {
    fn append_record(&mut self, record: &ExposureRecord) -> Result<(), LogError>;
    /// Stores the per-sample trace behind `record` as its side-car artifact.
    fn append_raw_trace(&mut self, record: &ExposureRecord, samples: &[f64]) -> Result<(), LogError>;
    fn append_telemetry(&mut self, sweep: &SweepResult) -> Result<(), LogError>;
    fn flush(&mut self) -> Result<(), LogError>;
}

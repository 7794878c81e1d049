use crate::config::ConfigError;
use crate::instrument::InstrumentError;
use crate::observation::LogError;
use std::fmt;

#[derive(Debug)]
pub enum SequencerError {
    /// Parameters needed by the operation were never set. Raised before any motion.
    Configuration(ConfigError),
    /// The mount did not answer the startup probe.
    MountUnavailable(InstrumentError),
    /// A mount command failed; motion commands are never retried.
    Mount(InstrumentError),
    /// A measurement was requested while running without the sensor.
    SensorUnavailable,
    Measurement(InstrumentError),
    Log(LogError),
    /// The sweep produced no usable slew rate to time the return slew with.
    NoValidSlewRate,
}

impl fmt::Display for SequencerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencerError::Configuration(e) => write!(f, "configuration error: {e}"),
            SequencerError::MountUnavailable(e) => write!(f, "mount not reachable: {e}"),
            SequencerError::Mount(e) => write!(f, "mount command failed: {e}"),
            SequencerError::SensorUnavailable => write!(f, "photodiode not connected"),
            SequencerError::Measurement(e) => write!(f, "measurement failed: {e}"),
            SequencerError::Log(e) => write!(f, "{e}"),
            SequencerError::NoValidSlewRate => write!(f, "sweep yielded no valid slew rate"),
        }
    }
}

impl std::error::Error for SequencerError {}

impl From<ConfigError> for SequencerError {
    fn from(value: ConfigError) -> Self { SequencerError::Configuration(value) }
}

impl From<LogError> for SequencerError {
    fn from(value: LogError) -> Self { SequencerError::Log(value) }
}

use std::{fmt, time::Duration};

/// Failure reported by a mount or sensor capability.
#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentError {
    /// The device did not answer at all.
    Unavailable(String),
    /// The device answered but refused or failed the command.
    Rejected { command: &'static str, reason: String },
    /// The device did not finish the command in time.
    Timeout(Duration),
}

impl fmt::Display for InstrumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentError::Unavailable(reason) => write!(f, "device unavailable: {reason}"),
            InstrumentError::Rejected { command, reason } => {
                write!(f, "command '{command}' rejected: {reason}")
            }
            InstrumentError::Timeout(dt) => write!(f, "command timed out after {:.1}s", dt.as_secs_f64()),
        }
    }
}

impl std::error::Error for InstrumentError {}

use std::fmt;

#[derive(Debug)]
pub enum LogError {
    Io(std::io::Error),
    Csv(csv::Error),
    Encode(bincode::error::EncodeError),
    Decode(bincode::error::DecodeError),
    Json(serde_json::Error),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::Io(e) => write!(f, "exposure log I/O failed: {e}"),
            LogError::Csv(e) => write!(f, "exposure table row failed: {e}"),
            LogError::Encode(e) => write!(f, "raw trace encoding failed: {e}"),
            LogError::Decode(e) => write!(f, "raw trace decoding failed: {e}"),
            LogError::Json(e) => write!(f, "mount telemetry row failed: {e}"),
        }
    }
}

impl std::error::Error for LogError {}

impl From<std::io::Error> for LogError {
    fn from(value: std::io::Error) -> Self { LogError::Io(value) }
}

impl From<csv::Error> for LogError {
    fn from(value: csv::Error) -> Self { LogError::Csv(value) }
}

impl From<bincode::error::EncodeError> for LogError {
    fn from(value: bincode::error::EncodeError) -> Self { LogError::Encode(value) }
}

impl From<bincode::error::DecodeError> for LogError {
    fn from(value: bincode::error::DecodeError) -> Self { LogError::Decode(value) }
}

impl From<serde_json::Error> for LogError {
    fn from(value: serde_json::Error) -> Self { LogError::Json(value) }
}

use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// A parameter block required by the requested operation was never set.
    Missing(&'static str),
    Invalid { field: &'static str, reason: String },
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid { field, reason: reason.into() }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(what) => write!(f, "{what} not configured, set them first"),
            ConfigError::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
            ConfigError::Io(e) => write!(f, "cannot read configuration: {e}"),
            ConfigError::Parse(e) => write!(f, "malformed configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self { ConfigError::Io(value) }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self { ConfigError::Parse(value) }
}

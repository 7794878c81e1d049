//! Run configuration: the `twilight.toml` file with its environment
//! overrides, the [`ObservationPlan`] the sequencer reads, and the
//! [`MapSession`] snapshot frozen for one map run.

mod error;
mod plan;
mod run_config;
mod sweep_config;
#[cfg(test)]
mod tests;

pub use error::ConfigError;
pub use plan::{MapSession, ObservationPlan};
pub use run_config::RunConfig;
pub use sweep_config::SweepConfig;

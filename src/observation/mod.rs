//! Durable output of a map run: exposure rows, their raw traces and the
//! mount telemetry of each elevation sweep.

mod daily_table;
mod error;
mod exposure_log;
mod exposure_record;

pub use daily_table::{DailyTable, RawTrace};
pub use error::LogError;
pub use exposure_log::ExposureLog;
pub use exposure_record::{ExposureRecord, Rank};

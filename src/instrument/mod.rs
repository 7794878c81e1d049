//! Capabilities of the two devices the monitor drives: the alt-az mount and
//! the photodiode ammeter. Device protocols live behind these traits.

mod direction;
mod error;
mod exposure_params;
mod mount;
mod photodiode;

pub use direction::{Axis, Direction};
pub use error::InstrumentError;
pub use exposure_params::ExposureParams;
pub use mount::{AltAz, GotoOutcome, GotoRequest, MountController, SlewSpan};
pub use photodiode::{MeasureMode, Measurement, Photodiode, Range, SensorSettings};

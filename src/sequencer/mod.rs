//! Sequencing of a twilight map run.
//!
//! [`SweepSequencer`] owns the devices and runs single elevation sweeps with
//! their acquisitions, [`MapController`] drives the full alt-az protocol on
//! top of it.

mod acquisition;
mod error;
mod map_controller;
mod pacer;
mod sweep_result;
mod sweep_sequencer;

#[cfg(test)]
mod mock;

pub use error::SequencerError;
pub use map_controller::{MapController, MapPhase, MapReport};
pub use pacer::{Pacer, TokioPacer};
pub use sweep_result::SweepResult;
pub use sweep_sequencer::{SensorMode, SweepSequencer};

use super::{
    direction::{Axis, Direction},
    error::InstrumentError,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

/// Pointing of the mount in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltAz {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

impl AltAz {
    pub fn new(altitude_deg: f64, azimuth_deg: f64) -> Self { Self { altitude_deg, azimuth_deg } }
}

impl fmt::Display for AltAz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(alt {:.3}°, az {:.3}°)", self.altitude_deg, self.azimuth_deg)
    }
}

/// How long a directional slew lasts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlewSpan {
    /// Jog for the given time, then hold through the settle pause before returning.
    Timed(Duration),
    /// Start jogging and return immediately; motion continues until [`MountController::stop`].
    FreeRun,
}

/// Absolute goto on one axis, repeated by the mount until within tolerance
/// or out of iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GotoRequest {
    pub axis: Axis,
    pub target_deg: f64,
    pub tolerance_deg: f64,
    pub speed: u8,
    pub max_iters: u32,
}

/// What a bounded-retry goto achieved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GotoOutcome {
    pub converged: bool,
    pub iterations: u32,
    pub final_deg: f64,
}

impl GotoOutcome {
    pub fn residual_deg(&self, request: &GotoRequest) -> f64 {
        (self.final_deg - request.target_deg).abs()
    }
}

/// Motion capability of the alt-az mount.
///
/// Every timed command includes a trailing settle pause of
/// [`MountController::settle_pause`] that is not attributable to motion.
#[async_trait]
pub trait MountController: Send {
    /// Checks that the mount answers. A failing probe is fatal for a session.
    async fn probe(&mut self) -> Result<(), InstrumentError>;
    async fn slew(&mut self, direction: Direction, span: SlewSpan) -> Result<(), InstrumentError>;
    /// Stops any free-running motion.
    async fn stop(&mut self) -> Result<(), InstrumentError>;
    async fn goto_absolute(&mut self, request: GotoRequest) -> Result<GotoOutcome, InstrumentError>;
    /// Drives both axes to the mechanical zero reference (altitude 90°, azimuth 0°).
    async fn goto_zero_reference(&mut self) -> Result<(), InstrumentError>;
    async fn set_jog_speed(&mut self, level: u8) -> Result<(), InstrumentError>;
    async fn query_position(&mut self) -> Result<AltAz, InstrumentError>;
    fn settle_pause(&self) -> Duration;
}

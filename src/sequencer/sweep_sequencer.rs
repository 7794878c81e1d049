use super::{
    Pacer, SequencerError,
    sweep_result::{SweepResult, SweepTrace},
};
use crate::config::{ObservationPlan, SweepConfig};
use crate::instrument::{
    AltAz, Axis, Direction, GotoRequest, MountController, Photodiode, SlewSpan,
};
use crate::observation::{ExposureLog, Rank};
use crate::{event, info, log, warn};
use std::time::Duration;
use strum_macros::Display;
use tokio::time::Instant;

/// Whether the photodiode answered when the session was connected.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SensorMode {
    Active,
    /// Motion-only operation: exposures are replaced by holds of equal length.
    Degraded,
}

/// Executes elevation sweeps and the acquisitions inside them.
///
/// The sequencer is the only party touching the devices during a run; every
/// command is awaited before the next one is issued.
pub struct SweepSequencer {
    pub(super) mount: Box<dyn MountController>,
    pub(super) photodiode: Box<dyn Photodiode>,
    pub(super) log: Box<dyn ExposureLog>,
    pub(super) pacer: Box<dyn Pacer>,
    pub(super) plan: ObservationPlan,
    pub(super) sensor: SensorMode,
}

impl SweepSequencer {
    /// Jog speed used for all directional slews.
    pub const JOG_SPEED: u8 = 9;
    /// Altitude every elevation sweep starts from and returns to.
    pub const REFERENCE_ALTITUDE_DEG: f64 = 85.0;
    /// Delay between commanding a moving exposure and the sensor actually integrating.
    pub const SENSOR_LAG: Duration = Duration::from_secs(2);

    const REFERENCE_GOTO: GotoRequest = GotoRequest {
        axis: Axis::Altitude,
        target_deg: Self::REFERENCE_ALTITUDE_DEG,
        tolerance_deg: 1.0,
        speed: 8,
        max_iters: 1,
    };

    /// Probes both devices. An unreachable mount is fatal, an unreachable
    /// photodiode degrades the session to motion-only operation.
    pub async fn connect(
        mut mount: Box<dyn MountController>,
        mut photodiode: Box<dyn Photodiode>,
        log: Box<dyn ExposureLog>,
        pacer: Box<dyn Pacer>,
        plan: ObservationPlan,
    ) -> Result<Self, SequencerError> {
        mount.probe().await.map_err(SequencerError::MountUnavailable)?;
        let sensor = match photodiode.probe().await {
            Ok(()) => SensorMode::Active,
            Err(e) => {
                warn!("Photodiode not connected ({e}). Running without data!");
                SensorMode::Degraded
            }
        };
        info!("Sequencer ready, sensor {sensor}.");
        Ok(Self { mount, photodiode, log, pacer, plan, sensor })
    }

    pub fn plan(&self) -> &ObservationPlan { &self.plan }
    pub fn sensor(&self) -> SensorMode { self.sensor }

    pub(super) async fn position(&mut self) -> Result<AltAz, SequencerError> {
        self.mount.query_position().await.map_err(SequencerError::Mount)
    }

    /// Runs `sweep.steps()` slew-then-acquire steps and returns the sweep telemetry,
    /// which is also appended to the log.
    ///
    /// The sensor is auto-ranged before the first step and again after the last
    /// one, ready for the moving exposure that usually follows.
    pub async fn sweep_elevation(
        &mut self,
        sweep: &SweepConfig,
        azimuth_rank: u32,
    ) -> Result<SweepResult, SequencerError> {
        let sweep_start = Instant::now();
        let steps = sweep.steps();
        let direction = sweep.direction();

        self.mount.set_jog_speed(Self::JOG_SPEED).await.map_err(SequencerError::Mount)?;
        let initial = self.position().await?;
        event!("Sweep {direction} starting at {initial}");
        self.auto_range_pass().await?;

        let mut slew_durations = Vec::with_capacity(steps as usize);
        let mut altitude_positions = Vec::with_capacity(steps as usize + 1);
        altitude_positions.push(initial.altitude_deg);
        let mut current = initial;

        for step in 0..steps {
            let step_start = Instant::now();
            let slew_time = sweep.step_slew_time(step as usize);
            self.slew(direction, SlewSpan::Timed(slew_time)).await?;
            let slew_duration = step_start.elapsed();

            let rank = Rank::new(step + 1, azimuth_rank);
            match self.sensor {
                SensorMode::Active => {
                    self.acquire(None, false, rank).await?;
                }
                SensorMode::Degraded => {
                    self.pacer.hold(self.plan.exposure().exposure_time()).await;
                }
            }

            current = self.position().await?;
            if step + 1 == steps {
                self.auto_range_pass().await?;
            }
            log!(
                "Step {}/{steps} at {current}: slew + data took {:.2}s",
                step + 1,
                step_start.elapsed().as_secs_f64()
            );
            slew_durations.push(slew_duration);
            altitude_positions.push(current.altitude_deg);
        }

        let result = SweepResult::from_trace(
            SweepTrace {
                azimuth_rank,
                direction,
                commanded_slew_time: sweep.slew_time(),
                slew_durations,
                altitude_positions,
                final_azimuth_deg: current.azimuth_deg,
                total_duration: sweep_start.elapsed(),
            },
            self.mount.settle_pause(),
        );
        self.log.append_telemetry(&result)?;
        info!("Sweep completed in {:.2}s", result.total_duration_s());
        Ok(result)
    }

    /// Goes to the reference altitude, sweeps down through the configured
    /// elevation steps and comes back up while taking one moving exposure.
    pub async fn sweep_down_and_return(&mut self, azimuth_rank: u32) -> Result<(), SequencerError> {
        let elevation = self.plan.elevation()?.clone();

        log!("Going to reference altitude {:.1}°", Self::REFERENCE_ALTITUDE_DEG);
        let outcome = self
            .mount
            .goto_absolute(Self::REFERENCE_GOTO)
            .await
            .map_err(SequencerError::Mount)?;
        if !outcome.converged {
            warn!(
                "Reference goto stopped {:.2}° off after {} iteration(s), continuing",
                outcome.residual_deg(&Self::REFERENCE_GOTO),
                outcome.iterations
            );
        }

        let sweep = self.sweep_elevation(&elevation, azimuth_rank).await?;
        log!("Altitude pointings completed: {:?}", sweep.altitude_positions_deg());

        match self.return_duration(&sweep)? {
            Some(duration) => {
                log!("Slewing back up for {:.2}s while taking data", duration.as_secs_f64());
                self.acquire_while_slewing(duration, elevation.direction().opposite(), azimuth_rank)
                    .await?;
            }
            None => warn!(
                "Sweep ended at {:.2}°, too close to the reference altitude for a return slew",
                sweep.final_altitude_deg()
            ),
        }
        Ok(())
    }

    /// Time needed to climb from the end of `sweep` back to the reference altitude.
    /// With the sensor active the start-up lag of the moving exposure is taken off.
    /// A duration that is not positive or does not fit a [`Duration`] yields `None`.
    pub(super) fn return_duration(&self, sweep: &SweepResult) -> Result<Option<Duration>, SequencerError> {
        let rate = sweep.median_abs_rate().ok_or(SequencerError::NoValidSlewRate)?;
        let mut secs = (Self::REFERENCE_ALTITUDE_DEG - sweep.final_altitude_deg()) / rate;
        if self.sensor == SensorMode::Active {
            secs -= Self::SENSOR_LAG.as_secs_f64();
        }
        if secs <= 0.0 {
            return Ok(None);
        }
        Ok(Duration::try_from_secs_f64(secs).ok())
    }

    pub(super) async fn slew(&mut self, direction: Direction, span: SlewSpan) -> Result<(), SequencerError> {
        self.mount.slew(direction, span).await.map_err(SequencerError::Mount)
    }
}

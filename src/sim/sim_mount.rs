use crate::instrument::{
    AltAz, Axis, Direction, GotoOutcome, GotoRequest, InstrumentError, MountController, SlewSpan,
};
use async_trait::async_trait;
use rand::random_range;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Mount jogging at a fixed rate per speed level, starting at the zero reference.
///
/// Gotos land slightly off target, by at most [`SimulatedMount::GOTO_SCATTER`]
/// of the travelled distance, and are repeated until within tolerance.
pub struct SimulatedMount {
    position: AltAz,
    jog_speed: u8,
    free_run: Option<(Direction, Instant)>,
}

impl SimulatedMount {
    /// Angular rate per jog speed level in degrees per second.
    pub const RATE_PER_LEVEL: f64 = 0.45;
    pub const GOTO_SCATTER: f64 = 0.02;
    const SETTLE: Duration = Duration::from_millis(500);
    const ALTITUDE_LIMITS: (f64, f64) = (0.0, 90.0);

    pub fn new() -> Self {
        Self { position: AltAz::new(90.0, 0.0), jog_speed: 1, free_run: None }
    }

    fn rate(level: u8) -> f64 { Self::RATE_PER_LEVEL * f64::from(level.max(1)) }

    /// Position after moving `direction` for `dt` at the current jog speed.
    fn moved(&self, direction: Direction, dt: Duration) -> AltAz {
        let delta = direction.sign() * Self::rate(self.jog_speed) * dt.as_secs_f64();
        let mut next = self.position;
        match direction.axis() {
            Axis::Altitude => {
                let (lo, hi) = Self::ALTITUDE_LIMITS;
                next.altitude_deg = (next.altitude_deg + delta).clamp(lo, hi);
            }
            Axis::Azimuth => next.azimuth_deg += delta,
        }
        next
    }

    fn axis_deg(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Altitude => self.position.altitude_deg,
            Axis::Azimuth => self.position.azimuth_deg,
        }
    }

    fn set_axis_deg(&mut self, axis: Axis, deg: f64) {
        match axis {
            Axis::Altitude => {
                let (lo, hi) = Self::ALTITUDE_LIMITS;
                self.position.altitude_deg = deg.clamp(lo, hi);
            }
            Axis::Azimuth => self.position.azimuth_deg = deg,
        }
    }

    fn ensure_idle(&self, command: &'static str) -> Result<(), InstrumentError> {
        match self.free_run {
            Some((direction, _)) => Err(InstrumentError::Rejected {
                command,
                reason: format!("mount is still jogging {direction}"),
            }),
            None => Ok(()),
        }
    }
}

impl Default for SimulatedMount {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl MountController for SimulatedMount {
    async fn probe(&mut self) -> Result<(), InstrumentError> { Ok(()) }

    async fn slew(&mut self, direction: Direction, span: SlewSpan) -> Result<(), InstrumentError> {
        self.ensure_idle("slew")?;
        match span {
            SlewSpan::Timed(dt) => {
                sleep(dt).await;
                self.position = self.moved(direction, dt);
                sleep(Self::SETTLE).await;
            }
            SlewSpan::FreeRun => self.free_run = Some((direction, Instant::now())),
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), InstrumentError> {
        if let Some((direction, started)) = self.free_run.take() {
            self.position = self.moved(direction, started.elapsed());
        }
        Ok(())
    }

    async fn goto_absolute(&mut self, request: GotoRequest) -> Result<GotoOutcome, InstrumentError> {
        self.ensure_idle("goto")?;
        let rate = Self::rate(request.speed);
        let mut iterations = 0;
        while iterations < request.max_iters {
            iterations += 1;
            let distance = request.target_deg - self.axis_deg(request.axis);
            sleep(Duration::from_secs_f64(distance.abs() / rate)).await;
            let scatter = distance * random_range(-Self::GOTO_SCATTER..=Self::GOTO_SCATTER);
            self.set_axis_deg(request.axis, request.target_deg + scatter);
            sleep(Self::SETTLE).await;
            if (self.axis_deg(request.axis) - request.target_deg).abs() <= request.tolerance_deg {
                break;
            }
        }
        let final_deg = self.axis_deg(request.axis);
        Ok(GotoOutcome {
            converged: (final_deg - request.target_deg).abs() <= request.tolerance_deg,
            iterations,
            final_deg,
        })
    }

    async fn goto_zero_reference(&mut self) -> Result<(), InstrumentError> {
        self.ensure_idle("home")?;
        let travel = (90.0 - self.position.altitude_deg).abs().max(self.position.azimuth_deg.abs());
        sleep(Duration::from_secs_f64(travel / Self::rate(self.jog_speed.max(8)))).await;
        self.position = AltAz::new(90.0, 0.0);
        sleep(Self::SETTLE).await;
        Ok(())
    }

    async fn set_jog_speed(&mut self, level: u8) -> Result<(), InstrumentError> {
        if !(1..=9).contains(&level) {
            return Err(InstrumentError::Rejected {
                command: "speed",
                reason: format!("jog speed {level} outside 1..=9"),
            });
        }
        self.jog_speed = level;
        Ok(())
    }

    async fn query_position(&mut self) -> Result<AltAz, InstrumentError> {
        Ok(match self.free_run {
            Some((direction, started)) => self.moved(direction, started.elapsed()),
            None => self.position,
        })
    }

    fn settle_pause(&self) -> Duration { Self::SETTLE }
}

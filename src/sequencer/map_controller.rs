use super::{SequencerError, SweepSequencer};
use crate::config::{MapSession, SweepConfig};
use crate::instrument::{Axis, Direction, GotoRequest, SlewSpan};
use crate::{info, log, phase, warn};
use std::time::Duration;
use strum_macros::Display;
use tokio::time::Instant;

/// States of the altitude/azimuth map protocol.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapPhase {
    Idle,
    Preparing,
    ForwardSweep,
    Repositioning,
    BackwardSweep,
    Returning,
}

/// Phases a finished map run went through, with their wall-clock durations.
#[derive(Debug, Clone)]
pub struct MapReport {
    session: MapSession,
    phases: Vec<(MapPhase, Duration)>,
    total: Duration,
}

impl MapReport {
    pub fn session(&self) -> &MapSession { &self.session }
    pub fn phases(&self) -> &[(MapPhase, Duration)] { &self.phases }
    pub fn total(&self) -> Duration { self.total }

    pub fn phase_duration(&self, phase: MapPhase) -> Duration {
        self.phases.iter().filter(|(p, _)| *p == phase).map(|(_, dt)| *dt).sum()
    }
}

/// Drives a full map: prepare, sweep forward in azimuth, reposition to -180°,
/// sweep backward and return home.
///
/// A run is all-or-nothing. Any error aborts it where it stands; there is no
/// checkpoint to resume from.
pub struct MapController {
    sequencer: SweepSequencer,
    phase: MapPhase,
}

impl MapController {
    /// Initial slew below the zero reference, reaching the first sweep start point.
    const PREPARE_OFFSET: Duration = Duration::from_millis(1250);
    const REPOSITION_GOTO: GotoRequest = GotoRequest {
        axis: Axis::Azimuth,
        target_deg: -180.0,
        tolerance_deg: 0.5,
        speed: 8,
        max_iters: 3,
    };

    pub fn new(sequencer: SweepSequencer) -> Self { Self { sequencer, phase: MapPhase::Idle } }

    pub fn phase(&self) -> MapPhase { self.phase }
    pub fn sequencer(&self) -> &SweepSequencer { &self.sequencer }

    fn enter(&mut self, phase: MapPhase) -> Instant {
        phase!("{phase}");
        self.phase = phase;
        Instant::now()
    }

    /// Runs the whole map protocol. Missing azimuth or elevation parameters are
    /// reported before the mount is commanded.
    pub async fn map_alt_az(&mut self) -> Result<MapReport, SequencerError> {
        let session = self.sequencer.plan().session()?;
        phase!(
            "Mapping altitude and azimuth: filter {}, {} azimuth x {} elevation steps",
            session.filter(),
            session.azimuth().steps(),
            session.elevation().steps()
        );
        let run_start = Instant::now();
        let mut phases = Vec::new();
        let outcome = self.run_phases(&session, &mut phases).await;
        let last_phase = self.phase;
        self.phase = MapPhase::Idle;
        if let Err(e) = outcome {
            warn!("Map run aborted during {last_phase}: {e}");
            return Err(e);
        }

        let report = MapReport { session, phases, total: run_start.elapsed() };
        phase!("Timing information");
        info!(
            "Azimuth forward sweep: {:.2} minutes",
            report.phase_duration(MapPhase::ForwardSweep).as_secs_f64() / 60.0
        );
        info!(
            "Azimuth backward sweep: {:.2} minutes",
            report.phase_duration(MapPhase::BackwardSweep).as_secs_f64() / 60.0
        );
        info!("Total map time: {:.2} minutes", report.total.as_secs_f64() / 60.0);
        Ok(report)
    }

    async fn run_phases(
        &mut self,
        session: &MapSession,
        phases: &mut Vec<(MapPhase, Duration)>,
    ) -> Result<(), SequencerError> {
        let forward = session.azimuth().direction();

        let t = self.enter(MapPhase::Preparing);
        self.prepare().await?;
        phases.push((MapPhase::Preparing, t.elapsed()));

        let t = self.enter(MapPhase::ForwardSweep);
        self.azimuth_sweep(session.azimuth(), forward).await?;
        phases.push((MapPhase::ForwardSweep, t.elapsed()));

        let t = self.enter(MapPhase::Repositioning);
        self.reposition().await?;
        phases.push((MapPhase::Repositioning, t.elapsed()));

        let t = self.enter(MapPhase::BackwardSweep);
        self.azimuth_sweep(session.azimuth(), forward.opposite()).await?;
        phases.push((MapPhase::BackwardSweep, t.elapsed()));

        let t = self.enter(MapPhase::Returning);
        log!("Returning to zero position");
        self.sequencer.mount.goto_zero_reference().await.map_err(SequencerError::Mount)?;
        phases.push((MapPhase::Returning, t.elapsed()));
        Ok(())
    }

    async fn prepare(&mut self) -> Result<(), SequencerError> {
        let seq = &mut self.sequencer;
        seq.mount.set_jog_speed(SweepSequencer::JOG_SPEED).await.map_err(SequencerError::Mount)?;
        seq.reset_sensor().await?;
        seq.mount.goto_zero_reference().await.map_err(SequencerError::Mount)?;
        seq.slew(Direction::Down, SlewSpan::Timed(Self::PREPARE_OFFSET)).await
    }

    async fn reposition(&mut self) -> Result<(), SequencerError> {
        log!("Going to {:.0}° azimuth", Self::REPOSITION_GOTO.target_deg);
        let outcome = self
            .sequencer
            .mount
            .goto_absolute(Self::REPOSITION_GOTO)
            .await
            .map_err(SequencerError::Mount)?;
        if !outcome.converged {
            warn!(
                "Azimuth goto stopped {:.2}° off after {} iteration(s), continuing",
                outcome.residual_deg(&Self::REPOSITION_GOTO),
                outcome.iterations
            );
        }
        Ok(())
    }

    /// One elevation sweep per azimuth step, jogging `direction` between steps.
    /// The last step leaves the azimuth where it is.
    async fn azimuth_sweep(&mut self, azimuth: &SweepConfig, direction: Direction) -> Result<(), SequencerError> {
        let steps = azimuth.steps();
        for rank in 1..=steps {
            let cycle_start = Instant::now();
            phase!("Azimuth cycle {rank}/{steps} ({direction})");
            self.sequencer.sweep_down_and_return(rank).await?;
            if rank == steps {
                break;
            }
            self.sequencer.slew(direction, SlewSpan::Timed(azimuth.slew_time())).await?;
            info!(
                "Azimuth cycle {rank} completed within {:.2}s",
                cycle_start.elapsed().as_secs_f64()
            );
        }
        Ok(())
    }
}

use super::{Pacer, SequencerError, SweepResult, SweepSequencer};
use crate::config::ObservationPlan;
use crate::instrument::{
    AltAz, Axis, Direction, ExposureParams, GotoOutcome, GotoRequest, InstrumentError, MeasureMode,
    Measurement, MountController, Photodiode, Range, SensorSettings, SlewSpan,
};
use crate::observation::{ExposureLog, ExposureRecord, LogError, Rank};
use async_trait::async_trait;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

/// Every command either mock device received, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Probe,
    Slew(Direction, SlewSpan),
    Stop,
    Goto(Axis, f64),
    GotoZero,
    JogSpeed(u8),
    QueryPosition,
    SensorProbe,
    SetRemote,
    EnableInput,
    SetMode(MeasureMode),
    SetRange(Range),
    SetNplc(f64),
    SetSampleCount(u32),
    SetAcquisitionTime(f64),
    Measure,
    AutoRange(f64),
    ReadSettings,
}

impl Call {
    pub fn is_mount(&self) -> bool {
        matches!(
            self,
            Call::Probe
                | Call::Slew(..)
                | Call::Stop
                | Call::Goto(..)
                | Call::GotoZero
                | Call::JogSpeed(_)
                | Call::QueryPosition
        )
    }
}

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    fn push(&self, call: Call) { self.0.lock().unwrap().push(call); }
    pub fn calls(&self) -> Vec<Call> { self.0.lock().unwrap().clone() }
    pub fn clear(&self) { self.0.lock().unwrap().clear(); }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|c| c == call)
    }
}

/// Mount moving one degree per timed slew, taking `duration + settle` to do so.
pub struct MockMount {
    journal: Journal,
    pub position: AltAz,
    pub reachable: bool,
    pub goto_converges: bool,
    pub fail_slews: bool,
}

impl MockMount {
    pub const SETTLE: Duration = Duration::from_secs(1);
    pub const STEP_DEG: f64 = 1.0;

    fn set_axis(&mut self, axis: Axis, deg: f64) {
        match axis {
            Axis::Altitude => self.position.altitude_deg = deg,
            Axis::Azimuth => self.position.azimuth_deg = deg,
        }
    }
}

#[async_trait]
impl MountController for MockMount {
    async fn probe(&mut self) -> Result<(), InstrumentError> {
        self.journal.push(Call::Probe);
        if self.reachable {
            Ok(())
        } else {
            Err(InstrumentError::Unavailable("no answer on /dev/ttyUSB0".to_string()))
        }
    }

    async fn slew(&mut self, direction: Direction, span: SlewSpan) -> Result<(), InstrumentError> {
        self.journal.push(Call::Slew(direction, span));
        if self.fail_slews {
            return Err(InstrumentError::Rejected { command: "slew", reason: "motor fault".to_string() });
        }
        if let SlewSpan::Timed(dt) = span {
            tokio::time::sleep(dt + Self::SETTLE).await;
            let delta = direction.sign() * Self::STEP_DEG;
            match direction.axis() {
                Axis::Altitude => self.position.altitude_deg += delta,
                Axis::Azimuth => self.position.azimuth_deg += delta,
            }
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), InstrumentError> {
        self.journal.push(Call::Stop);
        Ok(())
    }

    async fn goto_absolute(&mut self, request: GotoRequest) -> Result<GotoOutcome, InstrumentError> {
        self.journal.push(Call::Goto(request.axis, request.target_deg));
        let final_deg = if self.goto_converges {
            request.target_deg
        } else {
            request.target_deg + 2.0 * request.tolerance_deg
        };
        self.set_axis(request.axis, final_deg);
        Ok(GotoOutcome {
            converged: self.goto_converges,
            iterations: if self.goto_converges { 1 } else { request.max_iters },
            final_deg,
        })
    }

    async fn goto_zero_reference(&mut self) -> Result<(), InstrumentError> {
        self.journal.push(Call::GotoZero);
        self.position = AltAz::new(90.0, 0.0);
        Ok(())
    }

    async fn set_jog_speed(&mut self, level: u8) -> Result<(), InstrumentError> {
        self.journal.push(Call::JogSpeed(level));
        Ok(())
    }

    async fn query_position(&mut self) -> Result<AltAz, InstrumentError> {
        self.journal.push(Call::QueryPosition);
        Ok(self.position)
    }

    fn settle_pause(&self) -> Duration { Self::SETTLE }
}

pub struct MockPhotodiode {
    journal: Journal,
    pub reachable: bool,
    pub fail_measure: bool,
    nplc: f64,
    sample_count: u32,
    acquisition_time: Option<f64>,
}

impl MockPhotodiode {
    pub const MEAN: f64 = 2.0e-9;

    fn acquisition_time(&self) -> f64 {
        self.acquisition_time.unwrap_or(f64::from(self.sample_count) * self.nplc / ExposureParams::DEF_LINE_FREQUENCY_HZ)
    }
}

#[async_trait]
impl Photodiode for MockPhotodiode {
    async fn probe(&mut self) -> Result<(), InstrumentError> {
        self.journal.push(Call::SensorProbe);
        if self.reachable {
            Ok(())
        } else {
            Err(InstrumentError::Unavailable("no GPIB device at address 22".to_string()))
        }
    }

    async fn set_remote(&mut self) -> Result<(), InstrumentError> {
        self.journal.push(Call::SetRemote);
        Ok(())
    }

    async fn enable_input(&mut self) -> Result<(), InstrumentError> {
        self.journal.push(Call::EnableInput);
        Ok(())
    }

    async fn set_mode(&mut self, mode: MeasureMode) -> Result<(), InstrumentError> {
        self.journal.push(Call::SetMode(mode));
        Ok(())
    }

    async fn set_range(&mut self, range: Range) -> Result<(), InstrumentError> {
        self.journal.push(Call::SetRange(range));
        Ok(())
    }

    async fn set_integration_cycles(&mut self, nplc: f64) -> Result<(), InstrumentError> {
        self.journal.push(Call::SetNplc(nplc));
        self.nplc = nplc;
        self.acquisition_time = None;
        Ok(())
    }

    async fn set_sample_count(&mut self, count: u32) -> Result<(), InstrumentError> {
        self.journal.push(Call::SetSampleCount(count));
        self.sample_count = count;
        self.acquisition_time = None;
        Ok(())
    }

    async fn set_acquisition_time(&mut self, seconds: f64) -> Result<(), InstrumentError> {
        self.journal.push(Call::SetAcquisitionTime(seconds));
        self.acquisition_time = Some(seconds);
        Ok(())
    }

    async fn measure(&mut self) -> Result<Measurement, InstrumentError> {
        self.journal.push(Call::Measure);
        if self.fail_measure {
            return Err(InstrumentError::Timeout(Duration::from_secs(30)));
        }
        let effective_s = self.acquisition_time();
        tokio::time::sleep(Duration::from_secs_f64(effective_s)).await;
        Ok(Measurement {
            effective_s,
            mean: Self::MEAN,
            std: 1.0e-11,
            raw_samples: vec![Self::MEAN; 4],
        })
    }

    async fn auto_range(&mut self, initial_range: f64) -> Result<f64, InstrumentError> {
        self.journal.push(Call::AutoRange(initial_range));
        Ok(initial_range)
    }

    async fn read_settings(&mut self) -> Result<SensorSettings, InstrumentError> {
        self.journal.push(Call::ReadSettings);
        Ok(SensorSettings {
            mode: MeasureMode::Current,
            range: Range::Fixed(2.0e-5),
            nplc: self.nplc,
            sample_count: self.sample_count,
        })
    }
}

#[derive(Default)]
pub struct LogState {
    pub records: Vec<ExposureRecord>,
    pub traces: Vec<(Rank, usize)>,
    pub telemetry: Vec<SweepResult>,
    pub flushes: usize,
}

pub struct MockLog(Arc<Mutex<LogState>>);

impl ExposureLog for MockLog {
    fn append_record(&mut self, record: &ExposureRecord) -> Result<(), LogError> {
        self.0.lock().unwrap().records.push(record.clone());
        Ok(())
    }

    fn append_raw_trace(&mut self, record: &ExposureRecord, samples: &[f64]) -> Result<(), LogError> {
        self.0.lock().unwrap().traces.push((record.rank(), samples.len()));
        Ok(())
    }

    fn append_telemetry(&mut self, sweep: &SweepResult) -> Result<(), LogError> {
        self.0.lock().unwrap().telemetry.push(sweep.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LogError> {
        self.0.lock().unwrap().flushes += 1;
        Ok(())
    }
}

/// Pacer remembering every hold it was asked for.
pub struct RecordingPacer(Arc<Mutex<Vec<Duration>>>);

#[async_trait]
impl Pacer for RecordingPacer {
    async fn hold(&self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
        tokio::time::sleep(duration).await;
    }
}

/// Shared views on what the mocks saw after they were handed to a sequencer.
pub struct Handles {
    pub journal: Journal,
    pub log: Arc<Mutex<LogState>>,
    pub holds: Arc<Mutex<Vec<Duration>>>,
}

impl Handles {
    pub fn records(&self) -> Vec<ExposureRecord> { self.log.lock().unwrap().records.clone() }
    pub fn telemetry(&self) -> Vec<SweepResult> { self.log.lock().unwrap().telemetry.clone() }
    pub fn holds(&self) -> Vec<Duration> { self.holds.lock().unwrap().clone() }
}

/// Mock devices ready to be tweaked and connected.
pub struct Rig {
    pub mount: MockMount,
    pub photodiode: MockPhotodiode,
    handles: Handles,
}

impl Rig {
    pub fn new() -> Self {
        let journal = Journal::default();
        Self {
            mount: MockMount {
                journal: journal.clone(),
                position: AltAz::new(90.0, 0.0),
                reachable: true,
                goto_converges: true,
                fail_slews: false,
            },
            photodiode: MockPhotodiode {
                journal: journal.clone(),
                reachable: true,
                fail_measure: false,
                nplc: 1.0,
                sample_count: 50,
                acquisition_time: None,
            },
            handles: Handles {
                journal,
                log: Arc::new(Mutex::new(LogState::default())),
                holds: Arc::new(Mutex::new(Vec::new())),
            },
        }
    }

    /// Connects a sequencer to the mocks; the journal is cleared of the probes.
    pub async fn connect(self, plan: ObservationPlan) -> (Handles, Result<SweepSequencer, SequencerError>) {
        let Rig { mount, photodiode, handles } = self;
        let sequencer = SweepSequencer::connect(
            Box::new(mount),
            Box::new(photodiode),
            Box::new(MockLog(Arc::clone(&handles.log))),
            Box::new(RecordingPacer(Arc::clone(&handles.holds))),
            plan,
        )
        .await;
        handles.journal.clear();
        (handles, sequencer)
    }
}

/// 1 s exposures at 5 NPLC, 7 azimuth steps of 7.5 s and 5 elevation steps of 2.75 s.
pub fn standard_plan() -> ObservationPlan {
    let exposure = ExposureParams::new(1.0, 5.0, ExposureParams::DEF_LINE_FREQUENCY_HZ, 20e-6).unwrap();
    let mut plan = ObservationPlan::new("SDSSg", exposure);
    plan.set_azimuth_sweep_params(7, 7.5).unwrap();
    plan.set_elevation_sweep_params(5, 2.75).unwrap();
    plan
}

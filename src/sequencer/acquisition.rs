use super::{SensorMode, SequencerError, SweepSequencer};
use crate::instrument::{Direction, InstrumentError, MeasureMode, Range, SensorSettings, SlewSpan};
use crate::observation::{ExposureRecord, Rank};
use crate::{error, event, log, warn};
use chrono::Utc;
use std::time::Duration;

impl SweepSequencer {
    const AUTO_RANGE_NPLC: f64 = 1.0;
    const AUTO_RANGE_SAMPLES: u32 = 5;

    /// Pushes the configured sample count and integration cycles to the sensor.
    async fn apply_exposure(&mut self) -> Result<(), InstrumentError> {
        let exposure = *self.plan.exposure();
        self.photodiode.set_sample_count(exposure.sample_count()).await?;
        self.photodiode.set_integration_cycles(exposure.nplc()).await
    }

    async fn reset_settings(&mut self) -> Result<SensorSettings, InstrumentError> {
        self.photodiode.set_remote().await?;
        self.photodiode.set_mode(MeasureMode::Current).await?;
        self.apply_exposure().await?;
        self.photodiode.read_settings().await
    }

    /// Puts the sensor into remote current measurement with the configured exposure.
    pub async fn reset_sensor(&mut self) -> Result<(), SequencerError> {
        if self.sensor == SensorMode::Degraded {
            warn!("Photodiode not connected, nothing to reset.");
            return Ok(());
        }
        let settings = self.reset_settings().await.map_err(SequencerError::Measurement)?;
        log!("Photodiode reset: {settings}");
        Ok(())
    }

    async fn fast_auto_range(&mut self) -> Result<f64, InstrumentError> {
        self.photodiode.enable_input().await?;
        self.photodiode.set_integration_cycles(Self::AUTO_RANGE_NPLC).await?;
        self.photodiode.set_sample_count(Self::AUTO_RANGE_SAMPLES).await?;
        self.photodiode.auto_range(self.plan.exposure().initial_range()).await
    }

    /// Auto-ranges with shortened integration, then restores the configured
    /// exposure whether or not ranging succeeded.
    pub async fn auto_range_pass(&mut self) -> Result<(), SequencerError> {
        if self.sensor == SensorMode::Degraded {
            return Ok(());
        }
        let ranged = self.fast_auto_range().await;
        let restored = self.apply_exposure().await;
        let range = ranged.map_err(SequencerError::Measurement)?;
        restored.map_err(SequencerError::Measurement)?;
        log!("Photodiode auto-ranged to {range:.0e} A");
        Ok(())
    }

    /// Measures, snapshots the pointing and persists the record with its raw trace.
    ///
    /// The pointing is queried after the measurement returns, not at its start;
    /// while the mount moves the recorded position lags the integration window.
    async fn take_exposure(
        &mut self,
        exposure_s: Option<f64>,
        flag: bool,
        rank: Rank,
    ) -> Result<ExposureRecord, SequencerError> {
        if self.sensor == SensorMode::Degraded {
            return Err(SequencerError::SensorUnavailable);
        }
        let commanded_s = exposure_s.unwrap_or(self.plan.exposure().exposure_time_s());
        if let Some(secs) = exposure_s {
            self.photodiode.set_acquisition_time(secs).await.map_err(SequencerError::Measurement)?;
        }
        let measurement = self.photodiode.measure().await.map_err(SequencerError::Measurement)?;
        let pointing = self.position().await?;

        let record = ExposureRecord::new(
            Utc::now(),
            pointing,
            commanded_s,
            &measurement,
            self.plan.filter(),
            rank,
            flag,
        );
        self.log.append_record(&record)?;
        self.log.append_raw_trace(&record, &measurement.raw_samples)?;
        self.log.flush()?;
        event!(
            "Exposure {commanded_s}s at {pointing}: {:.3e} ± {:.1e} A",
            measurement.mean,
            measurement.std
        );
        Ok(record)
    }

    /// Takes one exposure and appends it to the log.
    ///
    /// An explicit `exposure_s` overrides the configured exposure time for this
    /// call only; the configured exposure is restored afterwards even if the
    /// measurement failed.
    pub async fn acquire(
        &mut self,
        exposure_s: Option<f64>,
        flag: bool,
        rank: Rank,
    ) -> Result<ExposureRecord, SequencerError> {
        let taken = self.take_exposure(exposure_s, flag, rank).await;
        if exposure_s.is_some() && self.sensor == SensorMode::Active {
            let restored = self.apply_exposure().await;
            let record = taken?;
            restored.map_err(SequencerError::Measurement)?;
            return Ok(record);
        }
        taken
    }

    /// Starts a free-running slew, integrates for `duration` with the sensor in
    /// auto range and stops the mount again.
    ///
    /// The stop is issued on every path once the slew started; the record of a
    /// successful exposure is flagged as taken while moving. Without the sensor
    /// the exposure is replaced by a hold and no record is produced.
    pub async fn acquire_while_slewing(
        &mut self,
        duration: Duration,
        direction: Direction,
        azimuth_rank: u32,
    ) -> Result<Option<ExposureRecord>, SequencerError> {
        self.slew(direction, SlewSpan::FreeRun).await?;

        let taken = match self.sensor {
            SensorMode::Active => self.exposure_while_moving(duration, azimuth_rank).await.map(Some),
            SensorMode::Degraded => {
                warn!("Photodiode not connected, holding {:.2}s without data.", duration.as_secs_f64());
                self.pacer.hold(duration).await;
                Ok(None)
            }
        };

        let stopped = self.mount.stop().await;
        let restored = match self.sensor {
            SensorMode::Active => self.apply_exposure().await,
            SensorMode::Degraded => Ok(()),
        };
        if let Err(e) = stopped {
            error!("Mount did not stop after the moving exposure: {e}");
            return Err(SequencerError::Mount(e));
        }
        let record = taken?;
        restored.map_err(SequencerError::Measurement)?;
        Ok(record)
    }

    async fn exposure_while_moving(
        &mut self,
        duration: Duration,
        azimuth_rank: u32,
    ) -> Result<ExposureRecord, SequencerError> {
        self.photodiode.set_range(Range::Auto).await.map_err(SequencerError::Measurement)?;
        self.take_exposure(Some(duration.as_secs_f64()), true, Rank::new(0, azimuth_rank)).await
    }
}

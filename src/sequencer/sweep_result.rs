use crate::instrument::Direction;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw per-step bookkeeping of one elevation sweep.
pub(super) struct SweepTrace {
    pub(super) azimuth_rank: u32,
    pub(super) direction: Direction,
    pub(super) commanded_slew_time: Duration,
    pub(super) slew_durations: Vec<Duration>,
    pub(super) altitude_positions: Vec<f64>,
    pub(super) final_azimuth_deg: f64,
    pub(super) total_duration: Duration,
}

/// Mount telemetry of one elevation sweep, built once when the sweep ends.
///
/// `altitude_positions_deg` holds the starting altitude followed by one entry
/// per step, `slew_durations_s` one entry per step. A slew rate is `None` when
/// the step duration left nothing after subtracting the settle pause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    azimuth_rank: u32,
    direction: Direction,
    commanded_slew_time_s: f64,
    final_azimuth_deg: f64,
    final_altitude_deg: f64,
    slew_durations_s: Vec<f64>,
    altitude_positions_deg: Vec<f64>,
    slew_rates_deg_s: Vec<Option<f64>>,
    total_duration_s: f64,
    finished_at: DateTime<Utc>,
}

impl SweepResult {
    pub(super) fn from_trace(trace: SweepTrace, settle_pause: Duration) -> Self {
        let slew_durations_s: Vec<f64> = trace.slew_durations.iter().map(Duration::as_secs_f64).collect();
        let slew_rates_deg_s =
            Self::slew_rates(&trace.altitude_positions, &slew_durations_s, settle_pause.as_secs_f64());
        let final_altitude_deg = trace.altitude_positions.last().copied().unwrap_or(f64::NAN);
        Self {
            azimuth_rank: trace.azimuth_rank,
            direction: trace.direction,
            commanded_slew_time_s: trace.commanded_slew_time.as_secs_f64(),
            final_azimuth_deg: trace.final_azimuth_deg,
            final_altitude_deg,
            slew_durations_s,
            altitude_positions_deg: trace.altitude_positions,
            slew_rates_deg_s,
            total_duration_s: trace.total_duration.as_secs_f64(),
            finished_at: Utc::now(),
        }
    }

    /// Angular rate of each step: altitude change over the slew time spent moving.
    pub fn slew_rates(positions: &[f64], durations_s: &[f64], settle_pause_s: f64) -> Vec<Option<f64>> {
        positions
            .iter()
            .tuple_windows()
            .zip(durations_s)
            .map(|((from, to), duration)| {
                let moving = duration - settle_pause_s;
                if moving.abs() <= f64::EPSILON {
                    return None;
                }
                let rate = (to - from) / moving;
                rate.is_finite().then_some(rate)
            })
            .collect()
    }

    /// Median of the absolute valid slew rates, `None` if there is none or it is zero.
    pub fn median_abs_rate(&self) -> Option<f64> {
        let rates = self.slew_rates_deg_s.iter().flatten().map(|r| r.abs()).sorted_by(f64::total_cmp).collect_vec();
        let mid = rates.len() / 2;
        let median = match rates.len() {
            0 => return None,
            n if n % 2 == 1 => rates[mid],
            _ => (rates[mid - 1] + rates[mid]) / 2.0,
        };
        (median > 0.0).then_some(median)
    }

    pub fn azimuth_rank(&self) -> u32 { self.azimuth_rank }
    pub fn direction(&self) -> Direction { self.direction }
    pub fn commanded_slew_time_s(&self) -> f64 { self.commanded_slew_time_s }
    pub fn final_azimuth_deg(&self) -> f64 { self.final_azimuth_deg }
    pub fn final_altitude_deg(&self) -> f64 { self.final_altitude_deg }
    pub fn slew_durations_s(&self) -> &[f64] { &self.slew_durations_s }
    pub fn altitude_positions_deg(&self) -> &[f64] { &self.altitude_positions_deg }
    pub fn slew_rates_deg_s(&self) -> &[Option<f64>] { &self.slew_rates_deg_s }
    pub fn total_duration_s(&self) -> f64 { self.total_duration_s }
    pub fn finished_at(&self) -> DateTime<Utc> { self.finished_at }
}

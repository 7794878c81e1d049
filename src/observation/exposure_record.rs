use crate::instrument::{AltAz, Measurement};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Decimal places kept for the pointing columns.
const POINTING_DECIMALS: i32 = 5;

fn round_pointing(deg: f64) -> f64 {
    let scale = 10f64.powi(POINTING_DECIMALS);
    (deg * scale).round() / scale
}

/// Which elevation step of which azimuth step produced a record.
///
/// Altitude rank 0 marks the exposure taken while slewing back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rank {
    pub altitude: u32,
    pub azimuth: u32,
}

impl Rank {
    pub fn new(altitude: u32, azimuth: u32) -> Self { Self { altitude, azimuth } }
}

/// One row of the per-day exposure table. Built once, appended, never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureRecord {
    timestamp_utc: DateTime<Utc>,
    altitude_deg: f64,
    azimuth_deg: f64,
    commanded_exposure_s: f64,
    effective_exposure_s: f64,
    filter: String,
    mean_current: f64,
    std_current: f64,
    altitude_rank: u32,
    azimuth_rank: u32,
    /// Set for exposures taken while the mount was moving.
    flag: bool,
}

impl ExposureRecord {
    pub fn new(
        timestamp_utc: DateTime<Utc>,
        pointing: AltAz,
        commanded_exposure_s: f64,
        measurement: &Measurement,
        filter: &str,
        rank: Rank,
        flag: bool,
    ) -> Self {
        Self {
            timestamp_utc,
            altitude_deg: round_pointing(pointing.altitude_deg),
            azimuth_deg: round_pointing(pointing.azimuth_deg),
            commanded_exposure_s,
            effective_exposure_s: measurement.effective_s,
            filter: filter.to_string(),
            mean_current: measurement.mean,
            std_current: measurement.std,
            altitude_rank: rank.altitude,
            azimuth_rank: rank.azimuth,
            flag,
        }
    }

    pub fn timestamp_utc(&self) -> DateTime<Utc> { self.timestamp_utc }
    pub fn altitude_deg(&self) -> f64 { self.altitude_deg }
    pub fn azimuth_deg(&self) -> f64 { self.azimuth_deg }
    pub fn commanded_exposure_s(&self) -> f64 { self.commanded_exposure_s }
    pub fn effective_exposure_s(&self) -> f64 { self.effective_exposure_s }
    pub fn filter(&self) -> &str { &self.filter }
    pub fn mean_current(&self) -> f64 { self.mean_current }
    pub fn std_current(&self) -> f64 { self.std_current }
    pub fn rank(&self) -> Rank { Rank::new(self.altitude_rank, self.azimuth_rank) }
    pub fn is_flagged(&self) -> bool { self.flag }
}

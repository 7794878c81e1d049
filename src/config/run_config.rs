use super::{ConfigError, ObservationPlan};
use crate::instrument::ExposureParams;
use serde::Deserialize;
use std::{
    env,
    path::{Path, PathBuf},
};

pub const CONFIG_PATH_VAR: &str = "TWILIGHT_CONFIG";
pub const DATA_ROOT_VAR: &str = "TWILIGHT_DATA_ROOT";
pub const FILTER_VAR: &str = "TWILIGHT_FILTER";
pub const SENSOR_VAR: &str = "TWILIGHT_SENSOR";

const DEF_CONFIG_PATH: &str = "twilight.toml";

/// On-disk run configuration (`twilight.toml`).
///
/// A missing file means the standard twilight run. A present file without an
/// `[azimuth]` or `[elevation]` table leaves that sweep unconfigured.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    #[serde(default = "default_sensor_enabled")]
    pub sensor_enabled: bool,
    #[serde(default)]
    pub photodiode: PhotodiodeSection,
    pub azimuth: Option<SweepSection>,
    pub elevation: Option<SweepSection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhotodiodeSection {
    pub exposure_time_s: f64,
    pub nplc: f64,
    pub initial_range: f64,
    #[serde(default = "default_line_frequency")]
    pub line_frequency_hz: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepSection {
    pub steps: u32,
    pub slew_time_s: f64,
    #[serde(default)]
    pub step_corrections: Vec<f64>,
}

fn default_filter() -> String { String::from("SDSSg") }
fn default_data_root() -> PathBuf { PathBuf::from("DATA") }
fn default_sensor_enabled() -> bool { true }
fn default_line_frequency() -> f64 { ExposureParams::DEF_LINE_FREQUENCY_HZ }

impl Default for PhotodiodeSection {
    fn default() -> Self {
        Self {
            exposure_time_s: 1.0,
            nplc: 5.0,
            initial_range: 20e-6,
            line_frequency_hz: default_line_frequency(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            data_root: default_data_root(),
            sensor_enabled: default_sensor_enabled(),
            photodiode: PhotodiodeSection::default(),
            azimuth: Some(SweepSection { steps: 7, slew_time_s: 7.5, step_corrections: Vec::new() }),
            elevation: Some(SweepSection { steps: 5, slew_time_s: 2.75, step_corrections: Vec::new() }),
        }
    }
}

impl RunConfig {
    /// Loads the file named by `TWILIGHT_CONFIG` (or `twilight.toml`) and
    /// applies the environment overrides.
    pub fn load() -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = env::var(CONFIG_PATH_VAR).map_or_else(|_| PathBuf::from(DEF_CONFIG_PATH), PathBuf::from);
        let (mut config, source) = if path.exists() {
            (Self::from_file(&path)?, Some(path))
        } else {
            (Self::default(), None)
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok((config, source))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(raw)?) }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where F: Fn(&str) -> Option<String> {
        if let Some(root) = lookup(DATA_ROOT_VAR) {
            self.data_root = PathBuf::from(root);
        }
        if let Some(filter) = lookup(FILTER_VAR) {
            self.filter = filter;
        }
        if let Some(sensor) = lookup(SENSOR_VAR) {
            self.sensor_enabled = !matches!(sensor.to_lowercase().as_str(), "off" | "0" | "false");
        }
    }

    /// Builds the validated configuration surface the sequencer runs on.
    pub fn to_plan(&self) -> Result<ObservationPlan, ConfigError> {
        let pd = &self.photodiode;
        let exposure =
            ExposureParams::new(pd.exposure_time_s, pd.nplc, pd.line_frequency_hz, pd.initial_range)?;
        let mut plan = ObservationPlan::new(self.filter.clone(), exposure);
        if let Some(az) = &self.azimuth {
            plan.set_azimuth_sweep_params(az.steps, az.slew_time_s)?;
        }
        if let Some(el) = &self.elevation {
            plan.set_elevation_sweep_params(el.steps, el.slew_time_s)?;
            if !el.step_corrections.is_empty() {
                plan.set_elevation_step_corrections(el.step_corrections.clone())?;
            }
        }
        Ok(plan)
    }
}

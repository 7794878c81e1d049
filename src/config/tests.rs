use super::{ConfigError, ObservationPlan, RunConfig, SweepConfig};
use crate::instrument::{Direction, ExposureParams};
use std::{path::PathBuf, time::Duration};

fn standard_plan() -> ObservationPlan {
    ObservationPlan::new("SDSSg", ExposureParams::new(1.0, 5.0, 50.0, 20e-6).unwrap())
}

#[test]
fn test_default_run_config_is_standard_run() {
    let plan = RunConfig::default().to_plan().unwrap();
    assert_eq!(plan.filter(), "SDSSg");
    assert_eq!(plan.exposure().sample_count(), 10);
    assert_eq!(plan.azimuth().unwrap().steps(), 7);
    assert_eq!(plan.azimuth().unwrap().direction(), Direction::Left);
    assert_eq!(plan.elevation().unwrap().steps(), 5);
    assert_eq!(plan.elevation().unwrap().slew_time(), Duration::from_secs_f64(2.75));
    assert_eq!(plan.elevation().unwrap().direction(), Direction::Down);
}

#[test]
fn test_toml_without_sweeps_leaves_them_unset() {
    let raw = r#"
        filter = "Empty"
        data_root = "/tmp/twm"

        [photodiode]
        exposure_time_s = 2.5
        nplc = 5.0
        initial_range = 2e-7
    "#;
    let config = RunConfig::from_toml_str(raw).unwrap();
    assert_eq!(config.data_root, PathBuf::from("/tmp/twm"));
    assert!(config.sensor_enabled);
    let plan = config.to_plan().unwrap();
    assert_eq!(plan.exposure().sample_count(), 25);
    assert!(matches!(plan.azimuth(), Err(ConfigError::Missing("azimuth parameters"))));
    assert!(matches!(plan.elevation(), Err(ConfigError::Missing("elevation parameters"))));
    assert!(plan.session().is_err());
}

#[test]
fn test_toml_step_corrections_reach_elevation_config() {
    let raw = r"
        [elevation]
        steps = 3
        slew_time_s = 2.0
        step_corrections = [1.5, 0.5]
    ";
    let plan = RunConfig::from_toml_str(raw).unwrap().to_plan().unwrap();
    let el = plan.elevation().unwrap();
    assert_eq!(el.step_slew_time(0), Duration::from_secs(3));
    assert_eq!(el.step_slew_time(1), Duration::from_secs(1));
    assert_eq!(el.step_slew_time(2), Duration::from_secs(2));
}

#[test]
fn test_toml_rejects_unknown_keys_and_bad_values() {
    assert!(matches!(RunConfig::from_toml_str("filtr = \"g\""), Err(ConfigError::Parse(_))));
    let zero_steps = "[azimuth]\nsteps = 0\nslew_time_s = 7.5\n";
    let config = RunConfig::from_toml_str(zero_steps).unwrap();
    assert!(matches!(config.to_plan(), Err(ConfigError::Invalid { field: "steps", .. })));
}

#[test]
fn test_env_overrides() {
    let mut config = RunConfig::default();
    config.apply_overrides(|key| match key {
        "TWILIGHT_DATA_ROOT" => Some(String::from("/data/twm")),
        "TWILIGHT_FILTER" => Some(String::from("SDSSr")),
        "TWILIGHT_SENSOR" => Some(String::from("OFF")),
        _ => None,
    });
    assert_eq!(config.data_root, PathBuf::from("/data/twm"));
    assert_eq!(config.filter, "SDSSr");
    assert!(!config.sensor_enabled);
}

#[test]
fn test_plan_setters_validate() {
    let mut plan = standard_plan();
    assert!(plan.set_elevation_step_corrections(vec![1.0]).is_err());
    assert!(plan.set_elevation_sweep_params(0, 2.75).is_err());
    assert!(plan.set_azimuth_sweep_params(7, -1.0).is_err());
    assert!(plan.azimuth().is_err());
    plan.set_azimuth_sweep_params(7, 7.5).unwrap();
    plan.set_elevation_sweep_params(5, 2.75).unwrap();
    assert!(plan.set_elevation_step_corrections(vec![1.1, f64::NAN]).is_err());
    plan.set_photodiode_params(2.0, 4.0, 1e-6).unwrap();
    assert_eq!(plan.exposure().sample_count(), 25);
    plan.set_filter("Empty");
    let session = plan.session().unwrap();
    assert_eq!(session.filter(), "Empty");
    assert_eq!(session.azimuth().steps(), 7);
}

#[test]
fn test_sweep_config_corrections_default_to_unity() {
    let config = SweepConfig::new(4, 1.0, Direction::Down).unwrap();
    assert!((config.correction(0) - 1.0).abs() < f64::EPSILON);
    assert!((config.correction(10) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_rejected_corrections_keep_elevation_sweep() {
    let mut plan = standard_plan();
    plan.set_elevation_sweep_params(5, 2.75).unwrap();
    plan.set_elevation_step_corrections(vec![1.2]).unwrap();

    assert!(plan.set_elevation_step_corrections(vec![0.9, -1.0]).is_err());

    let el = plan.elevation().unwrap();
    assert_eq!(el.steps(), 5);
    assert!((el.correction(0) - 1.2).abs() < f64::EPSILON);
}

#[test]
fn test_oversized_slew_times_are_rejected() {
    let raw = "[elevation]\nsteps = 5\nslew_time_s = 1e20\n";
    let config = RunConfig::from_toml_str(raw).unwrap();
    assert!(matches!(config.to_plan(), Err(ConfigError::Invalid { field: "slew_time_s", .. })));

    let sweep = SweepConfig::new(5, 2.75, Direction::Down).unwrap();
    let err = sweep.clone().with_step_corrections(vec![1.0, 1e20]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "step_corrections", .. }));
    let corrected = sweep.with_step_corrections(vec![1.0, 2.0]).unwrap();
    assert_eq!(corrected.step_slew_time(1), Duration::from_secs_f64(5.5));
}

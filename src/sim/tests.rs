use super::{SimulatedMount, SimulatedPhotodiode};
use crate::instrument::{AltAz, Axis, Direction, GotoRequest, MountController, Photodiode, SlewSpan};
use crate::log;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_timed_slew_moves_at_jog_rate() {
    let mut mount = SimulatedMount::new();
    mount.set_jog_speed(9).await.unwrap();
    let start = Instant::now();

    mount.slew(Direction::Down, SlewSpan::Timed(Duration::from_secs(2))).await.unwrap();

    let position = mount.query_position().await.unwrap();
    assert!((position.altitude_deg - (90.0 - 0.45 * 9.0 * 2.0)).abs() < 1e-9);
    assert_eq!(position.azimuth_deg, 0.0);
    assert!(((start.elapsed() - mount.settle_pause()).as_secs_f64() - 2.0).abs() < 1e-3);
}

#[tokio::test(start_paused = true)]
async fn test_free_run_moves_until_stopped() {
    let mut mount = SimulatedMount::new();
    mount.set_jog_speed(2).await.unwrap();

    mount.slew(Direction::Left, SlewSpan::FreeRun).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(mount.slew(Direction::Up, SlewSpan::FreeRun).await.is_err());
    mount.stop().await.unwrap();
    let stopped = mount.query_position().await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!((stopped.azimuth_deg + 9.0).abs() < 1e-9);
    assert_eq!(mount.query_position().await.unwrap(), stopped);
}

#[tokio::test(start_paused = true)]
async fn test_altitude_is_clamped_at_zenith() {
    let mut mount = SimulatedMount::new();
    mount.set_jog_speed(9).await.unwrap();
    mount.slew(Direction::Up, SlewSpan::Timed(Duration::from_secs(3))).await.unwrap();
    assert_eq!(mount.query_position().await.unwrap(), AltAz::new(90.0, 0.0));
    assert!(mount.set_jog_speed(10).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_goto_converges_within_tolerance() {
    let mut mount = SimulatedMount::new();
    let request = GotoRequest { axis: Axis::Azimuth, target_deg: -180.0, tolerance_deg: 0.5, speed: 8, max_iters: 3 };

    let outcome = mount.goto_absolute(request).await.unwrap();
    log!("Azimuth goto: {outcome:?}");

    assert!(outcome.converged);
    assert!(outcome.iterations <= 2);
    assert!(outcome.residual_deg(&request) <= 0.5);

    mount.goto_zero_reference().await.unwrap();
    assert_eq!(mount.query_position().await.unwrap(), AltAz::new(90.0, 0.0));
}

#[tokio::test(start_paused = true)]
async fn test_photodiode_measures_sky_current() {
    let mut photodiode = SimulatedPhotodiode::new(true);
    photodiode.probe().await.unwrap();
    photodiode.set_remote().await.unwrap();
    photodiode.set_sample_count(10).await.unwrap();
    photodiode.set_integration_cycles(5.0).await.unwrap();
    let start = Instant::now();

    let measurement = photodiode.measure().await.unwrap();

    assert!((start.elapsed().as_secs_f64() - 1.0).abs() < 1e-3);
    assert_eq!(measurement.raw_samples.len(), 10);
    assert!((measurement.effective_s - 1.0).abs() < 1e-12);
    let tolerance = SimulatedPhotodiode::SKY_CURRENT * SimulatedPhotodiode::NOISE;
    assert!((measurement.mean - SimulatedPhotodiode::SKY_CURRENT).abs() <= tolerance);
    assert!(measurement.std <= tolerance);

    photodiode.enable_input().await.unwrap();
    assert_eq!(photodiode.auto_range(20e-6).await.unwrap(), 20e-9);
}

#[tokio::test]
async fn test_disabled_photodiode_is_unreachable() {
    let mut photodiode = SimulatedPhotodiode::new(false);
    assert!(photodiode.probe().await.is_err());
    assert!(photodiode.measure().await.is_err());
}

#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod config;
mod instrument;
mod logger;
mod observation;
mod sequencer;
mod sim;

use crate::config::RunConfig;
use crate::observation::DailyTable;
use crate::sequencer::{MapController, MapReport, SweepSequencer, TokioPacer};
use crate::sim::{SimulatedMount, SimulatedPhotodiode};
use chrono::Utc;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let (run_config, source) =
        RunConfig::load().unwrap_or_else(|e| fatal!("Could not load run configuration: {e}"));
    match &source {
        Some(path) => info!("Run configuration loaded from {}.", path.display()),
        None => info!("No configuration file found, using the standard twilight run."),
    }
    let plan = run_config.to_plan().unwrap_or_else(|e| fatal!("Invalid run configuration: {e}"));
    let table = DailyTable::open(&run_config.data_root)
        .unwrap_or_else(|e| fatal!("Could not open data directory {}: {e}", run_config.data_root.display()));
    info!("Writing exposures below {}.", table.root().display());

    let sequencer = SweepSequencer::connect(
        Box::new(SimulatedMount::new()),
        Box::new(SimulatedPhotodiode::new(run_config.sensor_enabled)),
        Box::new(table),
        Box::new(TokioPacer),
        plan,
    )
    .await
    .unwrap_or_else(|e| fatal!("Could not start the sequencer: {e}"));

    let mut controller = MapController::new(sequencer);
    let report: MapReport = match controller.map_alt_az().await {
        Ok(report) => report,
        Err(e) => {
            error!("Map run failed: {e}");
            std::process::exit(1);
        }
    };
    for (phase, dt) in report.phases() {
        log!("{phase}: {:.1}s", dt.as_secs_f64());
    }
    info!(
        "Map with filter {} (started {}) finished.",
        report.session().filter(),
        report.session().started_at().format("%H:%M:%S")
    );

    let today = Utc::now().date_naive();
    match DailyTable::open(&run_config.data_root).and_then(|t| t.read_records(today)) {
        Ok(records) => info!("{} exposure(s) in today's table.", records.len()),
        Err(e) => warn!("Could not read back today's table: {e}"),
    }
}

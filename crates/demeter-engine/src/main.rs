//! Headless engine binary for the Demeter farm simulation.
//!
//! Plays one full session without a UI: the scripted [`Autopilot`] stands
//! in for the player, and the session's final report is logged at the end.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `demeter-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Start the game, bounding open-ended sessions
//! 4. Autoplay until the cycle limit
//! 5. Log the final report
//!
//! [`Autopilot`]: autoplay::Autopilot

mod autoplay;
mod error;

use std::path::Path;

use anyhow::Context;
use demeter_core::config::LoggingConfig;
use demeter_core::{Game, SimulationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::autoplay::Autopilot;
use crate::error::EngineError;

/// Configuration file read from the working directory.
const CONFIG_PATH: &str = "demeter-config.yaml";

/// Session length used when the configuration sets no cycle limit.
const DEFAULT_SESSION_CYCLES: u64 = 30;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, game setup, or a cycle fails.
fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let mut config = load_config().context("loading configuration")?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        seed = config.simulation.seed,
        rows = config.farm.rows,
        cols = config.farm.cols,
        location = %config.farm.location,
        "Configuration loaded"
    );

    // 3. Start the game.
    let cycles = *config
        .simulation
        .max_cycles
        .get_or_insert(DEFAULT_SESSION_CYCLES);
    let mut game = Game::new(&config).map_err(EngineError::from)?;
    let snapshot = game.environmental_snapshot().map_err(EngineError::from)?;
    info!(
        location = %game.location(),
        soil_moisture = snapshot.soil_moisture,
        vegetation_index = snapshot.vegetation_index,
        advice = snapshot.advice().message(),
        "Farm conditions"
    );

    // 4. Autoplay.
    let stats = Autopilot::default()
        .play(&mut game, cycles)
        .map_err(EngineError::from)?;
    info!(
        plantings = stats.plantings,
        irrigations = stats.irrigations,
        harvests = stats.harvests,
        harvest_income = %stats.harvest_income,
        events = stats.events_resolved,
        drone_flights = stats.drone_flights,
        refused = stats.refused,
        "Session played"
    );

    // 5. Report.
    let report = game.final_report();
    let encoded = serde_json::to_string(&report).map_err(EngineError::from)?;
    info!(
        session = %report.session,
        score = %report.score,
        cycles = report.cycles,
        money = %report.money,
        productivity = ?report.productivity_level,
        sustainability = ?report.sustainability_level,
        ledger_balanced = report.ledger_balanced,
        "Final report"
    );
    info!(report = %encoded, "Final report (JSON)");

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level; `format: json` switches to JSON lines.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format.as_str() {
        "json" => builder.json().init(),
        "pretty" => builder.pretty().init(),
        _ => builder.init(),
    }
}

/// Load configuration from `demeter-config.yaml`, or defaults if the file
/// is missing.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        Ok(SimulationConfig::parse("")?)
    }
}

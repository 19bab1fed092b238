//! Simulation binary for CoCaRo.
//!
//! Wires configuration, bootstrap, and the tick loop together and runs the
//! simulation until a termination condition is met.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$COCARO_CONFIG` (default `cocaro-config.yaml`)
//! 2. Initialize structured logging (tracing), `RUST_LOG` overriding the
//!    configured level
//! 3. Validate the configuration and build the initial world
//! 4. Create operator state from simulation bounds and wire Ctrl-C to it
//! 5. Run the simulation loop on a blocking thread
//! 6. Log the result

mod error;
mod progress;

use std::path::PathBuf;
use std::sync::Arc;

use cocaro_core::config::SimulationConfig;
use cocaro_core::operator::OperatorState;
use cocaro_core::{runner, setup};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "COCARO_CONFIG";

/// Configuration file used when `COCARO_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "cocaro-config.yaml";

/// Ticks between progress log lines.
const PROGRESS_EVERY_TICKS: u64 = 50;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so a missing file is
    //    reported after initialization.
    let (config, config_found) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("cocaro-engine starting");
    if !config_found {
        info!("Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        width = config.world.width,
        height = config.world.height,
        robot_count = config.population.robot_count,
        engine = %config.population.engine,
        "Configuration loaded"
    );

    // 3. Build the world.
    let mut state = setup::build_state(&config).map_err(EngineError::from)?;

    // 4. Operator state and Ctrl-C.
    let operator = Arc::new(OperatorState::new(&config.simulation));
    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping after the current tick");
                    operator.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    // 5. Run the simulation off the async runtime.
    let loop_operator = Arc::clone(&operator);
    let (state, callback, result) = tokio::task::spawn_blocking(move || {
        let mut callback = ProgressCallback::new(PROGRESS_EVERY_TICKS);
        let result = runner::run_simulation(&mut state, &loop_operator, &mut callback);
        (state, callback, result)
    })
    .await
    .map_err(EngineError::from)?;
    let result = result.map_err(EngineError::from)?;

    // 6. Log results.
    runner::log_simulation_end(&result, &state);
    let counts = callback.box_counts();
    info!(
        samples = counts.len(),
        first = ?counts.first(),
        last = ?counts.last(),
        "Box count series"
    );

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "cocaro-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// Returns the configuration and whether a file was actually read.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let path = std::env::var_os(CONFIG_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}

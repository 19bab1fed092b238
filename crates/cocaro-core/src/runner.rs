//! Simulation loop runner.
//!
//! [`run_simulation`] drives [`run_tick`] until one of these ends the run:
//!
//! - **Tick limit**: `max_ticks` ticks have completed
//! - **Extinction**: no robot is left alive (if enabled)
//! - **Operator stop**: [`OperatorState::request_stop`] was called
//!
//! The loop is synchronous. Callers that live in an async runtime run it
//! on a blocking thread and stop it through the shared [`OperatorState`].
//!
//! [`run_tick`]: crate::tick::run_tick

use std::time::Duration;

use tracing::{info, warn};

use crate::operator::{OperatorState, SimulationEndReason};
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Records the number of boxes left on the grid after every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxCountRecorder {
    /// `(tick, boxes_remaining)` pairs in tick order.
    pub samples: Vec<(u64, u32)>,
}

impl BoxCountRecorder {
    /// An empty recorder.
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }
}

impl TickCallback for BoxCountRecorder {
    fn on_tick(&mut self, summary: &TickSummary, _state: &SimulationState) {
        self.samples.push((summary.tick, summary.boxes_remaining));
    }
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError::Tick`] if any tick fails.
pub fn run_simulation(
    state: &mut SimulationState,
    operator: &OperatorState,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = operator.max_ticks(),
        tick_interval_ms = operator.tick_interval_ms(),
        stop_on_extinction = operator.stop_on_extinction(),
        width = state.grid.width(),
        height = state.grid.height(),
        robots = state.robots.len(),
        boxes = state.board.task_count(),
        "Simulation starting"
    );

    loop {
        // --- Check stop request (before tick) ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::OperatorStop,
                final_summary: last_summary,
                total_ticks,
            });
        }

        // --- Execute tick ---
        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);

        callback.on_tick(&summary, state);

        // --- Check extinction ---
        if operator.stop_on_extinction() && summary.robots_alive == 0 {
            info!(tick = summary.tick, "All robots dead -- extinction");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::Extinction,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        // --- Check tick limit (after tick) ---
        if operator.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            std::thread::sleep(Duration::from_millis(interval_ms));
        }
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult, state: &SimulationState) {
    let deliveries: u32 = state
        .robots
        .values()
        .map(cocaro_agents::Robot::deliveries)
        .fold(0, u32::saturating_add);
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        deliveries,
        messages_delivered = state.bus.delivered_total(),
        messages_dropped = state.bus.dropped_total(),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            robots_alive = summary.robots_alive,
            boxes_remaining = summary.boxes_remaining,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

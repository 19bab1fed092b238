//! Run boundaries and operator control shared with the tick loop.
//!
//! [`OperatorState`] is wrapped in [`Arc`](std::sync::Arc) and shared
//! between the thread running the simulation and whatever handles
//! operator input (the engine binary wires Ctrl-C to it). The stop flag is
//! atomic so the loop can poll it every tick without locking; the run
//! bounds are fixed at construction.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::config::SimulationBoundsConfig;

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Every robot ran out of energy.
    Extinction,
    /// An operator issued a stop command.
    OperatorStop,
}

/// Shared operator control state.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Pause between ticks in milliseconds (0 = run flat out).
    tick_interval_ms: u64,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// End the run when no robot is left alive.
    stop_on_extinction: bool,
}

impl OperatorState {
    /// Create a new operator state from configuration.
    pub const fn new(bounds: &SimulationBoundsConfig) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: bounds.tick_interval_ms,
            max_ticks: bounds.max_ticks,
            stop_on_extinction: bounds.stop_on_extinction,
        }
    }

    /// Request a clean simulation stop. The loop exits before its next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Get the tick interval in milliseconds.
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Get the configured tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether the run should end when every robot is dead.
    pub const fn stop_on_extinction(&self) -> bool {
        self.stop_on_extinction
    }

    /// Check whether the tick limit has been reached.
    ///
    /// Returns `true` if `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }
}

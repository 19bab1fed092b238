//! World clock, bootstrap, tick cycle, and run loop for the CoCaRo simulation.
//!
//! This crate turns a [`SimulationConfig`] into a populated world and
//! drives it tick by tick: Wake, Spawn, Act, Sweep.
//!
//! # Modules
//!
//! - [`clock`] -- World clock with a checked tick counter.
//! - [`config`] -- Configuration loading from `cocaro-config.yaml` into
//!   strongly-typed structs.
//! - [`operator`] -- Run boundaries and the shared stop flag.
//! - [`runner`] -- The run loop, tick callbacks, and the box-count recorder.
//! - [`setup`] -- Initial nests, boxes, and robots.
//! - [`tick`] -- Simulation state and the per-tick phases.
//!
//! [`SimulationConfig`]: config::SimulationConfig

pub mod clock;
pub mod config;
pub mod operator;
pub mod runner;
pub mod setup;
pub mod tick;

pub use clock::{ClockError, WorldClock};
pub use config::{ConfigError, SimulationConfig};
pub use operator::{OperatorState, SimulationEndReason};
pub use runner::{
    BoxCountRecorder, NoOpCallback, RunnerError, SimulationResult, TickCallback,
    log_simulation_end, run_simulation,
};
pub use setup::{SetupError, build_state};
pub use tick::{SimulationState, SpawnSchedule, TickError, TickSummary, run_tick};

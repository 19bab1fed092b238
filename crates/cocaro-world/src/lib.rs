//! Grid substrate, boxes, nests, and reservations for the CoCaRo simulation.
//!
//! This crate models the passive side of the world. Robots live in
//! `cocaro-agents`; everything they move toward, pick up, or deliver to
//! lives here.
//!
//! # Modules
//!
//! - [`board`] -- [`TaskBoard`]: boxes, nests, and the box lifecycle.
//! - [`error`] -- Error types for grid and board operations.
//! - [`grid`] -- The [`Spatial`] trait and the bounded [`Grid`] substrate.
//! - [`reservation`] -- [`ReservationTable`]: exclusive box ownership.

pub mod board;
pub mod error;
pub mod grid;
pub mod reservation;

// Re-export primary types at crate root.
pub use board::{RemovedTask, TaskBoard};
pub use error::WorldError;
pub use grid::{Grid, Spatial};
pub use reservation::{Hold, ReservationTable};

//! Error types for the `cocaro-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`].

use cocaro_types::{AgentId, Color, Position, TaskId};

/// Errors that can occur during grid and task-board operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorldError {
    /// A box was not found on the board.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The box is already reserved by another robot.
    #[error("task {task} is already reserved by {holder}")]
    AlreadyReserved {
        /// The contested box.
        task: TaskId,
        /// The robot currently holding the reservation.
        holder: AgentId,
    },

    /// The robot does not hold the reservation it tried to act on.
    #[error("agent {agent} does not hold task {task}")]
    NotHolder {
        /// The box in question.
        task: TaskId,
        /// The robot that attempted the operation.
        agent: AgentId,
    },

    /// No nest accepts boxes of this color.
    #[error("no nest accepts {0} boxes")]
    MissingNest(Color),

    /// A position lies outside the grid.
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    /// Grid dimensions are zero or do not fit the coordinate type.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

//! Task allocation engines.
//!
//! Every robot runs one engine, chosen at construction through
//! [`EngineKind`]. All engines share the same lifecycle (see
//! [`crate::lifecycle`]) and differ only in how they pick a box during
//! the search phase.
//!
//! # Submodules
//!
//! - [`random`] -- Claim a random free visible box when idle.
//! - [`greedy`] -- Keep the free box with the lowest anticipated criticality.
//! - [`cooperative`] -- Greedy on free boxes, challenge owners of held boxes.

pub mod cooperative;
pub mod greedy;
pub mod random;

use cocaro_types::{EngineKind, HoldStage, TaskId};
use cocaro_world::{TaskBoard, WorldError};

use crate::config::RobotConfig;
use crate::context::TickContext;
use crate::error::AgentError;
use crate::robot::Robot;

/// Run the robot's engine for one search phase.
pub fn search(robot: &mut Robot, ctx: &mut TickContext<'_>) -> Result<(), AgentError> {
    match robot.engine() {
        EngineKind::Random => random::search(robot, ctx),
        EngineKind::Greedy => greedy::search(robot, ctx),
        EngineKind::Cooperative => cooperative::search(robot, ctx),
    }
}

/// The box a robot holds, at which stage, and its anticipated criticality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentHold {
    /// The held box.
    pub task: TaskId,
    /// Targeted or carried.
    pub stage: HoldStage,
    /// Anticipated criticality of finishing the delivery.
    pub anticipated: u32,
}

/// Evaluate the robot's current hold, if any.
///
/// # Errors
///
/// Returns [`AgentError::World`] if the held box has vanished from the
/// board, or [`AgentError::MissingNest`] if it cannot be delivered.
pub fn current_hold(
    robot: &Robot,
    board: &TaskBoard,
    config: &RobotConfig,
) -> Result<Option<CurrentHold>, AgentError> {
    let Some((task, stage)) = board.held_by(robot.id()) else {
        return Ok(None);
    };
    let held = board.task(task).ok_or(WorldError::TaskNotFound(task))?;
    let anticipated = robot.anticipate(held, board, config)?;
    Ok(Some(CurrentHold {
        task,
        stage,
        anticipated,
    }))
}

/// Whether a candidate must be skipped under the lethal-claim policy.
pub const fn is_forbidden(anticipated: u32, config: &RobotConfig) -> bool {
    config.forbid_lethal_claims && anticipated >= config.max_criticality()
}

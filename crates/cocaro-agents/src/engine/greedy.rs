//! Greedy allocation: no messages, strictly-better replacement.
//!
//! Visible boxes are scanned in board order. Boxes held by another robot
//! are skipped. An idle robot claims the first free box it sees; a robot
//! that already targets or carries a box switches only when a free box has
//! a strictly lower anticipated criticality. Switching away from a carried
//! box drops it where the robot stands.

use cocaro_types::{HoldStage, Task};
use tracing::debug;

use super::{current_hold, is_forbidden};
use crate::context::TickContext;
use crate::error::AgentError;
use crate::robot::Robot;

/// Scan visible boxes and update the robot's claim.
pub fn search(robot: &mut Robot, ctx: &mut TickContext<'_>) -> Result<(), AgentError> {
    let visible = robot.visible_tasks().to_vec();
    for id in visible {
        if ctx.board.owner(id).is_some() {
            continue;
        }
        let Some(task) = ctx.board.task(id).cloned() else {
            continue;
        };
        consider_free_task(robot, &task, ctx)?;
    }
    Ok(())
}

/// Apply the greedy policy to one unowned box.
///
/// Shared with the cooperative engine, which treats free boxes exactly
/// like the greedy engine does.
pub fn consider_free_task(
    robot: &mut Robot,
    task: &Task,
    ctx: &mut TickContext<'_>,
) -> Result<(), AgentError> {
    let anticipated = robot.anticipate(task, ctx.board, ctx.config)?;
    if is_forbidden(anticipated, ctx.config) {
        debug!(agent = %robot.id(), task = %task.id, anticipated, "Skipping lethal task");
        return Ok(());
    }

    let Some(hold) = current_hold(robot, ctx.board, ctx.config)? else {
        ctx.board.claim(task.id, robot.id())?;
        return Ok(());
    };
    if anticipated >= hold.anticipated {
        return Ok(());
    }

    ctx.board.claim(task.id, robot.id())?;
    if hold.stage == HoldStage::Carried {
        robot.set_target_nest(None);
        debug!(
            agent = %robot.id(),
            dropped = %hold.task,
            chased = %task.id,
            position = %robot.position(),
            "Dropped carried task for a better one"
        );
    }
    Ok(())
}

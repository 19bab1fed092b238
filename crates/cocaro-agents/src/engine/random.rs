//! Random allocation: the baseline engine.
//!
//! An idle robot claims a uniformly random free box among those it sees.
//! A robot that already holds a box keeps it.

use rand::seq::IndexedRandom;

use super::is_forbidden;
use crate::context::TickContext;
use crate::error::AgentError;
use crate::robot::Robot;

/// Claim a random free visible box if the robot holds nothing.
pub fn search(robot: &mut Robot, ctx: &mut TickContext<'_>) -> Result<(), AgentError> {
    if ctx.board.held_by(robot.id()).is_some() {
        return Ok(());
    }

    let mut free = Vec::new();
    for &id in robot.visible_tasks() {
        if ctx.board.owner(id).is_some() {
            continue;
        }
        let Some(task) = ctx.board.task(id) else {
            continue;
        };
        if ctx.config.forbid_lethal_claims
            && is_forbidden(robot.anticipate(task, ctx.board, ctx.config)?, ctx.config)
        {
            continue;
        }
        free.push(id);
    }

    if let Some(&pick) = free.choose(&mut *ctx.rng) {
        ctx.board.claim(pick, robot.id())?;
    }
    Ok(())
}

//! The per-tick robot lifecycle shared by every engine.
//!
//! [`step_robot`] runs one robot through a tick:
//!
//! 1. Spend energy if the robot moved during its previous step.
//! 2. Refresh the boxes it can see.
//! 3. Drain its inboxes (cooperative robots only).
//! 4. Run its allocation engine.
//! 5. Move: toward the targeted box, toward the nearest nest of the
//!    carried box's color, or wander.
//! 6. Pick up, carry, and deliver.
//! 7. Die if the battery is empty.
//!
//! A robot whose battery is empty after step 1 skips straight to step 7.

use cocaro_types::{Color, EngineKind, HoldStage, NestId, Position, TaskId};
use cocaro_world::{TaskBoard, WorldError};
use rand::seq::IndexedRandom;
use tracing::info;

use crate::config::RobotConfig;
use crate::context::TickContext;
use crate::engine;
use crate::error::AgentError;
use crate::negotiation;
use crate::robot::Robot;

/// A completed delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// The delivered (and now destroyed) box.
    pub task: TaskId,
    /// Color of the box.
    pub color: Color,
    /// Nest that accepted it.
    pub nest: NestId,
    /// Energy credited to the robot.
    pub reward: u32,
}

/// What happened when a robot died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathReport {
    /// Where the robot stopped.
    pub position: Position,
    /// The box the robot was holding, now free.
    pub released_task: Option<TaskId>,
}

/// Outcome of one robot step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RobotTickResult {
    /// Set if the robot delivered a box this tick.
    pub delivery: Option<Delivery>,
    /// Set if the robot died this tick.
    pub death: Option<DeathReport>,
}

/// Advance one robot by one tick.
///
/// Dead robots are left untouched.
pub fn step_robot(
    robot: &mut Robot,
    ctx: &mut TickContext<'_>,
) -> Result<RobotTickResult, AgentError> {
    let mut result = RobotTickResult::default();
    if !robot.is_active() {
        return Ok(result);
    }

    if robot.moved_last_tick() {
        robot.spend(ctx.config.energy_cost_per_step);
    }

    if !robot.is_depleted() {
        refresh_visibility(robot, ctx.board, ctx.config);
        if robot.engine() == EngineKind::Cooperative {
            negotiation::process_inbox(robot, ctx)?;
        }
        engine::search(robot, ctx)?;
        move_robot(robot, ctx)?;
        result.delivery = handle_cargo(robot, ctx)?;
    }

    if robot.is_depleted() {
        result.death = Some(die(robot, ctx));
    }
    Ok(result)
}

/// Record the boxes within the robot's vision range, in board order.
pub fn refresh_visibility(robot: &mut Robot, board: &TaskBoard, config: &RobotConfig) {
    let visible = board
        .tasks_within(robot.position(), config.vision_range)
        .into_iter()
        .map(|t| t.id)
        .collect();
    robot.set_visible(visible);
}

fn move_robot(robot: &mut Robot, ctx: &mut TickContext<'_>) -> Result<(), AgentError> {
    let here = robot.position();
    let next = match ctx.board.held_by(robot.id()) {
        Some((task, HoldStage::Targeted)) => {
            robot.set_target_nest(None);
            let target = ctx
                .board
                .task(task)
                .ok_or(WorldError::TaskNotFound(task))?
                .position;
            ctx.space.step_toward(here, target, &mut *ctx.rng)
        }
        Some((task, HoldStage::Carried)) => {
            let color = ctx
                .board
                .task(task)
                .ok_or(WorldError::TaskNotFound(task))?
                .color;
            let nest = ctx
                .board
                .nearest_nest(color, here)
                .ok_or(AgentError::MissingNest(color))?;
            robot.set_target_nest(Some(nest.id));
            ctx.space.step_toward(here, nest.position, &mut *ctx.rng)
        }
        None => wander(robot, ctx),
    };
    robot.move_to(next);
    Ok(())
}

/// A random adjacent cell, avoiding the one just left unless it is the
/// only way out.
fn wander(robot: &Robot, ctx: &mut TickContext<'_>) -> Position {
    let here = robot.position();
    let neighbors = ctx.space.adjacent(here);
    let forward: Vec<Position> = neighbors
        .iter()
        .copied()
        .filter(|p| Some(*p) != robot.previous_position())
        .collect();
    let choices = if forward.is_empty() { &neighbors } else { &forward };
    choices.choose(&mut *ctx.rng).copied().unwrap_or(here)
}

fn handle_cargo(
    robot: &mut Robot,
    ctx: &mut TickContext<'_>,
) -> Result<Option<Delivery>, AgentError> {
    let me = robot.id();
    let here = robot.position();
    ctx.board.pick_up(me, here)?;

    let Some(task) = ctx.board.carried_by(me) else {
        return Ok(None);
    };
    ctx.board.move_task(task, here)?;

    let color = ctx
        .board
        .task(task)
        .ok_or(WorldError::TaskNotFound(task))?
        .color;
    let nest = match robot.target_nest().and_then(|id| ctx.board.nest(id)) {
        Some(nest) if nest.color == color => nest,
        _ => ctx
            .board
            .nearest_nest(color, here)
            .ok_or(AgentError::MissingNest(color))?,
    };
    let (nest_id, nest_position) = (nest.id, nest.position);
    robot.set_target_nest(Some(nest_id));
    if nest_position != here {
        return Ok(None);
    }

    ctx.board.remove_task(task)?;
    let reward = ctx.config.reward_for(robot.color(), color);
    robot.credit(reward);
    robot.record_delivery();
    robot.set_target_nest(None);
    info!(
        tick = ctx.tick,
        agent = %me,
        %task,
        %color,
        reward,
        energy = robot.energy(),
        "Task delivered"
    );
    Ok(Some(Delivery {
        task,
        color,
        nest: nest_id,
        reward,
    }))
}

fn die(robot: &mut Robot, ctx: &mut TickContext<'_>) -> DeathReport {
    let released_task = ctx.board.release(robot.id());
    robot.die();
    info!(
        tick = ctx.tick,
        agent = %robot.id(),
        position = %robot.position(),
        ?released_task,
        "Robot ran out of energy"
    );
    DeathReport {
        position: robot.position(),
        released_task,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cocaro_types::RobotStatus;

    use super::*;
    use crate::test_support::Fixture;

    fn step(fx: &mut Fixture, robot: &mut Robot) -> RobotTickResult {
        let result = step_robot(robot, &mut fx.ctx()).unwrap();
        fx.tick = fx.tick.saturating_add(1);
        result
    }

    #[test]
    fn energy_decays_only_after_a_move() {
        let mut fx = Fixture::new();
        let mut robot = fx.robot(Color::Red, EngineKind::Greedy, Position::new(5, 5));
        step(&mut fx, &mut robot);
        assert_eq!(robot.energy(), 300);
        assert!(robot.moved_last_tick());

        step(&mut fx, &mut robot);
        assert_eq!(robot.energy(), 299);
    }

    #[test]
    fn wander_avoids_previous_cell_when_possible() {
        let mut fx = Fixture::new();
        let mut robot = fx.robot(Color::Red, EngineKind::Greedy, Position::new(5, 5));
        for _ in 0..50 {
            let before = robot.previous_position();
            let here = robot.position();
            step(&mut fx, &mut robot);
            assert_eq!(robot.position().manhattan(here), 1);
            if let Some(prev) = before {
                assert_ne!(robot.position(), prev);
            }
        }
    }

    #[test]
    fn robot_fetches_and_delivers_matching_task() {
        let mut fx = Fixture::new();
        let mut robot = fx
            .robot(Color::Red, EngineKind::Greedy, Position::new(10, 3))
            .with_energy(100);
        let task = fx.board.spawn_task(Color::Red, Position::new(10, 2));

        let mut delivered = None;
        for _ in 0..10 {
            if let Some(d) = step(&mut fx, &mut robot).delivery {
                delivered = Some(d);
                break;
            }
        }

        let delivery = delivered.unwrap();
        assert_eq!(delivery.task, task);
        assert_eq!(delivery.reward, 200);
        assert!(fx.board.task(task).is_none());
        assert!(fx.board.reservations().is_empty());
        assert_eq!(robot.deliveries(), 1);
        assert_eq!(robot.target_nest(), None);
        // Three moves (one to the box, two to the nest); the last one is
        // charged on the next step.
        assert_eq!(robot.energy(), 298);
    }

    #[test]
    fn carried_task_follows_robot() {
        let mut fx = Fixture::new();
        let mut robot = fx.robot(Color::Blue, EngineKind::Greedy, Position::new(5, 5));
        let task = fx.board.spawn_task(Color::Blue, Position::new(5, 6));

        step(&mut fx, &mut robot);
        assert_eq!(fx.board.carried_by(robot.id()), Some(task));
        for _ in 0..5 {
            step(&mut fx, &mut robot);
            assert_eq!(
                fx.board.task(task).map(|t| t.position),
                Some(robot.position())
            );
        }
    }

    #[test]
    fn empty_battery_kills_and_releases_hold() {
        let mut fx = Fixture::new();
        let mut robot = fx
            .robot(Color::Green, EngineKind::Greedy, Position::new(5, 5))
            .with_energy(1);
        let task = fx.board.spawn_task(Color::Green, Position::new(5, 8));

        let first = step(&mut fx, &mut robot);
        assert!(first.death.is_none());
        assert_eq!(fx.board.targeted_by(robot.id()), Some(task));

        let second = step(&mut fx, &mut robot);
        assert_eq!(
            second.death,
            Some(DeathReport {
                position: robot.position(),
                released_task: Some(task),
            })
        );
        assert_eq!(robot.status(), RobotStatus::Dead);
        assert_eq!(robot.energy(), 0);
        assert_eq!(fx.board.owner(task), None);

        let position = robot.position();
        let third = step(&mut fx, &mut robot);
        assert_eq!(third, RobotTickResult::default());
        assert_eq!(robot.position(), position);
    }
}

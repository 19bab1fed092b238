//! Cooperative allocation: greedy on free boxes, negotiation for held ones.
//!
//! Free boxes are handled exactly as in [`greedy`](super::greedy). For a
//! visible box held by another robot, the robot sends the holder a
//! criticality challenge when it has nothing, or when the contested box
//! beats its own hold. Each holder holds a single box, so a scan sends at
//! most one challenge per holder. No new challenges go out while the
//! robot is still waiting for replies to a previous round; the replies
//! are handled by [`crate::negotiation`].

use cocaro_types::{Message, MessagePayload};
use tracing::debug;

use super::{current_hold, greedy, is_forbidden};
use crate::context::TickContext;
use crate::error::AgentError;
use crate::robot::Robot;

/// Scan visible boxes, claiming free ones and challenging held ones.
pub fn search(robot: &mut Robot, ctx: &mut TickContext<'_>) -> Result<(), AgentError> {
    let may_challenge = robot.awaiting_reply_since().is_none();
    let mut challenged = false;

    let visible = robot.visible_tasks().to_vec();
    for id in visible {
        let Some(task) = ctx.board.task(id).cloned() else {
            continue;
        };
        let owner = match ctx.board.owner(id) {
            None => {
                greedy::consider_free_task(robot, &task, ctx)?;
                continue;
            }
            Some(owner) if owner == robot.id() => continue,
            Some(owner) => owner,
        };
        if !may_challenge {
            continue;
        }

        let anticipated = robot.anticipate(&task, ctx.board, ctx.config)?;
        if is_forbidden(anticipated, ctx.config) {
            continue;
        }
        let improves = current_hold(robot, ctx.board, ctx.config)?
            .is_none_or(|hold| anticipated < hold.anticipated);
        if !improves {
            continue;
        }

        debug!(
            tick = ctx.tick,
            agent = %robot.id(),
            %owner,
            task = %id,
            anticipated,
            current = robot.criticality(),
            "Challenging task owner"
        );
        ctx.bus.send(Message::new(
            robot.id(),
            owner,
            MessagePayload::Criticality {
                anticipated,
                current: robot.criticality(),
            },
        ));
        challenged = true;
    }

    if challenged {
        robot.set_awaiting_reply_since(Some(ctx.tick));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cocaro_types::{Color, EngineKind, Performative, Position};

    use super::*;
    use crate::lifecycle::refresh_visibility;
    use crate::test_support::Fixture;

    #[test]
    fn idle_robot_challenges_owner_of_visible_task() {
        let mut fx = Fixture::new();
        let owner = fx.robot(Color::Red, EngineKind::Cooperative, Position::new(15, 15));
        let mut robot = fx
            .robot(Color::Red, EngineKind::Cooperative, Position::new(5, 5))
            .with_energy(120);
        let task = fx.board.spawn_task(Color::Red, Position::new(5, 7));
        fx.board.claim(task, owner.id()).unwrap();

        refresh_visibility(&mut robot, &fx.board, &fx.config);
        search(&mut robot, &mut fx.ctx()).unwrap();

        assert_eq!(fx.bus.pending().len(), 1);
        let sent = fx.bus.pending().first().copied().unwrap();
        assert_eq!(sent.recipient, owner.id());
        assert_eq!(sent.performative, Performative::Request);
        assert_eq!(
            sent.payload,
            MessagePayload::Criticality {
                anticipated: 0,
                current: 180
            }
        );
        assert_eq!(robot.awaiting_reply_since(), Some(fx.tick));
        assert_eq!(fx.board.owner(task), Some(owner.id()));
    }

    #[test]
    fn no_challenge_when_own_hold_is_as_good() {
        let mut fx = Fixture::new();
        let owner = fx.robot(Color::Red, EngineKind::Cooperative, Position::new(15, 15));
        let mut robot = fx.robot(Color::Red, EngineKind::Cooperative, Position::new(5, 5));
        let mine = fx.board.spawn_task(Color::Red, Position::new(6, 6));
        fx.board.claim(mine, robot.id()).unwrap();
        let theirs = fx.board.spawn_task(Color::Red, Position::new(5, 7));
        fx.board.claim(theirs, owner.id()).unwrap();

        refresh_visibility(&mut robot, &fx.board, &fx.config);
        search(&mut robot, &mut fx.ctx()).unwrap();
        // Both trips refill the battery: no strict improvement.
        assert!(fx.bus.pending().is_empty());
        assert_eq!(robot.awaiting_reply_since(), None);
    }

    #[test]
    fn waiting_robot_does_not_challenge_again() {
        let mut fx = Fixture::new();
        let owner = fx.robot(Color::Red, EngineKind::Cooperative, Position::new(15, 15));
        let mut robot = fx.robot(Color::Red, EngineKind::Cooperative, Position::new(5, 5));
        let task = fx.board.spawn_task(Color::Red, Position::new(5, 7));
        fx.board.claim(task, owner.id()).unwrap();

        refresh_visibility(&mut robot, &fx.board, &fx.config);
        search(&mut robot, &mut fx.ctx()).unwrap();
        assert_eq!(fx.bus.pending().len(), 1);

        fx.tick = fx.tick.saturating_add(1);
        search(&mut robot, &mut fx.ctx()).unwrap();
        assert_eq!(fx.bus.pending().len(), 1);
    }

    #[test]
    fn free_tasks_follow_greedy_policy() {
        let mut fx = Fixture::new();
        let mut robot = fx.robot(Color::Blue, EngineKind::Cooperative, Position::new(5, 5));
        let task = fx.board.spawn_task(Color::Blue, Position::new(4, 4));

        refresh_visibility(&mut robot, &fx.board, &fx.config);
        search(&mut robot, &mut fx.ctx()).unwrap();
        assert_eq!(fx.board.targeted_by(robot.id()), Some(task));
        assert!(fx.bus.pending().is_empty());
    }
}

//! The negotiation protocol run by cooperative robots.
//!
//! A round between a challenger and the holders it challenged goes:
//!
//! 1. challenger: `request Criticality` to each holder (sent by
//!    [`engine::cooperative`](crate::engine::cooperative));
//! 2. holder: [`arbitrate`], then `refuse Decline` or `agree Offer` +
//!    `inform OfferDetails`, promising its box;
//! 3. challenger: picks the lowest offer, sends `request DemandTask` to
//!    it and `refuse ReleaseReservation` to every other informer;
//! 4. holder: hands the box over through the board and answers
//!    `agree Handover`;
//! 5. challenger: adopts the box.
//!
//! Inboxes are drained once per tick in request, agree, refuse, inform
//! order. Every reply is sent through the bus and therefore seen one tick
//! later, so a full round trip takes [`REPLY_WINDOW_TICKS`] ticks. A
//! challenger that hears nothing back within that window stops waiting.

use std::collections::BTreeSet;

use cocaro_types::{AgentId, Message, MessagePayload, Performative, TaskId};
use tracing::debug;

use crate::context::TickContext;
use crate::engine::current_hold;
use crate::error::AgentError;
use crate::robot::Robot;

/// Ticks between sending a request and processing its replies.
pub const REPLY_WINDOW_TICKS: u64 = 2;

// ---------------------------------------------------------------------------
// Arbitration
// ---------------------------------------------------------------------------

/// One side's urgency in a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bid {
    /// Criticality right now.
    pub current: u32,
    /// Criticality after delivering the contested box.
    pub anticipated: u32,
}

/// A holder's answer to a criticality challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The holder keeps its box.
    Refuse,
    /// The challenger is more critical than the holder by at least the
    /// urgency margin.
    Overwhelming,
    /// The challenger would end the trip less critical than the holder.
    Anticipated,
}

impl Verdict {
    /// Whether the holder offers its box.
    pub const fn is_agree(self) -> bool {
        !matches!(self, Self::Refuse)
    }
}

/// Decide whether `holder` gives its box to `challenger`.
///
/// The holder refuses outright when it is at least as critical as both
/// the challenger's current and anticipated criticality. Otherwise it
/// agrees when the challenger is overwhelmingly more critical now, or
/// when the challenger's anticipated criticality beats the holder's own.
pub const fn arbitrate(holder: Bid, challenger: Bid, margin: u32) -> Verdict {
    if holder.current >= challenger.current && holder.current >= challenger.anticipated {
        return Verdict::Refuse;
    }
    if holder.current.saturating_add(margin) <= challenger.current {
        return Verdict::Overwhelming;
    }
    if challenger.anticipated < holder.anticipated {
        return Verdict::Anticipated;
    }
    Verdict::Refuse
}

// ---------------------------------------------------------------------------
// Inbox processing
// ---------------------------------------------------------------------------

/// Drain all four inboxes, then give up on a round whose replies are
/// overdue.
pub fn process_inbox(robot: &mut Robot, ctx: &mut TickContext<'_>) -> Result<(), AgentError> {
    for message in robot.mailbox_mut().take(Performative::Request) {
        handle_request(robot, &message, ctx)?;
    }
    for message in robot.mailbox_mut().take(Performative::Agree) {
        handle_agree(robot, &message, ctx)?;
    }
    for message in robot.mailbox_mut().take(Performative::Refuse) {
        handle_refuse(robot, &message)?;
    }
    let informs = robot.mailbox_mut().take(Performative::Inform);
    collate_offers(robot, &informs, ctx)?;

    if let Some(since) = robot.awaiting_reply_since()
        && ctx.tick >= since.saturating_add(REPLY_WINDOW_TICKS)
    {
        debug!(tick = ctx.tick, agent = %robot.id(), since, "Negotiation round expired");
        robot.set_awaiting_reply_since(None);
    }
    Ok(())
}

fn handle_request(
    robot: &mut Robot,
    message: &Message,
    ctx: &mut TickContext<'_>,
) -> Result<(), AgentError> {
    check_pairing(message, Performative::Request)?;
    match message.payload {
        MessagePayload::Criticality {
            anticipated,
            current,
        } => {
            let Some(hold) = current_hold(robot, ctx.board, ctx.config)? else {
                reply(robot, message, MessagePayload::Decline, ctx);
                return Ok(());
            };
            let verdict = arbitrate(
                Bid {
                    current: robot.criticality(),
                    anticipated: hold.anticipated,
                },
                Bid {
                    current,
                    anticipated,
                },
                ctx.config.urgency_margin,
            );
            debug!(
                tick = ctx.tick,
                agent = %robot.id(),
                challenger = %message.sender,
                task = %hold.task,
                ?verdict,
                "Arbitrated challenge"
            );
            if verdict.is_agree() {
                reply(robot, message, MessagePayload::Offer, ctx);
                reply(
                    robot,
                    message,
                    MessagePayload::OfferDetails {
                        anticipated: hold.anticipated,
                    },
                    ctx,
                );
                robot.set_box_reserved(true);
            } else {
                reply(robot, message, MessagePayload::Decline, ctx);
            }
        }
        MessagePayload::DemandTask => {
            if let Some((task, _)) = ctx.board.held_by(robot.id()) {
                hand_over(robot, task, message.sender, ctx)?;
                reply(robot, message, MessagePayload::Handover { task }, ctx);
            } else {
                reply(robot, message, MessagePayload::Decline, ctx);
            }
            robot.set_box_reserved(false);
        }
        _ => return Err(violation(message)),
    }
    Ok(())
}

fn hand_over(
    robot: &mut Robot,
    task: TaskId,
    to: AgentId,
    ctx: &mut TickContext<'_>,
) -> Result<(), AgentError> {
    let released = ctx.board.transfer(task, robot.id(), to)?;
    robot.set_target_nest(None);
    debug!(
        tick = ctx.tick,
        agent = %robot.id(),
        receiver = %to,
        %task,
        ?released,
        "Task handed over"
    );
    Ok(())
}

fn handle_agree(
    robot: &mut Robot,
    message: &Message,
    ctx: &mut TickContext<'_>,
) -> Result<(), AgentError> {
    check_pairing(message, Performative::Agree)?;
    match message.payload {
        MessagePayload::Offer => robot.set_awaiting_reply_since(None),
        MessagePayload::Handover { task } => {
            adopt(robot, task, ctx)?;
            robot.set_awaiting_reply_since(None);
        }
        _ => return Err(violation(message)),
    }
    Ok(())
}

/// Take over a handed-over box: confirm it if the transfer already made
/// us the holder, claim it if it is free, leave it alone otherwise.
fn adopt(robot: &mut Robot, task: TaskId, ctx: &mut TickContext<'_>) -> Result<(), AgentError> {
    let me = robot.id();
    match ctx.board.owner(task) {
        Some(holder) if holder == me => {}
        None if ctx.board.task(task).is_some() => {
            ctx.board.claim(task, me)?;
        }
        holder => {
            debug!(tick = ctx.tick, agent = %me, %task, ?holder, "Handed-over task unavailable");
            return Ok(());
        }
    }
    if ctx.board.carried_by(me).is_none() {
        robot.set_target_nest(None);
    }
    debug!(tick = ctx.tick, agent = %me, %task, "Adopted handed-over task");
    Ok(())
}

fn handle_refuse(robot: &mut Robot, message: &Message) -> Result<(), AgentError> {
    check_pairing(message, Performative::Refuse)?;
    match message.payload {
        MessagePayload::Decline => robot.set_awaiting_reply_since(None),
        MessagePayload::ReleaseReservation => robot.set_box_reserved(false),
        _ => return Err(violation(message)),
    }
    Ok(())
}

/// Pick the best offer among this tick's informs and answer every
/// informer: a demand to the winner, a release to the rest.
fn collate_offers(
    robot: &mut Robot,
    informs: &[Message],
    ctx: &mut TickContext<'_>,
) -> Result<(), AgentError> {
    let mut best: Option<(AgentId, u32)> = None;
    for message in informs {
        check_pairing(message, Performative::Inform)?;
        let MessagePayload::OfferDetails { anticipated } = message.payload else {
            return Err(violation(message));
        };
        let bar = best.map_or(ctx.config.max_criticality(), |(_, offered)| offered);
        if anticipated < bar {
            best = Some((message.sender, anticipated));
        }
    }

    let giver = best.map(|(giver, _)| giver);
    if let Some((giver, anticipated)) = best {
        debug!(tick = ctx.tick, agent = %robot.id(), %giver, anticipated, "Demanding offered task");
        ctx.bus
            .send(Message::new(robot.id(), giver, MessagePayload::DemandTask));
        robot.set_awaiting_reply_since(Some(ctx.tick));
    }

    let others: BTreeSet<AgentId> = informs
        .iter()
        .map(|m| m.sender)
        .filter(|sender| Some(*sender) != giver)
        .collect();
    for other in others {
        ctx.bus.send(Message::new(
            robot.id(),
            other,
            MessagePayload::ReleaseReservation,
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn reply(robot: &Robot, to: &Message, payload: MessagePayload, ctx: &mut TickContext<'_>) {
    ctx.bus.send(Message::new(robot.id(), to.sender, payload));
}

fn check_pairing(message: &Message, inbox: Performative) -> Result<(), AgentError> {
    if message.is_well_formed() && message.performative == inbox {
        Ok(())
    } else {
        Err(violation(message))
    }
}

const fn violation(message: &Message) -> AgentError {
    AgentError::ProtocolViolation {
        sender: message.sender,
        performative: message.performative,
        payload: message.payload,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cocaro_types::{Color, EngineKind, Position};

    use super::*;
    use crate::test_support::Fixture;

    fn coop(fx: &Fixture, at: Position) -> Robot {
        fx.robot(Color::Red, EngineKind::Cooperative, at)
    }

    /// Put a well-formed message from `sender` straight into `robot`'s inbox.
    fn receive(robot: &mut Robot, sender: AgentId, payload: MessagePayload) {
        let message = Message::new(sender, robot.id(), payload);
        robot.mailbox_mut().deliver(message);
    }

    fn payloads_to(fx: &Fixture, recipient: AgentId) -> Vec<MessagePayload> {
        fx.bus
            .pending()
            .iter()
            .filter(|m| m.recipient == recipient)
            .map(|m| m.payload)
            .collect()
    }

    #[test]
    fn overwhelmingly_critical_challenger_wins() {
        let holder = Bid {
            current: 40,
            anticipated: 50,
        };
        let challenger = Bid {
            current: 80,
            anticipated: 20,
        };
        assert_eq!(arbitrate(holder, challenger, 10), Verdict::Overwhelming);
    }

    #[test]
    fn holder_at_least_as_critical_refuses() {
        let holder = Bid {
            current: 100,
            anticipated: 0,
        };
        let challenger = Bid {
            current: 80,
            anticipated: 90,
        };
        assert_eq!(arbitrate(holder, challenger, 10), Verdict::Refuse);
    }

    #[test]
    fn better_anticipation_wins_inside_margin() {
        let holder = Bid {
            current: 40,
            anticipated: 60,
        };
        let challenger = Bid {
            current: 45,
            anticipated: 30,
        };
        assert_eq!(arbitrate(holder, challenger, 10), Verdict::Anticipated);
    }

    #[test]
    fn worse_anticipation_inside_margin_is_refused() {
        let holder = Bid {
            current: 40,
            anticipated: 20,
        };
        let challenger = Bid {
            current: 45,
            anticipated: 30,
        };
        assert_eq!(arbitrate(holder, challenger, 10), Verdict::Refuse);
    }

    #[test]
    fn every_challenge_gets_exactly_one_outcome() {
        for (energy, anticipated, current) in
            [(260, 20, 80), (300, 0, 0), (10, 299, 5), (150, 150, 150), (200, 10, 95)]
        {
            let mut fx = Fixture::new();
            let mut holder = coop(&fx, Position::new(5, 5)).with_energy(energy);
            let challenger = AgentId::new();
            let task = fx.board.spawn_task(Color::Red, Position::new(5, 8));
            fx.board.claim(task, holder.id()).unwrap();
            receive(
                &mut holder,
                challenger,
                MessagePayload::Criticality {
                    anticipated,
                    current,
                },
            );

            process_inbox(&mut holder, &mut fx.ctx()).unwrap();

            let replies = payloads_to(&fx, challenger);
            let refused = replies == [MessagePayload::Decline];
            let agreed = matches!(
                replies.as_slice(),
                [MessagePayload::Offer, MessagePayload::OfferDetails { .. }]
            );
            assert!(refused ^ agreed, "unexpected replies {replies:?}");
            assert_eq!(holder.box_reserved(), agreed);
        }
    }

    #[test]
    fn holder_with_nothing_declines() {
        let mut fx = Fixture::new();
        let mut holder = coop(&fx, Position::new(5, 5));
        let challenger = AgentId::new();
        receive(
            &mut holder,
            challenger,
            MessagePayload::Criticality {
                anticipated: 0,
                current: 299,
            },
        );
        process_inbox(&mut holder, &mut fx.ctx()).unwrap();
        assert_eq!(payloads_to(&fx, challenger), vec![MessagePayload::Decline]);
    }

    #[test]
    fn requester_demands_lowest_offer_and_releases_the_rest() {
        let mut fx = Fixture::new();
        let mut requester = coop(&fx, Position::new(5, 5));
        let (cheap, dear) = (AgentId::new(), AgentId::new());
        for (sender, anticipated) in [(dear, 30), (cheap, 10)] {
            receive(
                &mut requester,
                sender,
                MessagePayload::OfferDetails { anticipated },
            );
        }
        fx.tick = 7;
        process_inbox(&mut requester, &mut fx.ctx()).unwrap();

        assert_eq!(payloads_to(&fx, cheap), vec![MessagePayload::DemandTask]);
        assert_eq!(
            payloads_to(&fx, dear),
            vec![MessagePayload::ReleaseReservation]
        );
        assert_eq!(requester.awaiting_reply_since(), Some(7));
    }

    #[test]
    fn offers_at_max_criticality_are_all_released() {
        let mut fx = Fixture::new();
        let mut requester = coop(&fx, Position::new(5, 5));
        let informer = AgentId::new();
        receive(
            &mut requester,
            informer,
            MessagePayload::OfferDetails { anticipated: 300 },
        );
        process_inbox(&mut requester, &mut fx.ctx()).unwrap();
        assert_eq!(
            payloads_to(&fx, informer),
            vec![MessagePayload::ReleaseReservation]
        );
    }

    #[test]
    fn demand_transfers_task_and_finalize_adopts_it() {
        let mut fx = Fixture::new();
        let mut holder = coop(&fx, Position::new(5, 5));
        let mut requester = coop(&fx, Position::new(9, 9));
        let given = fx.board.spawn_task(Color::Red, Position::new(5, 5));
        fx.board.claim(given, holder.id()).unwrap();
        fx.board.pick_up(holder.id(), Position::new(5, 5)).unwrap();
        let previous = fx.board.spawn_task(Color::Blue, Position::new(12, 12));
        fx.board.claim(previous, requester.id()).unwrap();
        holder.set_box_reserved(true);

        receive(&mut holder, requester.id(), MessagePayload::DemandTask);
        process_inbox(&mut holder, &mut fx.ctx()).unwrap();

        assert_eq!(fx.board.held_by(holder.id()), None);
        assert_eq!(fx.board.targeted_by(requester.id()), Some(given));
        assert_eq!(fx.board.owner(previous), None);
        assert!(!holder.box_reserved());
        assert_eq!(
            payloads_to(&fx, requester.id()),
            vec![MessagePayload::Handover { task: given }]
        );

        requester.set_awaiting_reply_since(Some(0));
        receive(
            &mut requester,
            holder.id(),
            MessagePayload::Handover { task: given },
        );
        process_inbox(&mut requester, &mut fx.ctx()).unwrap();
        assert_eq!(fx.board.targeted_by(requester.id()), Some(given));
        assert_eq!(requester.awaiting_reply_since(), None);
        assert!(fx.board.reservations().is_consistent());
    }

    #[test]
    fn demand_without_task_is_declined() {
        let mut fx = Fixture::new();
        let mut holder = coop(&fx, Position::new(5, 5));
        let requester = AgentId::new();
        holder.set_box_reserved(true);
        receive(&mut holder, requester, MessagePayload::DemandTask);
        process_inbox(&mut holder, &mut fx.ctx()).unwrap();
        assert_eq!(payloads_to(&fx, requester), vec![MessagePayload::Decline]);
        assert!(!holder.box_reserved());
    }

    #[test]
    fn release_clears_promise_and_decline_clears_wait() {
        let mut fx = Fixture::new();
        let mut robot = coop(&fx, Position::new(5, 5));
        robot.set_box_reserved(true);
        robot.set_awaiting_reply_since(Some(0));
        let other = AgentId::new();
        receive(&mut robot, other, MessagePayload::ReleaseReservation);
        receive(&mut robot, other, MessagePayload::Decline);
        process_inbox(&mut robot, &mut fx.ctx()).unwrap();
        assert!(!robot.box_reserved());
        assert_eq!(robot.awaiting_reply_since(), None);
    }

    #[test]
    fn silent_round_expires() {
        let mut fx = Fixture::new();
        let mut robot = coop(&fx, Position::new(5, 5));
        robot.set_awaiting_reply_since(Some(3));

        fx.tick = 4;
        process_inbox(&mut robot, &mut fx.ctx()).unwrap();
        assert_eq!(robot.awaiting_reply_since(), Some(3));

        fx.tick = 5;
        process_inbox(&mut robot, &mut fx.ctx()).unwrap();
        assert_eq!(robot.awaiting_reply_since(), None);
    }

    #[test]
    fn mismatched_message_is_a_protocol_violation() {
        let mut fx = Fixture::new();
        let mut robot = coop(&fx, Position::new(5, 5));
        let bogus = Message {
            sender: AgentId::new(),
            recipient: robot.id(),
            performative: Performative::Inform,
            payload: MessagePayload::DemandTask,
        };
        robot.mailbox_mut().deliver(bogus);
        let result = process_inbox(&mut robot, &mut fx.ctx());
        assert_eq!(
            result,
            Err(AgentError::ProtocolViolation {
                sender: bogus.sender,
                performative: Performative::Inform,
                payload: MessagePayload::DemandTask,
            })
        );
    }
}

//! In-process message bus with one-tick latency.
//!
//! Robots [`send`] during their step; the driver calls [`flush`] at the
//! start of the next tick to move every pending message into its
//! recipient's [`Mailbox`](crate::mailbox::Mailbox). Messages addressed to
//! unknown or dead robots are dropped with a warning and counted.
//!
//! [`send`]: MessageBus::send
//! [`flush`]: MessageBus::flush

use std::collections::BTreeMap;

use cocaro_types::{AgentId, Message};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::robot::Robot;

/// Outcome of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Messages placed in a live robot's mailbox.
    pub delivered: u32,
    /// Messages dropped because the recipient is gone or dead.
    pub dropped: u32,
}

/// Messages sent this tick, awaiting delivery.
#[derive(Debug, Clone, Default)]
pub struct MessageBus {
    /// Pending messages in send order.
    pending: Vec<Message>,
    /// Lifetime delivered count.
    delivered_total: u64,
    /// Lifetime dropped count.
    dropped_total: u64,
}

impl MessageBus {
    /// Create an empty bus.
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            delivered_total: 0,
            dropped_total: 0,
        }
    }

    /// Queue a message for delivery at the next flush.
    pub fn send(&mut self, message: Message) {
        debug!(
            sender = %message.sender,
            recipient = %message.recipient,
            performative = %message.performative,
            payload = ?message.payload,
            "Message sent"
        );
        self.pending.push(message);
    }

    /// Messages waiting for the next flush.
    pub fn pending(&self) -> &[Message] {
        &self.pending
    }

    /// Deliver every pending message to its recipient's mailbox.
    pub fn flush(&mut self, robots: &mut BTreeMap<AgentId, Robot>) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for message in self.pending.drain(..) {
            match robots.get_mut(&message.recipient) {
                Some(robot) if robot.is_active() => {
                    robot.mailbox_mut().deliver(message);
                    report.delivered = report.delivered.saturating_add(1);
                }
                Some(_) => {
                    warn!(
                        sender = %message.sender,
                        recipient = %message.recipient,
                        performative = %message.performative,
                        "Dropping message to dead robot"
                    );
                    report.dropped = report.dropped.saturating_add(1);
                }
                None => {
                    warn!(
                        sender = %message.sender,
                        recipient = %message.recipient,
                        performative = %message.performative,
                        "Dropping message to unknown robot"
                    );
                    report.dropped = report.dropped.saturating_add(1);
                }
            }
        }
        self.delivered_total = self.delivered_total.saturating_add(u64::from(report.delivered));
        self.dropped_total = self.dropped_total.saturating_add(u64::from(report.dropped));
        report
    }

    /// Messages delivered since the bus was created.
    pub const fn delivered_total(&self) -> u64 {
        self.delivered_total
    }

    /// Messages dropped since the bus was created.
    pub const fn dropped_total(&self) -> u64 {
        self.dropped_total
    }
}

#[cfg(test)]
mod tests {
    use cocaro_types::{Color, EngineKind, MessagePayload, Performative, Position};

    use super::*;
    use crate::config::RobotConfig;

    fn robot() -> Robot {
        Robot::new(
            Color::Red,
            EngineKind::Cooperative,
            Position::new(0, 0),
            &RobotConfig::default(),
        )
    }

    #[test]
    fn flush_delivers_to_live_robots() {
        let (a, b) = (robot(), robot());
        let (a_id, b_id) = (a.id(), b.id());
        let mut robots: BTreeMap<AgentId, Robot> = [(a_id, a), (b_id, b)].into_iter().collect();

        let mut bus = MessageBus::new();
        bus.send(Message::new(a_id, b_id, MessagePayload::DemandTask));
        assert!(robots.get(&b_id).is_some_and(|r| r.mailbox().is_empty()));

        let report = bus.flush(&mut robots);
        assert_eq!(report, DeliveryReport { delivered: 1, dropped: 0 });
        assert!(bus.pending().is_empty());
        assert_eq!(
            robots
                .get(&b_id)
                .map(|r| r.mailbox().inbox(Performative::Request).len()),
            Some(1)
        );
    }

    #[test]
    fn flush_drops_unknown_and_dead_recipients() {
        let (a, mut b) = (robot(), robot());
        b.die();
        let (a_id, b_id) = (a.id(), b.id());
        let mut robots: BTreeMap<AgentId, Robot> = [(a_id, a), (b_id, b)].into_iter().collect();

        let mut bus = MessageBus::new();
        bus.send(Message::new(a_id, b_id, MessagePayload::Decline));
        bus.send(Message::new(a_id, AgentId::new(), MessagePayload::Decline));

        let report = bus.flush(&mut robots);
        assert_eq!(report, DeliveryReport { delivered: 0, dropped: 2 });
        assert_eq!(bus.dropped_total(), 2);
        assert!(robots.get(&b_id).is_some_and(|r| r.mailbox().is_empty()));
    }
}

//! Per-robot inboxes, one per performative.

use cocaro_types::{Message, Performative};
use serde::{Deserialize, Serialize};

/// Four inboxes, drained in [`Performative::PROCESSING_ORDER`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    /// Challenges and demands.
    requests: Vec<Message>,
    /// Offers and handovers.
    agrees: Vec<Message>,
    /// Declines and released reservations.
    refuses: Vec<Message>,
    /// Offer details.
    informs: Vec<Message>,
}

impl Mailbox {
    /// Create an empty mailbox.
    pub const fn new() -> Self {
        Self {
            requests: Vec::new(),
            agrees: Vec::new(),
            refuses: Vec::new(),
            informs: Vec::new(),
        }
    }

    /// File a message into the inbox its performative selects.
    pub fn deliver(&mut self, message: Message) {
        self.inbox_mut(message.performative).push(message);
    }

    /// Empty one inbox and return its messages in arrival order.
    pub fn take(&mut self, performative: Performative) -> Vec<Message> {
        std::mem::take(self.inbox_mut(performative))
    }

    /// Messages waiting in one inbox.
    pub fn inbox(&self, performative: Performative) -> &[Message] {
        match performative {
            Performative::Request => &self.requests,
            Performative::Agree => &self.agrees,
            Performative::Refuse => &self.refuses,
            Performative::Inform => &self.informs,
        }
    }

    /// Total messages waiting.
    pub fn len(&self) -> usize {
        Performative::PROCESSING_ORDER
            .iter()
            .map(|p| self.inbox(*p).len())
            .sum()
    }

    /// Whether every inbox is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard everything.
    pub fn clear(&mut self) {
        self.requests.clear();
        self.agrees.clear();
        self.refuses.clear();
        self.informs.clear();
    }

    const fn inbox_mut(&mut self, performative: Performative) -> &mut Vec<Message> {
        match performative {
            Performative::Request => &mut self.requests,
            Performative::Agree => &mut self.agrees,
            Performative::Refuse => &mut self.refuses,
            Performative::Inform => &mut self.informs,
        }
    }
}

#[cfg(test)]
mod tests {
    use cocaro_types::{AgentId, MessagePayload};

    use super::*;

    #[test]
    fn deliver_dispatches_by_performative() {
        let (a, b) = (AgentId::new(), AgentId::new());
        let mut mailbox = Mailbox::new();
        mailbox.deliver(Message::new(a, b, MessagePayload::Offer));
        mailbox.deliver(Message::new(a, b, MessagePayload::OfferDetails { anticipated: 3 }));
        mailbox.deliver(Message::new(a, b, MessagePayload::Decline));

        assert_eq!(mailbox.inbox(Performative::Agree).len(), 1);
        assert_eq!(mailbox.inbox(Performative::Inform).len(), 1);
        assert_eq!(mailbox.inbox(Performative::Refuse).len(), 1);
        assert!(mailbox.inbox(Performative::Request).is_empty());
        assert_eq!(mailbox.len(), 3);
    }

    #[test]
    fn take_drains_one_inbox() {
        let (a, b) = (AgentId::new(), AgentId::new());
        let mut mailbox = Mailbox::new();
        mailbox.deliver(Message::new(a, b, MessagePayload::DemandTask));
        mailbox.deliver(Message::new(a, b, MessagePayload::Offer));

        let requests = mailbox.take(Performative::Request);
        assert_eq!(requests.len(), 1);
        assert!(mailbox.inbox(Performative::Request).is_empty());
        assert_eq!(mailbox.len(), 1);
    }
}

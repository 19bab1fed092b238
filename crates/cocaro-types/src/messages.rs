//! Negotiation messages exchanged between cooperative robots.
//!
//! A [`Message`] pairs a [`Performative`] with a tagged [`MessagePayload`].
//! Each payload variant belongs to exactly one performative; a message
//! whose pairing does not match is a protocol violation that the receiver
//! reports instead of ignoring.
//!
//! | payload                | performative |
//! |------------------------|--------------|
//! | `Criticality`          | request      |
//! | `DemandTask`           | request      |
//! | `Offer`                | agree        |
//! | `Handover`             | agree        |
//! | `Decline`              | refuse       |
//! | `ReleaseReservation`   | refuse       |
//! | `OfferDetails`         | inform       |

use serde::{Deserialize, Serialize};

use crate::enums::Performative;
use crate::ids::{AgentId, TaskId};

/// The content of a negotiation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessagePayload {
    /// Challenge for a box the recipient holds.
    Criticality {
        /// The sender's anticipated criticality if it took the box.
        anticipated: u32,
        /// The sender's current criticality.
        current: u32,
    },
    /// The sender picked the recipient as the giver and wants its box now.
    DemandTask,
    /// The recipient's challenge was accepted; details follow as an inform.
    Offer,
    /// The sender relinquished `task` to the recipient.
    Handover {
        /// The box whose reservation was handed over.
        task: TaskId,
    },
    /// The request was refused.
    Decline,
    /// The requester picked another giver; the recipient's promise is void.
    ReleaseReservation,
    /// The offering robot's own anticipated criticality for its box.
    OfferDetails {
        /// Anticipated criticality of the box for the offering robot.
        anticipated: u32,
    },
}

impl MessagePayload {
    /// The only performative this payload may travel under.
    pub const fn performative(&self) -> Performative {
        match self {
            Self::Criticality { .. } | Self::DemandTask => Performative::Request,
            Self::Offer | Self::Handover { .. } => Performative::Agree,
            Self::Decline | Self::ReleaseReservation => Performative::Refuse,
            Self::OfferDetails { .. } => Performative::Inform,
        }
    }
}

/// A message from one robot to another.
///
/// Messages are plain `Copy` values: the bus and mailboxes hold their own
/// copies, so nothing a sender keeps can change what was delivered. The
/// fields stay public so a decoded message with a mismatched pairing can
/// still be represented and rejected; [`Message::new`] always builds a
/// well-formed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The robot that sent the message.
    pub sender: AgentId,
    /// The robot whose inbox receives the message.
    pub recipient: AgentId,
    /// Speech-act kind; selects the recipient's inbox.
    pub performative: Performative,
    /// Message content.
    pub payload: MessagePayload,
}

impl Message {
    /// Build a message whose performative is derived from the payload.
    pub const fn new(sender: AgentId, recipient: AgentId, payload: MessagePayload) -> Self {
        Self {
            sender,
            recipient,
            performative: payload.performative(),
            payload,
        }
    }

    /// Whether the performative matches the payload.
    pub const fn is_well_formed(&self) -> bool {
        matches!(
            (self.performative, self.payload.performative()),
            (Performative::Request, Performative::Request)
                | (Performative::Agree, Performative::Agree)
                | (Performative::Refuse, Performative::Refuse)
                | (Performative::Inform, Performative::Inform)
        )
    }
}

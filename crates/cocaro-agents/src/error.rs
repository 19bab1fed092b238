//! Error types for the cocaro-agents crate.
//!
//! Runtime conditions that the simulation recovers from on its own
//! (energy clamping, messages to dead robots, released reservations) are
//! not errors. What remains here indicates a configuration problem or a
//! bug in the negotiation protocol.

use cocaro_types::{AgentId, Color, MessagePayload, Performative};
use cocaro_world::WorldError;

/// Errors that can occur while stepping a robot.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AgentError {
    /// No nest accepts boxes of this color, so a delivery trip cannot be
    /// evaluated.
    #[error("no nest accepts {0} boxes")]
    MissingNest(Color),

    /// A message arrived whose performative does not match its payload.
    #[error("protocol violation: {performative} from {sender} carried {payload:?}")]
    ProtocolViolation {
        /// The robot that sent the message.
        sender: AgentId,
        /// The performative the message travelled under.
        performative: Performative,
        /// The offending payload.
        payload: MessagePayload,
    },

    /// A board operation failed.
    #[error("world error: {0}")]
    World(#[from] WorldError),
}

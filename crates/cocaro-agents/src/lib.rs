//! Robot state, urgency model, allocation engines, and negotiation for the
//! CoCaRo simulation.
//!
//! This crate contains the per-robot decision engine. It sits between
//! `cocaro-world` (boxes, nests, reservations, grid) and `cocaro-core`
//! (tick cycle and orchestration), and performs no I/O.
//!
//! # Modules
//!
//! - [`bus`] -- In-process message bus with one-tick latency ([`MessageBus`])
//! - [`config`] -- Robot parameters ([`RobotConfig`])
//! - [`context`] -- Shared world access for one robot step ([`TickContext`])
//! - [`energy`] -- Clamped battery and criticality ([`Energy`])
//! - [`engine`] -- Random, greedy, and cooperative allocation engines
//! - [`error`] -- Error types for robot operations ([`AgentError`])
//! - [`lifecycle`] -- Per-tick robot step, pickup, delivery, and death
//! - [`mailbox`] -- Per-performative inboxes ([`Mailbox`])
//! - [`negotiation`] -- Challenge arbitration and task handover
//! - [`robot`] -- Robot state and read-only accessors ([`Robot`])
//! - [`urgency`] -- Anticipated criticality of a delivery trip

pub mod bus;
pub mod config;
pub mod context;
pub mod energy;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod mailbox;
pub mod negotiation;
pub mod robot;
pub mod urgency;

#[cfg(test)]
mod test_support;

// Re-export primary types at crate root for convenience.
pub use bus::{DeliveryReport, MessageBus};
pub use config::RobotConfig;
pub use context::TickContext;
pub use energy::Energy;
pub use error::AgentError;
pub use lifecycle::{DeathReport, Delivery, RobotTickResult, refresh_visibility, step_robot};
pub use mailbox::Mailbox;
pub use negotiation::{Bid, REPLY_WINDOW_TICKS, Verdict, arbitrate};
pub use robot::Robot;
pub use urgency::anticipated_criticality;

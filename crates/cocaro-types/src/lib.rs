//! Shared type definitions for the CoCaRo collector-robot simulation.
//!
//! This crate is the single source of truth for the plain data shared by
//! the world, agent, and core crates. It holds no behavior beyond small
//! pure helpers.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for robots, boxes and nests
//! - [`enums`] -- Colors, performatives, engine kinds, lifecycle states
//! - [`structs`] -- Grid positions, boxes and nests
//! - [`messages`] -- Negotiation messages and their tagged payloads

pub mod enums;
pub mod ids;
pub mod messages;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Color, EngineKind, HoldStage, Performative, RobotStatus};
pub use ids::{AgentId, NestId, TaskId};
pub use messages::{Message, MessagePayload};
pub use structs::{Nest, Position, Task};

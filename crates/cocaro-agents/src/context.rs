//! Shared world access for one robot step.

use cocaro_world::{Spatial, TaskBoard};
use rand::RngCore;

use crate::bus::MessageBus;
use crate::config::RobotConfig;

/// Everything outside the robot that a step may read or change.
///
/// The driver builds one per robot per tick from disjoint borrows of the
/// simulation state.
pub struct TickContext<'a> {
    /// Current tick number.
    pub tick: u64,
    /// Boxes, nests, and reservations.
    pub board: &'a mut TaskBoard,
    /// Spatial substrate for movement.
    pub space: &'a dyn Spatial,
    /// Outgoing negotiation messages.
    pub bus: &'a mut MessageBus,
    /// Robot parameters.
    pub config: &'a RobotConfig,
    /// Seeded randomness for wandering and tie-breaks.
    pub rng: &'a mut dyn RngCore,
}

impl core::fmt::Debug for TickContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TickContext")
            .field("tick", &self.tick)
            .field("tasks", &self.board.task_count())
            .field("pending_messages", &self.bus.pending().len())
            .finish_non_exhaustive()
    }
}

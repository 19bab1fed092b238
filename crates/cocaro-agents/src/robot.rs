//! Robot state.
//!
//! A [`Robot`] owns everything about a collector except which box it
//! holds: that lives in the board's reservation table, so two robots can
//! never report the same box. Use [`TaskBoard::targeted_by`] and
//! [`TaskBoard::carried_by`] to read a robot's hold.
//!
//! [`TaskBoard::targeted_by`]: cocaro_world::TaskBoard::targeted_by
//! [`TaskBoard::carried_by`]: cocaro_world::TaskBoard::carried_by

use cocaro_types::{AgentId, Color, EngineKind, NestId, Position, RobotStatus, Task, TaskId};
use cocaro_world::TaskBoard;
use serde::{Deserialize, Serialize};

use crate::config::RobotConfig;
use crate::energy::Energy;
use crate::error::AgentError;
use crate::mailbox::Mailbox;
use crate::urgency;

/// A collector robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Robot {
    /// Unique identifier.
    id: AgentId,
    /// Color; boxes of this color earn the full reward.
    color: Color,
    /// Allocation engine this robot runs.
    engine: EngineKind,
    /// Current cell.
    position: Position,
    /// Cell occupied before the last move.
    previous_position: Option<Position>,
    /// Battery.
    energy: Energy,
    /// Nest the robot is carrying its box to.
    target_nest: Option<NestId>,
    /// This robot has offered its box to a challenger.
    box_reserved: bool,
    /// Tick at which the robot last sent a challenge or demand and began
    /// waiting for replies.
    awaiting_reply_since: Option<u64>,
    /// Whether the robot changed cell during its last step.
    moved_last_tick: bool,
    /// Lifecycle status.
    status: RobotStatus,
    /// Boxes seen during the current step, in board order.
    visible: Vec<TaskId>,
    /// Boxes delivered so far.
    deliveries: u32,
    /// Negotiation inboxes.
    mailbox: Mailbox,
}

impl Robot {
    /// Create an active robot with a full battery.
    pub fn new(color: Color, engine: EngineKind, position: Position, config: &RobotConfig) -> Self {
        Self {
            id: AgentId::new(),
            color,
            engine,
            position,
            previous_position: None,
            energy: Energy::full(config.max_energy),
            target_nest: None,
            box_reserved: false,
            awaiting_reply_since: None,
            moved_last_tick: false,
            status: RobotStatus::Active,
            visible: Vec::new(),
            deliveries: 0,
            mailbox: Mailbox::new(),
        }
    }

    /// Replace the battery. Used to set up specific energy levels.
    #[must_use]
    pub fn with_energy(mut self, value: u32) -> Self {
        self.energy = Energy::with_value(value, self.energy.max());
        self
    }

    // -------------------------------------------------------------------
    // Read-only accessors
    // -------------------------------------------------------------------

    /// Unique identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Robot color.
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Allocation engine.
    pub const fn engine(&self) -> EngineKind {
        self.engine
    }

    /// Current cell.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Cell occupied before the last move.
    pub const fn previous_position(&self) -> Option<Position> {
        self.previous_position
    }

    /// Current charge.
    pub const fn energy(&self) -> u32 {
        self.energy.value()
    }

    /// Battery capacity.
    pub const fn max_energy(&self) -> u32 {
        self.energy.max()
    }

    /// `max_energy - energy`.
    pub const fn criticality(&self) -> u32 {
        self.energy.criticality()
    }

    /// Nest the robot is heading to with its box.
    pub const fn target_nest(&self) -> Option<NestId> {
        self.target_nest
    }

    /// Whether this robot has promised its box to a challenger.
    pub const fn box_reserved(&self) -> bool {
        self.box_reserved
    }

    /// Tick at which the robot began waiting for negotiation replies.
    pub const fn awaiting_reply_since(&self) -> Option<u64> {
        self.awaiting_reply_since
    }

    /// Whether the robot changed cell during its last step.
    pub const fn moved_last_tick(&self) -> bool {
        self.moved_last_tick
    }

    /// Lifecycle status.
    pub const fn status(&self) -> RobotStatus {
        self.status
    }

    /// Whether the robot still acts.
    pub const fn is_active(&self) -> bool {
        matches!(self.status, RobotStatus::Active)
    }

    /// Boxes seen during the last step.
    pub fn visible_tasks(&self) -> &[TaskId] {
        &self.visible
    }

    /// Boxes delivered so far.
    pub const fn deliveries(&self) -> u32 {
        self.deliveries
    }

    /// Negotiation inboxes.
    pub const fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Anticipated criticality of taking `task` from the current cell.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::MissingNest`] if no nest accepts the box.
    pub fn anticipate(
        &self,
        task: &Task,
        board: &TaskBoard,
        config: &RobotConfig,
    ) -> Result<u32, AgentError> {
        let travel = urgency::trip_length(board, self.position, task)?;
        Ok(urgency::anticipated_criticality(
            self.energy,
            travel,
            config.energy_cost_per_step,
            config.reward_for(self.color, task.color),
        ))
    }

    // -------------------------------------------------------------------
    // Crate-internal mutation
    // -------------------------------------------------------------------

    pub(crate) const fn mailbox_mut(&mut self) -> &mut Mailbox {
        &mut self.mailbox
    }

    pub(crate) const fn spend(&mut self, amount: u32) {
        self.energy.spend(amount);
    }

    pub(crate) const fn credit(&mut self, amount: u32) {
        self.energy.credit(amount);
    }

    pub(crate) const fn is_depleted(&self) -> bool {
        self.energy.is_depleted()
    }

    pub(crate) fn set_visible(&mut self, visible: Vec<TaskId>) {
        self.visible = visible;
    }

    pub(crate) const fn set_target_nest(&mut self, nest: Option<NestId>) {
        self.target_nest = nest;
    }

    pub(crate) const fn set_box_reserved(&mut self, reserved: bool) {
        self.box_reserved = reserved;
    }

    pub(crate) const fn set_awaiting_reply_since(&mut self, tick: Option<u64>) {
        self.awaiting_reply_since = tick;
    }

    pub(crate) const fn move_to(&mut self, next: Position) {
        let moved = next.x != self.position.x || next.y != self.position.y;
        if moved {
            self.previous_position = Some(self.position);
            self.position = next;
        }
        self.moved_last_tick = moved;
    }

    pub(crate) const fn record_delivery(&mut self) {
        self.deliveries = self.deliveries.saturating_add(1);
    }

    pub(crate) fn die(&mut self) {
        self.status = RobotStatus::Dead;
        self.box_reserved = false;
        self.awaiting_reply_since = None;
        self.target_nest = None;
        self.moved_last_tick = false;
        self.visible.clear();
        self.mailbox.clear();
    }
}

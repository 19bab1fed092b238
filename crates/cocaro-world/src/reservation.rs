//! Exclusive box reservations.
//!
//! The [`ReservationTable`] is the only place where box ownership is
//! recorded. It keeps two mirrored indexes (box to holder, holder to box)
//! and every mutation goes through [`claim`], [`release_holder`],
//! [`release_task`], [`mark_carried`], or [`transfer`]. Together these
//! enforce:
//!
//! - at most one holder per box,
//! - at most one box per holder,
//! - a robot never targets and carries the same box.
//!
//! [`claim`]: ReservationTable::claim
//! [`release_holder`]: ReservationTable::release_holder
//! [`release_task`]: ReservationTable::release_task
//! [`mark_carried`]: ReservationTable::mark_carried
//! [`transfer`]: ReservationTable::transfer

use std::collections::BTreeMap;

use cocaro_types::{AgentId, HoldStage, TaskId};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// A robot's reservation on a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    /// The reserving robot.
    pub holder: AgentId,
    /// Whether the robot has reached the box yet.
    pub stage: HoldStage,
}

/// Bidirectional box/holder index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationTable {
    /// Box -> hold.
    by_task: BTreeMap<TaskId, Hold>,
    /// Holder -> box.
    by_holder: BTreeMap<AgentId, TaskId>,
}

impl ReservationTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            by_task: BTreeMap::new(),
            by_holder: BTreeMap::new(),
        }
    }

    /// The hold on a box, if any.
    pub fn hold(&self, task: TaskId) -> Option<Hold> {
        self.by_task.get(&task).copied()
    }

    /// The robot holding a box, if any.
    pub fn holder_of(&self, task: TaskId) -> Option<AgentId> {
        self.by_task.get(&task).map(|h| h.holder)
    }

    /// The box a robot holds and at which stage.
    pub fn held_by(&self, agent: AgentId) -> Option<(TaskId, HoldStage)> {
        let task = *self.by_holder.get(&agent)?;
        let hold = self.by_task.get(&task)?;
        Some((task, hold.stage))
    }

    /// Reserve `task` for `agent` as a target.
    ///
    /// Any box the agent previously held is released first and returned.
    /// Claiming a box the agent already holds is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AlreadyReserved`] if another robot holds the box.
    pub fn claim(&mut self, task: TaskId, agent: AgentId) -> Result<Option<TaskId>, WorldError> {
        match self.holder_of(task) {
            Some(holder) if holder == agent => return Ok(None),
            Some(holder) => return Err(WorldError::AlreadyReserved { task, holder }),
            None => {}
        }
        let released = self.release_holder(agent);
        self.insert(task, agent, HoldStage::Targeted);
        Ok(released)
    }

    /// Drop whatever the robot holds. Returns the released box.
    pub fn release_holder(&mut self, agent: AgentId) -> Option<TaskId> {
        let task = self.by_holder.remove(&agent)?;
        self.by_task.remove(&task);
        Some(task)
    }

    /// Drop the reservation on a box. Returns the robot that held it.
    pub fn release_task(&mut self, task: TaskId) -> Option<AgentId> {
        let hold = self.by_task.remove(&task)?;
        self.by_holder.remove(&hold.holder);
        Some(hold.holder)
    }

    /// Promote the robot's targeted box to carried.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotHolder`] if the robot does not hold `task`.
    pub fn mark_carried(&mut self, task: TaskId, agent: AgentId) -> Result<(), WorldError> {
        match self.by_task.get_mut(&task) {
            Some(hold) if hold.holder == agent => {
                hold.stage = HoldStage::Carried;
                Ok(())
            }
            _ => Err(WorldError::NotHolder { task, agent }),
        }
    }

    /// Move the reservation on `task` from `from` to `to`.
    ///
    /// The receiving robot's previous box, if any, is released first and
    /// returned. The box arrives as a target: the receiver still has to
    /// walk to it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotHolder`] if `from` does not hold `task`.
    pub fn transfer(
        &mut self,
        task: TaskId,
        from: AgentId,
        to: AgentId,
    ) -> Result<Option<TaskId>, WorldError> {
        if self.holder_of(task) != Some(from) {
            return Err(WorldError::NotHolder { task, agent: from });
        }
        if from == to {
            return Ok(None);
        }
        self.release_holder(from);
        let released = self.release_holder(to);
        self.insert(task, to, HoldStage::Targeted);
        Ok(released)
    }

    /// Number of active reservations.
    pub fn len(&self) -> usize {
        self.by_task.len()
    }

    /// Whether there are no reservations.
    pub fn is_empty(&self) -> bool {
        self.by_task.is_empty()
    }

    /// Iterate over `(box, hold)` pairs in box order.
    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, &Hold)> {
        self.by_task.iter()
    }

    /// Whether the two indexes mirror each other exactly.
    pub fn is_consistent(&self) -> bool {
        self.by_task.len() == self.by_holder.len()
            && self
                .by_holder
                .iter()
                .all(|(agent, task)| self.by_task.get(task).is_some_and(|h| h.holder == *agent))
    }

    fn insert(&mut self, task: TaskId, agent: AgentId, stage: HoldStage) {
        self.by_task.insert(task, Hold { holder: agent, stage });
        self.by_holder.insert(agent, task);
    }
}

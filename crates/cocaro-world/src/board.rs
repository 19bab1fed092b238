//! The task board: every box, every nest, and who holds what.
//!
//! [`TaskBoard`] owns the box and nest records together with the
//! [`ReservationTable`], so that box lifecycle and box ownership change in
//! one place. In particular, [`remove_task`] drops the box and its
//! reservation in the same call and reports which robot was holding it,
//! which is how delivery notifies stale holders.
//!
//! [`remove_task`]: TaskBoard::remove_task

use std::collections::BTreeMap;

use cocaro_types::{AgentId, Color, HoldStage, Nest, NestId, Position, Task, TaskId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;
use crate::reservation::{Hold, ReservationTable};

/// A box that was removed from the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedTask {
    /// The removed box.
    pub task: Task,
    /// The robot whose reservation was dropped along with the box.
    pub released_holder: Option<AgentId>,
}

/// All boxes, nests, and reservations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskBoard {
    /// Live boxes by id.
    tasks: BTreeMap<TaskId, Task>,
    /// Nests by id.
    nests: BTreeMap<NestId, Nest>,
    /// Box ownership.
    reservations: ReservationTable,
}

impl TaskBoard {
    /// Create an empty board.
    pub const fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            nests: BTreeMap::new(),
            reservations: ReservationTable::new(),
        }
    }

    // -------------------------------------------------------------------
    // Nests
    // -------------------------------------------------------------------

    /// Place a nest.
    pub fn add_nest(&mut self, color: Color, position: Position) -> NestId {
        let id = NestId::new();
        self.nests.insert(id, Nest { id, color, position });
        id
    }

    /// Look up a nest.
    pub fn nest(&self, id: NestId) -> Option<&Nest> {
        self.nests.get(&id)
    }

    /// Iterate over nests in id order.
    pub fn nests(&self) -> impl Iterator<Item = &Nest> {
        self.nests.values()
    }

    /// The nest of `color` closest to `from`. Ties go to the first nest found.
    pub fn nearest_nest(&self, color: Color, from: Position) -> Option<&Nest> {
        self.nests
            .values()
            .filter(|n| n.color == color)
            .fold(None, |best: Option<&Nest>, nest| match best {
                Some(b) if b.position.manhattan(from) <= nest.position.manhattan(from) => Some(b),
                _ => Some(nest),
            })
    }

    /// Ensure every color in `colors` has at least one nest.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MissingNest`] for the first color without one.
    pub fn ensure_nests_for(&self, colors: &[Color]) -> Result<(), WorldError> {
        for &color in colors {
            if !self.nests.values().any(|n| n.color == color) {
                return Err(WorldError::MissingNest(color));
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Boxes
    // -------------------------------------------------------------------

    /// Place a new, unreserved box.
    pub fn spawn_task(&mut self, color: Color, position: Position) -> TaskId {
        let id = TaskId::new();
        self.tasks.insert(id, Task { id, color, position });
        id
    }

    /// Look up a box.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Iterate over boxes in id order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Number of boxes on the board.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Boxes within Manhattan `radius` of `center`, excluding `center` itself.
    ///
    /// Results are in id order, which is the fixed scan order the
    /// allocation engines rely on.
    pub fn tasks_within(&self, center: Position, radius: u32) -> Vec<&Task> {
        self.tasks
            .values()
            .filter(|t| {
                let d = t.position.manhattan(center);
                d > 0 && d <= radius
            })
            .collect()
    }

    /// Whether a box or nest sits on `position`.
    pub fn is_occupied(&self, position: Position) -> bool {
        self.tasks.values().any(|t| t.position == position)
            || self.nests.values().any(|n| n.position == position)
    }

    /// Move a box (used to make carried boxes follow their carrier).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TaskNotFound`] if the box does not exist.
    pub fn move_task(&mut self, id: TaskId, position: Position) -> Result<(), WorldError> {
        let task = self.tasks.get_mut(&id).ok_or(WorldError::TaskNotFound(id))?;
        task.position = position;
        Ok(())
    }

    /// Destroy a box, dropping its reservation in the same step.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TaskNotFound`] if the box does not exist.
    pub fn remove_task(&mut self, id: TaskId) -> Result<RemovedTask, WorldError> {
        let task = self.tasks.remove(&id).ok_or(WorldError::TaskNotFound(id))?;
        let released_holder = self.reservations.release_task(id);
        if let Some(holder) = released_holder {
            debug!(task = %id, %holder, "Reservation dropped with removed task");
        }
        Ok(RemovedTask {
            task,
            released_holder,
        })
    }

    // -------------------------------------------------------------------
    // Reservations
    // -------------------------------------------------------------------

    /// The robot holding a box, if any.
    pub fn owner(&self, task: TaskId) -> Option<AgentId> {
        self.reservations.holder_of(task)
    }

    /// The hold on a box, if any.
    pub fn hold(&self, task: TaskId) -> Option<Hold> {
        self.reservations.hold(task)
    }

    /// The box a robot holds and at which stage.
    pub fn held_by(&self, agent: AgentId) -> Option<(TaskId, HoldStage)> {
        self.reservations.held_by(agent)
    }

    /// The box a robot is heading for but has not reached yet.
    pub fn targeted_by(&self, agent: AgentId) -> Option<TaskId> {
        match self.held_by(agent)? {
            (task, HoldStage::Targeted) => Some(task),
            (_, HoldStage::Carried) => None,
        }
    }

    /// The box a robot is carrying.
    pub fn carried_by(&self, agent: AgentId) -> Option<TaskId> {
        match self.held_by(agent)? {
            (task, HoldStage::Carried) => Some(task),
            (_, HoldStage::Targeted) => None,
        }
    }

    /// Reserve a box for a robot, releasing the robot's previous box.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TaskNotFound`] if the box does not exist, or
    /// [`WorldError::AlreadyReserved`] if another robot holds it.
    pub fn claim(&mut self, task: TaskId, agent: AgentId) -> Result<Option<TaskId>, WorldError> {
        if !self.tasks.contains_key(&task) {
            return Err(WorldError::TaskNotFound(task));
        }
        let released = self.reservations.claim(task, agent)?;
        debug!(%task, %agent, ?released, "Task claimed");
        Ok(released)
    }

    /// Release whatever the robot holds. The box stays where it is.
    pub fn release(&mut self, agent: AgentId) -> Option<TaskId> {
        let released = self.reservations.release_holder(agent);
        if let Some(task) = released {
            debug!(%task, %agent, "Task released");
        }
        released
    }

    /// Pick up the robot's targeted box if it lies on `at`.
    ///
    /// Returns the box that was picked up, if any.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotHolder`] if the reservation table is out of
    /// sync with the robot's target (never expected).
    pub fn pick_up(&mut self, agent: AgentId, at: Position) -> Result<Option<TaskId>, WorldError> {
        let Some(task) = self.targeted_by(agent) else {
            return Ok(None);
        };
        if self.tasks.get(&task).is_none_or(|t| t.position != at) {
            return Ok(None);
        }
        self.reservations.mark_carried(task, agent)?;
        debug!(%task, %agent, position = %at, "Task picked up");
        Ok(Some(task))
    }

    /// Hand the reservation on `task` from one robot to another.
    ///
    /// Returns the receiver's previously held box, which is released.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TaskNotFound`] if the box does not exist, or
    /// [`WorldError::NotHolder`] if `from` does not hold it.
    pub fn transfer(
        &mut self,
        task: TaskId,
        from: AgentId,
        to: AgentId,
    ) -> Result<Option<TaskId>, WorldError> {
        if !self.tasks.contains_key(&task) {
            return Err(WorldError::TaskNotFound(task));
        }
        let released = self.reservations.transfer(task, from, to)?;
        debug!(%task, %from, %to, ?released, "Task transferred");
        Ok(released)
    }

    /// Read-only view of the reservation table.
    pub const fn reservations(&self) -> &ReservationTable {
        &self.reservations
    }
}

//! Tick cycle: the engine loop body that drives the CoCaRo simulation.
//!
//! Each tick runs through these phases:
//!
//! 1. **Wake** -- advance the clock and deliver the messages sent during
//!    the previous tick.
//! 2. **Spawn** -- add new boxes if the spawn schedule is due.
//! 3. **Act** -- step every robot once, in a fresh seeded-random order.
//! 4. **Sweep** -- release any reservation still held by a dead robot.
//!
//! The tick cycle is deterministic given the same initial state and seed.

use std::collections::BTreeMap;

use cocaro_agents::{
    AgentError, DeathReport, Delivery, MessageBus, Robot, RobotConfig, TickContext, step_robot,
};
use cocaro_types::{AgentId, Color, TaskId};
use cocaro_world::{Grid, Spatial, TaskBoard, WorldError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::{debug, info};

use crate::clock::WorldClock;

/// Cells tried before a spawned box settles for an occupied one.
const SPAWN_PLACEMENT_ATTEMPTS: u32 = 16;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: crate::clock::ClockError,
    },

    /// A robot step failed.
    #[error("agent error for {agent_id}: {source}")]
    Agent {
        /// The robot that caused the error.
        agent_id: AgentId,
        /// The underlying agent error.
        source: AgentError,
    },

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Periodic box spawning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnSchedule {
    /// Ticks between spawns. Zero disables spawning.
    pub interval_ticks: u64,
    /// Boxes added per spawn.
    pub count: u32,
    /// Colors drawn from, uniformly.
    pub colors: Vec<Color>,
}

impl SpawnSchedule {
    /// A schedule that never fires.
    pub const fn disabled() -> Self {
        Self {
            interval_ticks: 0,
            count: 0,
            colors: Vec::new(),
        }
    }
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Robots still active at the end of the tick.
    pub robots_alive: u32,
    /// Boxes on the grid at the end of the tick.
    pub boxes_remaining: u32,
    /// Boxes spawned this tick.
    pub boxes_spawned: u32,
    /// Deliveries completed this tick, by robot.
    pub deliveries: BTreeMap<AgentId, Delivery>,
    /// Robots that died this tick.
    pub deaths: BTreeMap<AgentId, DeathReport>,
    /// Messages handed to mailboxes at the start of the tick.
    pub messages_delivered: u32,
    /// Messages dropped because their recipient was gone.
    pub messages_dropped: u32,
}

/// Complete mutable state of a running simulation.
#[derive(Debug)]
pub struct SimulationState {
    /// Simulation clock.
    pub clock: WorldClock,
    /// Spatial substrate.
    pub grid: Grid,
    /// Boxes, nests, and reservations.
    pub board: TaskBoard,
    /// Every robot ever placed, alive or dead.
    pub robots: BTreeMap<AgentId, Robot>,
    /// Messages in flight.
    pub bus: MessageBus,
    /// Parameters shared by all robots.
    pub robot_config: RobotConfig,
    /// Periodic box spawning.
    pub spawn: SpawnSchedule,
    /// Seeded randomness for ordering, movement, and spawning.
    pub rng: StdRng,
}

impl SimulationState {
    /// An empty world at tick 0 with spawning disabled.
    pub fn new(grid: Grid, board: TaskBoard, robot_config: RobotConfig, seed: u64) -> Self {
        Self {
            clock: WorldClock::new(),
            grid,
            board,
            robots: BTreeMap::new(),
            bus: MessageBus::new(),
            robot_config,
            spawn: SpawnSchedule::disabled(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Add a robot and return its id.
    pub fn insert_robot(&mut self, robot: Robot) -> AgentId {
        let id = robot.id();
        self.robots.insert(id, robot);
        id
    }

    /// Look up a robot.
    pub fn robot(&self, id: AgentId) -> Option<&Robot> {
        self.robots.get(&id)
    }

    /// The box a robot has reserved but not reached.
    pub fn targeted_box(&self, agent: AgentId) -> Option<TaskId> {
        self.board.targeted_by(agent)
    }

    /// The box a robot is carrying.
    pub fn carried_box(&self, agent: AgentId) -> Option<TaskId> {
        self.board.carried_by(agent)
    }

    /// Number of robots still active.
    pub fn robots_alive(&self) -> u32 {
        count(self.robots.values().filter(|r| r.is_active()).count())
    }

    /// Place `n` boxes with uniformly random colors from `colors`.
    ///
    /// Each box goes to a random empty cell if one turns up within a few
    /// draws, otherwise to the last cell drawn.
    pub fn spawn_tasks(&mut self, n: u32, colors: &[Color]) -> Vec<TaskId> {
        let mut spawned = Vec::new();
        for _ in 0..n {
            let Some(&color) = colors.choose(&mut self.rng) else {
                break;
            };
            let mut position = self.grid.random_position(&mut self.rng);
            for _ in 1..SPAWN_PLACEMENT_ATTEMPTS {
                if !self.board.is_occupied(position) {
                    break;
                }
                position = self.grid.random_position(&mut self.rng);
            }
            spawned.push(self.board.spawn_task(color, position));
        }
        spawned
    }
}

/// Execute a single tick of the simulation.
///
/// # Errors
///
/// Returns [`TickError::Clock`] on tick overflow and [`TickError::Agent`]
/// if any robot step fails. The state is left as it was when the failing
/// robot stopped.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    // --- Phase 1: Wake ---
    let tick = state.clock.advance()?;
    info!(
        tick,
        robots_alive = state.robots_alive(),
        boxes = state.board.task_count(),
        "Tick started"
    );
    let report = state.bus.flush(&mut state.robots);

    // --- Phase 2: Spawn ---
    let boxes_spawned = phase_spawn(state);

    // --- Phase 3: Act ---
    let mut deliveries = BTreeMap::new();
    let mut deaths = BTreeMap::new();
    let mut order: Vec<AgentId> = state.robots.keys().copied().collect();
    order.shuffle(&mut state.rng);

    for agent_id in order {
        let Some(robot) = state.robots.get_mut(&agent_id) else {
            continue;
        };
        let mut ctx = TickContext {
            tick,
            board: &mut state.board,
            space: &state.grid,
            bus: &mut state.bus,
            config: &state.robot_config,
            rng: &mut state.rng,
        };
        let result =
            step_robot(robot, &mut ctx).map_err(|source| TickError::Agent { agent_id, source })?;
        if let Some(delivery) = result.delivery {
            deliveries.insert(agent_id, delivery);
        }
        if let Some(death) = result.death {
            deaths.insert(agent_id, death);
        }
    }

    // --- Phase 4: Sweep ---
    phase_sweep(state, tick);

    Ok(TickSummary {
        tick,
        robots_alive: state.robots_alive(),
        boxes_remaining: count(state.board.task_count()),
        boxes_spawned,
        deliveries,
        deaths,
        messages_delivered: report.delivered,
        messages_dropped: report.dropped,
    })
}

fn phase_spawn(state: &mut SimulationState) -> u32 {
    if !state.clock.is_due(state.spawn.interval_ticks) {
        return 0;
    }
    let colors = state.spawn.colors.clone();
    let spawned = state.spawn_tasks(state.spawn.count, &colors);
    debug!(tick = state.clock.tick(), spawned = spawned.len(), "Boxes spawned");
    count(spawned.len())
}

/// Release holds whose holder is no longer active.
///
/// A handover can land on a robot that died after asking for it; the box
/// would otherwise stay reserved forever.
fn phase_sweep(state: &mut SimulationState, tick: u64) {
    let orphaned: Vec<AgentId> = state
        .board
        .reservations()
        .iter()
        .map(|(_, hold)| hold.holder)
        .filter(|holder| !state.robots.get(holder).is_some_and(Robot::is_active))
        .collect();
    for holder in orphaned {
        if let Some(task) = state.board.release(holder) {
            debug!(tick, %holder, %task, "Released box held by inactive robot");
        }
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

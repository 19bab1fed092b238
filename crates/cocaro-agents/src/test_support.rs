//! Shared fixture for unit tests.

#![allow(clippy::unwrap_used)]

use cocaro_types::{Color, EngineKind, Position};
use cocaro_world::{Grid, TaskBoard};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::bus::MessageBus;
use crate::config::RobotConfig;
use crate::context::TickContext;
use crate::robot::Robot;

/// A 20x20 world with one nest per color and no robots.
///
/// Nests: red at (10, 0), green at (0, 10), blue at (19, 19).
pub(crate) struct Fixture {
    pub(crate) board: TaskBoard,
    pub(crate) grid: Grid,
    pub(crate) bus: MessageBus,
    pub(crate) config: RobotConfig,
    pub(crate) rng: StdRng,
    pub(crate) tick: u64,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let mut board = TaskBoard::new();
        board.add_nest(Color::Red, Position::new(10, 0));
        board.add_nest(Color::Green, Position::new(0, 10));
        board.add_nest(Color::Blue, Position::new(19, 19));
        Self {
            board,
            grid: Grid::new(20, 20).unwrap(),
            bus: MessageBus::new(),
            config: RobotConfig::default(),
            rng: StdRng::seed_from_u64(11),
            tick: 0,
        }
    }

    pub(crate) fn robot(&self, color: Color, engine: EngineKind, at: Position) -> Robot {
        Robot::new(color, engine, at, &self.config)
    }

    pub(crate) fn ctx(&mut self) -> TickContext<'_> {
        TickContext {
            tick: self.tick,
            board: &mut self.board,
            space: &self.grid,
            bus: &mut self.bus,
            config: &self.config,
            rng: &mut self.rng,
        }
    }
}

//! Bootstrap: build the initial [`SimulationState`] from configuration.
//!
//! The standard world has one nest at each configured cell, colored by a
//! seeded shuffle of the color list; boxes with random colors on random
//! cells; and robots split evenly across colors (any remainder drawn at
//! random) on random cells with a full battery.

use cocaro_agents::Robot;
use cocaro_types::Color;
use cocaro_world::{Grid, Spatial, TaskBoard, WorldError};
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::info;

use crate::config::{ConfigError, SimulationConfig};
use crate::tick::{SimulationState, SpawnSchedule};

/// Errors that can occur while building the initial world.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The configuration failed validation.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A color in play has no nest to deliver to.
    #[error("no nest accepts {0} boxes")]
    MissingNest(Color),

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        source: WorldError,
    },
}

impl From<WorldError> for SetupError {
    fn from(source: WorldError) -> Self {
        match source {
            WorldError::MissingNest(color) => Self::MissingNest(color),
            other => Self::World { source: other },
        }
    }
}

/// Build a ready-to-run world from a configuration.
///
/// # Errors
///
/// Returns [`SetupError::Config`] if the configuration does not validate,
/// and [`SetupError::MissingNest`] if some color ends up without a nest.
pub fn build_state(config: &SimulationConfig) -> Result<SimulationState, SetupError> {
    config.validate()?;

    let grid = Grid::new(config.world.width, config.world.height)?;
    let mut state = SimulationState::new(
        grid,
        TaskBoard::new(),
        config.robot.clone(),
        config.world.seed,
    );
    let colors = &config.tasks.colors;

    // Nests
    let mut nest_colors = colors.clone();
    nest_colors.shuffle(&mut state.rng);
    for (nest, color) in config.tasks.nests.iter().zip(nest_colors.iter().cycle()) {
        let position = state.grid.check(nest.position())?;
        state.board.add_nest(*color, position);
    }
    state.board.ensure_nests_for(colors)?;

    // Boxes
    state.spawn_tasks(config.tasks.initial_boxes, colors);
    state.spawn = SpawnSchedule {
        interval_ticks: config.tasks.spawn_interval_ticks,
        count: config.tasks.spawn_count,
        colors: colors.clone(),
    };

    // Robots
    for color in robot_colors(config, &mut state) {
        let position = state.grid.random_position(&mut state.rng);
        let robot = Robot::new(color, config.population.engine, position, &state.robot_config);
        state.insert_robot(robot);
    }

    info!(
        world = config.world.name,
        seed = config.world.seed,
        width = config.world.width,
        height = config.world.height,
        nests = config.tasks.nests.len(),
        boxes = state.board.task_count(),
        robots = state.robots.len(),
        engine = %config.population.engine,
        "World built"
    );
    Ok(state)
}

/// One color per robot: an even share for every color, then the
/// remainder drawn at random.
fn robot_colors(config: &SimulationConfig, state: &mut SimulationState) -> Vec<Color> {
    let colors = &config.tasks.colors;
    let total = usize::try_from(config.population.robot_count).unwrap_or(usize::MAX);
    let share = total.checked_div(colors.len()).unwrap_or(0);

    let mut assigned: Vec<Color> = colors
        .iter()
        .flat_map(|&c| std::iter::repeat_n(c, share))
        .collect();
    while assigned.len() < total {
        let Some(&color) = colors.choose(&mut state.rng) else {
            break;
        };
        assigned.push(color);
    }
    assigned
}

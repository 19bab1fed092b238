//! Configuration loading and typed config structures for the CoCaRo simulation.
//!
//! The canonical configuration lives in `cocaro-config.yaml` at the project
//! root. Every section and every field has a serde default, so an empty
//! file (or no file at all) describes the standard run: a 50x50 grid,
//! three nests, twenty boxes, and nine robots.

use std::path::Path;

use cocaro_agents::RobotConfig;
use cocaro_types::{Color, EngineKind, Position};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible world.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `cocaro-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Grid and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Robot count and engine.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Box colors, initial boxes, spawning, and nest placement.
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Energy, vision, reward, and negotiation parameters.
    #[serde(default)]
    pub robot: RobotConfig,

    /// Run boundaries.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document carries no sections at all.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Reject configurations that cannot produce a runnable world.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero-sized grid, an empty
    /// color list, fewer nests than colors, or a nest outside the grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid =
            |reason: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid { reason }) };

        if self.world.width == 0 || self.world.height == 0 {
            return invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.world.width, self.world.height
            ));
        }
        if self.tasks.colors.is_empty() {
            return invalid("tasks.colors must name at least one color".to_owned());
        }
        if self.tasks.nests.len() < self.tasks.colors.len() {
            return invalid(format!(
                "{} nests cannot serve {} colors",
                self.tasks.nests.len(),
                self.tasks.colors.len()
            ));
        }
        for nest in &self.tasks.nests {
            let inside = u32::try_from(nest.x).is_ok_and(|x| x < self.world.width)
                && u32::try_from(nest.y).is_ok_and(|y| y < self.world.height);
            if !inside {
                return invalid(format!(
                    "nest at {} lies outside the {}x{} grid",
                    nest.position(),
                    self.world.width,
                    self.world.height
                ));
            }
        }
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Grid columns.
    #[serde(default = "default_grid_side")]
    pub width: u32,

    /// Grid rows.
    #[serde(default = "default_grid_side")]
    pub height: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            width: default_grid_side(),
            height: default_grid_side(),
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Robots placed at simulation start, split evenly across colors.
    #[serde(default = "default_robot_count")]
    pub robot_count: u32,

    /// Allocation engine every robot runs.
    #[serde(default)]
    pub engine: EngineKind,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            robot_count: default_robot_count(),
            engine: EngineKind::default(),
        }
    }
}

/// A nest location in the YAML file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NestPosition {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl NestPosition {
    /// Convert to a grid position.
    pub const fn position(self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Box and nest configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TasksConfig {
    /// Colors in play. Nest colors are a seeded shuffle of this list.
    #[serde(default = "default_colors")]
    pub colors: Vec<Color>,

    /// Boxes placed at simulation start.
    #[serde(default = "default_initial_boxes")]
    pub initial_boxes: u32,

    /// Ticks between box spawns. Zero disables spawning.
    #[serde(default)]
    pub spawn_interval_ticks: u64,

    /// Boxes added at each spawn.
    #[serde(default = "default_spawn_count")]
    pub spawn_count: u32,

    /// One nest is built at each of these cells.
    #[serde(default = "default_nests")]
    pub nests: Vec<NestPosition>,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            colors: default_colors(),
            initial_boxes: default_initial_boxes(),
            spawn_interval_ticks: 0,
            spawn_count: default_spawn_count(),
            nests: default_nests(),
        }
    }
}

/// Simulation boundary configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many ticks. Zero runs until another condition ends it.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Real-time milliseconds to sleep between ticks.
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Stop as soon as every robot is dead.
    #[serde(default = "default_true")]
    pub stop_on_extinction: bool,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            tick_interval_ms: 0,
            stop_on_extinction: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "CoCaRo".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_grid_side() -> u32 {
    50
}

const fn default_robot_count() -> u32 {
    9
}

fn default_colors() -> Vec<Color> {
    Color::ALL.to_vec()
}

const fn default_initial_boxes() -> u32 {
    20
}

const fn default_spawn_count() -> u32 {
    1
}

fn default_nests() -> Vec<NestPosition> {
    vec![
        NestPosition { x: 15, y: 15 },
        NestPosition { x: 35, y: 15 },
        NestPosition { x: 25, y: 32 },
    ]
}

const fn default_max_ticks() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

//! The spatial substrate: a bounded orthogonal grid.
//!
//! The decision engine only needs three things from space: which cells are
//! adjacent, how to take one greedy step toward a target, and where a
//! random cell is. [`Spatial`] captures exactly that, and [`Grid`] is the
//! bounded, non-wrapping von Neumann implementation used by the simulation.
//!
//! Movement is pure greedy distance reduction. There are no obstacles and
//! no path planning.

use cocaro_types::Position;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// The four von Neumann offsets, in a fixed order.
const VON_NEUMANN: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Spatial queries consumed by the robots.
pub trait Spatial {
    /// Whether the position lies on the grid.
    fn contains(&self, position: Position) -> bool;

    /// Cells orthogonally adjacent to `position` that lie on the grid.
    fn adjacent(&self, position: Position) -> Vec<Position>;

    /// One step from `from` toward `target`.
    ///
    /// Picks the adjacent cell with the smallest Manhattan distance to the
    /// target, breaking ties uniformly at random. Returns `from` unchanged
    /// when it already equals `target` or has no neighbors.
    fn step_toward(&self, from: Position, target: Position, rng: &mut dyn RngCore) -> Position;

    /// A uniformly random cell.
    fn random_position(&self, rng: &mut dyn RngCore) -> Position;
}

/// A `width x height` grid with cells `(0..width, 0..height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Number of columns.
    width: i32,
    /// Number of rows.
    height: i32,
}

impl Grid {
    /// Create a grid with the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either dimension is zero
    /// or exceeds `i32::MAX`.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        let invalid = WorldError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(invalid);
        };
        Ok(Self {
            width: w,
            height: h,
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Return `position` if it lies on the grid.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] otherwise.
    pub fn check(&self, position: Position) -> Result<Position, WorldError> {
        if self.contains(position) {
            Ok(position)
        } else {
            Err(WorldError::OutOfBounds(position))
        }
    }
}

impl Spatial for Grid {
    fn contains(&self, position: Position) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    fn adjacent(&self, position: Position) -> Vec<Position> {
        VON_NEUMANN
            .iter()
            .filter_map(|&(dx, dy)| position.offset(dx, dy))
            .filter(|p| self.contains(*p))
            .collect()
    }

    fn step_toward(&self, from: Position, target: Position, rng: &mut dyn RngCore) -> Position {
        if from == target {
            return from;
        }
        let neighbors = self.adjacent(from);
        let Some(best) = neighbors.iter().map(|p| p.manhattan(target)).min() else {
            return from;
        };
        let closest: Vec<Position> = neighbors
            .into_iter()
            .filter(|p| p.manhattan(target) == best)
            .collect();
        closest.choose(rng).copied().unwrap_or(from)
    }

    fn random_position(&self, rng: &mut dyn RngCore) -> Position {
        Position::new(rng.random_range(0..self.width), rng.random_range(0..self.height))
    }
}

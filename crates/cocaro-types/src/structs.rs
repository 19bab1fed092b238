//! Core entity structs: grid positions, boxes and nests.

use serde::{Deserialize, Serialize};

use crate::enums::Color;
use crate::ids::{NestId, TaskId};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column, growing to the right.
    pub x: i32,
    /// Row, growing upward.
    pub y: i32,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance to another position.
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// The position shifted by `(dx, dy)`, or `None` on coordinate overflow.
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let Some(x) = self.x.checked_add(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add(dy) else {
            return None;
        };
        Some(Self { x, y })
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Boxes and nests
// ---------------------------------------------------------------------------

/// A colored box lying on (or being carried across) the grid.
///
/// Ownership is deliberately not a field here: reservations live in the
/// task board's reservation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique box identifier.
    pub id: TaskId,
    /// The box color; only a nest of this color accepts it.
    pub color: Color,
    /// Current cell. Tracks the carrier while the box is carried.
    pub position: Position,
}

/// A fixed delivery target for boxes of one color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nest {
    /// Unique nest identifier.
    pub id: NestId,
    /// Boxes of this color are accepted here.
    pub color: Color,
    /// Fixed cell.
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_is_symmetric() {
        let a = Position::new(2, -3);
        let b = Position::new(-1, 4);
        assert_eq!(a.manhattan(b), 10);
        assert_eq!(b.manhattan(a), 10);
    }

    #[test]
    fn manhattan_to_self_is_zero() {
        let a = Position::new(7, 7);
        assert_eq!(a.manhattan(a), 0);
    }

    #[test]
    fn offset_detects_overflow() {
        assert_eq!(Position::new(i32::MAX, 0).offset(1, 0), None);
        assert_eq!(Position::new(1, 1).offset(-1, 1), Some(Position::new(0, 2)));
    }
}

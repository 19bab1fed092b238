//! The urgency model: projecting criticality over a delivery trip.
//!
//! A candidate box is judged by the criticality the robot would have
//! after walking to it, carrying it to the nearest nest of its color, and
//! collecting the reward. Lower is better; every engine compares
//! candidates with this single number.

use cocaro_types::{Position, Task};
use cocaro_world::TaskBoard;

use crate::energy::Energy;
use crate::error::AgentError;

/// Manhattan length of the trip `from -> task -> nearest matching nest`.
///
/// # Errors
///
/// Returns [`AgentError::MissingNest`] if no nest accepts the box's color.
pub fn trip_length(board: &TaskBoard, from: Position, task: &Task) -> Result<u32, AgentError> {
    let nest = board
        .nearest_nest(task.color, task.position)
        .ok_or(AgentError::MissingNest(task.color))?;
    Ok(from
        .manhattan(task.position)
        .saturating_add(task.position.manhattan(nest.position)))
}

/// Criticality after a trip of `travel` steps that ends with `reward`.
///
/// Returns the battery capacity if the trip alone would drain the
/// battery, zero if the reward would refill it, and the remaining gap
/// otherwise.
pub const fn anticipated_criticality(
    energy: Energy,
    travel: u32,
    cost_per_step: u32,
    reward: u32,
) -> u32 {
    let trip_cost = travel.saturating_mul(cost_per_step);
    if trip_cost >= energy.value() {
        return energy.max();
    }
    let projected = energy.value().saturating_sub(trip_cost).saturating_add(reward);
    energy.max().saturating_sub(projected)
}

#[cfg(test)]
mod tests {
    use cocaro_types::Color;

    use super::*;

    #[test]
    fn full_recovery_is_zero() {
        let e = Energy::with_value(250, 300);
        assert_eq!(anticipated_criticality(e, 10, 1, 200), 0);
    }

    #[test]
    fn dying_en_route_is_max() {
        let e = Energy::with_value(20, 300);
        assert_eq!(anticipated_criticality(e, 20, 1, 200), 300);
        assert_eq!(anticipated_criticality(e, 35, 1, 200), 300);
    }

    #[test]
    fn linear_between_bounds() {
        let e = Energy::with_value(100, 300);
        // 100 - 30 + 66 = 136 -> 300 - 136
        assert_eq!(anticipated_criticality(e, 30, 1, 66), 164);
    }

    #[test]
    fn longer_trips_are_never_better() {
        let e = Energy::with_value(150, 300);
        let mut previous = 0;
        for travel in 0..200 {
            let c = anticipated_criticality(e, travel, 1, 66);
            assert!(c >= previous);
            assert!(c <= 300);
            previous = c;
        }
    }

    #[test]
    fn trip_length_goes_through_nearest_nest() {
        let mut board = TaskBoard::new();
        board.add_nest(Color::Red, Position::new(10, 0));
        board.add_nest(Color::Red, Position::new(30, 0));
        let id = board.spawn_task(Color::Red, Position::new(5, 0));
        let task = board.task(id).cloned();
        let len = task.map(|t| trip_length(&board, Position::new(0, 0), &t));
        assert_eq!(len, Some(Ok(10)));
    }

    #[test]
    fn trip_length_without_nest_is_an_error() {
        let mut board = TaskBoard::new();
        let id = board.spawn_task(Color::Blue, Position::new(1, 1));
        let task = board.task(id).cloned();
        let len = task.map(|t| trip_length(&board, Position::new(0, 0), &t));
        assert_eq!(len, Some(Err(AgentError::MissingNest(Color::Blue))));
    }
}

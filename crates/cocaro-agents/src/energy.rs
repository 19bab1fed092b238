//! Battery accounting.
//!
//! [`Energy`] keeps the charge inside `[0, max]` on every write. Spending
//! more than is left empties the battery; crediting more than fits fills
//! it. Neither is an error. Criticality is computed from the charge on
//! demand and never stored.

use serde::{Deserialize, Serialize};

/// A robot's battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Energy {
    /// Current charge.
    value: u32,
    /// Capacity.
    max: u32,
}

impl Energy {
    /// A full battery of the given capacity.
    pub const fn full(max: u32) -> Self {
        Self { value: max, max }
    }

    /// A battery holding `value`, clamped to `max`.
    pub const fn with_value(value: u32, max: u32) -> Self {
        let value = if value > max { max } else { value };
        Self { value, max }
    }

    /// Current charge.
    pub const fn value(self) -> u32 {
        self.value
    }

    /// Capacity.
    pub const fn max(self) -> u32 {
        self.max
    }

    /// How close to empty the battery is: `max - value`.
    pub const fn criticality(self) -> u32 {
        self.max.saturating_sub(self.value)
    }

    /// Whether the battery is empty.
    pub const fn is_depleted(self) -> bool {
        self.value == 0
    }

    /// Spend `amount`, stopping at zero.
    pub const fn spend(&mut self, amount: u32) {
        self.value = self.value.saturating_sub(amount);
    }

    /// Add `amount`, stopping at capacity.
    pub const fn credit(&mut self, amount: u32) {
        let raised = self.value.saturating_add(amount);
        self.value = if raised > self.max { self.max } else { raised };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_clamps_at_zero() {
        let mut e = Energy::with_value(3, 300);
        e.spend(5);
        assert_eq!(e.value(), 0);
        assert!(e.is_depleted());
        assert_eq!(e.criticality(), 300);
    }

    #[test]
    fn credit_clamps_at_max() {
        let mut e = Energy::with_value(250, 300);
        e.credit(200);
        assert_eq!(e.value(), 300);
        assert_eq!(e.criticality(), 0);
    }

    #[test]
    fn construction_clamps() {
        assert_eq!(Energy::with_value(900, 300).value(), 300);
    }

    #[test]
    fn criticality_tracks_value() {
        let mut e = Energy::full(300);
        for _ in 0..40 {
            e.spend(7);
            assert!(e.value() <= e.max());
            assert_eq!(e.criticality(), e.max().saturating_sub(e.value()));
        }
    }
}

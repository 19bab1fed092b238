//! Tunable parameters for robot energy, rewards, and negotiation.
//!
//! [`RobotConfig`] is the `robot` section of `cocaro-config.yaml`. Every
//! field has a serde default so that a partial section (or none at all)
//! yields the standard CoCaRo robot: 300 energy, one energy per step
//! moved, a vision radius of 3, and a full reward of two thirds of the
//! battery.

use cocaro_types::Color;
use serde::{Deserialize, Serialize};

/// Robot parameters shared by every engine variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Battery capacity and starting energy (default: 300).
    #[serde(default = "default_max_energy")]
    pub max_energy: u32,

    /// Energy spent per tick in which the robot changed cell (default: 1).
    #[serde(default = "default_energy_cost_per_step")]
    pub energy_cost_per_step: u32,

    /// Manhattan radius within which boxes are visible (default: 3).
    #[serde(default = "default_vision_range")]
    pub vision_range: u32,

    /// Energy credited for delivering a box of the robot's own color
    /// (default: 200).
    #[serde(default = "default_reward")]
    pub reward: u32,

    /// Divisor applied to `reward` for boxes of another color (default: 3).
    #[serde(default = "default_reduced_reward_divisor")]
    pub reduced_reward_divisor: u32,

    /// How much more critical a challenger must be, in current
    /// criticality, to win a box outright (default: 10).
    #[serde(default = "default_urgency_margin")]
    pub urgency_margin: u32,

    /// Skip candidate boxes the robot would die trying to deliver
    /// (default: false).
    #[serde(default)]
    pub forbid_lethal_claims: bool,
}

const fn default_max_energy() -> u32 {
    300
}

const fn default_energy_cost_per_step() -> u32 {
    1
}

const fn default_vision_range() -> u32 {
    3
}

const fn default_reward() -> u32 {
    200
}

const fn default_reduced_reward_divisor() -> u32 {
    3
}

const fn default_urgency_margin() -> u32 {
    10
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            max_energy: default_max_energy(),
            energy_cost_per_step: default_energy_cost_per_step(),
            vision_range: default_vision_range(),
            reward: default_reward(),
            reduced_reward_divisor: default_reduced_reward_divisor(),
            urgency_margin: default_urgency_margin(),
            forbid_lethal_claims: false,
        }
    }
}

impl RobotConfig {
    /// The highest criticality a robot can have (an empty battery).
    pub const fn max_criticality(&self) -> u32 {
        self.max_energy
    }

    /// Reward for delivering a box of another color.
    ///
    /// A divisor of zero is treated as one (no reduction).
    pub const fn reduced_reward(&self) -> u32 {
        match self.reward.checked_div(self.reduced_reward_divisor) {
            Some(reduced) => reduced,
            None => self.reward,
        }
    }

    /// Reward credited to a robot of `robot` color delivering a `task` box.
    pub fn reward_for(&self, robot: Color, task: Color) -> u32 {
        if robot == task {
            self.reward
        } else {
            self.reduced_reward()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_standard_robot() {
        let cfg = RobotConfig::default();
        assert_eq!(cfg.max_energy, 300);
        assert_eq!(cfg.reward, 200);
        assert_eq!(cfg.reduced_reward(), 66);
        assert_eq!(cfg.max_criticality(), 300);
        assert!(!cfg.forbid_lethal_claims);
    }

    #[test]
    fn partial_section_fills_defaults() {
        let cfg: RobotConfig =
            serde_json::from_str(r#"{"max_energy": 100, "forbid_lethal_claims": true}"#).unwrap();
        assert_eq!(cfg.max_energy, 100);
        assert_eq!(cfg.vision_range, 3);
        assert_eq!(cfg.urgency_margin, 10);
        assert!(cfg.forbid_lethal_claims);
    }

    #[test]
    fn reward_depends_on_color_match() {
        let cfg = RobotConfig::default();
        assert_eq!(cfg.reward_for(Color::Red, Color::Red), 200);
        assert_eq!(cfg.reward_for(Color::Red, Color::Blue), 66);
    }

    #[test]
    fn zero_divisor_means_no_reduction() {
        let cfg = RobotConfig {
            reduced_reward_divisor: 0,
            ..RobotConfig::default()
        };
        assert_eq!(cfg.reduced_reward(), 200);
    }
}

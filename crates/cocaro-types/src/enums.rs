//! Enumeration types for the CoCaRo simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// The color of a robot, box, or nest.
///
/// A box may only be delivered to a nest of the same color. A robot
/// delivering a box of its own color earns the full reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Red.
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
}

impl Color {
    /// Every color, in declaration order.
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];
}

impl core::fmt::Display for Color {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Green => write!(f, "green"),
            Self::Blue => write!(f, "blue"),
        }
    }
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

/// The speech-act kind of a message.
///
/// Each performative has its own inbox on the recipient, and inboxes are
/// drained in declaration order once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performative {
    /// Ask the recipient to do something (challenge or demand a task).
    Request,
    /// Accept a request.
    Agree,
    /// Reject a request, or withdraw from an offer.
    Refuse,
    /// Share information that the recipient asked for.
    Inform,
}

impl Performative {
    /// All performatives in inbox processing order.
    pub const PROCESSING_ORDER: [Self; 4] = [Self::Request, Self::Agree, Self::Refuse, Self::Inform];
}

impl core::fmt::Display for Performative {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Request => write!(f, "request"),
            Self::Agree => write!(f, "agree"),
            Self::Refuse => write!(f, "refuse"),
            Self::Inform => write!(f, "inform"),
        }
    }
}

// ---------------------------------------------------------------------------
// Robots
// ---------------------------------------------------------------------------

/// Which allocation engine a robot runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Claims a random free visible box when idle. No comparison.
    Random,
    /// Compares anticipated criticality across free boxes. No messages.
    #[default]
    Greedy,
    /// Greedy on free boxes, negotiates for boxes held by other robots.
    Cooperative,
}

impl core::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Greedy => write!(f, "greedy"),
            Self::Cooperative => write!(f, "cooperative"),
        }
    }
}

/// Lifecycle status of a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotStatus {
    /// The robot acts every tick.
    Active,
    /// The robot ran out of energy. It stays on the grid but is inert.
    Dead,
}

/// How far a robot has progressed with the box it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldStage {
    /// Reserved, but the robot has not reached the box yet.
    Targeted,
    /// The box is co-located with the robot and moves with it.
    Carried,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_serializes_lowercase() {
        let json = serde_json::to_string(&Color::Green).ok();
        assert_eq!(json.as_deref(), Some("\"green\""));
    }

    #[test]
    fn engine_kind_parses_from_lowercase() {
        let kind: Result<EngineKind, _> = serde_json::from_str("\"cooperative\"");
        assert_eq!(kind.ok(), Some(EngineKind::Cooperative));
    }

    #[test]
    fn processing_order_is_request_agree_refuse_inform() {
        assert_eq!(
            Performative::PROCESSING_ORDER,
            [
                Performative::Request,
                Performative::Agree,
                Performative::Refuse,
                Performative::Inform
            ]
        );
    }
}

//! # Maneuver translation
//!
//! The directions services describe maneuvers with their own string enumerations. The tracking
//! core only cares about which side a turn is on, so the vendor strings are collapsed into a
//! [`TurnSide`] once, when the [`RouteData`](crate::route::RouteData) is built.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Google Directions maneuvers which turn to the left.
const GOOGLE_LEFT: [&str; 8] = [
    "turn-left",
    "turn-sharp-left",
    "turn-slight-left",
    "ramp-left",
    "fork-left",
    "keep-left",
    "roundabout-left",
    "uturn-left",
];

/// Google Directions maneuvers which turn to the right.
const GOOGLE_RIGHT: [&str; 8] = [
    "turn-right",
    "turn-sharp-right",
    "turn-slight-right",
    "ramp-right",
    "fork-right",
    "keep-right",
    "roundabout-right",
    "uturn-right",
];

const MAPBOX_LEFT: [&str; 3] = ["left", "sharp left", "slight left"];

const MAPBOX_RIGHT: [&str; 3] = ["right", "sharp right", "slight right"];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The side a maneuver turns towards.
///
/// Serialised using the single letter codes of the directions backend, `B` meaning "both" or
/// straight on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnSide {
    #[serde(rename = "L", alias = "Left")]
    Left,

    #[serde(rename = "R", alias = "Right")]
    Right,

    #[serde(rename = "B", alias = "Straight")]
    Straight,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TurnSide {
    /// Translate a Google Directions `maneuver` string.
    ///
    /// Missing or unrecognised maneuvers (`straight`, `merge`, `ferry`, ...) are `Straight`.
    pub fn from_google_maneuver(maneuver: &str) -> Self {
        if GOOGLE_LEFT.iter().any(|m| *m == maneuver) {
            TurnSide::Left
        } else if GOOGLE_RIGHT.iter().any(|m| *m == maneuver) {
            TurnSide::Right
        } else {
            TurnSide::Straight
        }
    }

    /// Translate a Mapbox Directions maneuver `modifier`.
    pub fn from_mapbox_modifier(modifier: Option<&str>) -> Self {
        match modifier {
            Some(m) if MAPBOX_LEFT.iter().any(|l| *l == m) => TurnSide::Left,
            Some(m) if MAPBOX_RIGHT.iter().any(|r| *r == m) => TurnSide::Right,
            _ => TurnSide::Straight,
        }
    }

    /// Returns true if this side requires the user to turn.
    pub fn is_turn(&self) -> bool {
        !matches!(self, TurnSide::Straight)
    }

    /// Lower case direction word used in notifications.
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnSide::Left => "left",
            TurnSide::Right => "right",
            TurnSide::Straight => "straight",
        }
    }
}

impl std::fmt::Display for TurnSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_google_maneuvers() {
        assert_eq!(TurnSide::from_google_maneuver("turn-left"), TurnSide::Left);
        assert_eq!(TurnSide::from_google_maneuver("roundabout-left"), TurnSide::Left);
        assert_eq!(TurnSide::from_google_maneuver("uturn-right"), TurnSide::Right);
        assert_eq!(TurnSide::from_google_maneuver("keep-right"), TurnSide::Right);
        assert_eq!(TurnSide::from_google_maneuver("straight"), TurnSide::Straight);
        assert_eq!(TurnSide::from_google_maneuver("merge"), TurnSide::Straight);
        assert_eq!(TurnSide::from_google_maneuver(""), TurnSide::Straight);
    }

    #[test]
    fn test_mapbox_modifiers() {
        assert_eq!(TurnSide::from_mapbox_modifier(Some("sharp left")), TurnSide::Left);
        assert_eq!(TurnSide::from_mapbox_modifier(Some("slight right")), TurnSide::Right);
        assert_eq!(TurnSide::from_mapbox_modifier(Some("uturn")), TurnSide::Straight);
        assert_eq!(TurnSide::from_mapbox_modifier(None), TurnSide::Straight);
    }

    #[test]
    fn test_side_wire_format() {
        assert_eq!(serde_json::to_string(&TurnSide::Left).unwrap(), "\"L\"");
        let s: TurnSide = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(s, TurnSide::Straight);
        assert!(!s.is_turn());
    }
}

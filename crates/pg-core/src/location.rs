use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::LOCATION_COUNT;
use crate::error::ModelError;

/// One of the eight compass points an actor can occupy.
///
/// Discriminants run clockwise from north so that rotating by `k` eighths of
/// a circle is `(index + k) mod 8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    N = 0,
    NE = 1,
    E = 2,
    SE = 3,
    S = 4,
    SW = 5,
    W = 6,
    NW = 7,
}

impl Location {
    pub const ALL: [Location; 8] = [
        Location::N,
        Location::NE,
        Location::E,
        Location::SE,
        Location::S,
        Location::SW,
        Location::W,
        Location::NW,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn from_index(index: u8) -> Self {
        Self::ALL[(index % LOCATION_COUNT) as usize]
    }

    /// Rotate clockwise by `steps` eighths of a circle.
    pub const fn rotated(self, steps: u8) -> Self {
        Self::from_index(self.index() + steps % LOCATION_COUNT)
    }

    /// Reflection across the north-south axis.
    pub const fn mirrored(self) -> Self {
        Self::from_index(LOCATION_COUNT - self.index())
    }

    /// Clockwise distance from `self` to `other`, in eighths (0..8).
    pub const fn steps_to(self, other: Self) -> u8 {
        (other.index() + LOCATION_COUNT - self.index()) % LOCATION_COUNT
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::N => "n",
            Self::NE => "ne",
            Self::E => "e",
            Self::SE => "se",
            Self::S => "s",
            Self::SW => "sw",
            Self::W => "w",
            Self::NW => "nw",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" => Ok(Self::N),
            "ne" => Ok(Self::NE),
            "e" => Ok(Self::E),
            "se" => Ok(Self::SE),
            "s" => Ok(Self::S),
            "sw" => Ok(Self::SW),
            "w" => Ok(Self::W),
            "nw" => Ok(Self::NW),
            _ => Err(ModelError::UnknownName {
                kind: "location",
                value: s.to_string(),
            }),
        }
    }
}

/// Prop rotation direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
    #[default]
    None,
}

impl RotationDirection {
    /// Clockwise and counter-clockwise swap; `None` stays `None`.
    pub fn inverted(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
            Self::None => Self::None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }

    /// A motion without rotation is compatible with any fixed direction.
    pub fn is_compatible_with(self, fixed: Self) -> bool {
        self == Self::None || self == fixed
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clockwise => "clockwise",
            Self::CounterClockwise => "counter_clockwise",
            Self::None => "none",
        }
    }

    /// Accepts both long names and the short `cw` / `ccw` forms.
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s.to_ascii_lowercase().as_str() {
            "clockwise" | "cw" => Ok(Self::Clockwise),
            "counter_clockwise" | "counterclockwise" | "ccw" => Ok(Self::CounterClockwise),
            "none" | "no_rot" | "" => Ok(Self::None),
            _ => Err(ModelError::UnknownName {
                kind: "rotation direction",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RotationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prop orientation relative to the grid center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    In,
    Out,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s.to_ascii_lowercase().as_str() {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            _ => Err(ModelError::UnknownName {
                kind: "orientation",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        assert_eq!(Location::NW.rotated(1), Location::N);
        assert_eq!(Location::S.rotated(4), Location::N);
        assert_eq!(Location::E.rotated(10), Location::S);
    }

    #[test]
    fn test_mirror_fixes_axis() {
        assert_eq!(Location::N.mirrored(), Location::N);
        assert_eq!(Location::S.mirrored(), Location::S);
        assert_eq!(Location::E.mirrored(), Location::W);
        assert_eq!(Location::NE.mirrored(), Location::NW);
        for loc in Location::ALL {
            assert_eq!(loc.mirrored().mirrored(), loc);
        }
    }

    #[test]
    fn test_steps_to() {
        assert_eq!(Location::N.steps_to(Location::E), 2);
        assert_eq!(Location::E.steps_to(Location::N), 6);
        assert_eq!(Location::W.steps_to(Location::W), 0);
    }

    #[test]
    fn test_parse_roundtrip() {
        for loc in Location::ALL {
            assert_eq!(loc.as_str().parse::<Location>().unwrap(), loc);
        }
        assert!("north".parse::<Location>().is_err());
    }

    #[test]
    fn test_rotation_inversion() {
        assert_eq!(RotationDirection::Clockwise.inverted(), RotationDirection::CounterClockwise);
        assert_eq!(RotationDirection::None.inverted(), RotationDirection::None);
        assert!(RotationDirection::None.is_compatible_with(RotationDirection::Clockwise));
        assert!(!RotationDirection::CounterClockwise.is_compatible_with(RotationDirection::Clockwise));
    }

    #[test]
    fn test_rotation_parse_short_forms() {
        assert_eq!(RotationDirection::parse("cw").unwrap(), RotationDirection::Clockwise);
        assert_eq!(RotationDirection::parse("ccw").unwrap(), RotationDirection::CounterClockwise);
        assert_eq!(RotationDirection::parse("no_rot").unwrap(), RotationDirection::None);
        assert!(RotationDirection::parse("sideways").is_err());
    }
}

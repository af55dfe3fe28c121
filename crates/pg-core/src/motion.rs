use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::constants::{FLOAT_SENTINEL, HALF_STEPS, MAX_HALF_TURNS, QUARTER_STEPS};
use crate::error::ModelError;
use crate::location::{Location, Orientation, RotationDirection};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionType {
    Pro,
    Anti,
    Float,
    Dash,
    Static,
}

impl MotionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::Anti => "anti",
            Self::Float => "float",
            Self::Dash => "dash",
            Self::Static => "static",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s.to_ascii_lowercase().as_str() {
            "pro" => Ok(Self::Pro),
            "anti" => Ok(Self::Anti),
            "float" => Ok(Self::Float),
            "dash" => Ok(Self::Dash),
            "static" => Ok(Self::Static),
            _ => Err(ModelError::UnknownName {
                kind: "motion type",
                value: s.to_string(),
            }),
        }
    }

    /// Pro, anti and float travel a quarter circle along the hand path.
    pub fn is_shift(self) -> bool {
        matches!(self, Self::Pro | Self::Anti | Self::Float)
    }

    /// Whether a zero-turn motion of this type flips in/out.
    fn flips_orientation(self) -> bool {
        matches!(self, Self::Anti | Self::Dash)
    }

    /// Clockwise steps between start and end location this type allows.
    fn allowed_travel(self) -> &'static [u8] {
        match self {
            Self::Pro | Self::Anti | Self::Float => &[QUARTER_STEPS, 8 - QUARTER_STEPS],
            Self::Dash => &[HALF_STEPS],
            Self::Static => &[0],
        }
    }
}

impl fmt::Display for MotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn count of a motion: a multiple of one half turn, or the float sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Turns {
    Half(u8),
    Float,
}

impl Default for Turns {
    fn default() -> Self {
        Turns::Half(0)
    }
}

impl Turns {
    pub const ZERO: Turns = Turns::Half(0);

    /// Parse a numeric turn value; must be a 0.5 multiple in 0..=3.
    pub fn from_value(value: f64) -> Result<Self, ModelError> {
        let halves = value * 2.0;
        if !(0.0..=f64::from(MAX_HALF_TURNS)).contains(&halves) || halves.fract() != 0.0 {
            return Err(ModelError::InvalidTurns(value));
        }
        Ok(Turns::Half(halves as u8))
    }

    /// Numeric value, `None` for the float sentinel.
    pub fn value(self) -> Option<f64> {
        match self {
            Turns::Half(n) => Some(f64::from(n) / 2.0),
            Turns::Float => None,
        }
    }

    /// Half-turn count; float counts as zero.
    pub fn half_turns(self) -> u8 {
        match self {
            Turns::Half(n) => n,
            Turns::Float => 0,
        }
    }

    pub fn is_zero(self) -> bool {
        self == Turns::ZERO
    }

    pub fn is_float(self) -> bool {
        self == Turns::Float
    }
}

impl fmt::Display for Turns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{v}"),
            None => f.write_str(FLOAT_SENTINEL),
        }
    }
}

impl Serialize for Turns {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        match *self {
            Turns::Half(n) if n % 2 == 0 => serializer.serialize_u8(n / 2),
            Turns::Half(n) => serializer.serialize_f64(f64::from(n) / 2.0),
            Turns::Float => serializer.serialize_str(FLOAT_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for Turns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Turns::from_value(v).map_err(de::Error::custom),
            Raw::Text(s) if s == FLOAT_SENTINEL => Ok(Turns::Float),
            Raw::Text(s) => s
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("invalid turns {s:?}")))
                .and_then(|v| Turns::from_value(v).map_err(de::Error::custom)),
        }
    }
}

/// End orientation of a motion, given its start orientation.
///
/// Anti and dash flip in/out at zero turns, pro and static keep it. Each odd
/// whole turn flips once more; a trailing half turn leaves in/out alone.
/// A floated motion is evaluated as its pre-float type with zero turns, and a
/// float with no pre-float record keeps its orientation.
pub fn end_orientation(
    motion_type: MotionType,
    turns: Turns,
    prefloat_motion_type: Option<MotionType>,
    start: Orientation,
) -> Orientation {
    let (effective, half_turns) = match (motion_type, turns) {
        (MotionType::Float, _) | (_, Turns::Float) => match prefloat_motion_type {
            Some(original) => (original, 0),
            None => return start,
        },
        (ty, Turns::Half(n)) => (ty, n),
    };
    let odd_whole_turns = (half_turns / 2) % 2 == 1;
    if effective.flips_orientation() ^ odd_whole_turns {
        start.flipped()
    } else {
        start
    }
}

/// One actor's motion within a beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MotionData {
    pub motion_type: MotionType,
    pub rotation_direction: RotationDirection,
    pub start_location: Location,
    pub end_location: Location,
    pub start_orientation: Orientation,
    pub end_orientation: Orientation,
    pub turns: Turns,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefloat_motion_type: Option<MotionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefloat_rotation_direction: Option<RotationDirection>,
}

impl MotionData {
    /// Zero-turn motion with its end orientation derived from `start_orientation`.
    pub fn new(
        motion_type: MotionType,
        start_location: Location,
        end_location: Location,
        start_orientation: Orientation,
    ) -> Self {
        let mut motion = Self {
            motion_type,
            rotation_direction: RotationDirection::None,
            start_location,
            end_location,
            start_orientation,
            end_orientation: start_orientation,
            turns: if motion_type == MotionType::Float {
                Turns::Float
            } else {
                Turns::ZERO
            },
            prefloat_motion_type: None,
            prefloat_rotation_direction: None,
        };
        motion.end_orientation = motion.computed_end_orientation();
        motion
    }

    /// Check travel, turns and rotation rules.
    pub fn validate(&self) -> Result<(), ModelError> {
        let travel = self.start_location.steps_to(self.end_location);
        if !self.motion_type.allowed_travel().contains(&travel) {
            return Err(ModelError::InvalidMotion(format!(
                "{} cannot travel {} -> {}",
                self.motion_type, self.start_location, self.end_location
            )));
        }
        match (self.motion_type, self.turns) {
            (MotionType::Float, Turns::Float) => {
                if !self.rotation_direction.is_none() {
                    return Err(ModelError::InvalidMotion(
                        "float motion cannot rotate".to_string(),
                    ));
                }
                if let Some(original) = self.prefloat_motion_type
                    && !matches!(original, MotionType::Pro | MotionType::Anti)
                {
                    return Err(ModelError::InvalidMotion(format!(
                        "only pro/anti can float, found pre-float {original}"
                    )));
                }
            }
            (MotionType::Float, Turns::Half(_)) | (_, Turns::Float) => {
                return Err(ModelError::InvalidMotion(format!(
                    "{} with turns {} (float type and float turns go together)",
                    self.motion_type, self.turns
                )));
            }
            (_, Turns::Half(n)) => {
                if n > MAX_HALF_TURNS {
                    return Err(ModelError::InvalidTurns(f64::from(n) / 2.0));
                }
                if n == 0 && !self.rotation_direction.is_none() {
                    return Err(ModelError::InvalidMotion(format!(
                        "zero turns with rotation {}",
                        self.rotation_direction
                    )));
                }
                if n > 0 && self.rotation_direction.is_none() {
                    return Err(ModelError::InvalidMotion(format!(
                        "{} turns without a rotation direction",
                        self.turns
                    )));
                }
                if self.prefloat_motion_type.is_some() || self.prefloat_rotation_direction.is_some() {
                    return Err(ModelError::InvalidMotion(
                        "pre-float fields on a motion that is not floated".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn is_float(&self) -> bool {
        self.motion_type == MotionType::Float
    }

    /// Direction the hand travels for shifts; `None` for dash and static.
    pub fn hand_path(&self) -> RotationDirection {
        match self.start_location.steps_to(self.end_location) {
            QUARTER_STEPS => RotationDirection::Clockwise,
            steps if steps == 8 - QUARTER_STEPS => RotationDirection::CounterClockwise,
            _ => RotationDirection::None,
        }
    }

    pub fn computed_end_orientation(&self) -> Orientation {
        end_orientation(
            self.motion_type,
            self.turns,
            self.prefloat_motion_type,
            self.start_orientation,
        )
    }

    /// Copy starting at `start`, with the end orientation recomputed.
    pub fn reoriented(mut self, start: Orientation) -> Self {
        self.start_orientation = start;
        self.end_orientation = self.computed_end_orientation();
        self
    }

    /// Copy with new numeric turns. Pro rotates with its hand path and anti
    /// against it; dash and static take `stationary_direction`. Zero turns
    /// always clear the rotation. A float with no pre-float record has no
    /// shift to restore and stays a bare float.
    pub fn with_turns(mut self, turns: Turns, stationary_direction: RotationDirection) -> Self {
        if self.is_float() {
            self = self.unfloated();
            if self.is_float() {
                self.turns = Turns::Float;
                self.rotation_direction = RotationDirection::None;
                self.end_orientation = self.computed_end_orientation();
                return self;
            }
        }
        self.turns = turns;
        self.rotation_direction = if turns.is_zero() {
            RotationDirection::None
        } else {
            match self.motion_type {
                MotionType::Pro => self.hand_path(),
                MotionType::Anti => self.hand_path().inverted(),
                _ => stationary_direction,
            }
        };
        self.end_orientation = self.computed_end_orientation();
        self
    }

    /// Substitute a pro/anti motion with a float, stashing the original type
    /// and rotation. Other motion types are returned unchanged.
    pub fn floated(mut self) -> Self {
        if !matches!(self.motion_type, MotionType::Pro | MotionType::Anti) {
            return self;
        }
        self.prefloat_motion_type = Some(self.motion_type);
        self.prefloat_rotation_direction = Some(self.rotation_direction);
        self.motion_type = MotionType::Float;
        self.rotation_direction = RotationDirection::None;
        self.turns = Turns::Float;
        self.end_orientation = self.computed_end_orientation();
        self
    }

    /// Restore a floated motion to its pre-float type and rotation, with
    /// zero turns. Motions without a pre-float record are unchanged.
    pub fn unfloated(mut self) -> Self {
        let Some(original) = self.prefloat_motion_type else {
            return self;
        };
        self.motion_type = original;
        self.rotation_direction = RotationDirection::None;
        self.turns = Turns::ZERO;
        self.prefloat_motion_type = None;
        self.prefloat_rotation_direction = None;
        self.end_orientation = self.computed_end_orientation();
        self
    }

    /// Rotate both locations clockwise by `steps` eighths.
    pub fn rotated(mut self, steps: u8) -> Self {
        self.start_location = self.start_location.rotated(steps);
        self.end_location = self.end_location.rotated(steps);
        self
    }

    /// Reflect across the north-south axis. Reflection reverses handedness,
    /// so rotation directions invert as well.
    pub fn mirrored(mut self) -> Self {
        self.start_location = self.start_location.mirrored();
        self.end_location = self.end_location.mirrored();
        self.complemented()
    }

    /// Invert every rotation direction, including the stashed pre-float one.
    pub fn complemented(mut self) -> Self {
        self.rotation_direction = self.rotation_direction.inverted();
        self.prefloat_rotation_direction = self.prefloat_rotation_direction.map(|d| d.inverted());
        self
    }
}

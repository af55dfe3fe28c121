use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DURATION;
use crate::error::ModelError;
use crate::grid::{GridPosition, try_resolve};
use crate::letter::LetterType;
use crate::location::RotationDirection;
use crate::motion::MotionData;

/// Provenance recorded by the CAP engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatMetadata {
    #[serde(default)]
    pub is_mirrored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotated_from: Option<GridPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotated_to: Option<GridPosition>,
}

/// Hand-path relationship between the two actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timing {
    /// Both hands travel the same way around the grid.
    Together,
    /// Hands travel in opposite directions.
    Split,
    /// At least one hand does not travel around the grid.
    None,
}

impl Timing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Together => "together",
            Self::Split => "split",
            Self::None => "none",
        }
    }
}

/// Prop rotation relationship between the two actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Same,
    Opposite,
    None,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Same => "same",
            Self::Opposite => "opp",
            Self::None => "none",
        }
    }
}

/// One beat: the paired motion of both actors.
///
/// Blank beats hold a slot in the sequence without motions; they resolve
/// no position and are skipped by continuity checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeatData {
    pub beat_number: u32,
    pub letter: Option<String>,
    pub duration: f64,
    pub actor1_motion: Option<MotionData>,
    pub actor2_motion: Option<MotionData>,
    #[serde(default)]
    pub is_blank: bool,
    #[serde(default)]
    pub metadata: BeatMetadata,
}

impl BeatData {
    pub fn new(letter: &str, actor1: MotionData, actor2: MotionData) -> Self {
        Self {
            beat_number: 1,
            letter: Some(letter.to_string()),
            duration: DEFAULT_DURATION,
            actor1_motion: Some(actor1),
            actor2_motion: Some(actor2),
            is_blank: false,
            metadata: BeatMetadata::default(),
        }
    }

    pub fn blank(beat_number: u32) -> Self {
        Self {
            beat_number,
            letter: None,
            duration: DEFAULT_DURATION,
            actor1_motion: None,
            actor2_motion: None,
            is_blank: true,
            metadata: BeatMetadata::default(),
        }
    }

    /// Both motions, when the beat has them.
    pub fn motions(&self) -> Option<(&MotionData, &MotionData)> {
        Some((self.actor1_motion.as_ref()?, self.actor2_motion.as_ref()?))
    }

    pub fn start_position(&self) -> Option<GridPosition> {
        let (a, b) = self.motions()?;
        try_resolve(a.start_location, b.start_location)
    }

    pub fn end_position(&self) -> Option<GridPosition> {
        let (a, b) = self.motions()?;
        try_resolve(a.end_location, b.end_location)
    }

    pub fn letter_type(&self) -> Option<LetterType> {
        self.letter.as_deref().and_then(LetterType::of)
    }

    pub fn timing(&self) -> Timing {
        let Some((a, b)) = self.motions() else {
            return Timing::None;
        };
        match (a.hand_path(), b.hand_path()) {
            (RotationDirection::None, _) | (_, RotationDirection::None) => Timing::None,
            (x, y) if x == y => Timing::Together,
            _ => Timing::Split,
        }
    }

    pub fn direction(&self) -> Direction {
        let Some((a, b)) = self.motions() else {
            return Direction::None;
        };
        match (a.rotation_direction, b.rotation_direction) {
            (RotationDirection::None, _) | (_, RotationDirection::None) => Direction::None,
            (x, y) if x == y => Direction::Same,
            _ => Direction::Opposite,
        }
    }

    pub fn with_beat_number(mut self, beat_number: u32) -> Self {
        self.beat_number = beat_number;
        self
    }

    pub fn with_letter(mut self, letter: Option<String>) -> Self {
        self.letter = letter;
        self
    }

    /// Structural check: numbering, duration, motions, and for non-blank
    /// beats a letter plus a resolvable start and end position.
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |reason: String| ModelError::InvalidBeat {
            beat: self.beat_number,
            reason,
        };
        if self.beat_number == 0 {
            return Err(invalid("beat numbers start at 1".to_string()));
        }
        if !(self.duration > 0.0) {
            return Err(invalid(format!("duration {} is not positive", self.duration)));
        }
        if self.is_blank {
            return Ok(());
        }
        let (a, b) = self
            .motions()
            .ok_or_else(|| invalid("non-blank beat needs both motions".to_string()))?;
        if self.letter.is_none() {
            return Err(invalid("non-blank beat needs a letter".to_string()));
        }
        a.validate()?;
        b.validate()?;
        if try_resolve(a.start_location, b.start_location).is_none() {
            return Err(ModelError::OffGridPair(a.start_location, b.start_location));
        }
        if try_resolve(a.end_location, b.end_location).is_none() {
            return Err(ModelError::OffGridPair(a.end_location, b.end_location));
        }
        Ok(())
    }

    /// Like [`BeatData::validate`] but tolerates a missing letter, which is
    /// how a transformed beat that could not be classified is carried.
    pub(crate) fn validate_shape(&self) -> Result<(), ModelError> {
        if self.is_blank || self.letter.is_some() {
            return self.validate();
        }
        self.clone().with_letter(Some(String::new())).validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location::{E, N, S, W};
    use crate::location::Orientation;
    use crate::motion::{MotionType, Turns};

    fn shift(ty: MotionType, from: crate::location::Location, to: crate::location::Location) -> MotionData {
        MotionData::new(ty, from, to, Orientation::In)
    }

    #[test]
    fn test_positions_from_motions() {
        let beat = BeatData::new(
            "A",
            shift(MotionType::Pro, S, W),
            shift(MotionType::Pro, N, E),
        );
        assert_eq!(beat.start_position().unwrap().to_string(), "alpha1");
        assert_eq!(beat.end_position().unwrap().to_string(), "alpha3");
        assert_eq!(beat.timing(), Timing::Together);
        assert_eq!(beat.direction(), Direction::None);
        assert!(beat.validate().is_ok());
    }

    #[test]
    fn test_split_timing_and_direction() {
        let a = shift(MotionType::Pro, S, W).with_turns(Turns::Half(2), RotationDirection::None);
        let b = shift(MotionType::Pro, N, W).with_turns(Turns::Half(2), RotationDirection::None);
        let beat = BeatData::new("J", a, b);
        assert_eq!(beat.timing(), Timing::Split);
        assert_eq!(beat.direction(), Direction::Opposite);
        assert_eq!(beat.end_position().unwrap().to_string(), "beta7");
    }

    #[test]
    fn test_blank_beat() {
        let beat = BeatData::blank(3);
        assert!(beat.validate().is_ok());
        assert_eq!(beat.start_position(), None);
        assert_eq!(beat.timing(), Timing::None);
    }

    #[test]
    fn test_non_blank_requires_letter() {
        let beat = BeatData::new(
            "A",
            shift(MotionType::Static, N, N),
            shift(MotionType::Static, S, S),
        )
        .with_letter(None);
        assert!(matches!(beat.validate(), Err(ModelError::InvalidBeat { .. })));
    }

    #[test]
    fn test_rejects_zero_duration() {
        let mut beat = BeatData::blank(1);
        beat.duration = 0.0;
        assert!(beat.validate().is_err());
    }

    #[test]
    fn test_letter_type() {
        let beat = BeatData::new(
            "α",
            shift(MotionType::Static, N, N),
            shift(MotionType::Static, S, S),
        );
        assert_eq!(beat.letter_type(), Some(LetterType::Type6));
    }
}

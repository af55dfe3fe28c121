use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::beat::BeatData;
use crate::error::ModelError;
use crate::grid::GridPosition;

/// An ordered chain of beats that connect end to start on the grid.
///
/// Invariants held by every constructor and by [`SequenceData::push`]:
/// beats are numbered 1..=n in order, and each non-blank beat starts where
/// the previous non-blank beat ended (or at `start_position` for the first).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceData {
    pub id: Uuid,
    beats: Vec<BeatData>,
    pub start_position: Option<GridPosition>,
}

impl SequenceData {
    pub fn new(start_position: Option<GridPosition>) -> Self {
        Self {
            id: Uuid::new_v4(),
            beats: Vec::new(),
            start_position,
        }
    }

    /// Build from existing beats, renumbering them and checking continuity.
    pub fn from_beats(
        start_position: Option<GridPosition>,
        beats: impl IntoIterator<Item = BeatData>,
    ) -> Result<Self, ModelError> {
        let mut seq = Self::new(start_position);
        for beat in beats {
            seq = seq.push(beat)?;
        }
        Ok(seq)
    }

    pub fn beats(&self) -> &[BeatData] {
        &self.beats
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    /// Position the next beat must start from: the last non-blank beat's end,
    /// else the declared start position.
    pub fn end_position(&self) -> Option<GridPosition> {
        self.beats
            .iter()
            .rev()
            .find(|b| !b.is_blank)
            .and_then(BeatData::end_position)
            .or(self.start_position)
    }

    /// First position the sequence occupies.
    pub fn first_position(&self) -> Option<GridPosition> {
        self.start_position.or_else(|| {
            self.beats
                .iter()
                .find(|b| !b.is_blank)
                .and_then(BeatData::start_position)
        })
    }

    /// Append a copy of `beat` numbered `len + 1`, after checking it
    /// continues from the current end position.
    pub fn push(mut self, beat: BeatData) -> Result<Self, ModelError> {
        let beat = beat.with_beat_number(self.beats.len() as u32 + 1);
        beat.validate_shape()?;
        if !beat.is_blank
            && let (Some(expected), Some(found)) = (self.end_position(), beat.start_position())
            && expected != found
        {
            return Err(ModelError::Continuity {
                index: self.beats.len(),
                expected,
                found,
            });
        }
        self.beats.push(beat);
        Ok(self)
    }

    /// First `len` beats. Numbering is unaffected.
    pub fn truncated(mut self, len: usize) -> Self {
        self.beats.truncate(len);
        self
    }

    /// Concatenated letters; `?` marks an unlabeled beat and `_` a blank.
    pub fn word(&self) -> String {
        self.beats
            .iter()
            .map(|b| {
                if b.is_blank {
                    "_".to_string()
                } else {
                    b.letter.clone().unwrap_or_else(|| "?".to_string())
                }
            })
            .collect()
    }

    /// Re-check numbering and continuity over the whole sequence.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut expected = self.start_position;
        for (index, beat) in self.beats.iter().enumerate() {
            if beat.beat_number as usize != index + 1 {
                return Err(ModelError::Numbering {
                    index,
                    found: beat.beat_number,
                });
            }
            beat.validate_shape()?;
            if beat.is_blank {
                continue;
            }
            if let (Some(e), Some(found)) = (expected, beat.start_position())
                && e != found
            {
                return Err(ModelError::Continuity {
                    index,
                    expected: e,
                    found,
                });
            }
            expected = beat.end_position();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location::{self, E, N, S, W};
    use crate::location::Orientation;
    use crate::motion::{MotionData, MotionType};

    fn beat(letter: &str, a: (Location, Location), b: (Location, Location)) -> BeatData {
        let ty = |from: Location, to: Location| match from.steps_to(to) {
            0 => MotionType::Static,
            4 => MotionType::Dash,
            _ => MotionType::Pro,
        };
        BeatData::new(
            letter,
            MotionData::new(ty(a.0, a.1), a.0, a.1, Orientation::In),
            MotionData::new(ty(b.0, b.1), b.0, b.1, Orientation::In),
        )
    }

    #[test]
    fn test_push_numbers_beats() {
        let seq = SequenceData::new(None)
            .push(beat("A", (S, W), (N, E)))
            .unwrap()
            .push(beat("A", (W, N), (E, S)))
            .unwrap();
        let numbers: Vec<u32> = seq.beats().iter().map(|b| b.beat_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(seq.end_position().unwrap().to_string(), "alpha5");
        assert_eq!(seq.word(), "AA");
    }

    #[test]
    fn test_push_rejects_discontinuity() {
        let seq = SequenceData::new(None).push(beat("A", (S, W), (N, E))).unwrap();
        let err = seq.push(beat("α", (N, N), (S, S))).unwrap_err();
        assert!(matches!(err, ModelError::Continuity { index: 1, .. }));
    }

    #[test]
    fn test_push_checks_declared_start() {
        let start: GridPosition = "beta1".parse().unwrap();
        let err = SequenceData::new(Some(start))
            .push(beat("A", (S, W), (N, E)))
            .unwrap_err();
        assert!(matches!(err, ModelError::Continuity { index: 0, .. }));
    }

    #[test]
    fn test_blank_beats_skip_continuity() {
        let seq = SequenceData::new(None)
            .push(beat("A", (S, W), (N, E)))
            .unwrap()
            .push(BeatData::blank(99))
            .unwrap()
            .push(beat("A", (W, N), (E, S)))
            .unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.beats()[1].beat_number, 2);
        assert_eq!(seq.word(), "A_A");
        assert!(seq.validate().is_ok());
    }

    #[test]
    fn test_validate_catches_numbering() {
        let mut seq = SequenceData::new(None).push(beat("A", (S, W), (N, E))).unwrap();
        seq.beats[0].beat_number = 5;
        assert!(matches!(seq.validate(), Err(ModelError::Numbering { index: 0, found: 5 })));
    }

    #[test]
    fn test_unlabeled_beat_allowed() {
        let seq = SequenceData::new(None)
            .push(beat("A", (S, W), (N, E)).with_letter(None))
            .unwrap();
        assert_eq!(seq.word(), "?");
        assert!(seq.validate().is_ok());
    }

    #[test]
    fn test_truncated() {
        let seq = SequenceData::from_beats(
            None,
            vec![beat("A", (S, W), (N, E)), beat("A", (W, N), (E, S))],
        )
        .unwrap()
        .truncated(1);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.first_position().unwrap().to_string(), "alpha1");
    }
}

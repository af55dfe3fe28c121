//! CAP transform engine.
//!
//! A CAP type names an ordered composition of four primitives (rotate,
//! mirror, swap, complement). Applying one to a base sequence transforms
//! every base beat and appends the results, so the continuation starts where
//! the base ends. That only holds when the transform carries the base start
//! onto the base end; [`CapEngine::validate_applicability`] checks it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::beat::BeatData;
use crate::constants::{HALF_STEPS, MIN_CAP_LENGTH, QUARTER_STEPS};
use crate::error::ModelError;
use crate::grid::GridPosition;
use crate::letter_determination::LetterDeterminer;
use crate::location::Orientation;
use crate::sequence::SequenceData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Rotate,
    Mirror,
    Swap,
    Complement,
}

/// How far `rotate` turns: a half turn for `Full`, a quarter for `Halved`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceSize {
    #[default]
    Full,
    Halved,
}

impl SliceSize {
    pub fn steps(self) -> u8 {
        match self {
            Self::Full => HALF_STEPS,
            Self::Halved => QUARTER_STEPS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Halved => "halved",
        }
    }
}

impl FromStr for SliceSize {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "halved" | "half" => Ok(Self::Halved),
            _ => Err(ModelError::UnknownName {
                kind: "slice size",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SliceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapParams {
    #[serde(default)]
    pub slice_size: SliceSize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapType {
    #[default]
    StrictRotated,
    StrictMirrored,
    MirroredSwapped,
    StrictSwapped,
    SwappedComplementary,
    StrictComplementary,
    RotatedComplementary,
    MirroredComplementary,
    RotatedSwapped,
    MirroredRotated,
    MirroredComplementaryRotated,
}

impl CapType {
    pub const ALL: [CapType; 11] = [
        CapType::StrictRotated,
        CapType::StrictMirrored,
        CapType::MirroredSwapped,
        CapType::StrictSwapped,
        CapType::SwappedComplementary,
        CapType::StrictComplementary,
        CapType::RotatedComplementary,
        CapType::MirroredComplementary,
        CapType::RotatedSwapped,
        CapType::MirroredRotated,
        CapType::MirroredComplementaryRotated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrictRotated => "strict_rotated",
            Self::StrictMirrored => "strict_mirrored",
            Self::MirroredSwapped => "mirrored_swapped",
            Self::StrictSwapped => "strict_swapped",
            Self::SwappedComplementary => "swapped_complementary",
            Self::StrictComplementary => "strict_complementary",
            Self::RotatedComplementary => "rotated_complementary",
            Self::MirroredComplementary => "mirrored_complementary",
            Self::RotatedSwapped => "rotated_swapped",
            Self::MirroredRotated => "mirrored_rotated",
            Self::MirroredComplementaryRotated => "mirrored_complementary_rotated",
        }
    }

    /// Primitives in application order, which is the order of the name.
    pub fn primitives(self) -> &'static [Primitive] {
        use Primitive::*;
        match self {
            Self::StrictRotated => &[Rotate],
            Self::StrictMirrored => &[Mirror],
            Self::MirroredSwapped => &[Mirror, Swap],
            Self::StrictSwapped => &[Swap],
            Self::SwappedComplementary => &[Swap, Complement],
            Self::StrictComplementary => &[Complement],
            Self::RotatedComplementary => &[Rotate, Complement],
            Self::MirroredComplementary => &[Mirror, Complement],
            Self::RotatedSwapped => &[Rotate, Swap],
            Self::MirroredRotated => &[Mirror, Rotate],
            Self::MirroredComplementaryRotated => &[Mirror, Complement, Rotate],
        }
    }

    /// Where this transform sends a grid position.
    pub fn transform_position(self, position: GridPosition, slice: SliceSize) -> GridPosition {
        self.primitives()
            .iter()
            .fold(position, |pos, primitive| match primitive {
                Primitive::Rotate => rotate_position(pos, slice),
                Primitive::Mirror => pos.mirrored(),
                Primitive::Swap => pos.swapped(),
                Primitive::Complement => pos,
            })
    }

    /// End position a base starting at `start` needs for the seam to close.
    pub fn required_end(self, start: GridPosition, slice: SliceSize) -> GridPosition {
        self.transform_position(start, slice)
    }
}

impl FromStr for CapType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ModelError::UnknownName {
                kind: "CAP type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for CapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn rotate_position(position: GridPosition, slice: SliceSize) -> GridPosition {
    position.rotated(slice.steps())
}

/// (from, to) for every position under `rotate(slice)`.
pub fn rotation_table(slice: SliceSize) -> Vec<(GridPosition, GridPosition)> {
    GridPosition::all()
        .map(|pos| (pos, rotate_position(pos, slice)))
        .collect()
}

pub fn rotate_beat(beat: &BeatData, slice: SliceSize) -> BeatData {
    let mut out = beat.clone();
    if beat.is_blank {
        return out;
    }
    let steps = slice.steps();
    out.actor1_motion = beat.actor1_motion.map(|m| m.rotated(steps));
    out.actor2_motion = beat.actor2_motion.map(|m| m.rotated(steps));
    out.metadata.rotated_from = beat.start_position();
    out.metadata.rotated_to = out.start_position();
    out
}

pub fn mirror_beat(beat: &BeatData) -> BeatData {
    let mut out = beat.clone();
    if beat.is_blank {
        return out;
    }
    out.actor1_motion = beat.actor1_motion.map(|m| m.mirrored());
    out.actor2_motion = beat.actor2_motion.map(|m| m.mirrored());
    out.metadata.is_mirrored = !beat.metadata.is_mirrored;
    out
}

pub fn swap_beat(beat: &BeatData) -> BeatData {
    let mut out = beat.clone();
    out.actor1_motion = beat.actor2_motion;
    out.actor2_motion = beat.actor1_motion;
    out
}

pub fn complement_beat(beat: &BeatData) -> BeatData {
    let mut out = beat.clone();
    out.actor1_motion = beat.actor1_motion.map(|m| m.complemented());
    out.actor2_motion = beat.actor2_motion.map(|m| m.complemented());
    out
}

/// Transform one beat by every primitive of `cap`, in order.
pub fn transform_beat(beat: &BeatData, cap: CapType, params: &CapParams) -> BeatData {
    cap.primitives()
        .iter()
        .fold(beat.clone(), |b, primitive| match primitive {
            Primitive::Rotate => rotate_beat(&b, params.slice_size),
            Primitive::Mirror => mirror_beat(&b),
            Primitive::Swap => swap_beat(&b),
            Primitive::Complement => complement_beat(&b),
        })
}

/// Why a CAP left its input alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotApplicable {
    TooShort { len: usize },
    Unpositioned,
    SeamOpen {
        required_end: GridPosition,
        end: GridPosition,
    },
}

impl fmt::Display for NotApplicable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len } => {
                write!(f, "sequence has {len} beats, need at least {MIN_CAP_LENGTH}")
            }
            Self::Unpositioned => f.write_str("sequence has no positioned beats"),
            Self::SeamOpen { required_end, end } => {
                write!(f, "base ends at {end} but the transform needs {required_end}")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CapOutcome {
    Applied { repetitions: usize },
    NotApplicable(NotApplicable),
}

#[derive(Clone, Debug)]
pub struct CapResult {
    pub sequence: SequenceData,
    pub outcome: CapOutcome,
}

impl CapResult {
    pub fn applied(&self) -> bool {
        matches!(self.outcome, CapOutcome::Applied { .. })
    }
}

/// Applies CAP transforms and relabels the transformed beats.
pub struct CapEngine<'a> {
    letters: &'a LetterDeterminer,
}

impl<'a> CapEngine<'a> {
    pub fn new(letters: &'a LetterDeterminer) -> Self {
        Self { letters }
    }

    /// Ok when `cap` can extend `seq` without breaking continuity.
    pub fn validate_applicability(
        &self,
        seq: &SequenceData,
        cap: CapType,
        params: &CapParams,
    ) -> Result<(), NotApplicable> {
        if seq.len() < MIN_CAP_LENGTH {
            return Err(NotApplicable::TooShort { len: seq.len() });
        }
        let (Some(start), Some(end)) = (seq.first_position(), seq.end_position()) else {
            return Err(NotApplicable::Unpositioned);
        };
        let required_end = cap.required_end(start, params.slice_size);
        if required_end != end {
            return Err(NotApplicable::SeamOpen { required_end, end });
        }
        Ok(())
    }

    /// Append one transformed copy of `seq`. Numbering continues from the
    /// base length. An inapplicable CAP returns the input unchanged.
    pub fn apply(
        &self,
        seq: &SequenceData,
        cap: CapType,
        params: &CapParams,
    ) -> Result<CapResult, ModelError> {
        self.extend_to(seq, cap, params, seq.len() * 2)
    }

    /// Repeat the transform, each time on the previous slice, until the
    /// sequence holds at least `length` beats; then truncate to `length`.
    /// `length` at or below the base length leaves the input unchanged.
    pub fn extend_to(
        &self,
        seq: &SequenceData,
        cap: CapType,
        params: &CapParams,
        length: usize,
    ) -> Result<CapResult, ModelError> {
        seq.validate()?;
        if let Err(reason) = self.validate_applicability(seq, cap, params) {
            tracing::info!(cap = %cap, %reason, "CAP not applicable, sequence unchanged");
            return Ok(CapResult {
                sequence: seq.clone(),
                outcome: CapOutcome::NotApplicable(reason),
            });
        }

        let slice_len = seq.len();
        let mut out = seq.clone();
        let mut repetitions = 0;
        while out.len() < length {
            let slice: Vec<BeatData> = out.beats()[out.len() - slice_len..].to_vec();
            let mut orientations = end_orientations(&out);
            for beat in &slice {
                let mut next = transform_beat(beat, cap, params);
                if let Some(prev) = orientations {
                    next = reorient(next, prev);
                }
                if !next.is_blank {
                    orientations = next
                        .motions()
                        .map(|(a, b)| (a.end_orientation, b.end_orientation));
                    next.letter = self.letters.relabel(&next);
                    if next.letter.is_none() {
                        tracing::debug!(
                            beat = out.len() + 1,
                            "no letter matches transformed beat, left unlabeled"
                        );
                    }
                }
                out = out.push(next)?;
            }
            repetitions += 1;
        }

        Ok(CapResult {
            sequence: out.truncated(length.max(slice_len)),
            outcome: CapOutcome::Applied { repetitions },
        })
    }
}

/// End orientations of the last non-blank beat.
fn end_orientations(seq: &SequenceData) -> Option<(Orientation, Orientation)> {
    seq.beats()
        .iter()
        .rev()
        .find(|b| !b.is_blank)
        .and_then(BeatData::motions)
        .map(|(a, b)| (a.end_orientation, b.end_orientation))
}

/// Start each actor where the previous beat left it.
fn reorient(mut beat: BeatData, (ori1, ori2): (Orientation, Orientation)) -> BeatData {
    beat.actor1_motion = beat.actor1_motion.map(|m| m.reoriented(ori1));
    beat.actor2_motion = beat.actor2_motion.map(|m| m.reoriented(ori2));
    beat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, REFERENCE_DATASET_JSON};
    use crate::location::Location::{self, E, N, S, W};
    use crate::location::RotationDirection;
    use crate::motion::{MotionData, MotionType, Turns};

    fn determiner() -> LetterDeterminer {
        LetterDeterminer::new(&Dataset::from_json(REFERENCE_DATASET_JSON).unwrap())
    }

    fn pos(name: &str) -> GridPosition {
        name.parse().unwrap()
    }

    fn motion(ty: MotionType, from: Location, to: Location) -> MotionData {
        MotionData::new(ty, from, to, Orientation::In)
    }

    /// alpha1 -> alpha3 -> alpha5: two A beats turning the pair a half turn.
    fn half_turn_base() -> SequenceData {
        SequenceData::from_beats(
            None,
            vec![
                BeatData::new("A", motion(MotionType::Pro, S, W), motion(MotionType::Pro, N, E)),
                BeatData::new("A", motion(MotionType::Pro, W, N), motion(MotionType::Pro, E, S)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_primitive_order_follows_name() {
        assert_eq!(CapType::MirroredRotated.primitives(), &[Primitive::Mirror, Primitive::Rotate]);
        assert_eq!(
            CapType::MirroredComplementaryRotated.primitives(),
            &[Primitive::Mirror, Primitive::Complement, Primitive::Rotate]
        );
        for cap in CapType::ALL {
            assert!(!cap.primitives().is_empty());
        }
    }

    #[test]
    fn test_parse_cap_type() {
        for cap in CapType::ALL {
            assert_eq!(cap.as_str().parse::<CapType>().unwrap(), cap);
        }
        assert_eq!("strict-rotated".parse::<CapType>().unwrap(), CapType::StrictRotated);
        assert!("spun".parse::<CapType>().is_err());
        assert_eq!(CapType::default(), CapType::StrictRotated);
    }

    #[test]
    fn test_rotation_table() {
        let full = rotation_table(SliceSize::Full);
        assert_eq!(full.len(), GridPosition::COUNT);
        for (from, to) in &full {
            assert_eq!(from.family(), to.family());
            assert_eq!(rotate_position(*to, SliceSize::Full), *from);
        }
        assert_eq!(rotate_position(pos("alpha1"), SliceSize::Halved), pos("alpha3"));
    }

    #[test]
    fn test_mirror_beat_is_involution() {
        let beat = BeatData::new(
            "C",
            motion(MotionType::Pro, S, W).with_turns(Turns::Half(2), RotationDirection::None),
            motion(MotionType::Anti, N, E).floated(),
        );
        let once = mirror_beat(&beat);
        assert!(once.metadata.is_mirrored);
        assert_eq!(once.start_position(), Some(pos("alpha1")));
        assert_eq!(once.end_position(), Some(pos("alpha7")));
        assert_eq!(mirror_beat(&once), beat);
    }

    #[test]
    fn test_swap_and_complement() {
        let a = motion(MotionType::Pro, S, W).with_turns(Turns::Half(2), RotationDirection::None);
        let b = motion(MotionType::Static, N, N);
        let beat = BeatData::new("W", a, b);
        let swapped = swap_beat(&beat);
        assert_eq!(swapped.actor1_motion, Some(b));
        assert_eq!(swapped.start_position(), Some(pos("alpha5")));

        let comp = complement_beat(&beat);
        assert_eq!(
            comp.actor1_motion.unwrap().rotation_direction,
            RotationDirection::CounterClockwise
        );
        assert_eq!(comp.actor2_motion.unwrap().rotation_direction, RotationDirection::None);
        assert_eq!(comp.start_position(), beat.start_position());
    }

    #[test]
    fn test_rotate_records_provenance() {
        let beat = BeatData::new("A", motion(MotionType::Pro, S, W), motion(MotionType::Pro, N, E));
        let rotated = rotate_beat(&beat, SliceSize::Full);
        assert_eq!(rotated.metadata.rotated_from, Some(pos("alpha1")));
        assert_eq!(rotated.metadata.rotated_to, Some(pos("alpha5")));
        assert_eq!(rotated.end_position(), Some(pos("alpha7")));
    }

    #[test]
    fn test_apply_strict_rotated() {
        let letters = determiner();
        let engine = CapEngine::new(&letters);
        let base = half_turn_base();
        let result = engine
            .apply(&base, CapType::StrictRotated, &CapParams::default())
            .unwrap();
        assert_eq!(result.outcome, CapOutcome::Applied { repetitions: 1 });
        let seq = result.sequence;
        assert_eq!(seq.len(), 4);
        assert!(seq.validate().is_ok());
        let numbers: Vec<u32> = seq.beats().iter().map(|b| b.beat_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(seq.beats()[2].start_position(), Some(pos("alpha5")));
        assert_eq!(seq.end_position(), Some(pos("alpha1")));
        assert_eq!(seq.word(), "AAAA");
    }

    #[test]
    fn test_apply_too_short_is_noop() {
        let letters = determiner();
        let engine = CapEngine::new(&letters);
        let base = half_turn_base().truncated(1);
        let result = engine
            .apply(&base, CapType::StrictRotated, &CapParams::default())
            .unwrap();
        assert_eq!(
            result.outcome,
            CapOutcome::NotApplicable(NotApplicable::TooShort { len: 1 })
        );
        assert_eq!(result.sequence, base);
    }

    #[test]
    fn test_apply_open_seam_is_noop() {
        let letters = determiner();
        let engine = CapEngine::new(&letters);
        let base = half_turn_base();
        let params = CapParams {
            slice_size: SliceSize::Halved,
        };
        let result = engine.apply(&base, CapType::StrictRotated, &params).unwrap();
        assert!(!result.applied());
        assert_eq!(result.sequence, base);
    }

    #[test]
    fn test_extend_repeats_on_previous_slice() {
        let letters = determiner();
        let engine = CapEngine::new(&letters);
        let base = half_turn_base();
        let result = engine
            .extend_to(&base, CapType::StrictRotated, &CapParams::default(), 7)
            .unwrap();
        assert_eq!(result.outcome, CapOutcome::Applied { repetitions: 3 });
        assert_eq!(result.sequence.len(), 7);
        assert!(result.sequence.validate().is_ok());
    }

    #[test]
    fn test_apply_rejects_broken_input() {
        let letters = determiner();
        let engine = CapEngine::new(&letters);
        let mut base = half_turn_base();
        let json = serde_json::to_string(&base)
            .unwrap()
            .replace("\"beat_number\":2", "\"beat_number\":9");
        base = serde_json::from_str(&json).unwrap();
        assert!(engine.apply(&base, CapType::StrictRotated, &CapParams::default()).is_err());
    }

    #[test]
    fn test_continuation_orientation_follows_base() {
        let letters = determiner();
        let engine = CapEngine::new(&letters);
        // Anti flips in/out each beat, so the continuation must pick up the flip.
        let base = SequenceData::from_beats(
            None,
            vec![
                BeatData::new("B", motion(MotionType::Anti, S, W), motion(MotionType::Anti, N, E)),
                BeatData::new(
                    "B",
                    motion(MotionType::Anti, W, N).reoriented(Orientation::Out),
                    motion(MotionType::Anti, E, S).reoriented(Orientation::Out),
                ),
            ],
        )
        .unwrap();
        let seq = engine
            .apply(&base, CapType::StrictRotated, &CapParams::default())
            .unwrap()
            .sequence;
        let third = seq.beats()[2].actor1_motion.unwrap();
        assert_eq!(third.start_orientation, Orientation::In);
        assert_eq!(third.end_orientation, Orientation::Out);
    }
}

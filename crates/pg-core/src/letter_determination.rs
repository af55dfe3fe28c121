//! Letter determination: match a motion pair against the reference dataset.
//!
//! Candidates are the dataset templates with the same start and end
//! locations as the pair. Each candidate is scored on motion type and, where
//! the template carries one, rotation direction; confidence is the fraction
//! of compared attributes that agree. A best score under
//! [`LETTER_CONFIDENCE_THRESHOLD`] is a miss, reported as a value.
//!
//! Orientation is not scored: it follows from the motion type and turns, and
//! no two letters differ by orientation alone.

use std::collections::HashMap;

use serde::Serialize;

use crate::beat::BeatData;
use crate::constants::LETTER_CONFIDENCE_THRESHOLD;
use crate::dataset::Dataset;
use crate::grid::{GridPosition, try_resolve};
use crate::location::{Location, RotationDirection};
use crate::motion::{MotionData, MotionType};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchResult {
    pub success: bool,
    pub letter: Option<String>,
    pub confidence: f64,
}

impl MatchResult {
    fn miss(confidence: f64) -> Self {
        Self {
            success: false,
            letter: None,
            confidence,
        }
    }
}

/// Comparison strategy, chosen from the shape of the motion pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Both actors floated.
    DualFloat,
    /// Both actors shift and neither is floated.
    NonHybridShift,
    /// Exactly one actor floated.
    Hybrid,
    /// At least one dash or static, nothing floated.
    NonShift,
}

/// How one actor's motion is compared against a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Comparison {
    /// Effective type plus rotation.
    Shift,
    /// Pre-float type when known, else any shift; rotation is not compared.
    Floated,
    /// Type only; stationary rotation follows the sequence, not the letter.
    Stationary,
}

impl Strategy {
    pub fn select(actor1: &MotionData, actor2: &MotionData) -> Self {
        match (actor1.is_float(), actor2.is_float()) {
            (true, true) => Self::DualFloat,
            (true, false) | (false, true) => Self::Hybrid,
            _ if actor1.motion_type.is_shift() && actor2.motion_type.is_shift() => {
                Self::NonHybridShift
            }
            _ => Self::NonShift,
        }
    }

    fn comparisons(self, actor1: &MotionData, actor2: &MotionData) -> [Comparison; 2] {
        let per_actor = |m: &MotionData| {
            if m.is_float() {
                Comparison::Floated
            } else if m.motion_type.is_shift() {
                Comparison::Shift
            } else {
                Comparison::Stationary
            }
        };
        match self {
            Self::DualFloat => [Comparison::Floated, Comparison::Floated],
            Self::NonHybridShift => [Comparison::Shift, Comparison::Shift],
            Self::Hybrid | Self::NonShift => [per_actor(actor1), per_actor(actor2)],
        }
    }
}

/// A motion reduced to what letters distinguish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Shape {
    start: Location,
    end: Location,
    /// `None` for a float with no pre-float record.
    motion_type: Option<MotionType>,
    rotation: RotationDirection,
}

impl Shape {
    /// Floats take their pre-float type. A pro rotating against its hand
    /// path reads as anti and an anti rotating with it reads as pro.
    fn of(m: &MotionData) -> Self {
        let (motion_type, rotation) = if m.is_float() {
            (
                m.prefloat_motion_type,
                m.prefloat_rotation_direction.unwrap_or_default(),
            )
        } else {
            (Some(m.motion_type), m.rotation_direction)
        };
        let path = m.hand_path();
        let motion_type = match motion_type {
            Some(MotionType::Pro) if !rotation.is_none() && rotation == path.inverted() => {
                Some(MotionType::Anti)
            }
            Some(MotionType::Anti) if !rotation.is_none() && rotation == path => {
                Some(MotionType::Pro)
            }
            other => other,
        };
        Self {
            start: m.start_location,
            end: m.end_location,
            motion_type,
            rotation,
        }
    }

    /// (matched, compared) attribute counts against a template shape.
    fn score(&self, template: &Shape, comparison: Comparison) -> (u32, u32) {
        let type_ok = match (comparison, self.motion_type, template.motion_type) {
            (Comparison::Floated, None, Some(t)) => t.is_shift(),
            (_, own, theirs) => own == theirs,
        };
        let mut matched = u32::from(type_ok);
        let mut compared = 1;
        if comparison == Comparison::Shift && !template.rotation.is_none() {
            compared += 1;
            matched += u32::from(self.rotation == template.rotation);
        }
        (matched, compared)
    }
}

#[derive(Clone, Debug)]
struct Template {
    letter: String,
    actor1: Shape,
    actor2: Shape,
}

/// Reference-dataset classifier.
#[derive(Clone, Debug, Default)]
pub struct LetterDeterminer {
    by_start: HashMap<GridPosition, Vec<Template>>,
}

impl LetterDeterminer {
    pub fn new(dataset: &Dataset) -> Self {
        let mut by_start: HashMap<GridPosition, Vec<Template>> = HashMap::new();
        for beat in dataset.templates() {
            let (Some((a, b)), Some(letter), Some(start)) =
                (beat.motions(), beat.letter.as_ref(), beat.start_position())
            else {
                continue;
            };
            by_start.entry(start).or_default().push(Template {
                letter: letter.clone(),
                actor1: Shape::of(a),
                actor2: Shape::of(b),
            });
        }
        Self { by_start }
    }

    /// Best-scoring letter for the pair. Ties go to the earliest template.
    pub fn determine(&self, actor1: &MotionData, actor2: &MotionData) -> MatchResult {
        let Some(start) = try_resolve(actor1.start_location, actor2.start_location) else {
            return MatchResult::miss(0.0);
        };
        let strategy = Strategy::select(actor1, actor2);
        let [cmp1, cmp2] = strategy.comparisons(actor1, actor2);
        let (s1, s2) = (Shape::of(actor1), Shape::of(actor2));

        let mut best: Option<(&Template, f64)> = None;
        for t in self.candidates(start, &s1, &s2) {
            let (m1, c1) = s1.score(&t.actor1, cmp1);
            let (m2, c2) = s2.score(&t.actor2, cmp2);
            let confidence = f64::from(m1 + m2) / f64::from(c1 + c2);
            if best.is_none_or(|(_, c)| confidence > c) {
                best = Some((t, confidence));
            }
        }
        match best {
            Some((t, confidence)) if confidence >= LETTER_CONFIDENCE_THRESHOLD => MatchResult {
                success: true,
                letter: Some(t.letter.clone()),
                confidence,
            },
            Some((_, confidence)) => MatchResult::miss(confidence),
            None => MatchResult::miss(0.0),
        }
    }

    /// [`LetterDeterminer::determine`] over a beat's motions. Blank beats miss.
    pub fn determine_beat(&self, beat: &BeatData) -> MatchResult {
        match beat.motions() {
            Some((a, b)) => self.determine(a, b),
            None => MatchResult::miss(0.0),
        }
    }

    /// Whether some template carrying the beat's own letter fully matches
    /// its geometry and motions.
    pub fn still_matches(&self, beat: &BeatData) -> bool {
        let (Some((a, b)), Some(letter), Some(start)) =
            (beat.motions(), beat.letter.as_deref(), beat.start_position())
        else {
            return false;
        };
        let [cmp1, cmp2] = Strategy::select(a, b).comparisons(a, b);
        let (s1, s2) = (Shape::of(a), Shape::of(b));
        self.candidates(start, &s1, &s2)
            .filter(|t| t.letter == letter)
            .any(|t| {
                let (m1, c1) = s1.score(&t.actor1, cmp1);
                let (m2, c2) = s2.score(&t.actor2, cmp2);
                m1 == c1 && m2 == c2
            })
    }

    /// Letter to carry after a transform: the beat's own letter if it still
    /// fits, else the best determination, else nothing.
    pub fn relabel(&self, beat: &BeatData) -> Option<String> {
        if self.still_matches(beat) {
            return beat.letter.clone();
        }
        self.determine_beat(beat).letter
    }

    fn candidates<'a>(
        &'a self,
        start: GridPosition,
        s1: &'a Shape,
        s2: &'a Shape,
    ) -> impl Iterator<Item = &'a Template> + 'a {
        self.by_start
            .get(&start)
            .into_iter()
            .flatten()
            .filter(move |t| t.actor1.end == s1.end && t.actor2.end == s2.end)
            .filter(move |t| t.actor1.start == s1.start && t.actor2.start == s2.start)
    }
}

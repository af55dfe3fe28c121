//! Sequence generation.
//!
//! Freeform mode walks the adjacency graph one beat at a time, narrowing the
//! candidates by letter category and (in continuous mode) rotation, then
//! dresses the chosen template with allocated turns and carries each actor's
//! orientation forward. Circular mode builds a base that ends where the CAP
//! transform needs it to, then extends it with [`CapEngine`].
//!
//! Running out of candidates is not an error: the sequence comes back short
//! and the outcome says so.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::adjacency::AdjacencyProvider;
use crate::beat::BeatData;
use crate::cap::{CapEngine, CapOutcome, CapParams, CapType, SliceSize};
use crate::constants::MIN_CAP_LENGTH;
use crate::error::ModelError;
use crate::grid::GridPosition;
use crate::letter::{LetterType, letter_in_types};
use crate::letter_determination::LetterDeterminer;
use crate::location::RotationDirection;
use crate::motion::{MotionData, MotionType, Turns};
use crate::sequence::SequenceData;
use crate::turns::TurnAllocator;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    #[default]
    Freeform,
    Circular,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freeform => "freeform",
            Self::Circular => "circular",
        }
    }
}

impl FromStr for GenerationMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "freeform" => Ok(Self::Freeform),
            "circular" => Ok(Self::Circular),
            _ => Err(ModelError::UnknownName {
                kind: "generation mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether each actor keeps one rotation direction for the whole sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropContinuity {
    Continuous,
    #[default]
    Random,
}

impl PropContinuity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continuous => "continuous",
            Self::Random => "random",
        }
    }
}

impl FromStr for PropContinuity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "continuous" => Ok(Self::Continuous),
            "random" => Ok(Self::Random),
            _ => Err(ModelError::UnknownName {
                kind: "prop continuity",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PropContinuity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    pub mode: GenerationMode,
    pub length: usize,
    pub level: u8,
    /// Target mean turns per beat, per actor.
    pub intensity: f64,
    /// Empty means every category.
    pub letter_types: Vec<LetterType>,
    pub prop_continuity: PropContinuity,
    pub cap_type: CapType,
    pub slice_size: SliceSize,
    /// Where the first beat starts; random among indexed positions if unset.
    pub start_position: Option<GridPosition>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Freeform,
            length: 8,
            level: 1,
            intensity: 1.0,
            letter_types: Vec::new(),
            prop_continuity: PropContinuity::Random,
            cap_type: CapType::default(),
            slice_size: SliceSize::default(),
            start_position: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    Complete,
    Truncated { requested: usize, produced: usize },
}

#[derive(Clone, Debug)]
pub struct GenerationResult {
    pub sequence: SequenceData,
    pub outcome: GenerationOutcome,
}

impl GenerationResult {
    fn new(sequence: SequenceData, requested: usize) -> Self {
        let produced = sequence.len();
        let outcome = if produced < requested {
            tracing::warn!(requested, produced, "generation truncated");
            GenerationOutcome::Truncated {
                requested,
                produced,
            }
        } else {
            GenerationOutcome::Complete
        };
        Self { sequence, outcome }
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == GenerationOutcome::Complete
    }
}

/// Per-call generation settings shared by every beat.
struct Walk<'r> {
    request: &'r GenerationRequest,
    /// Fixed (actor1, actor2) directions in continuous mode.
    fixed: Option<(RotationDirection, RotationDirection)>,
    /// Base end the last beat should reach so a CAP seam closes.
    seam_target: Option<GridPosition>,
}

pub struct SequenceGenerator<'a> {
    adjacency: &'a AdjacencyProvider,
    letters: &'a LetterDeterminer,
}

impl<'a> SequenceGenerator<'a> {
    pub fn new(adjacency: &'a AdjacencyProvider, letters: &'a LetterDeterminer) -> Self {
        Self { adjacency, letters }
    }

    pub fn generate(
        &self,
        request: &GenerationRequest,
        rng: &mut impl Rng,
    ) -> Result<GenerationResult, ModelError> {
        self.generate_from(SequenceData::new(request.start_position), request, rng)
    }

    /// Extend `seq` until it holds `request.length` beats.
    pub fn generate_from(
        &self,
        seq: SequenceData,
        request: &GenerationRequest,
        rng: &mut impl Rng,
    ) -> Result<GenerationResult, ModelError> {
        seq.validate()?;
        let allocator = TurnAllocator::new(request.level, request.intensity)?;
        match request.mode {
            GenerationMode::Freeform => {
                let seq = self.freeform(seq, request.length, request, &allocator, false, rng)?;
                Ok(GenerationResult::new(seq, request.length))
            }
            GenerationMode::Circular => self.circular(seq, request, &allocator, rng),
        }
    }

    fn circular(
        &self,
        seq: SequenceData,
        request: &GenerationRequest,
        allocator: &TurnAllocator,
        rng: &mut impl Rng,
    ) -> Result<GenerationResult, ModelError> {
        let base_len = (request.length / 2)
            .max(MIN_CAP_LENGTH)
            .min(request.length)
            .max(seq.len());
        let base = self.freeform(seq, base_len, request, allocator, true, rng)?;
        if base.len() < base_len || base.len() >= request.length {
            return Ok(GenerationResult::new(base, request.length));
        }

        let engine = CapEngine::new(self.letters);
        let params = CapParams {
            slice_size: request.slice_size,
        };
        let extended = engine.extend_to(&base, request.cap_type, &params, request.length)?;
        if let CapOutcome::NotApplicable(reason) = &extended.outcome {
            tracing::warn!(cap = %request.cap_type, %reason, "circular seam did not close");
        }
        Ok(GenerationResult::new(extended.sequence, request.length))
    }

    fn freeform(
        &self,
        mut seq: SequenceData,
        target_len: usize,
        request: &GenerationRequest,
        allocator: &TurnAllocator,
        close_seam: bool,
        rng: &mut impl Rng,
    ) -> Result<SequenceData, ModelError> {
        if seq.first_position().is_none() {
            let positions = self.adjacency.positions();
            match positions.choose(rng) {
                Some(&start) => seq.start_position = Some(start),
                None => return Ok(seq),
            }
        }

        let fixed = match request.prop_continuity {
            PropContinuity::Continuous => Some((random_direction(rng), random_direction(rng))),
            PropContinuity::Random => None,
        };
        let seam_target = match (close_seam, seq.first_position()) {
            (true, Some(start)) => Some(request.cap_type.required_end(start, request.slice_size)),
            _ => None,
        };
        let walk = Walk {
            request,
            fixed,
            seam_target,
        };

        let remaining = target_len.saturating_sub(seq.len());
        let (turns1, turns2) = allocator.allocate(remaining, rng);
        for (i, (&t1, &t2)) in turns1.iter().zip(&turns2).enumerate() {
            let last = i + 1 == remaining;
            let Some(beat) = self.next_beat(&seq, &walk, (t1, t2), last, rng) else {
                break;
            };
            seq = seq.push(beat)?;
        }
        Ok(seq)
    }

    /// One step of the walk; `None` when the current end has no continuation.
    fn next_beat(
        &self,
        seq: &SequenceData,
        walk: &Walk<'_>,
        (t1, t2): (Turns, Turns),
        last: bool,
        rng: &mut impl Rng,
    ) -> Option<BeatData> {
        let end = seq.end_position()?;
        if !self.adjacency.has_options(end) {
            tracing::debug!(position = %end, "no continuation from position");
            return None;
        }
        let options = self.adjacency.get_next_options(end);

        let mut pool: Vec<&BeatData> = options.iter().collect();
        pool = narrow(pool, "letter_types", |b| {
            letter_in_types(b.letter.as_deref(), &walk.request.letter_types)
        });
        if let Some((dir1, dir2)) = walk.fixed {
            pool = narrow(pool, "rotation", |b| {
                b.motions().is_some_and(|(m1, m2)| {
                    dressed(*m1, t1, dir1).rotation_direction.is_compatible_with(dir1)
                        && dressed(*m2, t2, dir2).rotation_direction.is_compatible_with(dir2)
                })
            });
        }
        if last && let Some(target) = walk.seam_target {
            pool = narrow(pool, "seam", |b| b.end_position() == Some(target));
        }

        let template = *pool.choose(rng)?;
        let (stationary1, stationary2) = match walk.fixed {
            Some(dirs) => dirs,
            None => (random_direction(rng), random_direction(rng)),
        };
        let previous = seq
            .beats()
            .iter()
            .rev()
            .find(|b| !b.is_blank)
            .and_then(BeatData::motions)
            .map(|(a, b)| (a.end_orientation, b.end_orientation));

        let mut beat = template.clone();
        beat.actor1_motion = beat.actor1_motion.map(|m| {
            let m = dressed(m, t1, stationary1);
            previous.map_or(m, |(ori, _)| m.reoriented(ori))
        });
        beat.actor2_motion = beat.actor2_motion.map(|m| {
            let m = dressed(m, t2, stationary2);
            previous.map_or(m, |(_, ori)| m.reoriented(ori))
        });
        Some(beat)
    }
}

/// Keep the candidates passing `keep`, or all of them if none do.
fn narrow<'t>(
    pool: Vec<&'t BeatData>,
    filter: &str,
    keep: impl Fn(&BeatData) -> bool,
) -> Vec<&'t BeatData> {
    let narrowed: Vec<&BeatData> = pool.iter().copied().filter(|&b| keep(b)).collect();
    if narrowed.is_empty() {
        tracing::debug!(filter, candidates = pool.len(), "filter emptied candidates, falling back");
        pool
    } else {
        narrowed
    }
}

/// A motion carrying allocated turns. A float draw floats pro and anti and
/// leaves other motions at zero turns.
fn dressed(motion: MotionData, turns: Turns, stationary: RotationDirection) -> MotionData {
    match turns {
        Turns::Float if matches!(motion.motion_type, MotionType::Pro | MotionType::Anti) => {
            motion.with_turns(Turns::ZERO, stationary).floated()
        }
        Turns::Float => motion.with_turns(Turns::ZERO, stationary),
        t => motion.with_turns(t, stationary),
    }
}

fn random_direction(rng: &mut impl Rng) -> RotationDirection {
    if rng.random_bool(0.5) {
        RotationDirection::Clockwise
    } else {
        RotationDirection::CounterClockwise
    }
}

//! Turn intensity allocator.
//!
//! Draws per-beat turn values for both actors under a running budget of
//! `intensity * beat_count` turns per actor. Float draws cost nothing toward
//! the budget. The random source is always supplied by the caller.

use rand::Rng;

use crate::constants::{MAX_HALF_TURNS, MAX_LEVEL};
use crate::error::ModelError;
use crate::motion::Turns;

/// Half-turn values a level may draw from, float excluded.
fn level_domain(level: u8) -> &'static [u8] {
    match level {
        1 => &[0],
        2 => &[0, 2, 4],
        _ => &[0, 1, 2, 3, 4, 5, 6],
    }
}

/// Highest per-beat turn value (in half turns) a level permits.
fn level_max_halves(level: u8) -> u8 {
    match level {
        1 => 0,
        2 => 4,
        _ => MAX_HALF_TURNS,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnAllocator {
    level: u8,
    intensity: f64,
}

impl TurnAllocator {
    /// `intensity` is the target mean turns per beat; it is clamped into
    /// `0..=max` for the level. Levels outside 1..=3 are rejected.
    pub fn new(level: u8, intensity: f64) -> Result<Self, ModelError> {
        if level == 0 || level > MAX_LEVEL {
            return Err(ModelError::InvalidLevel(level));
        }
        let max = f64::from(level_max_halves(level)) / 2.0;
        let intensity = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, max)
        };
        Ok(Self { level, intensity })
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Turn lists for both actors, each `beat_count` long.
    pub fn allocate(&self, beat_count: usize, rng: &mut impl Rng) -> (Vec<Turns>, Vec<Turns>) {
        let actor1 = self.allocate_one(beat_count, rng);
        let actor2 = self.allocate_one(beat_count, rng);
        (actor1, actor2)
    }

    fn allocate_one(&self, beat_count: usize, rng: &mut impl Rng) -> Vec<Turns> {
        if self.level == 1 {
            return vec![Turns::ZERO; beat_count];
        }
        let domain = level_domain(self.level);
        // Budget in half turns; floored so the mean never exceeds intensity.
        let mut remaining = (self.intensity * 2.0 * beat_count as f64).floor() as u32;
        let mut out = Vec::with_capacity(beat_count);

        for i in 0..beat_count {
            let target = f64::from(remaining) / (beat_count - i) as f64;
            let mut choices: Vec<(Turns, f64)> = domain
                .iter()
                .filter(|&&h| u32::from(h) <= remaining)
                .map(|&h| (Turns::Half(h), 1.0 / (1.0 + (f64::from(h) - target).abs())))
                .collect();
            // Float is free; weight it like a small draw.
            choices.push((Turns::Float, 0.5 / (1.0 + target)));

            let turns = sample_weighted(&choices, rng.random::<f64>());
            remaining -= u32::from(turns.half_turns());
            out.push(turns);
        }
        out
    }
}

/// Pick from `(value, weight)` pairs using a uniform draw in [0, 1).
fn sample_weighted(choices: &[(Turns, f64)], rng_val: f64) -> Turns {
    let total: f64 = choices.iter().map(|(_, w)| w).sum();
    let target = rng_val * total;
    let mut cumulative = 0.0;
    for &(turns, weight) in choices {
        cumulative += weight;
        if cumulative > target {
            return turns;
        }
    }
    choices.last().map_or(Turns::ZERO, |&(t, _)| t)
}

/// Sum of numeric turn values; float counts as zero.
pub fn total_turns(turns: &[Turns]) -> f64 {
    turns.iter().map(|t| t.value().unwrap_or(0.0)).sum()
}

use std::fmt;

use crate::grid::GridPosition;
use crate::location::Location;

/// Structural errors: malformed input or a broken invariant.
///
/// These are fatal and surface at construction or validation time, before
/// generation begins. Exhaustion and classification misses are not errors
/// and never appear here.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    UnknownName { kind: &'static str, value: String },
    OffGridPair(Location, Location),
    InvalidTurns(f64),
    InvalidMotion(String),
    InvalidBeat { beat: u32, reason: String },
    Numbering { index: usize, found: u32 },
    Continuity {
        index: usize,
        expected: GridPosition,
        found: GridPosition,
    },
    DatasetRow { row: usize, reason: String },
    LegacyMismatch(String),
    Malformed(String),
    InvalidLevel(u8),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownName { kind, value } => write!(f, "unknown {kind}: {value:?}"),
            ModelError::OffGridPair(a, b) => {
                write!(f, "locations ({a}, {b}) do not form a grid position")
            }
            ModelError::InvalidTurns(v) => {
                write!(f, "invalid turns {v}: expected 0..=3 in steps of 0.5")
            }
            ModelError::InvalidMotion(msg) => write!(f, "invalid motion: {msg}"),
            ModelError::InvalidBeat { beat, reason } => write!(f, "invalid beat {beat}: {reason}"),
            ModelError::Numbering { index, found } => {
                write!(f, "beat at index {index} numbered {found}, expected {}", index + 1)
            }
            ModelError::Continuity {
                index,
                expected,
                found,
            } => write!(
                f,
                "beat at index {index} starts at {found} but previous beat ends at {expected}"
            ),
            ModelError::DatasetRow { row, reason } => write!(f, "dataset row {row}: {reason}"),
            ModelError::LegacyMismatch(msg) => write!(f, "legacy record mismatch: {msg}"),
            ModelError::Malformed(msg) => write!(f, "malformed input: {msg}"),
            ModelError::InvalidLevel(level) => write!(f, "invalid level {level}: expected 1..=3"),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;

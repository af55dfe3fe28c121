//! Pictograph sequence engine.
//!
//! Sequences are chains of beats, each pairing the motions of two actors on
//! an eight-point grid. Consecutive beats connect end to start through named
//! grid positions. The engine generates sequences from a reference dataset,
//! extends them with CAP transforms (rotate / mirror / swap / complement),
//! and classifies motion pairs back into letters.
//!
//! Zero I/O. Randomness is always passed in by the caller.

pub mod adjacency;
pub mod beat;
pub mod cap;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod generate;
pub mod grid;
pub mod legacy;
pub mod letter;
pub mod letter_determination;
pub mod location;
pub mod motion;
pub mod sequence;
pub mod turns;

pub use adjacency::AdjacencyProvider;
pub use beat::{BeatData, BeatMetadata, Direction, Timing};
pub use cap::{
    CapEngine, CapOutcome, CapParams, CapResult, CapType, NotApplicable, Primitive, SliceSize,
    rotation_table, transform_beat,
};
pub use constants::{LETTER_CONFIDENCE_THRESHOLD, MAX_LEVEL, MIN_CAP_LENGTH};
pub use dataset::{Dataset, DatasetRow};
pub use error::ModelError;
pub use generate::{
    GenerationMode, GenerationOutcome, GenerationRequest, GenerationResult, PropContinuity,
    SequenceGenerator,
};
pub use grid::{GridPosition, POSITION_TABLE, PositionFamily, inverse, resolve, try_resolve};
pub use legacy::{LegacyBeat, export_sequence_json, from_legacy, import_sequence_json, to_legacy};
pub use letter::LetterType;
pub use letter_determination::{LetterDeterminer, MatchResult, Strategy};
pub use location::{Location, Orientation, RotationDirection};
pub use motion::{MotionData, MotionType, Turns};
pub use sequence::SequenceData;
pub use turns::TurnAllocator;

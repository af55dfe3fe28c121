//! Reference dataset of beat templates.
//!
//! Rows arrive already parsed from an external loader as flat records with
//! per-actor columns. [`Dataset::from_rows`] validates every row and turns it
//! into a [`BeatData`] template; one bad row rejects the whole dataset.

use serde::{Deserialize, Serialize};

use crate::beat::BeatData;
use crate::error::ModelError;
use crate::grid::GridPosition;
use crate::letter::LetterType;
use crate::location::{Location, Orientation, RotationDirection};
use crate::motion::{MotionData, MotionType, Turns};

/// One flat dataset row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub letter: String,
    pub start_position: GridPosition,
    pub end_position: GridPosition,
    pub actor1_motion_type: MotionType,
    pub actor1_start_location: Location,
    pub actor1_end_location: Location,
    #[serde(default)]
    pub actor1_start_orientation: Orientation,
    #[serde(default)]
    pub actor1_end_orientation: Orientation,
    #[serde(default)]
    pub actor1_rotation_direction: RotationDirection,
    #[serde(default)]
    pub actor1_turns: Turns,
    pub actor2_motion_type: MotionType,
    pub actor2_start_location: Location,
    pub actor2_end_location: Location,
    #[serde(default)]
    pub actor2_start_orientation: Orientation,
    #[serde(default)]
    pub actor2_end_orientation: Orientation,
    #[serde(default)]
    pub actor2_rotation_direction: RotationDirection,
    #[serde(default)]
    pub actor2_turns: Turns,
}

impl DatasetRow {
    /// Flatten a beat back into a row.
    pub fn from_beat(beat: &BeatData) -> Option<Self> {
        let (a, b) = beat.motions()?;
        Some(Self {
            letter: beat.letter.clone()?,
            start_position: beat.start_position()?,
            end_position: beat.end_position()?,
            actor1_motion_type: a.motion_type,
            actor1_start_location: a.start_location,
            actor1_end_location: a.end_location,
            actor1_start_orientation: a.start_orientation,
            actor1_end_orientation: a.end_orientation,
            actor1_rotation_direction: a.rotation_direction,
            actor1_turns: a.turns,
            actor2_motion_type: b.motion_type,
            actor2_start_location: b.start_location,
            actor2_end_location: b.end_location,
            actor2_start_orientation: b.start_orientation,
            actor2_end_orientation: b.end_orientation,
            actor2_rotation_direction: b.rotation_direction,
            actor2_turns: b.turns,
        })
    }

    fn to_beat(&self) -> BeatData {
        let actor1 = MotionData {
            motion_type: self.actor1_motion_type,
            rotation_direction: self.actor1_rotation_direction,
            start_location: self.actor1_start_location,
            end_location: self.actor1_end_location,
            start_orientation: self.actor1_start_orientation,
            end_orientation: self.actor1_end_orientation,
            turns: self.actor1_turns,
            prefloat_motion_type: None,
            prefloat_rotation_direction: None,
        };
        let actor2 = MotionData {
            motion_type: self.actor2_motion_type,
            rotation_direction: self.actor2_rotation_direction,
            start_location: self.actor2_start_location,
            end_location: self.actor2_end_location,
            start_orientation: self.actor2_start_orientation,
            end_orientation: self.actor2_end_orientation,
            turns: self.actor2_turns,
            prefloat_motion_type: None,
            prefloat_rotation_direction: None,
        };
        BeatData::new(&self.letter, actor1, actor2)
    }
}

/// Validated beat templates in row order.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    templates: Vec<BeatData>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<DatasetRow>) -> Result<Self, ModelError> {
        let mut templates = Vec::with_capacity(rows.len());
        for (row, raw) in rows.iter().enumerate() {
            let fail = |reason: String| ModelError::DatasetRow { row, reason };
            if LetterType::of(&raw.letter).is_none() {
                return Err(fail(format!("unknown letter {:?}", raw.letter)));
            }
            let beat = raw.to_beat();
            beat.validate().map_err(|e| fail(e.to_string()))?;
            if beat.start_position() != Some(raw.start_position)
                || beat.end_position() != Some(raw.end_position)
            {
                return Err(fail(format!(
                    "declared {} -> {} but locations give {:?} -> {:?}",
                    raw.start_position,
                    raw.end_position,
                    beat.start_position(),
                    beat.end_position()
                )));
            }
            templates.push(beat);
        }
        Ok(Self { templates })
    }

    /// Parse a JSON array of rows and validate it.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let rows: Vec<DatasetRow> =
            serde_json::from_str(json).map_err(|e| ModelError::Malformed(e.to_string()))?;
        Self::from_rows(rows)
    }

    pub fn templates(&self) -> &[BeatData] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// The reference dataset shipped with the workspace. Used by tests and
/// benchmarks; applications load their own through `pg-store`.
#[doc(hidden)]
pub const REFERENCE_DATASET_JSON: &str = include_str!("../../../data/pictograph_dataset.json");

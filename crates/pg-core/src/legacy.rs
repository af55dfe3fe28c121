//! Legacy interchange records.
//!
//! The legacy shape is a nested record per beat with per-actor attribute
//! maps (`blue_attributes` / `red_attributes`) spelled the way older tools
//! write them: `cw` / `ccw` / `no_rot` for rotation and `"fl"` for floated
//! turns. Conversion is explicit in both directions and lossless:
//! `from_legacy(&to_legacy(&beat)) == beat` for every valid beat.

use serde::{Deserialize, Serialize};

use crate::beat::{BeatData, BeatMetadata};
use crate::constants::DEFAULT_DURATION;
use crate::error::ModelError;
use crate::grid::GridPosition;
use crate::location::{Location, Orientation, RotationDirection};
use crate::motion::{MotionData, MotionType, Turns};
use crate::sequence::SequenceData;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegacyMotion {
    pub motion_type: String,
    pub start_loc: String,
    pub end_loc: String,
    pub start_ori: String,
    pub end_ori: String,
    pub prop_rot_dir: String,
    pub turns: Turns,
    #[serde(rename = "prefloat_motion_type", default, skip_serializing_if = "Option::is_none")]
    pub prefloat_motion_type: Option<String>,
    #[serde(rename = "prefloat_prop_rot_dir", default, skip_serializing_if = "Option::is_none")]
    pub prefloat_prop_rot_dir: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegacyBeat {
    pub beat: u32,
    #[serde(default)]
    pub letter: Option<String>,
    #[serde(default)]
    pub start_pos: Option<GridPosition>,
    #[serde(default)]
    pub end_pos: Option<GridPosition>,
    pub timing: String,
    pub direction: String,
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub is_blank: bool,
    #[serde(default)]
    pub is_mirrored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotated_from: Option<GridPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotated_to: Option<GridPosition>,
    #[serde(rename = "blue_attributes", alias = "actor1_attributes", default)]
    pub actor1_attributes: Option<LegacyMotion>,
    #[serde(rename = "red_attributes", alias = "actor2_attributes", default)]
    pub actor2_attributes: Option<LegacyMotion>,
}

fn default_duration() -> f64 {
    DEFAULT_DURATION
}

/// Leading record of an exported sequence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegacyHeader {
    pub word: String,
    pub sequence_id: String,
}

/// Start-position record (beat 0).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegacyStart {
    pub beat: u32,
    pub sequence_start_position: GridPosition,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum LegacyEntry {
    Header(LegacyHeader),
    Start(LegacyStart),
    Beat(Box<LegacyBeat>),
}

// --- Conversion: Domain → Legacy ---

fn rotation_to_legacy(dir: RotationDirection) -> &'static str {
    match dir {
        RotationDirection::Clockwise => "cw",
        RotationDirection::CounterClockwise => "ccw",
        RotationDirection::None => "no_rot",
    }
}

fn motion_to_legacy(m: &MotionData) -> LegacyMotion {
    LegacyMotion {
        motion_type: m.motion_type.as_str().to_string(),
        start_loc: m.start_location.as_str().to_string(),
        end_loc: m.end_location.as_str().to_string(),
        start_ori: m.start_orientation.as_str().to_string(),
        end_ori: m.end_orientation.as_str().to_string(),
        prop_rot_dir: rotation_to_legacy(m.rotation_direction).to_string(),
        turns: m.turns,
        prefloat_motion_type: m.prefloat_motion_type.map(|t| t.as_str().to_string()),
        prefloat_prop_rot_dir: m
            .prefloat_rotation_direction
            .map(|d| rotation_to_legacy(d).to_string()),
    }
}

pub fn to_legacy(beat: &BeatData) -> LegacyBeat {
    LegacyBeat {
        beat: beat.beat_number,
        letter: beat.letter.clone(),
        start_pos: beat.start_position(),
        end_pos: beat.end_position(),
        timing: beat.timing().as_str().to_string(),
        direction: beat.direction().as_str().to_string(),
        duration: beat.duration,
        is_blank: beat.is_blank,
        is_mirrored: beat.metadata.is_mirrored,
        rotated_from: beat.metadata.rotated_from,
        rotated_to: beat.metadata.rotated_to,
        actor1_attributes: beat.actor1_motion.as_ref().map(motion_to_legacy),
        actor2_attributes: beat.actor2_motion.as_ref().map(motion_to_legacy),
    }
}

// --- Conversion: Legacy → Domain ---

fn motion_from_legacy(m: &LegacyMotion) -> Result<MotionData, ModelError> {
    Ok(MotionData {
        motion_type: MotionType::parse(&m.motion_type)?,
        rotation_direction: RotationDirection::parse(&m.prop_rot_dir)?,
        start_location: m.start_loc.parse::<Location>()?,
        end_location: m.end_loc.parse::<Location>()?,
        start_orientation: Orientation::parse(&m.start_ori)?,
        end_orientation: Orientation::parse(&m.end_ori)?,
        turns: m.turns,
        prefloat_motion_type: m
            .prefloat_motion_type
            .as_deref()
            .map(MotionType::parse)
            .transpose()?,
        prefloat_rotation_direction: m
            .prefloat_prop_rot_dir
            .as_deref()
            .map(RotationDirection::parse)
            .transpose()?,
    })
}

/// Convert a legacy record to a beat. Declared positions must agree with the
/// motions; timing and direction are derived and not checked.
pub fn from_legacy(legacy: &LegacyBeat) -> Result<BeatData, ModelError> {
    let beat = BeatData {
        beat_number: legacy.beat,
        letter: legacy.letter.clone(),
        duration: legacy.duration,
        actor1_motion: legacy
            .actor1_attributes
            .as_ref()
            .map(motion_from_legacy)
            .transpose()?,
        actor2_motion: legacy
            .actor2_attributes
            .as_ref()
            .map(motion_from_legacy)
            .transpose()?,
        is_blank: legacy.is_blank,
        metadata: BeatMetadata {
            is_mirrored: legacy.is_mirrored,
            rotated_from: legacy.rotated_from,
            rotated_to: legacy.rotated_to,
        },
    };
    beat.validate_shape()?;

    let derived = (beat.start_position(), beat.end_position());
    let declared_ok = |declared: Option<GridPosition>, actual: Option<GridPosition>| {
        declared.is_none() || declared == actual
    };
    if !declared_ok(legacy.start_pos, derived.0) || !declared_ok(legacy.end_pos, derived.1) {
        return Err(ModelError::LegacyMismatch(format!(
            "beat {} declares {:?} -> {:?} but its motions give {:?} -> {:?}",
            legacy.beat, legacy.start_pos, legacy.end_pos, derived.0, derived.1
        )));
    }
    Ok(beat)
}

// --- Sequences ---

pub fn sequence_to_legacy(seq: &SequenceData) -> Vec<LegacyEntry> {
    let mut entries = vec![LegacyEntry::Header(LegacyHeader {
        word: seq.word(),
        sequence_id: seq.id.to_string(),
    })];
    if let Some(start) = seq.start_position {
        entries.push(LegacyEntry::Start(LegacyStart {
            beat: 0,
            sequence_start_position: start,
        }));
    }
    entries.extend(
        seq.beats()
            .iter()
            .map(|b| LegacyEntry::Beat(Box::new(to_legacy(b)))),
    );
    entries
}

/// Rebuild a sequence from legacy entries. Beats are renumbered in order
/// and continuity is re-checked.
pub fn sequence_from_legacy(entries: &[LegacyEntry]) -> Result<SequenceData, ModelError> {
    let mut start = None;
    let mut id = None;
    let mut beats = Vec::new();
    for entry in entries {
        match entry {
            LegacyEntry::Header(h) => id = uuid::Uuid::parse_str(&h.sequence_id).ok(),
            LegacyEntry::Start(s) => start = Some(s.sequence_start_position),
            LegacyEntry::Beat(b) => beats.push(from_legacy(b)?),
        }
    }
    let mut seq = SequenceData::from_beats(start, beats)?;
    if let Some(id) = id {
        seq.id = id;
    }
    Ok(seq)
}

/// Serialize a sequence to the legacy JSON array.
pub fn export_sequence_json(seq: &SequenceData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&sequence_to_legacy(seq))
}

/// Deserialize a legacy JSON array into a sequence.
pub fn import_sequence_json(json: &str) -> Result<SequenceData, ModelError> {
    let entries: Vec<LegacyEntry> =
        serde_json::from_str(json).map_err(|e| ModelError::Malformed(e.to_string()))?;
    sequence_from_legacy(&entries)
}

//! Plain-text rendering for stdout.

use pg_core::{
    BeatData, GridPosition, MatchResult, MotionData, RotationDirection, SequenceData,
};

pub fn motion(m: &MotionData) -> String {
    let mut out = format!(
        "{} {}->{} {}->{} turns={}",
        m.motion_type,
        m.start_location,
        m.end_location,
        m.start_orientation,
        m.end_orientation,
        m.turns
    );
    if m.rotation_direction != RotationDirection::None {
        out.push_str(&format!(" {}", m.rotation_direction));
    }
    out
}

fn position(pos: Option<GridPosition>) -> String {
    pos.map_or_else(|| "-".to_string(), |p| p.to_string())
}

pub fn beat(b: &BeatData) -> String {
    if b.is_blank {
        return format!("{:>3}  _", b.beat_number);
    }
    let letter = b.letter.as_deref().unwrap_or("?");
    let (a, r) = match b.motions() {
        Some((a, r)) => (motion(a), motion(r)),
        None => ("-".to_string(), "-".to_string()),
    };
    let mut line = format!(
        "{:>3}  {:<3} {:>7} -> {:<7}  blue: {a}  red: {r}",
        b.beat_number,
        letter,
        position(b.start_position()),
        position(b.end_position()),
    );
    if b.metadata.is_mirrored {
        line.push_str("  [mirrored]");
    }
    line
}

pub fn sequence(seq: &SequenceData) {
    println!("word:  {}", seq.word());
    println!("beats: {}", seq.len());
    println!("start: {}", position(seq.first_position()));
    println!("end:   {}", position(seq.end_position()));
    for b in seq.beats() {
        println!("{}", beat(b));
    }
}

pub fn classification(b: &BeatData, result: &MatchResult) -> String {
    let stored = b.letter.as_deref().unwrap_or("?");
    match (&result.letter, result.success) {
        (Some(letter), true) => {
            let flag = if b.letter.as_deref() == Some(letter.as_str()) {
                ""
            } else {
                "  (differs)"
            };
            format!(
                "{:>3}  {stored:<3} -> {letter:<3} confidence {:.2}{flag}",
                b.beat_number, result.confidence
            )
        }
        _ => format!(
            "{:>3}  {stored:<3} -> no match (best confidence {:.2})",
            b.beat_number, result.confidence
        ),
    }
}

//! Grid position resolver.
//!
//! Maps an ordered pair of actor locations to a named grid position and back.
//! The table covers the 32 grid-aligned pairs: both actors on the diamond
//! (N/E/S/W) or both on the box (NE/SE/SW/NW). A const assertion below
//! rejects the build if the table has a gap, a duplicate, or a family that
//! disagrees with the geometry of its pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ModelError;
use crate::location::Location::{self, E, N, NE, NW, S, SE, SW, W};

/// Position families: actors opposite, together, or a quarter apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PositionFamily {
    Alpha,
    Beta,
    Gamma,
}

impl PositionFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Gamma => "gamma",
        }
    }

    const fn size(self) -> u8 {
        match self {
            Self::Alpha | Self::Beta => 8,
            Self::Gamma => 16,
        }
    }

    const fn base_slot(self) -> usize {
        match self {
            Self::Alpha => 0,
            Self::Beta => 8,
            Self::Gamma => 16,
        }
    }
}

impl fmt::Display for PositionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named grid position such as `alpha1` or `gamma12`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPosition {
    family: PositionFamily,
    index: u8,
}

impl GridPosition {
    pub const COUNT: usize = 32;

    pub fn new(family: PositionFamily, index: u8) -> Result<Self, ModelError> {
        if index == 0 || index > family.size() {
            return Err(ModelError::UnknownName {
                kind: "grid position",
                value: format!("{family}{index}"),
            });
        }
        Ok(Self { family, index })
    }

    const fn alpha(index: u8) -> Self {
        Self {
            family: PositionFamily::Alpha,
            index,
        }
    }

    const fn beta(index: u8) -> Self {
        Self {
            family: PositionFamily::Beta,
            index,
        }
    }

    const fn gamma(index: u8) -> Self {
        Self {
            family: PositionFamily::Gamma,
            index,
        }
    }

    pub fn family(&self) -> PositionFamily {
        self.family
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    /// Dense slot in 0..32: alpha, then beta, then gamma.
    const fn slot(self) -> usize {
        self.family.base_slot() + self.index as usize - 1
    }

    /// Every position in table order.
    pub fn all() -> impl Iterator<Item = GridPosition> {
        POSITION_TABLE.iter().map(|&(_, _, pos)| pos)
    }

    /// The location pair this position names.
    pub fn locations(self) -> (Location, Location) {
        SLOT_TO_PAIR[self.slot()]
    }

    /// Rotate both locations clockwise by `steps` eighths.
    pub fn rotated(self, steps: u8) -> Self {
        let (a, b) = self.locations();
        resolve(a.rotated(steps), b.rotated(steps))
    }

    /// Reflect both locations across the north-south axis.
    pub fn mirrored(self) -> Self {
        let (a, b) = self.locations();
        resolve(a.mirrored(), b.mirrored())
    }

    /// Exchange the two actors' locations.
    pub fn swapped(self) -> Self {
        let (a, b) = self.locations();
        resolve(b, a)
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family, self.index)
    }
}

impl FromStr for GridPosition {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ModelError::UnknownName {
            kind: "grid position",
            value: s.to_string(),
        };
        let lower = s.trim().to_ascii_lowercase();
        let (family, digits) = if let Some(rest) = lower.strip_prefix("alpha") {
            (PositionFamily::Alpha, rest)
        } else if let Some(rest) = lower.strip_prefix("beta") {
            (PositionFamily::Beta, rest)
        } else if let Some(rest) = lower.strip_prefix("gamma") {
            (PositionFamily::Gamma, rest)
        } else {
            return Err(unknown());
        };
        let index: u8 = digits.parse().map_err(|_| unknown())?;
        Self::new(family, index).map_err(|_| unknown())
    }
}

impl Serialize for GridPosition {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GridPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// (actor1 location, actor2 location) → position.
pub const POSITION_TABLE: [(Location, Location, GridPosition); 32] = [
    (S, N, GridPosition::alpha(1)),
    (SW, NE, GridPosition::alpha(2)),
    (W, E, GridPosition::alpha(3)),
    (NW, SE, GridPosition::alpha(4)),
    (N, S, GridPosition::alpha(5)),
    (NE, SW, GridPosition::alpha(6)),
    (E, W, GridPosition::alpha(7)),
    (SE, NW, GridPosition::alpha(8)),
    (N, N, GridPosition::beta(1)),
    (NE, NE, GridPosition::beta(2)),
    (E, E, GridPosition::beta(3)),
    (SE, SE, GridPosition::beta(4)),
    (S, S, GridPosition::beta(5)),
    (SW, SW, GridPosition::beta(6)),
    (W, W, GridPosition::beta(7)),
    (NW, NW, GridPosition::beta(8)),
    (W, N, GridPosition::gamma(1)),
    (NW, NE, GridPosition::gamma(2)),
    (N, E, GridPosition::gamma(3)),
    (NE, SE, GridPosition::gamma(4)),
    (E, S, GridPosition::gamma(5)),
    (SE, SW, GridPosition::gamma(6)),
    (S, W, GridPosition::gamma(7)),
    (SW, NW, GridPosition::gamma(8)),
    (E, N, GridPosition::gamma(9)),
    (SE, NE, GridPosition::gamma(10)),
    (S, E, GridPosition::gamma(11)),
    (SW, SE, GridPosition::gamma(12)),
    (W, S, GridPosition::gamma(13)),
    (NW, SW, GridPosition::gamma(14)),
    (N, W, GridPosition::gamma(15)),
    (NE, NW, GridPosition::gamma(16)),
];

const fn family_matches(pos: GridPosition, offset: u8) -> bool {
    match pos.family {
        PositionFamily::Alpha => offset == 4,
        PositionFamily::Beta => offset == 0,
        PositionFamily::Gamma => {
            if pos.index <= 8 {
                offset == 2
            } else {
                offset == 6
            }
        }
    }
}

const fn table_is_complete(table: &[(Location, Location, GridPosition)]) -> bool {
    let mut seen_pairs = [false; 64];
    let mut seen_slots = [false; GridPosition::COUNT];
    let mut i = 0;
    while i < table.len() {
        let (a, b, pos) = table[i];
        let offset = a.steps_to(b);
        if offset % 2 != 0 || !family_matches(pos, offset) {
            return false;
        }
        if pos.index == 0 || pos.index > pos.family.size() {
            return false;
        }
        let pair = (a.index() * 8 + b.index()) as usize;
        let slot = pos.slot();
        if seen_pairs[pair] || seen_slots[slot] {
            return false;
        }
        seen_pairs[pair] = true;
        seen_slots[slot] = true;
        i += 1;
    }
    // 8 locations × 4 even offsets = 32 grid-aligned pairs.
    i == GridPosition::COUNT
}

const _: () = assert!(table_is_complete(&POSITION_TABLE));

const PAIR_TO_POSITION: [Option<GridPosition>; 64] = {
    let mut out = [None; 64];
    let mut i = 0;
    while i < POSITION_TABLE.len() {
        let (a, b, pos) = POSITION_TABLE[i];
        out[(a.index() * 8 + b.index()) as usize] = Some(pos);
        i += 1;
    }
    out
};

const SLOT_TO_PAIR: [(Location, Location); GridPosition::COUNT] = {
    let mut out = [(N, N); GridPosition::COUNT];
    let mut i = 0;
    while i < POSITION_TABLE.len() {
        let (a, b, pos) = POSITION_TABLE[i];
        out[pos.slot()] = (a, b);
        i += 1;
    }
    out
};

/// Checked lookup. `None` for pairs that mix the diamond and box grids.
pub fn try_resolve(actor1: Location, actor2: Location) -> Option<GridPosition> {
    PAIR_TO_POSITION[(actor1.index() * 8 + actor2.index()) as usize]
}

/// Position of a grid-aligned location pair.
///
/// # Panics
///
/// On a pair offset by an odd number of eighths. Such a pair cannot come out
/// of validated data; use [`try_resolve`] at input boundaries.
pub fn resolve(actor1: Location, actor2: Location) -> GridPosition {
    match try_resolve(actor1, actor2) {
        Some(pos) => pos,
        None => panic!("({actor1}, {actor2}) is not a grid-aligned location pair"),
    }
}

/// Every location pair that resolves to `position`.
pub fn inverse(position: GridPosition) -> Vec<(Location, Location)> {
    POSITION_TABLE
        .iter()
        .filter(|(_, _, pos)| *pos == position)
        .map(|&(a, b, _)| (a, b))
        .collect()
}

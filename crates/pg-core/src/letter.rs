use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Letter categories, partitioning the alphabet by the motion families of
/// the two actors. Types 7–9 are the role-reversed forms of types 2–4
/// (written with a trailing `'`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LetterType {
    Type1,
    Type2,
    Type3,
    Type4,
    Type5,
    Type6,
    Type7,
    Type8,
    Type9,
}

const TYPE1: &[&str] = &[
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V",
];
const TYPE2: &[&str] = &["W", "X", "Y", "Z", "Σ", "Δ", "θ", "Ω"];
const TYPE3: &[&str] = &["W-", "X-", "Y-", "Z-", "Σ-", "Δ-", "θ-", "Ω-"];
const TYPE4: &[&str] = &["Φ", "Ψ", "Λ"];
const TYPE5: &[&str] = &["Φ-", "Ψ-", "Λ-"];
const TYPE6: &[&str] = &["α", "β", "Γ"];
const TYPE7: &[&str] = &["W'", "X'", "Y'", "Z'", "Σ'", "Δ'", "θ'", "Ω'"];
const TYPE8: &[&str] = &["W-'", "X-'", "Y-'", "Z-'", "Σ-'", "Δ-'", "θ-'", "Ω-'"];
const TYPE9: &[&str] = &["Φ'", "Ψ'", "Λ'"];

impl LetterType {
    pub const ALL: [LetterType; 9] = [
        LetterType::Type1,
        LetterType::Type2,
        LetterType::Type3,
        LetterType::Type4,
        LetterType::Type5,
        LetterType::Type6,
        LetterType::Type7,
        LetterType::Type8,
        LetterType::Type9,
    ];

    pub fn letters(self) -> &'static [&'static str] {
        match self {
            Self::Type1 => TYPE1,
            Self::Type2 => TYPE2,
            Self::Type3 => TYPE3,
            Self::Type4 => TYPE4,
            Self::Type5 => TYPE5,
            Self::Type6 => TYPE6,
            Self::Type7 => TYPE7,
            Self::Type8 => TYPE8,
            Self::Type9 => TYPE9,
        }
    }

    /// Category of a letter symbol, `None` if it is not in the alphabet.
    pub fn of(letter: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.letters().contains(&letter))
    }

    /// 1-based category number.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_number(n: u8) -> Result<Self, ModelError> {
        Self::ALL
            .get(usize::from(n).wrapping_sub(1))
            .copied()
            .ok_or_else(|| ModelError::UnknownName {
                kind: "letter type",
                value: n.to_string(),
            })
    }
}

impl fmt::Display for LetterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type{}", self.number())
    }
}

/// Whether `letter` passes a category filter. An empty filter passes all.
pub fn letter_in_types(letter: Option<&str>, types: &[LetterType]) -> bool {
    if types.is_empty() {
        return true;
    }
    letter
        .and_then(LetterType::of)
        .is_some_and(|ty| types.contains(&ty))
}

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GradeError {
    #[error("unknown letter grade '{0}'")]
    Unknown(String),
}

/// Letter grade on the registrar's ordinal scale.
///
/// Comparison uses the scale rank, never the letter text: `B+` outranks `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grade {
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    DPlus,
    D,
    DMinus,
    F,
}

/// Highest grade first.
const SCALE: [(Grade, &str); 13] = [
    (Grade::APlus, "A+"),
    (Grade::A, "A"),
    (Grade::AMinus, "A-"),
    (Grade::BPlus, "B+"),
    (Grade::B, "B"),
    (Grade::BMinus, "B-"),
    (Grade::CPlus, "C+"),
    (Grade::C, "C"),
    (Grade::CMinus, "C-"),
    (Grade::DPlus, "D+"),
    (Grade::D, "D"),
    (Grade::DMinus, "D-"),
    (Grade::F, "F"),
];

impl Grade {
    pub const fn all() -> [Self; 13] {
        [
            Self::APlus,
            Self::A,
            Self::AMinus,
            Self::BPlus,
            Self::B,
            Self::BMinus,
            Self::CPlus,
            Self::C,
            Self::CMinus,
            Self::DPlus,
            Self::D,
            Self::DMinus,
            Self::F,
        ]
    }

    /// Position on the scale; `F` is 0 and `A+` is 12.
    pub const fn rank(self) -> u8 {
        match self {
            Self::APlus => 12,
            Self::A => 11,
            Self::AMinus => 10,
            Self::BPlus => 9,
            Self::B => 8,
            Self::BMinus => 7,
            Self::CPlus => 6,
            Self::C => 5,
            Self::CMinus => 4,
            Self::DPlus => 3,
            Self::D => 2,
            Self::DMinus => 1,
            Self::F => 0,
        }
    }

    pub fn letter(self) -> &'static str {
        SCALE[usize::from(12 - self.rank())].1
    }

    pub fn meets(self, minimum: Grade) -> bool {
        self >= minimum
    }

    /// Any grade above `F` earns credit.
    pub fn is_passing(self) -> bool {
        self != Self::F
    }
}

impl Ord for Grade {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Grade {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl FromStr for Grade {
    type Err = GradeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        SCALE
            .iter()
            .find(|(_, letter)| letter.eq_ignore_ascii_case(trimmed))
            .map(|(grade, _)| *grade)
            .ok_or_else(|| GradeError::Unknown(value.to_string()))
    }
}

impl TryFrom<String> for Grade {
    type Error = GradeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Grade> for String {
    fn from(value: Grade) -> Self {
        value.letter().to_string()
    }
}

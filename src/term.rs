//! Academic term identity.
//!
//! A `TermKey` names one term (season plus year) and provides the short code, long
//! label, and six-digit numeric forms used by the registrar feeds.

use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors raised while parsing term identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TermError {
    #[error("invalid term format: '{0}'")]
    InvalidTermFormat(String),
    #[error("invalid numeric term code: {0}")]
    InvalidTermCode(i64),
}

/// Season within an academic year, declared in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const fn ordered() -> [Self; 3] {
        [Self::Spring, Self::Summer, Self::Fall]
    }

    /// Two-letter code used in short term strings.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Spring => "SP",
            Self::Summer => "SM",
            Self::Fall => "FA",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        }
    }

    /// Suffix used in six-digit numeric term codes.
    pub const fn numeric_suffix(self) -> i32 {
        match self {
            Self::Spring => 10,
            Self::Summer => 60,
            Self::Fall => 90,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|season| season.code().eq_ignore_ascii_case(code))
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|season| season.label().eq_ignore_ascii_case(label.trim()))
    }

    fn from_numeric_suffix(suffix: i32) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|season| season.numeric_suffix() == suffix)
    }
}

/// Immutable identifier for an academic term.
///
/// Ordering is chronological: year first, then season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct TermKey {
    year: i32,
    season: Season,
}

impl TermKey {
    pub const fn new(season: Season, year: i32) -> Self {
        Self { year, season }
    }

    pub const fn season(&self) -> Season {
        self.season
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Short code such as `FA17`.
    pub fn short_code(&self) -> String {
        format!("{}{:02}", self.season.code(), self.year.rem_euclid(100))
    }

    /// Long label such as `Fall, 2017`.
    pub fn long_label(&self) -> String {
        format!("{}, {}", self.season.label(), self.year)
    }

    /// Six-digit numeric code such as `201790`.
    pub const fn numeric(&self) -> i32 {
        self.year
            .saturating_mul(100)
            .saturating_add(self.season.numeric_suffix())
    }

    /// The term `count` terms after this one, counting summer terms.
    pub fn advance(&self, count: u32) -> Self {
        let mut season = self.season;
        let mut year = self.year;

        for _ in 0..count {
            season = match season {
                Season::Spring => Season::Summer,
                Season::Summer => Season::Fall,
                Season::Fall => {
                    year = year.saturating_add(1);
                    Season::Spring
                }
            };
        }

        Self { year, season }
    }

    /// Parses a 2- or 4-character short term string.
    ///
    /// Four characters are a season code plus a two-digit year (suffixes of 80 and
    /// above fall in the 1900s), or a bare year between 2000 and 2999. Two characters
    /// are a bare two-digit year between 00 and 39. Bare years name the spring term.
    pub fn parse_short(value: &str) -> Result<Self, TermError> {
        let invalid = || TermError::InvalidTermFormat(value.to_string());

        if !value.is_ascii() {
            return Err(invalid());
        }

        match value.len() {
            4 => {
                let (prefix, suffix) = value.split_at(2);
                match Season::from_code(prefix) {
                    Some(season) => {
                        let short_year = parse_digits(suffix).ok_or_else(invalid)?;
                        let year = if short_year >= 80 {
                            1900 + short_year
                        } else {
                            2000 + short_year
                        };
                        Ok(Self::new(season, year))
                    }
                    None => {
                        let year = parse_digits(value).ok_or_else(invalid)?;
                        if (2000..=2999).contains(&year) {
                            Ok(Self::new(Season::Spring, year))
                        } else {
                            Err(invalid())
                        }
                    }
                }
            }
            2 => {
                let short_year = parse_digits(value).ok_or_else(invalid)?;
                if (0..40).contains(&short_year) {
                    Ok(Self::new(Season::Spring, 2000 + short_year))
                } else {
                    Err(invalid())
                }
            }
            _ => Err(invalid()),
        }
    }

    /// Builds a term from a numeric code such as `201790`.
    pub fn from_numeric(code: i32) -> Result<Self, TermError> {
        let invalid = || TermError::InvalidTermCode(i64::from(code));

        let year = code.div_euclid(100);
        if !YEARS.contains(&year) {
            return Err(invalid());
        }

        let season = Season::from_numeric_suffix(code.rem_euclid(100)).ok_or_else(invalid)?;
        Ok(Self::new(season, year))
    }

    /// Parses a six-digit numeric term string such as `"201790"`.
    pub fn parse_numeric(value: &str) -> Result<Self, TermError> {
        if value.len() != 6 {
            return Err(TermError::InvalidTermFormat(value.to_string()));
        }
        let code = parse_digits(value)
            .ok_or_else(|| TermError::InvalidTermFormat(value.to_string()))?;
        Self::from_numeric(code)
    }

    /// Parses a long label such as `"Fall, 2017"`.
    pub fn parse_long(value: &str) -> Result<Self, TermError> {
        let invalid = || TermError::InvalidTermFormat(value.to_string());

        let (label, year) = value.split_once(',').ok_or_else(invalid)?;
        let season = Season::from_label(label).ok_or_else(invalid)?;
        let year = parse_digits(year.trim())
            .filter(|year| YEARS.contains(year))
            .ok_or_else(invalid)?;

        Ok(Self::new(season, year))
    }
}

/// Years representable by the six-digit numeric code.
const YEARS: RangeInclusive<i32> = 1000..=9999;

fn parse_digits(value: &str) -> Option<i32> {
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

impl Ord for TermKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| self.season.cmp(&other.season))
    }
}

impl PartialOrd for TermKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TermKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.season.label(), self.year)
    }
}

impl FromStr for TermKey {
    type Err = TermError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_short(value)
    }
}

impl TryFrom<i32> for TermKey {
    type Error = TermError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_numeric(code)
    }
}

impl From<TermKey> for i32 {
    fn from(value: TermKey) -> Self {
        value.numeric()
    }
}

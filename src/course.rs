//! Course and exam identifiers shared by the catalog, achievement data, and engines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Registrar course number such as `M 117`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub String);

impl CourseId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CourseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Exam identifier such as `MC117`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExamId(pub String);

impl ExamId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExamId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Course numbers of the precalculus sequence and related offerings.
pub mod numbers {
    pub const M117: &str = "M 117";
    pub const M118: &str = "M 118";
    pub const M124: &str = "M 124";
    pub const M125: &str = "M 125";
    pub const M126: &str = "M 126";

    pub const MATH117: &str = "MATH117";
    pub const MATH118: &str = "MATH118";
    pub const MATH124: &str = "MATH124";
    pub const MATH125: &str = "MATH125";
    pub const MATH126: &str = "MATH126";

    pub const M1170: &str = "M 1170";
    pub const M1180: &str = "M 1180";
    pub const M1240: &str = "M 1240";
    pub const M1250: &str = "M 1250";
    pub const M1260: &str = "M 1260";

    /// Entry-level mathematics tutorial.
    pub const M100T: &str = "M 100T";
}

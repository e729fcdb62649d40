//! Per-student achievement snapshot consumed by the eligibility engines.
//!
//! The storage layer assembles one snapshot per query from completed courses,
//! transfer and placement credit, exam attempts, and current registrations. Once
//! built the snapshot cannot be changed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::course::{CourseId, ExamId};
use crate::prereq::Grade;
use crate::term::TermKey;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Special-population marker assigned by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryFlag(pub String);

impl CategoryFlag {
    pub const PCT117: &'static str = "PCT117";
    pub const PCT118: &'static str = "PCT118";
    pub const PCT124: &'static str = "PCT124";
    pub const PCT125: &'static str = "PCT125";
    pub const PCT126: &'static str = "PCT126";
    /// Access to the entry-level mathematics tutorial without a placement attempt.
    pub const ELM: &'static str = "ELM";
    /// Treat the application term as a spring term.
    pub const PLCSP: &'static str = "PLCSP";
    /// Treat the application term as a summer term.
    pub const PLCSM: &'static str = "PLCSM";
    /// Treat the application term as a fall term.
    pub const PLCFA: &'static str = "PLCFA";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryFlag {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptKind {
    Challenge,
    Placement,
    Review,
    Unit,
    Final,
}

/// One recorded exam attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamAttempt {
    pub exam_id: ExamId,
    pub attempted_at: NaiveDateTime,
    pub passed: bool,
    pub kind: AttemptKind,
    /// Course or tutorial the exam belongs to, when it belongs to one.
    pub course: Option<CourseId>,
    pub unit: Option<u8>,
}

impl ExamAttempt {
    pub fn challenge(exam_id: impl Into<ExamId>, attempted_at: NaiveDateTime, passed: bool) -> Self {
        Self {
            exam_id: exam_id.into(),
            attempted_at,
            passed,
            kind: AttemptKind::Challenge,
            course: None,
            unit: None,
        }
    }

    pub fn placement(exam_id: impl Into<ExamId>, attempted_at: NaiveDateTime) -> Self {
        Self {
            exam_id: exam_id.into(),
            attempted_at,
            passed: true,
            kind: AttemptKind::Placement,
            course: None,
            unit: None,
        }
    }

    /// Unit review exam (`kind == Review`) or proctored unit exam (`kind == Unit`).
    pub fn unit(
        kind: AttemptKind,
        exam_id: impl Into<ExamId>,
        course: impl Into<CourseId>,
        unit: u8,
        attempted_at: NaiveDateTime,
        passed: bool,
    ) -> Self {
        Self {
            exam_id: exam_id.into(),
            attempted_at,
            passed,
            kind,
            course: Some(course.into()),
            unit: Some(unit),
        }
    }

    pub fn is_for(&self, course: &CourseId, unit: u8) -> bool {
        self.course.as_ref() == Some(course) && self.unit == Some(unit)
    }
}

/// Current-term registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub course: CourseId,
    pub section: Option<String>,
    pub open_incomplete: bool,
    pub counts_toward_pace: bool,
}

impl Registration {
    pub fn new(course: impl Into<CourseId>) -> Self {
        Self {
            course: course.into(),
            section: None,
            open_incomplete: false,
            counts_toward_pace: true,
        }
    }

    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn open_incomplete(mut self, counts_toward_pace: bool) -> Self {
        self.open_incomplete = true;
        self.counts_toward_pace = counts_toward_pace;
        self
    }

    /// An open incomplete that still counts toward the student's pace.
    pub fn blocks_tutorial(&self) -> bool {
        self.open_incomplete && self.counts_toward_pace
    }
}

/// Immutable view of one student's academic history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentAchievementSet {
    student_id: StudentId,
    completed_courses: BTreeMap<CourseId, Grade>,
    transfer_credit: BTreeSet<CourseId>,
    test_credit: BTreeSet<CourseId>,
    exam_attempts: Vec<ExamAttempt>,
    active_registrations: BTreeMap<CourseId, Registration>,
    category_flags: BTreeSet<CategoryFlag>,
    application_term: Option<TermKey>,
    prerequisite_clearances: BTreeSet<CourseId>,
}

impl StudentAchievementSet {
    pub fn builder(student_id: impl Into<String>) -> StudentAchievementSetBuilder {
        StudentAchievementSetBuilder {
            set: Self {
                student_id: StudentId(student_id.into()),
                completed_courses: BTreeMap::new(),
                transfer_credit: BTreeSet::new(),
                test_credit: BTreeSet::new(),
                exam_attempts: Vec::new(),
                active_registrations: BTreeMap::new(),
                category_flags: BTreeSet::new(),
                application_term: None,
                prerequisite_clearances: BTreeSet::new(),
            },
        }
    }

    pub fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    pub fn completed_grade(&self, course: &CourseId) -> Option<Grade> {
        self.completed_courses.get(course).copied()
    }

    pub fn has_transfer_credit(&self, course: &CourseId) -> bool {
        self.transfer_credit.contains(course)
    }

    pub fn has_test_credit(&self, course: &CourseId) -> bool {
        self.test_credit.contains(course)
    }

    /// Passing completion, placement/test credit, or transfer credit.
    pub fn has_credit_for(&self, course: &CourseId) -> bool {
        self.has_passing_completion(course)
            || self.has_test_credit(course)
            || self.has_transfer_credit(course)
    }

    /// Credit that exists only because of a transfer record.
    pub fn has_credit_only_by_transfer(&self, course: &CourseId) -> bool {
        self.has_transfer_credit(course)
            && !self.has_passing_completion(course)
            && !self.has_test_credit(course)
    }

    /// Passing completion or placement/test credit; transfer records excluded.
    pub fn has_direct_credit_for(&self, course: &CourseId) -> bool {
        self.has_passing_completion(course) || self.has_test_credit(course)
    }

    fn has_passing_completion(&self, course: &CourseId) -> bool {
        self.completed_grade(course).is_some_and(Grade::is_passing)
    }

    pub fn exam_attempts(&self) -> &[ExamAttempt] {
        &self.exam_attempts
    }

    /// Earliest attempt of `exam_id`, if any.
    pub fn first_attempt_of(&self, exam_id: &ExamId) -> Option<&ExamAttempt> {
        self.exam_attempts
            .iter()
            .filter(|attempt| &attempt.exam_id == exam_id)
            .min_by_key(|attempt| attempt.attempted_at)
    }

    pub fn has_placement_attempt(&self) -> bool {
        self.exam_attempts
            .iter()
            .any(|attempt| attempt.kind == AttemptKind::Placement)
    }

    pub fn is_registered(&self, course: &CourseId) -> bool {
        self.active_registrations.contains_key(course)
    }

    pub fn registration(&self, course: &CourseId) -> Option<&Registration> {
        self.active_registrations.get(course)
    }

    pub fn registrations(&self) -> impl Iterator<Item = &Registration> {
        self.active_registrations.values()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.category_flags.iter().any(|held| held.as_str() == flag)
    }

    pub fn category_flags(&self) -> impl Iterator<Item = &CategoryFlag> {
        self.category_flags.iter()
    }

    pub fn application_term(&self) -> Option<TermKey> {
        self.application_term
    }

    /// A prior registration in `course` was marked as having met its prerequisites.
    pub fn has_prerequisite_clearance(&self, course: &CourseId) -> bool {
        self.prerequisite_clearances.contains(course)
    }
}

#[derive(Debug, Clone)]
pub struct StudentAchievementSetBuilder {
    set: StudentAchievementSet,
}

impl StudentAchievementSetBuilder {
    /// Records a completed course. A later grade for the same course replaces an
    /// earlier one only when it is higher.
    pub fn completed(mut self, course: impl Into<CourseId>, grade: Grade) -> Self {
        self.set
            .completed_courses
            .entry(course.into())
            .and_modify(|held| *held = (*held).max(grade))
            .or_insert(grade);
        self
    }

    pub fn transfer_credit(mut self, course: impl Into<CourseId>) -> Self {
        self.set.transfer_credit.insert(course.into());
        self
    }

    pub fn test_credit(mut self, course: impl Into<CourseId>) -> Self {
        self.set.test_credit.insert(course.into());
        self
    }

    pub fn attempt(mut self, attempt: ExamAttempt) -> Self {
        self.set.exam_attempts.push(attempt);
        self
    }

    pub fn registration(mut self, registration: Registration) -> Self {
        self.set
            .active_registrations
            .insert(registration.course.clone(), registration);
        self
    }

    pub fn registered(self, course: impl Into<CourseId>) -> Self {
        self.registration(Registration::new(course))
    }

    pub fn flag(mut self, flag: impl Into<CategoryFlag>) -> Self {
        self.set.category_flags.insert(flag.into());
        self
    }

    pub fn application_term(mut self, term: TermKey) -> Self {
        self.set.application_term = Some(term);
        self
    }

    pub fn prerequisite_clearance(mut self, course: impl Into<CourseId>) -> Self {
        self.set.prerequisite_clearances.insert(course.into());
        self
    }

    pub fn build(self) -> StudentAchievementSet {
        self.set
    }
}

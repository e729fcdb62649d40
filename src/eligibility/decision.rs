use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::STUDENT_DATE_FORMAT;
use crate::course::{CourseId, ExamId};

/// Exam or tutorial a decision is about.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&ExamId> for SubjectId {
    fn from(value: &ExamId) -> Self {
        Self(value.0.clone())
    }
}

impl From<&CourseId> for SubjectId {
    fn from(value: &CourseId) -> Self {
        Self(value.0.clone())
    }
}

/// Engine family that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineFamily {
    ChallengeExam,
    PrecalcTutorial,
    RemedialTutorial,
}

impl EngineFamily {
    pub fn ordered() -> [Self; 3] {
        [
            Self::ChallengeExam,
            Self::PrecalcTutorial,
            Self::RemedialTutorial,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ChallengeExam => "challenge exam",
            Self::PrecalcTutorial => "precalculus tutorial",
            Self::RemedialTutorial => "ELM tutorial",
        }
    }
}

impl fmt::Display for EngineFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why an exam or tutorial is not available. Every variant renders as a full
/// sentence for the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnavailableReason {
    AlreadyAttempted {
        on: NaiveDate,
    },
    EnrolledInCourse {
        course: CourseId,
    },
    OpenIncomplete {
        course: CourseId,
    },
    PrerequisitesNotMet {
        family: EngineFamily,
        explanation: String,
    },
    NotEligibleForTutorials,
    AlreadyCompleted {
        course: CourseId,
    },
    NotNextTutorial {
        next: Option<SubjectId>,
    },
    PlacementRequired,
    ReviewNotPassed {
        unit: u8,
    },
    TooManyFailedAttempts {
        failures: usize,
    },
    NotCurrentlyOpen {
        subject: SubjectId,
        opens_on: Option<NaiveDate>,
    },
}

impl UnavailableReason {
    pub fn sentence(&self) -> String {
        match self {
            UnavailableReason::AlreadyAttempted { on } => format!(
                "Challenge exam was already taken on {}.",
                on.format(STUDENT_DATE_FORMAT)
            ),
            UnavailableReason::EnrolledInCourse { .. } => {
                "Course challenge exam may not be taken while enrolled in the course.".to_string()
            }
            UnavailableReason::OpenIncomplete { course } => format!(
                "This tutorial may not be taken while you have an open incomplete in {course}."
            ),
            UnavailableReason::PrerequisitesNotMet {
                family,
                explanation,
            } => {
                let lead = match family {
                    EngineFamily::ChallengeExam => {
                        "In order to take Challenge Exam, you must have satisfied the prerequisites for the course."
                    }
                    EngineFamily::PrecalcTutorial | EngineFamily::RemedialTutorial => {
                        "You must satisfy the prerequisites for this tutorial before starting it."
                    }
                };
                if explanation.is_empty() {
                    lead.to_string()
                } else {
                    format!("{lead} {explanation}")
                }
            }
            UnavailableReason::NotEligibleForTutorials => {
                "Precalculus tutorials are available only to incoming students who need to complete precalculus placement.".to_string()
            }
            UnavailableReason::AlreadyCompleted { course } => {
                format!("You have already placed out of or earned credit for {course}.")
            }
            UnavailableReason::NotNextTutorial { next } => match next {
                Some(next) => format!("Your next precalculus tutorial is {next}."),
                None => "No precalculus tutorial is available to you at this time.".to_string(),
            },
            UnavailableReason::PlacementRequired => {
                "The ELM tutorial is available once you have attempted the Math Placement Exam."
                    .to_string()
            }
            UnavailableReason::ReviewNotPassed { unit } => {
                format!("You must pass the Unit {unit} Review Exam before taking the ELM Exam.")
            }
            UnavailableReason::TooManyFailedAttempts { failures } => format!(
                "You have failed the ELM Exam {failures} times since your last passing review; \
                 pass the Unit 4 Review Exam again before retrying."
            ),
            UnavailableReason::NotCurrentlyOpen { subject, opens_on } => match opens_on {
                Some(date) => format!(
                    "{subject} is not currently open; it next opens on {}.",
                    date.format(STUDENT_DATE_FORMAT)
                ),
                None => format!("{subject} is not currently open."),
            },
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sentence())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Available(SubjectId),
    Unavailable(UnavailableReason),
}

/// One explainable result per candidate exam or tutorial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityDecision {
    pub subject: SubjectId,
    pub outcome: Outcome,
}

impl EligibilityDecision {
    pub fn available(subject: SubjectId) -> Self {
        Self {
            outcome: Outcome::Available(subject.clone()),
            subject,
        }
    }

    pub fn unavailable(subject: SubjectId, reason: UnavailableReason) -> Self {
        Self {
            subject,
            outcome: Outcome::Unavailable(reason),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.outcome, Outcome::Available(_))
    }

    pub fn reason(&self) -> Option<&UnavailableReason> {
        match &self.outcome {
            Outcome::Available(_) => None,
            Outcome::Unavailable(reason) => Some(reason),
        }
    }

    pub fn summary(&self) -> String {
        match &self.outcome {
            Outcome::Available(id) => format!("{id} is available"),
            Outcome::Unavailable(reason) => reason.sentence(),
        }
    }
}

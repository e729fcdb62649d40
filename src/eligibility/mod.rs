//! Eligibility engines for challenge exams and the precalculus and ELM tutorials.
//!
//! Every engine applies the same precedence: attempt history first, then the
//! enrollment gate, then prerequisites (or an explicit override) together with the
//! access window. Each candidate yields exactly one [`EligibilityDecision`].

mod challenge;
mod context;
mod decision;
mod gates;
mod overrides;
mod precalc;
mod remedial;

#[cfg(test)]
mod tests;

use chrono::NaiveDate;

use crate::calendar::DateRangeGroup;
use crate::student::StudentAchievementSet;

pub use challenge::{challenge_exam_for, ChallengeExam, ChallengeExamEngine, CHALLENGE_EXAMS};
pub use context::{AccessCalendar, AccessSchedule, EligibilityContext};
pub use decision::{EligibilityDecision, EngineFamily, Outcome, SubjectId, UnavailableReason};
pub use overrides::{OverrideBasis, OverridePolicy, PrerequisiteOverride, DISTANCE_SECTIONS};
pub use precalc::{
    is_incoming, remap_application_term, PrecalcCourse, PrecalcTutorialEngine,
    PrecalcTutorialStatus, NEXT_TUTORIAL_PRIORITY, PRECALC_SEQUENCE,
};
pub use remedial::{RemedialTutorialEngine, RemedialTutorialStatus, ELM_EXAM};

/// Shared shape of the engine families.
///
/// Engines hold only shared, read-only catalog and calendar data, so one instance
/// can serve any number of concurrent queries.
pub trait EligibilityEngine: Send + Sync {
    fn family(&self) -> EngineFamily;

    /// One decision per candidate exam or tutorial, in a fixed order.
    fn evaluate(
        &self,
        achievements: &StudentAchievementSet,
        as_of: NaiveDate,
    ) -> Vec<EligibilityDecision>;

    fn describe_availability(&self, subject: &SubjectId, as_of: NaiveDate) -> DateRangeGroup;
}

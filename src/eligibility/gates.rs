use chrono::NaiveDate;
use tracing::{debug, info};

use super::{
    EligibilityContext, EngineFamily, PrerequisiteOverride, SubjectId, UnavailableReason,
};
use crate::course::CourseId;
use crate::prereq::Evaluator;
use crate::student::StudentAchievementSet;

/// Result of the prerequisite stage for one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PrerequisiteCheck {
    Satisfied,
    Overridden(PrerequisiteOverride),
    Unsatisfied { explanation: String },
}

impl PrerequisiteCheck {
    pub fn is_met(&self) -> bool {
        !matches!(self, PrerequisiteCheck::Unsatisfied { .. })
    }

    pub fn into_reason(self, family: EngineFamily) -> Option<UnavailableReason> {
        match self {
            PrerequisiteCheck::Unsatisfied { explanation } => {
                Some(UnavailableReason::PrerequisitesNotMet {
                    family,
                    explanation,
                })
            }
            PrerequisiteCheck::Satisfied | PrerequisiteCheck::Overridden(_) => None,
        }
    }
}

/// Evaluates the course's tree, consulting the override policy only when the tree
/// is not satisfied.
pub(crate) fn check_prerequisites(
    context: &EligibilityContext,
    achievements: &StudentAchievementSet,
    course: &CourseId,
) -> PrerequisiteCheck {
    let Some(expr) = context.catalog.requirement_for(course) else {
        if !context.catalog.is_known(course) {
            debug!(%course, "course missing from catalog; no prerequisites applied");
        }
        return PrerequisiteCheck::Satisfied;
    };

    let Some(explanation) = Evaluator::new(achievements).explain(expr) else {
        return PrerequisiteCheck::Satisfied;
    };

    match context.overrides.override_for(achievements, course) {
        Some(applied) => {
            info!(
                student_id = %achievements.student_id(),
                course = %applied.course,
                basis = %applied.basis,
                "prerequisite override applied"
            );
            PrerequisiteCheck::Overridden(applied)
        }
        None => PrerequisiteCheck::Unsatisfied { explanation },
    }
}

/// An open incomplete counting toward pace in any of `courses`.
pub(crate) fn open_incomplete(
    achievements: &StudentAchievementSet,
    courses: &[&CourseId],
) -> Option<UnavailableReason> {
    courses.iter().find_map(|course| {
        achievements
            .registration(course)
            .filter(|registration| registration.blocks_tutorial())
            .map(|registration| UnavailableReason::OpenIncomplete {
                course: registration.course.clone(),
            })
    })
}

/// Closed unless the subject's access window contains `as_of`.
pub(crate) fn access_window(
    context: &EligibilityContext,
    family: EngineFamily,
    subject: &SubjectId,
    as_of: NaiveDate,
) -> Option<UnavailableReason> {
    let availability = context.calendars.availability(family, subject, as_of);
    if availability.is_open() {
        return None;
    }

    Some(UnavailableReason::NotCurrentlyOpen {
        subject: subject.clone(),
        opens_on: availability.next_opening().and_then(|range| range.start()),
    })
}

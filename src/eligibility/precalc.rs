//! Precalculus tutorials offered to incoming students ahead of their first fall
//! term.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::gates::{access_window, check_prerequisites, open_incomplete, PrerequisiteCheck};
use super::{
    EligibilityContext, EligibilityDecision, EligibilityEngine, EngineFamily, SubjectId,
    UnavailableReason,
};
use crate::calendar::DateRangeGroup;
use crate::course::{numbers, CourseId};
use crate::prereq::Evaluator;
use crate::student::{AttemptKind, CategoryFlag, StudentAchievementSet, StudentId};
use crate::term::{Season, TermKey};

/// Unit whose passed review exam unlocks the tutorial's proctored exam.
const REVIEW_UNIT: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecalcCourse {
    pub course: &'static str,
    pub alias: &'static str,
    pub tutorial: &'static str,
    pub flag: &'static str,
}

impl PrecalcCourse {
    fn course_id(&self) -> CourseId {
        CourseId::from(self.course)
    }

    fn tutorial_id(&self) -> SubjectId {
        SubjectId::from(self.tutorial)
    }
}

/// The precalculus sequence in course-number order.
pub static PRECALC_SEQUENCE: [PrecalcCourse; 5] = [
    PrecalcCourse {
        course: numbers::M117,
        alias: numbers::MATH117,
        tutorial: numbers::M1170,
        flag: CategoryFlag::PCT117,
    },
    PrecalcCourse {
        course: numbers::M118,
        alias: numbers::MATH118,
        tutorial: numbers::M1180,
        flag: CategoryFlag::PCT118,
    },
    PrecalcCourse {
        course: numbers::M124,
        alias: numbers::MATH124,
        tutorial: numbers::M1240,
        flag: CategoryFlag::PCT124,
    },
    PrecalcCourse {
        course: numbers::M125,
        alias: numbers::MATH125,
        tutorial: numbers::M1250,
        flag: CategoryFlag::PCT125,
    },
    PrecalcCourse {
        course: numbers::M126,
        alias: numbers::MATH126,
        tutorial: numbers::M1260,
        flag: CategoryFlag::PCT126,
    },
];

/// Order in which the next tutorial is chosen. Not numeric order.
pub const NEXT_TUTORIAL_PRIORITY: [&str; 5] = [
    numbers::M124,
    numbers::M126,
    numbers::M125,
    numbers::M118,
    numbers::M117,
];

/// Overall precalculus tutorial standing for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecalcTutorialStatus {
    pub student_id: StudentId,
    pub eligible: bool,
    pub incoming: bool,
    /// Application term after category-flag adjustments.
    pub application_term: Option<TermKey>,
    pub next_tutorial: Option<SubjectId>,
    pub completed_tutorials: Vec<SubjectId>,
    pub exam_eligible_tutorials: Vec<SubjectId>,
    pub website_availability: DateRangeGroup,
}

struct CourseProgress {
    entry: &'static PrecalcCourse,
    prerequisites: PrerequisiteCheck,
    done_with: bool,
}

impl CourseProgress {
    fn is_open(&self) -> bool {
        self.prerequisites.is_met() && !self.done_with
    }
}

/// Applies placement category flags to an application term, in flag order.
pub fn remap_application_term<'a>(
    term: TermKey,
    flags: impl IntoIterator<Item = &'a CategoryFlag>,
) -> TermKey {
    flags.into_iter().fold(term, |term, flag| {
        let year = term.year();
        match flag.as_str() {
            CategoryFlag::PLCSP => match term.season() {
                Season::Spring => term,
                Season::Summer | Season::Fall => TermKey::new(Season::Spring, year + 1),
            },
            CategoryFlag::PLCSM => match term.season() {
                Season::Spring => TermKey::new(Season::Summer, year),
                Season::Summer => term,
                Season::Fall => TermKey::new(Season::Summer, year + 1),
            },
            CategoryFlag::PLCFA
            | CategoryFlag::PCT117
            | CategoryFlag::PCT118
            | CategoryFlag::PCT124
            | CategoryFlag::PCT125
            | CategoryFlag::PCT126 => TermKey::new(Season::Fall, year),
            _ => term,
        }
    })
}

/// A fall applicant during the summer or fall of that same year.
pub fn is_incoming(application_term: TermKey, active_term: TermKey) -> bool {
    application_term.season() == Season::Fall
        && matches!(active_term.season(), Season::Summer | Season::Fall)
        && application_term.year() == active_term.year()
}

#[derive(Debug, Clone)]
pub struct PrecalcTutorialEngine {
    context: EligibilityContext,
}

impl PrecalcTutorialEngine {
    pub fn new(context: EligibilityContext) -> Self {
        Self { context }
    }

    pub fn status(
        &self,
        achievements: &StudentAchievementSet,
        as_of: NaiveDate,
    ) -> PrecalcTutorialStatus {
        self.assess(achievements, as_of).0
    }

    fn assess(
        &self,
        achievements: &StudentAchievementSet,
        as_of: NaiveDate,
    ) -> (PrecalcTutorialStatus, Vec<CourseProgress>) {
        let mut progress: Vec<CourseProgress> = PRECALC_SEQUENCE
            .iter()
            .map(|entry| CourseProgress {
                entry,
                prerequisites: check_prerequisites(&self.context, achievements, &entry.course_id()),
                done_with: achievements.has_credit_for(&entry.course_id())
                    || achievements.has_credit_for(&CourseId::from(entry.alias)),
            })
            .collect();

        let needs_precalc = progress.iter().any(|course| !course.done_with);
        let has_placement = achievements.has_placement_attempt();
        let any_flagged = PRECALC_SEQUENCE
            .iter()
            .any(|entry| achievements.has_flag(entry.flag));

        for course in &mut progress {
            if course.done_with && self.reopens(achievements, course.entry) {
                info!(
                    student_id = %achievements.student_id(),
                    course = course.entry.course,
                    "tutorial reopened for transfer credit"
                );
                course.done_with = false;
            }
        }

        let application_term = achievements
            .application_term()
            .map(|term| remap_application_term(term, achievements.category_flags()));
        let incoming = application_term
            .is_some_and(|term| is_incoming(term, self.context.active_term));
        let eligible = incoming && ((has_placement && needs_precalc) || any_flagged);

        let next = select_next(&progress, has_placement);
        let exam_eligible_tutorials = exam_eligible(achievements, next);

        let website_availability = if eligible {
            self.context
                .calendars
                .family_availability(EngineFamily::PrecalcTutorial, as_of)
        } else {
            DateRangeGroup::default()
        };

        let status = PrecalcTutorialStatus {
            student_id: achievements.student_id().clone(),
            eligible,
            incoming,
            application_term,
            next_tutorial: next.map(PrecalcCourse::tutorial_id),
            completed_tutorials: progress
                .iter()
                .filter(|course| course.done_with)
                .map(|course| course.entry.tutorial_id())
                .collect(),
            exam_eligible_tutorials,
            website_availability,
        };

        debug!(
            student_id = %status.student_id,
            eligible = status.eligible,
            next = ?status.next_tutorial,
            "precalculus tutorial status"
        );

        (status, progress)
    }

    /// Flagged students whose credit came only by transfer may retake the tutorial.
    /// Direct or test credit under either course number keeps it closed.
    fn reopens(&self, achievements: &StudentAchievementSet, entry: &PrecalcCourse) -> bool {
        if !achievements.has_flag(entry.flag) {
            return false;
        }

        let ids = [entry.course_id(), CourseId::from(entry.alias)];
        if ids.iter().any(|id| achievements.has_direct_credit_for(id)) {
            return false;
        }

        let by_transfer = ids
            .iter()
            .any(|id| achievements.has_credit_only_by_transfer(id));
        if entry.course == numbers::M125 {
            return by_transfer || self.satisfied_by_transfer(achievements, numbers::M126);
        }
        by_transfer
    }

    fn satisfied_by_transfer(&self, achievements: &StudentAchievementSet, course: &str) -> bool {
        self.context
            .catalog
            .requirement_for(&CourseId::from(course))
            .is_some_and(|expr| Evaluator::new(achievements).is_satisfied_by_transfer(expr))
    }

    fn decide(
        &self,
        achievements: &StudentAchievementSet,
        status: &PrecalcTutorialStatus,
        course: &CourseProgress,
        as_of: NaiveDate,
    ) -> EligibilityDecision {
        let subject = course.entry.tutorial_id();
        match self.blocking_reason(achievements, status, course, &subject, as_of) {
            Some(reason) => EligibilityDecision::unavailable(subject, reason),
            None => EligibilityDecision::available(subject),
        }
    }

    fn blocking_reason(
        &self,
        achievements: &StudentAchievementSet,
        status: &PrecalcTutorialStatus,
        course: &CourseProgress,
        subject: &SubjectId,
        as_of: NaiveDate,
    ) -> Option<UnavailableReason> {
        if !status.eligible {
            return Some(UnavailableReason::NotEligibleForTutorials);
        }

        let course_id = course.entry.course_id();
        let tutorial_course = CourseId::from(course.entry.tutorial);
        if let Some(reason) = open_incomplete(achievements, &[&course_id, &tutorial_course]) {
            return Some(reason);
        }

        if status.next_tutorial.as_ref() == Some(subject) {
            return access_window(&self.context, EngineFamily::PrecalcTutorial, subject, as_of);
        }

        if course.done_with {
            return Some(UnavailableReason::AlreadyCompleted { course: course_id });
        }

        if let Some(reason) = course
            .prerequisites
            .clone()
            .into_reason(EngineFamily::PrecalcTutorial)
        {
            return Some(reason);
        }

        Some(UnavailableReason::NotNextTutorial {
            next: status.next_tutorial.clone(),
        })
    }
}

/// First course in priority order that is open; 117 for any student who has
/// attempted placement.
fn select_next(progress: &[CourseProgress], has_placement: bool) -> Option<&'static PrecalcCourse> {
    let entry_for = |course: &str| progress.iter().find(|held| held.entry.course == course);

    NEXT_TUTORIAL_PRIORITY
        .iter()
        .filter_map(|course| entry_for(*course))
        .find(|held| held.is_open())
        .or_else(|| entry_for(numbers::M117).filter(|_| has_placement))
        .map(|held| held.entry)
}

fn exam_eligible(
    achievements: &StudentAchievementSet,
    next: Option<&'static PrecalcCourse>,
) -> Vec<SubjectId> {
    let flagged = PRECALC_SEQUENCE
        .iter()
        .filter(|entry| achievements.has_flag(entry.flag));

    let mut tutorials = Vec::new();
    for entry in next.into_iter().chain(flagged) {
        let tutorial = entry.tutorial_id();
        if !tutorials.contains(&tutorial) && passed_review(achievements, entry) {
            tutorials.push(tutorial);
        }
    }
    tutorials
}

fn passed_review(achievements: &StudentAchievementSet, entry: &PrecalcCourse) -> bool {
    let tutorial = CourseId::from(entry.tutorial);
    achievements.exam_attempts().iter().any(|attempt| {
        attempt.kind == AttemptKind::Review
            && attempt.passed
            && attempt.is_for(&tutorial, REVIEW_UNIT)
    })
}

impl EligibilityEngine for PrecalcTutorialEngine {
    fn family(&self) -> EngineFamily {
        EngineFamily::PrecalcTutorial
    }

    fn evaluate(
        &self,
        achievements: &StudentAchievementSet,
        as_of: NaiveDate,
    ) -> Vec<EligibilityDecision> {
        let (status, progress) = self.assess(achievements, as_of);
        progress
            .iter()
            .map(|course| self.decide(achievements, &status, course, as_of))
            .collect()
    }

    fn describe_availability(&self, subject: &SubjectId, as_of: NaiveDate) -> DateRangeGroup {
        self.context
            .calendars
            .availability(EngineFamily::PrecalcTutorial, subject, as_of)
    }
}

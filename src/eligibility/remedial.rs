//! Entry-level mathematics (ELM) tutorial and its proctored exam.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::gates::{access_window, open_incomplete};
use super::{
    EligibilityContext, EligibilityDecision, EligibilityEngine, EngineFamily, SubjectId,
    UnavailableReason,
};
use crate::calendar::DateRangeGroup;
use crate::course::{numbers, CourseId};
use crate::student::{AttemptKind, CategoryFlag, ExamAttempt, StudentAchievementSet, StudentId};

pub const ELM_EXAM: &str = "ELM";

/// Unit whose proctored exam is the ELM exam.
const EXAM_UNIT: u8 = 4;
const UNIT_THREE: u8 = 3;
/// Failed ELM exams allowed after a passing review before another review is required.
const MAX_FAILURES_SINCE_REVIEW: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemedialTutorialStatus {
    pub student_id: StudentId,
    pub tutorial_eligible: bool,
    pub exam_eligible: bool,
    pub exam_passed: bool,
    pub unit3_passed: bool,
    pub latest_passing_review: Option<NaiveDateTime>,
    pub failed_exams_since_review: usize,
    pub availability: DateRangeGroup,
}

#[derive(Debug, Clone)]
pub struct RemedialTutorialEngine {
    context: EligibilityContext,
}

impl RemedialTutorialEngine {
    pub fn new(context: EligibilityContext) -> Self {
        Self { context }
    }

    pub fn status(
        &self,
        achievements: &StudentAchievementSet,
        as_of: NaiveDate,
    ) -> RemedialTutorialStatus {
        let tutorial = CourseId::from(numbers::M100T);
        let tutorial_eligible =
            achievements.has_placement_attempt() || achievements.has_flag(CategoryFlag::ELM);

        let latest_passing_review = achievements
            .exam_attempts()
            .iter()
            .filter(|attempt| {
                attempt.kind == AttemptKind::Review
                    && attempt.passed
                    && attempt.is_for(&tutorial, EXAM_UNIT)
            })
            .map(|attempt| attempt.attempted_at)
            .max();

        let unit_exams: Vec<&ExamAttempt> = achievements
            .exam_attempts()
            .iter()
            .filter(|attempt| {
                attempt.kind == AttemptKind::Unit && attempt.course.as_ref() == Some(&tutorial)
            })
            .collect();

        let unit3_passed = unit_exams
            .iter()
            .any(|attempt| attempt.unit == Some(UNIT_THREE) && attempt.passed);
        let exam_passed = unit_exams
            .iter()
            .any(|attempt| attempt.unit == Some(EXAM_UNIT) && attempt.passed);
        let failed_exams_since_review = latest_passing_review.map_or(0, |review| {
            unit_exams
                .iter()
                .filter(|attempt| {
                    attempt.unit == Some(EXAM_UNIT)
                        && !attempt.passed
                        && attempt.attempted_at > review
                })
                .count()
        });

        let exam_eligible = latest_passing_review.is_some()
            && failed_exams_since_review < MAX_FAILURES_SINCE_REVIEW;

        let status = RemedialTutorialStatus {
            student_id: achievements.student_id().clone(),
            tutorial_eligible,
            exam_eligible,
            exam_passed,
            unit3_passed,
            latest_passing_review,
            failed_exams_since_review,
            availability: self
                .context
                .calendars
                .family_availability(EngineFamily::RemedialTutorial, as_of),
        };

        debug!(
            student_id = %status.student_id,
            tutorial_eligible = status.tutorial_eligible,
            exam_eligible = status.exam_eligible,
            failures = status.failed_exams_since_review,
            "ELM tutorial status"
        );
        status
    }

    fn tutorial_reason(
        &self,
        achievements: &StudentAchievementSet,
        status: &RemedialTutorialStatus,
        subject: &SubjectId,
        as_of: NaiveDate,
    ) -> Option<UnavailableReason> {
        let tutorial = CourseId::from(numbers::M100T);
        if let Some(reason) = open_incomplete(achievements, &[&tutorial]) {
            return Some(reason);
        }
        if !status.tutorial_eligible {
            return Some(UnavailableReason::PlacementRequired);
        }
        access_window(&self.context, EngineFamily::RemedialTutorial, subject, as_of)
    }

    fn exam_reason(
        &self,
        achievements: &StudentAchievementSet,
        status: &RemedialTutorialStatus,
        subject: &SubjectId,
        as_of: NaiveDate,
    ) -> Option<UnavailableReason> {
        let tutorial = CourseId::from(numbers::M100T);
        if let Some(reason) = open_incomplete(achievements, &[&tutorial]) {
            return Some(reason);
        }
        if status.latest_passing_review.is_none() {
            return Some(UnavailableReason::ReviewNotPassed { unit: EXAM_UNIT });
        }
        if !status.exam_eligible {
            return Some(UnavailableReason::TooManyFailedAttempts {
                failures: status.failed_exams_since_review,
            });
        }
        access_window(&self.context, EngineFamily::RemedialTutorial, subject, as_of)
    }
}

impl EligibilityEngine for RemedialTutorialEngine {
    fn family(&self) -> EngineFamily {
        EngineFamily::RemedialTutorial
    }

    fn evaluate(
        &self,
        achievements: &StudentAchievementSet,
        as_of: NaiveDate,
    ) -> Vec<EligibilityDecision> {
        let status = self.status(achievements, as_of);

        let tutorial = SubjectId::from(numbers::M100T);
        let tutorial_decision = match self.tutorial_reason(achievements, &status, &tutorial, as_of) {
            Some(reason) => EligibilityDecision::unavailable(tutorial, reason),
            None => EligibilityDecision::available(tutorial),
        };

        let exam = SubjectId::from(ELM_EXAM);
        let exam_decision = match self.exam_reason(achievements, &status, &exam, as_of) {
            Some(reason) => EligibilityDecision::unavailable(exam, reason),
            None => EligibilityDecision::available(exam),
        };

        vec![tutorial_decision, exam_decision]
    }

    fn describe_availability(&self, subject: &SubjectId, as_of: NaiveDate) -> DateRangeGroup {
        self.context
            .calendars
            .availability(EngineFamily::RemedialTutorial, subject, as_of)
    }
}

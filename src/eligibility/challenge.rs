//! Challenge exams: a one-time equivalency exam per precalculus course.

use chrono::NaiveDate;
use tracing::debug;

use super::gates::{access_window, check_prerequisites};
use super::{
    EligibilityContext, EligibilityDecision, EligibilityEngine, EngineFamily, SubjectId,
    UnavailableReason,
};
use crate::calendar::DateRangeGroup;
use crate::course::{numbers, CourseId, ExamId};
use crate::student::StudentAchievementSet;

/// Course, its catalog alias, and its challenge exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeExam {
    pub course: &'static str,
    pub alias: &'static str,
    pub exam: &'static str,
}

impl ChallengeExam {
    pub fn course_id(&self) -> CourseId {
        CourseId::from(self.course)
    }

    pub fn exam_id(&self) -> ExamId {
        ExamId::from(self.exam)
    }

    fn matches(&self, course: &str) -> bool {
        self.course == course || self.alias == course
    }
}

pub static CHALLENGE_EXAMS: [ChallengeExam; 5] = [
    ChallengeExam {
        course: numbers::M117,
        alias: numbers::MATH117,
        exam: "MC117",
    },
    ChallengeExam {
        course: numbers::M118,
        alias: numbers::MATH118,
        exam: "MC118",
    },
    ChallengeExam {
        course: numbers::M124,
        alias: numbers::MATH124,
        exam: "MC124",
    },
    ChallengeExam {
        course: numbers::M125,
        alias: numbers::MATH125,
        exam: "MC125",
    },
    ChallengeExam {
        course: numbers::M126,
        alias: numbers::MATH126,
        exam: "MC126",
    },
];

/// Resolves a course number or its alias to the challenge exam.
pub fn challenge_exam_for(course: &str) -> Option<&'static ChallengeExam> {
    CHALLENGE_EXAMS.iter().find(|exam| exam.matches(course))
}

#[derive(Debug, Clone)]
pub struct ChallengeExamEngine {
    context: EligibilityContext,
}

impl ChallengeExamEngine {
    pub fn new(context: EligibilityContext) -> Self {
        Self { context }
    }

    /// Decision for the challenge exam of `course` (course number or alias).
    pub fn decide(
        &self,
        achievements: &StudentAchievementSet,
        course: &str,
        as_of: NaiveDate,
    ) -> Option<EligibilityDecision> {
        challenge_exam_for(course).map(|exam| self.decide_exam(achievements, exam, as_of))
    }

    fn decide_exam(
        &self,
        achievements: &StudentAchievementSet,
        exam: &ChallengeExam,
        as_of: NaiveDate,
    ) -> EligibilityDecision {
        let subject = SubjectId::from(exam.exam);
        let decision = match self.blocking_reason(achievements, exam, &subject, as_of) {
            Some(reason) => EligibilityDecision::unavailable(subject, reason),
            None => EligibilityDecision::available(subject),
        };

        debug!(
            student_id = %achievements.student_id(),
            course = exam.course,
            available = decision.is_available(),
            "challenge exam decision"
        );
        decision
    }

    fn blocking_reason(
        &self,
        achievements: &StudentAchievementSet,
        exam: &ChallengeExam,
        subject: &SubjectId,
        as_of: NaiveDate,
    ) -> Option<UnavailableReason> {
        if let Some(attempt) = achievements.first_attempt_of(&exam.exam_id()) {
            return Some(UnavailableReason::AlreadyAttempted {
                on: attempt.attempted_at.date(),
            });
        }

        let course = exam.course_id();
        if achievements.is_registered(&course)
            || achievements.is_registered(&CourseId::from(exam.alias))
        {
            return Some(UnavailableReason::EnrolledInCourse { course });
        }

        if let Some(reason) = check_prerequisites(&self.context, achievements, &course)
            .into_reason(EngineFamily::ChallengeExam)
        {
            return Some(reason);
        }

        access_window(&self.context, EngineFamily::ChallengeExam, subject, as_of)
    }
}

impl EligibilityEngine for ChallengeExamEngine {
    fn family(&self) -> EngineFamily {
        EngineFamily::ChallengeExam
    }

    fn evaluate(
        &self,
        achievements: &StudentAchievementSet,
        as_of: NaiveDate,
    ) -> Vec<EligibilityDecision> {
        CHALLENGE_EXAMS
            .iter()
            .map(|exam| self.decide_exam(achievements, exam, as_of))
            .collect()
    }

    fn describe_availability(&self, subject: &SubjectId, as_of: NaiveDate) -> DateRangeGroup {
        self.context
            .calendars
            .availability(EngineFamily::ChallengeExam, subject, as_of)
    }
}

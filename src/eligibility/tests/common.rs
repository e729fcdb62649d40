use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::calendar::{BlackoutInterval, CalendarWindow, DateRange};
use crate::eligibility::{
    AccessCalendar, AccessSchedule, EligibilityContext, EligibilityDecision, EngineFamily,
    SubjectId, UnavailableReason,
};
use crate::prereq::{Grade, PrereqExpr, PrerequisiteCatalog};
use crate::student::{StudentAchievementSet, StudentAchievementSetBuilder};
use crate::term::{Season, TermKey};

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

pub(super) fn at(month: u32, day: u32) -> NaiveDateTime {
    date(month, day).and_hms_opt(10, 30, 0).expect("valid time")
}

/// Mid-July, inside the summer tutorial window.
pub(super) fn as_of() -> NaiveDate {
    date(7, 15)
}

pub(super) fn active_term() -> TermKey {
    TermKey::new(Season::Summer, 2025)
}

pub(super) fn catalog() -> Arc<PrerequisiteCatalog> {
    let catalog = PrerequisiteCatalog::builder()
        .course("M 100T")
        .course("M 101")
        .requires(
            "M 117",
            PrereqExpr::any(vec![
                PrereqExpr::simple("M 100T", Grade::C),
                PrereqExpr::simple("M 101", Grade::C),
            ]),
        )
        .requires("M 118", PrereqExpr::simple("M 117", Grade::C))
        .requires("M 124", PrereqExpr::concurrent("M 118", Grade::C))
        .requires("M 125", PrereqExpr::simple("M 117", Grade::C))
        .requires(
            "M 126",
            PrereqExpr::all(vec![
                PrereqExpr::simple("M 124", Grade::C),
                PrereqExpr::simple("M 125", Grade::C),
            ]),
        )
        .build()
        .expect("fixture catalog is valid");

    Arc::new(catalog)
}

pub(super) fn calendars() -> Arc<AccessCalendar> {
    let tutorial_window = DateRange::between(date(6, 1), date(8, 20)).expect("valid range");
    let calendar = AccessCalendar::new()
        .with_family(
            EngineFamily::ChallengeExam,
            AccessSchedule::OutsideBlackouts(CalendarWindow::new(vec![BlackoutInterval::new(
                date(8, 1),
                date(8, 5),
            )])),
        )
        .with_family(
            EngineFamily::PrecalcTutorial,
            AccessSchedule::Between(tutorial_window),
        )
        .with_family(
            EngineFamily::RemedialTutorial,
            AccessSchedule::OutsideBlackouts(CalendarWindow::new(vec![BlackoutInterval::new(
                date(7, 1),
                date(7, 4),
            )])),
        );

    Arc::new(calendar)
}

pub(super) fn context() -> EligibilityContext {
    EligibilityContext::new(catalog(), calendars(), active_term())
}

pub(super) fn student(id: &str) -> StudentAchievementSetBuilder {
    StudentAchievementSet::builder(id)
}

/// A fall 2025 applicant, which makes them incoming during summer 2025.
pub(super) fn incoming(id: &str) -> StudentAchievementSetBuilder {
    student(id).application_term(TermKey::new(Season::Fall, 2025))
}

pub(super) fn decision_for<'a>(
    decisions: &'a [EligibilityDecision],
    subject: &str,
) -> &'a EligibilityDecision {
    decisions
        .iter()
        .find(|decision| decision.subject == SubjectId::from(subject))
        .unwrap_or_else(|| panic!("no decision for {subject}"))
}

pub(super) fn reason_for<'a>(
    decisions: &'a [EligibilityDecision],
    subject: &str,
) -> &'a UnavailableReason {
    match decision_for(decisions, subject).reason() {
        Some(reason) => reason,
        None => panic!("expected {subject} to be unavailable"),
    }
}

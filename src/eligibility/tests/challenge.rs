use super::common::*;
use crate::eligibility::{
    ChallengeExamEngine, EligibilityEngine, EngineFamily, OverrideBasis, OverridePolicy, Outcome,
    SubjectId, UnavailableReason,
};
use crate::prereq::Grade;
use crate::student::{ExamAttempt, Registration};

fn engine() -> ChallengeExamEngine {
    ChallengeExamEngine::new(context())
}

#[test]
fn evaluates_every_challenge_exam_in_course_order() {
    let set = student("830000100").build();

    let decisions = engine().evaluate(&set, as_of());

    let subjects: Vec<&str> = decisions
        .iter()
        .map(|decision| decision.subject.as_str())
        .collect();
    assert_eq!(subjects, ["MC117", "MC118", "MC124", "MC125", "MC126"]);
}

#[test]
fn any_prior_attempt_is_terminal() {
    let failed = student("830000101")
        .completed("M 100T", Grade::A)
        .attempt(ExamAttempt::challenge("MC117", at(3, 4), false))
        .build();
    let passed = student("830000102")
        .completed("M 100T", Grade::A)
        .attempt(ExamAttempt::challenge("MC117", at(3, 4), true))
        .registered("M 117")
        .build();

    for set in [&failed, &passed] {
        let decisions = engine().evaluate(set, as_of());
        let reason = reason_for(&decisions, "MC117");
        assert_eq!(
            reason.sentence(),
            "Challenge exam was already taken on 03/04/2025."
        );
    }
}

#[test]
fn earliest_attempt_date_is_reported() {
    let set = student("830000103")
        .attempt(ExamAttempt::challenge("MC125", at(5, 2), true))
        .attempt(ExamAttempt::challenge("MC125", at(1, 20), false))
        .build();

    let decisions = engine().evaluate(&set, as_of());

    match reason_for(&decisions, "MC125") {
        UnavailableReason::AlreadyAttempted { on } => assert_eq!(*on, date(1, 20)),
        other => panic!("expected already attempted, got {other:?}"),
    }
}

#[test]
fn enrollment_blocks_even_with_prerequisites() {
    let set = student("830000104")
        .completed("M 117", Grade::A)
        .registered("M 118")
        .build();

    let decisions = engine().evaluate(&set, as_of());

    let reason = reason_for(&decisions, "MC118");
    assert!(matches!(reason, UnavailableReason::EnrolledInCourse { .. }));
    assert!(reason
        .sentence()
        .contains("may not be taken while enrolled"));
}

#[test]
fn enrollment_under_catalog_alias_also_blocks() {
    let set = student("830000105")
        .completed("M 117", Grade::A)
        .registration(Registration::new("MATH118"))
        .build();

    let decision = engine()
        .decide(&set, "MATH118", as_of())
        .expect("alias resolves to MC118");

    assert_eq!(decision.subject, SubjectId::from("MC118"));
    assert!(matches!(
        decision.reason(),
        Some(UnavailableReason::EnrolledInCourse { .. })
    ));
    assert!(engine().decide(&set, "M 160", as_of()).is_none());
}

#[test]
fn unmet_prerequisites_explain_the_missing_course() {
    let set = student("830000106").completed("M 117", Grade::D).build();

    let decisions = engine().evaluate(&set, as_of());

    let sentence = reason_for(&decisions, "MC118").sentence();
    assert!(sentence.starts_with(
        "In order to take Challenge Exam, you must have satisfied the prerequisites for the course."
    ));
    assert!(sentence.contains("M 117"));
    assert!(sentence.ends_with('.'));
}

#[test]
fn satisfied_prerequisites_inside_window_are_available() {
    let set = student("830000107").completed("M 117", Grade::C).build();

    let decisions = engine().evaluate(&set, as_of());

    assert_eq!(
        decision_for(&decisions, "MC118").outcome,
        Outcome::Available(SubjectId::from("MC118"))
    );
    assert!(decision_for(&decisions, "MC125").is_available());
    assert!(!decision_for(&decisions, "MC126").is_available());
}

#[test]
fn concurrent_registration_satisfies_a_concurrent_leaf() {
    let set = student("830000108")
        .completed("M 117", Grade::B)
        .registered("M 118")
        .build();

    let decisions = engine().evaluate(&set, as_of());

    assert!(decision_for(&decisions, "MC124").is_available());
}

#[test]
fn category_flag_substitutes_for_prerequisites() {
    let set = student("830000109").flag("PCT124").build();

    let decisions = engine().evaluate(&set, as_of());

    assert!(decision_for(&decisions, "MC124").is_available());
    assert!(!decision_for(&decisions, "MC126").is_available());
}

#[test]
fn overrides_never_bypass_enrollment_or_history() {
    let set = student("830000110")
        .flag("PCT124")
        .registered("M 124")
        .prerequisite_clearance("M 126")
        .attempt(ExamAttempt::challenge("MC126", at(2, 14), false))
        .build();

    let decisions = engine().evaluate(&set, as_of());

    assert!(matches!(
        reason_for(&decisions, "MC124"),
        UnavailableReason::EnrolledInCourse { .. }
    ));
    assert!(matches!(
        reason_for(&decisions, "MC126"),
        UnavailableReason::AlreadyAttempted { .. }
    ));
}

#[test]
fn empty_override_policy_ignores_flags() {
    let engine = ChallengeExamEngine::new(context().with_overrides(OverridePolicy::none()));
    let set = student("830000111").flag("PCT124").build();

    let decisions = engine.evaluate(&set, as_of());

    assert!(matches!(
        reason_for(&decisions, "MC124"),
        UnavailableReason::PrerequisitesNotMet {
            family: EngineFamily::ChallengeExam,
            ..
        }
    ));
}

#[test]
fn distance_section_opens_m117() {
    let policy = OverridePolicy::default();
    let set = student("830000112")
        .registration(Registration::new("M 117").in_section("801"))
        .build();

    let applied = policy
        .override_for(&set, &"M 117".into())
        .expect("section 801 applies");
    assert_eq!(applied.basis, OverrideBasis::DistanceSection("801".to_string()));

    let decisions = engine().evaluate(&set, as_of());
    assert!(matches!(
        reason_for(&decisions, "MC117"),
        UnavailableReason::EnrolledInCourse { .. }
    ));
}

#[test]
fn closed_window_reports_next_opening() {
    let set = student("830000113").completed("M 117", Grade::A).build();

    let decisions = engine().evaluate(&set, date(8, 3));

    match reason_for(&decisions, "MC118") {
        UnavailableReason::NotCurrentlyOpen { subject, opens_on } => {
            assert_eq!(subject, &SubjectId::from("MC118"));
            assert_eq!(*opens_on, Some(date(8, 6)));
        }
        other => panic!("expected closed window, got {other:?}"),
    }
}

#[test]
fn describes_availability_around_blackouts() {
    let group = engine().describe_availability(&SubjectId::from("MC124"), date(7, 20));

    let current = group.current.expect("open in July");
    assert_eq!(current.start(), Some(date(7, 20)));
    assert_eq!(current.end(), Some(date(7, 31)));
    assert_eq!(group.future.len(), 1);
    assert!(group.past.is_empty());
}

use std::thread;

use super::common::*;
use crate::eligibility::{
    ChallengeExamEngine, EligibilityEngine, PrecalcTutorialEngine, RemedialTutorialEngine,
};
use crate::prereq::Grade;
use crate::student::{ExamAttempt, StudentAchievementSet};

fn engines() -> Vec<Box<dyn EligibilityEngine>> {
    let context = context();
    vec![
        Box::new(ChallengeExamEngine::new(context.clone())),
        Box::new(PrecalcTutorialEngine::new(context.clone())),
        Box::new(RemedialTutorialEngine::new(context)),
    ]
}

fn roster() -> Vec<StudentAchievementSet> {
    (0..16)
        .map(|index| {
            let mut builder = incoming(&format!("8300004{index:02}"))
                .attempt(ExamAttempt::placement("MPTTC", at(4, 10)));
            if index % 2 == 0 {
                builder = builder.completed("M 117", Grade::B);
            }
            if index % 3 == 0 {
                builder = builder.flag("PCT125").transfer_credit("M 125");
            }
            if index % 5 == 0 {
                builder = builder.attempt(ExamAttempt::challenge("MC118", at(2, 1), false));
            }
            builder.build()
        })
        .collect()
}

#[test]
fn repeated_evaluation_is_identical() {
    for engine in engines() {
        for set in roster() {
            let first = engine.evaluate(&set, as_of());
            let second = engine.evaluate(&set, as_of());
            assert_eq!(first, second, "{} changed between runs", engine.family());
        }
    }
}

#[test]
fn parallel_queries_match_sequential_results() {
    let engines = engines();
    let roster = roster();

    let sequential: Vec<_> = roster
        .iter()
        .map(|set| {
            engines
                .iter()
                .map(|engine| engine.evaluate(set, as_of()))
                .collect::<Vec<_>>()
        })
        .collect();

    let parallel: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = roster
            .iter()
            .map(|set| {
                let engines = &engines;
                scope.spawn(move || {
                    engines
                        .iter()
                        .map(|engine| engine.evaluate(set, as_of()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .collect()
    });

    assert_eq!(parallel, sequential);
}

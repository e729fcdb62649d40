use tracing::debug;

use super::{PrereqExpr, PrereqNode, SimpleRequirement};
use crate::student::StudentAchievementSet;

/// Walks prerequisite trees against one student's achievement snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    achievements: &'a StudentAchievementSet,
}

impl<'a> Evaluator<'a> {
    pub fn new(achievements: &'a StudentAchievementSet) -> Self {
        Self { achievements }
    }

    pub fn is_satisfied(&self, expr: &PrereqExpr) -> bool {
        match expr.node() {
            PrereqNode::Simple(requirement) => self.leaf_satisfied(requirement),
            PrereqNode::All(children) => children.iter().all(|child| self.is_satisfied(child)),
            PrereqNode::Any(children) => children.iter().any(|child| self.is_satisfied(child)),
        }
    }

    /// Satisfied, and only because of transfer credit: a leaf met by a passing
    /// completion, test credit or a concurrent registration is not a transfer route.
    pub fn is_satisfied_by_transfer(&self, expr: &PrereqExpr) -> bool {
        self.transfer_route(expr) == Some(true)
    }

    /// `None` when unsatisfied, otherwise whether transfer credit was required.
    fn transfer_route(&self, expr: &PrereqExpr) -> Option<bool> {
        match expr.node() {
            PrereqNode::Simple(requirement) => {
                if self.leaf_satisfied_directly(requirement) {
                    Some(false)
                } else if self.achievements.has_transfer_credit(&requirement.course) {
                    Some(true)
                } else {
                    None
                }
            }
            PrereqNode::All(children) => children
                .iter()
                .map(|child| self.transfer_route(child))
                .try_fold(false, |needed, route| route.map(|by_transfer| needed || by_transfer)),
            PrereqNode::Any(children) => {
                let routes: Vec<Option<bool>> =
                    children.iter().map(|child| self.transfer_route(child)).collect();
                if routes.contains(&Some(false)) {
                    Some(false)
                } else if routes.contains(&Some(true)) {
                    Some(true)
                } else {
                    None
                }
            }
        }
    }

    /// Single sentence naming the failing requirement, or `None` when satisfied.
    ///
    /// `All` reports its first failing child. `Any` reports its first child, so
    /// the wording does not depend on which alternative came closest.
    pub fn explain(&self, expr: &PrereqExpr) -> Option<String> {
        match expr.node() {
            PrereqNode::Simple(requirement) => {
                if self.leaf_satisfied(requirement) {
                    None
                } else {
                    debug!(
                        student_id = %self.achievements.student_id(),
                        course = %requirement.course,
                        node = %expr.id(),
                        "prerequisite leaf not met"
                    );
                    Some(self.leaf_sentence(requirement))
                }
            }
            PrereqNode::All(children) => children.iter().find_map(|child| self.explain(child)),
            PrereqNode::Any(children) => {
                if children.iter().any(|child| self.is_satisfied(child)) {
                    None
                } else {
                    children.first().and_then(|child| self.explain(child))
                }
            }
        }
    }

    fn leaf_satisfied(&self, requirement: &SimpleRequirement) -> bool {
        self.leaf_satisfied_directly(requirement)
            || self.achievements.has_transfer_credit(&requirement.course)
    }

    fn leaf_satisfied_directly(&self, requirement: &SimpleRequirement) -> bool {
        let course = &requirement.course;
        let by_grade = self
            .achievements
            .completed_grade(course)
            .is_some_and(|grade| grade.meets(requirement.min_grade));

        by_grade
            || self.achievements.has_test_credit(course)
            || (requirement.allow_concurrent && self.achievements.is_registered(course))
    }

    fn leaf_sentence(&self, requirement: &SimpleRequirement) -> String {
        let course = &requirement.course;
        let minimum = requirement.min_grade;
        let alternative = if requirement.allow_concurrent {
            ", or be registered in it this term"
        } else {
            ""
        };

        match self.achievements.completed_grade(course) {
            Some(grade) => format!(
                "Your grade of {grade} in {course} is below the required {minimum}; \
                 you must earn {minimum} or better{alternative}."
            ),
            None => format!("You must complete {course} with a grade of {minimum} or better{alternative}."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prereq::Grade;

    fn student() -> crate::student::StudentAchievementSetBuilder {
        StudentAchievementSet::builder("830000010")
    }

    fn leaf(course: &str) -> PrereqExpr {
        PrereqExpr::simple(course, Grade::C)
    }

    #[test]
    fn leaf_uses_grade_scale_not_letter_order() {
        let set = student()
            .completed("M 117", Grade::BPlus)
            .completed("M 118", Grade::CMinus)
            .build();
        let evaluator = Evaluator::new(&set);

        assert!(evaluator.is_satisfied(&PrereqExpr::simple("M 117", Grade::B)));
        assert!(!evaluator.is_satisfied(&PrereqExpr::simple("M 118", Grade::C)));
        assert!(!evaluator.is_satisfied(&leaf("M 124")));
    }

    #[test]
    fn transfer_and_test_credit_bypass_minimum_grade() {
        let set = student()
            .transfer_credit("M 117")
            .test_credit("M 118")
            .build();
        let evaluator = Evaluator::new(&set);

        assert!(evaluator.is_satisfied(&PrereqExpr::simple("M 117", Grade::APlus)));
        assert!(evaluator.is_satisfied(&PrereqExpr::simple("M 118", Grade::APlus)));
    }

    #[test]
    fn concurrent_registration_counts_only_when_allowed() {
        let set = student().registered("M 124").build();
        let evaluator = Evaluator::new(&set);

        assert!(evaluator.is_satisfied(&PrereqExpr::concurrent("M 124", Grade::C)));
        assert!(!evaluator.is_satisfied(&leaf("M 124")));
    }

    #[test]
    fn combinators_follow_boolean_algebra() {
        let histories = [
            student().build(),
            student().completed("M 117", Grade::A).build(),
            student().completed("M 118", Grade::A).build(),
            student()
                .completed("M 117", Grade::A)
                .completed("M 118", Grade::A)
                .build(),
        ];

        for set in &histories {
            let evaluator = Evaluator::new(set);
            let a = evaluator.is_satisfied(&leaf("M 117"));
            let b = evaluator.is_satisfied(&leaf("M 118"));

            let all = PrereqExpr::all(vec![leaf("M 117"), leaf("M 118")]);
            let any = PrereqExpr::any(vec![leaf("M 117"), leaf("M 118")]);

            assert_eq!(evaluator.is_satisfied(&all), a && b);
            assert_eq!(evaluator.is_satisfied(&any), a || b);
            assert_eq!(evaluator.explain(&all).is_none(), a && b);
            assert_eq!(evaluator.explain(&any).is_none(), a || b);
        }
    }

    #[test]
    fn all_explains_first_failing_child() {
        let set = student().completed("M 117", Grade::A).build();
        let expr = PrereqExpr::all(vec![leaf("M 117"), leaf("M 118"), leaf("M 124")]);

        let sentence = Evaluator::new(&set).explain(&expr).expect("unsatisfied");
        assert_eq!(sentence, "You must complete M 118 with a grade of C or better.");
    }

    #[test]
    fn any_explains_first_declared_child() {
        let set = student().completed("M 118", Grade::D).build();
        let expr = PrereqExpr::any(vec![
            PrereqExpr::concurrent("M 117", Grade::C),
            leaf("M 118"),
        ]);

        let sentence = Evaluator::new(&set).explain(&expr).expect("unsatisfied");
        assert_eq!(
            sentence,
            "You must complete M 117 with a grade of C or better, or be registered in it this term."
        );
    }

    #[test]
    fn low_grade_is_named_in_explanation() {
        let set = student().completed("M 117", Grade::D).build();

        let sentence = Evaluator::new(&set)
            .explain(&leaf("M 117"))
            .expect("unsatisfied");
        assert!(sentence.starts_with("Your grade of D in M 117"));
        assert!(sentence.ends_with('.'));
    }

    #[test]
    fn transfer_route_needs_a_leaf_met_only_by_transfer() {
        let set = student()
            .completed("M 124", Grade::A)
            .transfer_credit("M 125")
            .build();
        let evaluator = Evaluator::new(&set);

        let both = PrereqExpr::all(vec![leaf("M 124"), leaf("M 125")]);
        assert!(evaluator.is_satisfied(&both));
        assert!(evaluator.is_satisfied_by_transfer(&both));
        assert!(!evaluator.is_satisfied_by_transfer(&PrereqExpr::any(vec![
            leaf("M 125"),
            leaf("M 124"),
        ])));
        assert!(!evaluator.is_satisfied_by_transfer(&leaf("M 124")));
        assert!(!evaluator.is_satisfied_by_transfer(&leaf("M 126")));
    }

    #[test]
    fn completion_takes_precedence_over_transfer_credit() {
        let set = student()
            .completed("M 124", Grade::B)
            .transfer_credit("M 124")
            .test_credit("M 125")
            .transfer_credit("M 125")
            .build();
        let evaluator = Evaluator::new(&set);

        let both = PrereqExpr::all(vec![leaf("M 124"), leaf("M 125")]);
        assert!(evaluator.is_satisfied(&both));
        assert!(!evaluator.is_satisfied_by_transfer(&both));
    }

    #[test]
    fn failing_grade_falls_through_to_transfer_credit() {
        let set = student()
            .completed("M 124", Grade::D)
            .transfer_credit("M 124")
            .build();

        assert!(Evaluator::new(&set).is_satisfied_by_transfer(&leaf("M 124")));
    }
}

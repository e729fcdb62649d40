use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info};

use super::{NodeId, PrereqExpr, PrereqNode};
use crate::course::CourseId;

/// Configuration errors found while building the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("prerequisites for {course} reference unknown course {referenced} at node {node}")]
    UnknownCourseReference {
        course: CourseId,
        referenced: CourseId,
        node: NodeId,
    },
    #[error("prerequisites for {course} eventually require {course} itself")]
    CyclicPrerequisite { course: CourseId },
    #[error("prerequisites for {course} contain an empty combinator at node {node}")]
    EmptyCombinator { course: CourseId, node: NodeId },
    #[error("prerequisites for {course} were defined more than once")]
    DuplicateRequirement { course: CourseId },
}

/// Immutable mapping from course to prerequisite tree, shared by all queries.
#[derive(Debug, Default)]
pub struct PrerequisiteCatalog {
    courses: BTreeSet<CourseId>,
    requirements: BTreeMap<CourseId, Arc<PrereqExpr>>,
}

impl PrerequisiteCatalog {
    pub fn builder() -> PrerequisiteCatalogBuilder {
        PrerequisiteCatalogBuilder::default()
    }

    pub fn is_known(&self, course: &CourseId) -> bool {
        self.courses.contains(course)
    }

    /// Tree for `course`; `None` means the course has no prerequisites.
    pub fn requirement_for(&self, course: &CourseId) -> Option<&PrereqExpr> {
        self.requirements.get(course).map(Arc::as_ref)
    }

    pub fn courses(&self) -> impl Iterator<Item = &CourseId> {
        self.courses.iter()
    }
}

#[derive(Debug, Default)]
pub struct PrerequisiteCatalogBuilder {
    courses: BTreeSet<CourseId>,
    requirements: Vec<(CourseId, PrereqExpr)>,
}

impl PrerequisiteCatalogBuilder {
    /// Registers a course that may be referenced by prerequisite trees.
    pub fn course(mut self, course: impl Into<CourseId>) -> Self {
        self.courses.insert(course.into());
        self
    }

    /// Registers `course` together with its prerequisite tree.
    pub fn requires(mut self, course: impl Into<CourseId>, expr: PrereqExpr) -> Self {
        let course = course.into();
        self.courses.insert(course.clone());
        self.requirements.push((course, expr));
        self
    }

    /// Validates every tree and freezes the catalog.
    pub fn build(self) -> Result<PrerequisiteCatalog, CatalogError> {
        let mut requirements = BTreeMap::new();

        for (course, mut expr) in self.requirements {
            if requirements.contains_key(&course) {
                return Err(CatalogError::DuplicateRequirement { course });
            }

            expr.assign_ids();
            check_tree(&course, &expr, &self.courses)?;
            requirements.insert(course, expr);
        }

        check_acyclic(&requirements)?;

        info!(
            courses = self.courses.len(),
            trees = requirements.len(),
            "prerequisite catalog built"
        );

        Ok(PrerequisiteCatalog {
            courses: self.courses,
            requirements: requirements
                .into_iter()
                .map(|(course, expr)| (course, Arc::new(expr)))
                .collect(),
        })
    }
}

fn check_tree(
    course: &CourseId,
    expr: &PrereqExpr,
    known: &BTreeSet<CourseId>,
) -> Result<(), CatalogError> {
    match expr.node() {
        PrereqNode::Simple(requirement) => {
            if known.contains(&requirement.course) {
                Ok(())
            } else {
                Err(CatalogError::UnknownCourseReference {
                    course: course.clone(),
                    referenced: requirement.course.clone(),
                    node: expr.id(),
                })
            }
        }
        PrereqNode::All(children) | PrereqNode::Any(children) => {
            if children.is_empty() {
                return Err(CatalogError::EmptyCombinator {
                    course: course.clone(),
                    node: expr.id(),
                });
            }
            children
                .iter()
                .try_for_each(|child| check_tree(course, child, known))
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

fn check_acyclic(requirements: &BTreeMap<CourseId, PrereqExpr>) -> Result<(), CatalogError> {
    let mut visits = BTreeMap::new();

    for course in requirements.keys() {
        visit(course, requirements, &mut visits)?;
    }

    Ok(())
}

fn visit<'a>(
    course: &'a CourseId,
    requirements: &'a BTreeMap<CourseId, PrereqExpr>,
    visits: &mut BTreeMap<&'a CourseId, Visit>,
) -> Result<(), CatalogError> {
    match visits.get(course) {
        Some(Visit::Done) => return Ok(()),
        Some(Visit::InProgress) => {
            return Err(CatalogError::CyclicPrerequisite {
                course: course.clone(),
            })
        }
        None => {}
    }

    visits.insert(course, Visit::InProgress);
    if let Some(expr) = requirements.get(course) {
        for (_, leaf) in expr.leaves() {
            debug!(%course, referenced = %leaf.course, "checking prerequisite edge");
            visit(&leaf.course, requirements, visits)?;
        }
    }
    visits.insert(course, Visit::Done);

    Ok(())
}

//! Course prerequisite trees and their evaluation against a student's history.

mod catalog;
mod evaluator;
mod expr;
mod grade;

pub use catalog::{CatalogError, PrerequisiteCatalog, PrerequisiteCatalogBuilder};
pub use evaluator::Evaluator;
pub use expr::{NodeId, PrereqExpr, PrereqNode, SimpleRequirement};
pub use grade::{Grade, GradeError};

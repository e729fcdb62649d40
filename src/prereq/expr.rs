use std::fmt;

use serde::{Deserialize, Serialize};

use super::Grade;
use crate::course::CourseId;

/// Stable identifier of a node within one course's prerequisite tree.
///
/// Assigned in pre-order when the catalog is built; `0` is the root.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Leaf requirement: one course at a minimum grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleRequirement {
    pub course: CourseId,
    pub min_grade: Grade,
    pub allow_concurrent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrereqNode {
    Simple(SimpleRequirement),
    All(Vec<PrereqExpr>),
    Any(Vec<PrereqExpr>),
}

/// Boolean-combinator tree describing the coursework a course requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrereqExpr {
    id: NodeId,
    node: PrereqNode,
}

impl PrereqExpr {
    pub fn simple(course: impl Into<CourseId>, min_grade: Grade) -> Self {
        Self::from_node(PrereqNode::Simple(SimpleRequirement {
            course: course.into(),
            min_grade,
            allow_concurrent: false,
        }))
    }

    /// Leaf that is also met by a current registration in the course.
    pub fn concurrent(course: impl Into<CourseId>, min_grade: Grade) -> Self {
        Self::from_node(PrereqNode::Simple(SimpleRequirement {
            course: course.into(),
            min_grade,
            allow_concurrent: true,
        }))
    }

    pub fn all(children: Vec<PrereqExpr>) -> Self {
        Self::from_node(PrereqNode::All(children))
    }

    pub fn any(children: Vec<PrereqExpr>) -> Self {
        Self::from_node(PrereqNode::Any(children))
    }

    fn from_node(node: PrereqNode) -> Self {
        Self {
            id: NodeId::default(),
            node,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &PrereqNode {
        &self.node
    }

    /// Every leaf requirement, in declaration order.
    pub fn leaves(&self) -> Vec<(NodeId, &SimpleRequirement)> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<(NodeId, &'a SimpleRequirement)>) {
        match &self.node {
            PrereqNode::Simple(requirement) => leaves.push((self.id, requirement)),
            PrereqNode::All(children) | PrereqNode::Any(children) => {
                for child in children {
                    child.collect_leaves(leaves);
                }
            }
        }
    }

    /// Renumbers the tree in pre-order starting at the root.
    pub(crate) fn assign_ids(&mut self) {
        let mut next = 0;
        self.assign_from(&mut next);
    }

    fn assign_from(&mut self, next: &mut u32) {
        self.id = NodeId(*next);
        *next += 1;
        if let PrereqNode::All(children) | PrereqNode::Any(children) = &mut self.node {
            for child in children {
                child.assign_from(next);
            }
        }
    }
}

impl fmt::Display for PrereqExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            PrereqNode::Simple(requirement) => {
                write!(f, "{} ({} or better", requirement.course, requirement.min_grade)?;
                if requirement.allow_concurrent {
                    write!(f, ", or concurrent")?;
                }
                write!(f, ")")
            }
            PrereqNode::All(children) | PrereqNode::Any(children) => {
                let joiner = if matches!(self.node, PrereqNode::All(_)) {
                    " and "
                } else {
                    " or "
                };
                write!(f, "(")?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        f.write_str(joiner)?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_pre_order_ids() {
        let mut expr = PrereqExpr::all(vec![
            PrereqExpr::simple("M 117", Grade::C),
            PrereqExpr::any(vec![
                PrereqExpr::simple("M 118", Grade::C),
                PrereqExpr::concurrent("M 124", Grade::C),
            ]),
        ]);

        expr.assign_ids();

        assert_eq!(expr.id(), NodeId(0));
        let leaves: Vec<_> = expr
            .leaves()
            .into_iter()
            .map(|(id, leaf)| (id, leaf.course.as_str().to_string()))
            .collect();
        assert_eq!(
            leaves,
            vec![
                (NodeId(1), "M 117".to_string()),
                (NodeId(3), "M 118".to_string()),
                (NodeId(4), "M 124".to_string()),
            ]
        );
    }

    #[test]
    fn renders_readable_summary() {
        let expr = PrereqExpr::any(vec![
            PrereqExpr::simple("M 117", Grade::C),
            PrereqExpr::concurrent("M 118", Grade::BMinus),
        ]);
        assert_eq!(
            expr.to_string(),
            "(M 117 (C or better) or M 118 (B- or better, or concurrent))"
        );
    }
}

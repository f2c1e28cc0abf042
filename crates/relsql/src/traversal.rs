//! Read-only traversal utilities for algebra trees.
//!
//! Rust's ownership model keeps parent pointers out of [`RelNode`], so these
//! helpers walk top-down and answer the questions the rewrite engine asks
//! before lowering a node: which conjuncts a condition has, whether a subtree
//! references a correlation variable, whether a subquery is nested somewhere
//! it cannot be lowered.

use crate::operators::SqlKind;
use crate::rel::{CorrelationId, RelNode, RexNode, SubQueryKind};

/// Pre-order iterator over a relational tree.
pub struct RelIter<'a> {
    stack: Vec<&'a RelNode>,
}

impl<'a> Iterator for RelIter<'a> {
    type Item = &'a RelNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.inputs().into_iter().rev());
        Some(node)
    }
}

/// Walking a relational tree.
pub trait RelWalk {
    /// Depth-first, pre-order, left input first.
    fn dfs(&self) -> RelIter<'_>;

    /// Row expressions held directly by this node (not by its inputs).
    fn expressions(&self) -> Vec<&RexNode>;
}

impl RelWalk for RelNode {
    fn dfs(&self) -> RelIter<'_> {
        RelIter { stack: vec![self] }
    }

    fn expressions(&self) -> Vec<&RexNode> {
        match self {
            RelNode::Project { exprs, .. } => exprs.iter().collect(),
            RelNode::Filter { condition, .. } | RelNode::Join { condition, .. } => vec![condition],
            _ => Vec::new(),
        }
    }
}

/// Top-level conjuncts of `condition`, flattening nested `AND`s.
pub fn conjunctions(condition: &RexNode) -> Vec<&RexNode> {
    match condition.as_call() {
        Some(call) if call.is_kind(SqlKind::And) => {
            call.operands.iter().flat_map(conjunctions).collect()
        }
        _ => vec![condition],
    }
}

/// Whether `rex` reads correlation variable `id`, including inside subqueries.
pub fn rex_references_correlation(rex: &RexNode, id: CorrelationId) -> bool {
    match rex {
        RexNode::CorrelVariable { id: found, .. } => *found == id,
        RexNode::FieldAccess { expr, .. } => rex_references_correlation(expr, id),
        RexNode::Call(call) => call
            .operands
            .iter()
            .any(|operand| rex_references_correlation(operand, id)),
        RexNode::SubQuery(sub) => {
            let needles = match &sub.kind {
                SubQueryKind::In { needles } => needles.as_slice(),
                _ => &[],
            };
            needles.iter().any(|n| rex_references_correlation(n, id))
                || rel_references_correlation(&sub.rel, id)
        }
        RexNode::InputRef { .. } | RexNode::Literal(_) => false,
    }
}

/// Whether any expression in the tree under `rel` reads correlation variable `id`.
pub fn rel_references_correlation(rel: &RelNode, id: CorrelationId) -> bool {
    rel.dfs().any(|node| {
        node.expressions()
            .into_iter()
            .any(|rex| rex_references_correlation(rex, id))
    })
}

/// `$cor.field` where `$cor` is correlation `id`: the accessed field's name.
pub fn correlated_field(rex: &RexNode, id: CorrelationId) -> Option<&str> {
    match rex {
        RexNode::FieldAccess { expr, field, .. } => match expr.as_ref() {
            RexNode::CorrelVariable { id: found, .. } if *found == id => Some(field.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// Whether an EXISTS or IN subquery appears anywhere in `rex`.
pub fn contains_predicate_subquery(rex: &RexNode) -> bool {
    match rex {
        RexNode::SubQuery(sub) => !matches!(sub.kind, SubQueryKind::Scalar),
        RexNode::Call(call) => call.operands.iter().any(contains_predicate_subquery),
        RexNode::FieldAccess { expr, .. } => contains_predicate_subquery(expr),
        _ => false,
    }
}

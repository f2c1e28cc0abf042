//! Lowering of EXISTS and IN subqueries in filter conditions.
//!
//! Trino plans these fine as written, but a correlated subquery cannot be
//! printed without a scope for its correlation variable. Both kinds are
//! turned into joins before conversion:
//!
//! - `EXISTS (q)` becomes a LEFT JOIN against `SELECT MIN(TRUE) FROM q`
//!   (grouped by the correlation keys when `q` is correlated), and the
//!   conjunct becomes `marker IS NOT NULL`.
//! - `x IN (q)` becomes an INNER JOIN against `SELECT DISTINCT` of `q` on
//!   `x = q.col`, and the conjunct disappears.
//!
//! Only correlations that are equalities in the top filter of the subquery can
//! be turned into join keys. Anything else is rejected.

use crate::builder::{agg, and, boolean, eq, field, is_not_null, not};
use crate::error::{Error, Result};
use crate::operators::{self, SqlKind};
use crate::rel::{
    CorrelationId, DataType, FieldName, JoinType, RelNode, RexNode, SubQuery, SubQueryKind,
};
use crate::traversal::{
    conjunctions, contains_predicate_subquery, correlated_field, rel_references_correlation,
    rex_references_correlation,
};

/// A correlated equality as (outer field, inner expression).
type JoinKey = (RexNode, RexNode);

/// Rewrite `Filter(input, condition)` so no EXISTS or IN subquery remains.
///
/// The result has the fields of `input` first, followed by the fields of the
/// joined subqueries.
pub(super) fn lower_filter(input: &RelNode, condition: &RexNode) -> Result<RelNode> {
    let mut rel = input.clone();
    let mut remaining = Vec::new();
    for conjunct in conjunctions(condition) {
        match conjunct {
            RexNode::SubQuery(sub) => match &sub.kind {
                SubQueryKind::Exists => {
                    let (joined, marker) = join_exists(rel, sub)?;
                    rel = joined;
                    remaining.push(is_not_null(marker));
                }
                SubQueryKind::In { needles } => rel = join_in(rel, needles, sub)?,
                SubQueryKind::Scalar => remaining.push(conjunct.clone()),
            },
            RexNode::Call(call) if call.is_kind(SqlKind::Not) && call.arity() == 1 => {
                match &call.operands[0] {
                    RexNode::SubQuery(sub) => match &sub.kind {
                        SubQueryKind::Exists => {
                            let (joined, marker) = join_exists(rel, sub)?;
                            rel = joined;
                            remaining.push(not(is_not_null(marker)));
                        }
                        SubQueryKind::In { .. } => return Err(Error::unsupported("NOT IN subquery")),
                        SubQueryKind::Scalar => remaining.push(conjunct.clone()),
                    },
                    operand if contains_predicate_subquery(operand) => {
                        return Err(Error::unsupported("subquery nested inside NOT"));
                    }
                    _ => remaining.push(conjunct.clone()),
                }
            }
            other if contains_predicate_subquery(other) => {
                return Err(Error::unsupported(
                    "EXISTS or IN subquery nested inside an expression",
                ));
            }
            other => remaining.push(other.clone()),
        }
    }
    Ok(if remaining.is_empty() {
        rel
    } else {
        RelNode::Filter {
            input: Box::new(rel),
            condition: and(remaining),
        }
    })
}

/// Left-join the EXISTS marker aggregate of `sub` onto `rel`.
fn join_exists(rel: RelNode, sub: &SubQuery) -> Result<(RelNode, RexNode)> {
    let outer_len = rel.row_type().len();
    // the select list of an EXISTS body is irrelevant
    let body = match sub.rel.as_ref() {
        RelNode::Project { input, .. } => input.as_ref().clone(),
        other => other.clone(),
    };
    let (body, keys) = match sub.correlation {
        Some(id) => decorrelate(body, id)?,
        None => (body, Vec::new()),
    };

    let k = keys.len();
    let mut exprs: Vec<RexNode> = keys.iter().map(|(_, inner)| inner.clone()).collect();
    exprs.push(boolean(true));
    let mut names: Vec<FieldName> = (0..k).map(|i| FieldName::quoted(format!("$f{}", i))).collect();
    names.push(FieldName::Derived);
    let project = RelNode::Project {
        input: Box::new(body),
        exprs,
        names,
    };
    let marker = agg(
        operators::MIN,
        vec![k],
        false,
        FieldName::quoted(format!("$f{}", k)),
        DataType::Boolean,
    );
    let aggregate = RelNode::Aggregate {
        input: Box::new(project),
        group_set: (0..k).collect(),
        calls: vec![marker],
    };

    let condition = if keys.is_empty() {
        boolean(true)
    } else {
        and(keys
            .into_iter()
            .enumerate()
            .map(|(i, (outer, inner))| eq(outer, field(outer_len + i, inner.data_type().clone())))
            .collect())
    };
    let joined = RelNode::Join {
        left: Box::new(rel),
        right: Box::new(aggregate),
        join_type: JoinType::Left,
        condition,
    };
    Ok((joined, field(outer_len + k, DataType::Boolean)))
}

/// Inner-join the distinct rows of `sub` onto `rel`, matching `needles`.
fn join_in(rel: RelNode, needles: &[RexNode], sub: &SubQuery) -> Result<RelNode> {
    if sub.correlation.is_some() {
        return Err(Error::unsupported("correlated IN subquery"));
    }
    let row_type = sub.rel.row_type();
    if needles.is_empty() || needles.len() != row_type.len() {
        return Err(Error::internal(format!(
            "IN subquery compares {} values against {} columns",
            needles.len(),
            row_type.len()
        )));
    }
    let outer_len = rel.row_type().len();
    let condition = and(needles
        .iter()
        .zip(&row_type.fields)
        .enumerate()
        .map(|(i, (needle, column))| {
            eq(needle.clone(), field(outer_len + i, column.data_type.clone()))
        })
        .collect());
    let distinct = RelNode::Aggregate {
        input: sub.rel.clone(),
        group_set: (0..row_type.len()).collect(),
        calls: Vec::new(),
    };
    Ok(RelNode::Join {
        left: Box::new(rel),
        right: Box::new(distinct),
        join_type: JoinType::Inner,
        condition,
    })
}

/// Pull the correlated equalities out of the top filter of `body`.
fn decorrelate(body: RelNode, id: CorrelationId) -> Result<(RelNode, Vec<JoinKey>)> {
    match body {
        RelNode::Filter { input, condition } if !rel_references_correlation(&input, id) => {
            let mut keys = Vec::new();
            let mut kept = Vec::new();
            for conjunct in conjunctions(&condition) {
                if !rex_references_correlation(conjunct, id) {
                    kept.push(conjunct.clone());
                    continue;
                }
                let key = correlated_equality(conjunct, id).ok_or_else(|| {
                    Error::unsupported("correlated subquery predicate other than an equality")
                })?;
                keys.push(key);
            }
            let body = if kept.is_empty() {
                *input
            } else {
                RelNode::Filter {
                    input,
                    condition: and(kept),
                }
            };
            Ok((body, keys))
        }
        other if !rel_references_correlation(&other, id) => Ok((other, Vec::new())),
        _ => Err(Error::unsupported(
            "correlation below the top filter of a subquery",
        )),
    }
}

/// `$cor.f = expr` (either side), where `expr` does not read the correlation.
fn correlated_equality(rex: &RexNode, id: CorrelationId) -> Option<JoinKey> {
    let call = rex.as_call()?;
    if !call.is_kind(SqlKind::Equals) || call.arity() != 2 {
        return None;
    }
    [(0, 1), (1, 0)].into_iter().find_map(|(outer, inner)| {
        let name = correlated_field(&call.operands[outer], id)?;
        let inner = &call.operands[inner];
        if rex_references_correlation(inner, id) {
            return None;
        }
        let RexNode::FieldAccess { expr, data_type, .. } = &call.operands[outer] else {
            return None;
        };
        let index = expr
            .data_type()
            .fields()
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))?;
        Some((field(index, data_type.clone()), inner.clone()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{correl, exists, field_access, gt, in_subquery, int, RelBuilder};
    use crate::rel::Field;

    fn outer() -> RelBuilder {
        RelBuilder::scan("tableOne", vec![Field::new("icol", DataType::Integer)])
    }

    fn inner() -> RelBuilder {
        RelBuilder::scan(
            "tableTwo",
            vec![
                Field::new("ifield", DataType::Integer),
                Field::new("dfield", DataType::Double),
            ],
        )
    }

    #[test]
    fn test_exists_becomes_left_join_with_marker() {
        let input = outer().build();
        let lowered = lower_filter(&input, &exists(inner().build())).unwrap();
        let RelNode::Filter { input, condition } = lowered else {
            panic!("expected a filter over the join");
        };
        assert_eq!(condition, is_not_null(field(1, DataType::Boolean)));
        assert!(matches!(
            *input,
            RelNode::Join {
                join_type: JoinType::Left,
                ..
            }
        ));
    }

    #[test]
    fn test_in_drops_conjunct() {
        let input = outer().build();
        let sub = inner()
            .project(vec![(field(0, DataType::Integer), FieldName::unquoted("ifield"))])
            .build();
        let lowered = lower_filter(&input, &in_subquery(vec![field(0, DataType::Integer)], sub)).unwrap();
        assert!(matches!(
            lowered,
            RelNode::Join {
                join_type: JoinType::Inner,
                ..
            }
        ));
    }

    #[test]
    fn test_correlated_equality_becomes_key() {
        let id = CorrelationId(0);
        let cor = correl(id, &outer().row_type());
        let body = inner()
            .filter(and(vec![
                eq(field(0, DataType::Integer), field_access(cor, "icol")),
                gt(field(1, DataType::Double), int(1)),
            ]))
            .build();
        let (body, keys) = decorrelate(body, id).unwrap();
        assert_eq!(keys, vec![(field(0, DataType::Integer), field(0, DataType::Integer))]);
        assert!(matches!(body, RelNode::Filter { .. }));
    }

    #[test]
    fn test_correlated_inequality_is_rejected() {
        let id = CorrelationId(0);
        let cor = correl(id, &outer().row_type());
        let body = inner()
            .filter(gt(field(0, DataType::Integer), field_access(cor, "icol")))
            .build();
        assert!(matches!(
            decorrelate(body, id),
            Err(Error::UnsupportedConstruct { .. })
        ));
    }

    #[test]
    fn test_not_in_is_rejected() {
        let sub = inner().build();
        let cond = not(in_subquery(
            vec![field(0, DataType::Integer), field(0, DataType::Integer)],
            sub,
        ));
        assert!(lower_filter(&outer().build(), &cond).is_err());
    }
}

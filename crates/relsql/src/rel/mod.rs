//! Relational algebra tree.
//!
//! This is the validated, typed plan handed over by an external planner. The
//! rewrite engine only reads it; nothing in this crate mutates a tree it was
//! given. Trees derive serde so a planner in another process can ship them
//! as JSON (see [`RelNode::from_json`]).

pub mod rex;
pub mod types;

pub use rex::{CorrelationId, LiteralValue, RexCall, RexLiteral, RexNode, SubQuery, SubQueryKind};
pub use types::{DataType, Field, RowType, TypeFamily};

use crate::error::Result;
use crate::function_registry::OperatorRef;
use crate::operators::SqlKind;
use serde::{Deserialize, Serialize};

/// Casing applied to names that were written without quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierCasing {
    #[default]
    Upper,
    Lower,
    Preserve,
}

impl IdentifierCasing {
    pub fn apply(self, name: &str) -> String {
        match self {
            IdentifierCasing::Upper => name.to_uppercase(),
            IdentifierCasing::Lower => name.to_lowercase(),
            IdentifierCasing::Preserve => name.to_string(),
        }
    }
}

/// How an output column of a projection or aggregate got its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    /// No alias was written; the planner derives one.
    #[default]
    Derived,
    /// An alias written without quotes; subject to identifier casing.
    Unquoted(String),
    /// A quoted alias, or one that must keep its exact spelling.
    Quoted(String),
}

impl FieldName {
    pub fn unquoted(name: impl Into<String>) -> Self {
        FieldName::Unquoted(name.into())
    }

    pub fn quoted(name: impl Into<String>) -> Self {
        FieldName::Quoted(name.into())
    }

    /// Name of a projected column at `index`.
    ///
    /// Derived names of niladic pseudo-columns (`CURRENT_DATE`, ...) are the
    /// keyword itself; every other derived name is `EXPR$<index>`.
    pub fn resolve(&self, index: usize, expr: Option<&RexNode>, casing: IdentifierCasing) -> String {
        match self {
            FieldName::Unquoted(name) => casing.apply(name),
            FieldName::Quoted(name) => name.clone(),
            FieldName::Derived => match expr.and_then(RexNode::as_call) {
                Some(call) if call.kind().is_some_and(SqlKind::is_context_variable) => {
                    call.operator.name().to_string()
                }
                _ => format!("EXPR${}", index),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullDirection {
    First,
    Last,
}

/// One ORDER BY key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldCollation {
    pub field: usize,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<NullDirection>,
}

impl FieldCollation {
    pub fn asc(field: usize) -> Self {
        Self {
            field,
            direction: Direction::Ascending,
            nulls: None,
        }
    }

    pub fn desc(field: usize) -> Self {
        Self {
            field,
            direction: Direction::Descending,
            nulls: None,
        }
    }
}

/// An aggregate function applied to input fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateCall {
    pub function: OperatorRef,
    #[serde(default)]
    pub args: Vec<usize>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub name: FieldName,
    pub data_type: DataType,
}

/// A relational operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "rel", rename_all = "snake_case")]
pub enum RelNode {
    TableScan {
        /// Qualified name; the last part is the table name.
        table: Vec<String>,
        row_type: RowType,
    },
    Values {
        tuples: Vec<Vec<RexLiteral>>,
        row_type: RowType,
    },
    Project {
        input: Box<RelNode>,
        exprs: Vec<RexNode>,
        names: Vec<FieldName>,
    },
    Filter {
        input: Box<RelNode>,
        condition: RexNode,
    },
    Aggregate {
        input: Box<RelNode>,
        group_set: Vec<usize>,
        calls: Vec<AggregateCall>,
    },
    Join {
        left: Box<RelNode>,
        right: Box<RelNode>,
        join_type: JoinType,
        condition: RexNode,
    },
    /// Lateral join: `right` is evaluated once per row of `left`.
    Correlate {
        left: Box<RelNode>,
        right: Box<RelNode>,
        correlation: CorrelationId,
        join_type: JoinType,
    },
    Sort {
        input: Box<RelNode>,
        #[serde(default)]
        collation: Vec<FieldCollation>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fetch: Option<u64>,
    },
    SetOp {
        kind: SetOpKind,
        #[serde(default)]
        all: bool,
        inputs: Vec<RelNode>,
    },
    /// Expands each collection-typed input column into rows.
    Uncollect {
        input: Box<RelNode>,
        #[serde(default)]
        with_ordinality: bool,
    },
}

impl RelNode {
    /// Parse a tree serialized as JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Short node label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RelNode::TableScan { .. } => "TableScan",
            RelNode::Values { .. } => "Values",
            RelNode::Project { .. } => "Project",
            RelNode::Filter { .. } => "Filter",
            RelNode::Aggregate { .. } => "Aggregate",
            RelNode::Join { .. } => "Join",
            RelNode::Correlate { .. } => "Correlate",
            RelNode::Sort { .. } => "Sort",
            RelNode::SetOp { .. } => "SetOp",
            RelNode::Uncollect { .. } => "Uncollect",
        }
    }

    pub fn inputs(&self) -> Vec<&RelNode> {
        match self {
            RelNode::TableScan { .. } | RelNode::Values { .. } => Vec::new(),
            RelNode::Project { input, .. }
            | RelNode::Filter { input, .. }
            | RelNode::Aggregate { input, .. }
            | RelNode::Sort { input, .. }
            | RelNode::Uncollect { input, .. } => vec![input.as_ref()],
            RelNode::Join { left, right, .. } | RelNode::Correlate { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            RelNode::SetOp { inputs, .. } => inputs.iter().collect(),
        }
    }

    /// Output row type, with unquoted names upper-cased the way the planner reports them.
    pub fn row_type(&self) -> RowType {
        self.row_type_with(IdentifierCasing::Upper)
    }

    pub fn row_type_with(&self, casing: IdentifierCasing) -> RowType {
        match self {
            RelNode::TableScan { row_type, .. } | RelNode::Values { row_type, .. } => {
                row_type.clone()
            }
            RelNode::Project { exprs, names, .. } => exprs
                .iter()
                .enumerate()
                .map(|(i, expr)| {
                    let name = names
                        .get(i)
                        .cloned()
                        .unwrap_or_default()
                        .resolve(i, Some(expr), casing);
                    Field::new(name, expr.data_type().clone())
                })
                .collect(),
            RelNode::Filter { input, .. } | RelNode::Sort { input, .. } => {
                input.row_type_with(casing)
            }
            RelNode::Aggregate {
                input,
                group_set,
                calls,
            } => {
                let input_type = input.row_type_with(casing);
                let mut fields: Vec<Field> = group_set
                    .iter()
                    .filter_map(|&i| input_type.field(i).cloned())
                    .collect();
                let offset = fields.len();
                fields.extend(calls.iter().enumerate().map(|(i, call)| {
                    Field::new(
                        call.name.resolve(offset + i, None, casing),
                        call.data_type.clone(),
                    )
                }));
                RowType::new(fields)
            }
            RelNode::Join { left, right, .. } | RelNode::Correlate { left, right, .. } => {
                let mut fields = left.row_type_with(casing).fields;
                fields.extend(right.row_type_with(casing).fields);
                RowType::new(fields)
            }
            RelNode::SetOp { inputs, .. } => inputs
                .first()
                .map(|input| input.row_type_with(casing))
                .unwrap_or_default(),
            RelNode::Uncollect {
                input,
                with_ordinality,
            } => uncollect_row_type(&input.row_type_with(casing), *with_ordinality),
        }
    }
}

/// Columns produced by unnesting every field of `input`.
///
/// Arrays of rows yield one column per row field, named `col_<n>` across the
/// whole output; maps yield `key` and `value`; other arrays keep the input
/// field's name.
pub fn uncollect_row_type(input: &RowType, with_ordinality: bool) -> RowType {
    let mut fields = Vec::new();
    let mut synthesized = 0;
    for field in &input.fields {
        match &field.data_type {
            DataType::Array(element) => match element.as_ref() {
                DataType::Row(members) => {
                    for member in members {
                        fields.push(Field::new(
                            format!("col_{}", synthesized),
                            member.data_type.clone(),
                        ));
                        synthesized += 1;
                    }
                }
                other => fields.push(Field::new(field.name.clone(), other.clone())),
            },
            DataType::Map { key, value } => {
                fields.push(Field::new("key", key.as_ref().clone()));
                fields.push(Field::new("value", value.as_ref().clone()));
            }
            other => fields.push(Field::new(field.name.clone(), other.clone())),
        }
    }
    if with_ordinality {
        fields.push(Field::new("ORDINALITY", DataType::Integer));
    }
    RowType::new(fields)
}

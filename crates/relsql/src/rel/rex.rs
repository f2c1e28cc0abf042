//! Row expressions: the scalar half of the algebra tree.

use super::types::DataType;
use super::RelNode;
use crate::function_registry::OperatorRef;
use crate::operators::SqlKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the left input of a correlate so the right side can reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub u32);

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$cor{}", self.0)
    }
}

/// Literal payload. Numbers keep their written text so scale survives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(String),
    String(String),
    Date(String),
    Time(String),
    Timestamp(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RexLiteral {
    pub value: LiteralValue,
    pub data_type: DataType,
}

impl RexLiteral {
    pub fn is_null(&self) -> bool {
        self.value == LiteralValue::Null
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RexCall {
    pub operator: OperatorRef,
    #[serde(default)]
    pub operands: Vec<RexNode>,
    pub data_type: DataType,
}

impl RexCall {
    pub fn kind(&self) -> Option<SqlKind> {
        self.operator.kind()
    }

    pub fn is_kind(&self, kind: SqlKind) -> bool {
        self.operator.is_kind(kind)
    }

    /// Whether the call is bound to a function with this name, ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        self.operator.name().eq_ignore_ascii_case(name)
    }

    pub fn arity(&self) -> usize {
        self.operands.len()
    }
}

/// Flavor of a nested query used as an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubQueryKind {
    Exists,
    /// `needles IN (query)`; one needle per column of the query.
    In { needles: Vec<RexNode> },
    Scalar,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubQuery {
    #[serde(flatten)]
    pub kind: SubQueryKind,
    pub rel: Box<RelNode>,
    /// Correlation variable the query body references, if it is correlated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationId>,
    pub data_type: DataType,
}

/// A scalar expression over the fields of a relational input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "rex", rename_all = "snake_case")]
pub enum RexNode {
    /// Reference to field `index` of the input row.
    InputRef { index: usize, data_type: DataType },
    Literal(RexLiteral),
    Call(RexCall),
    /// Access to a named field of a row-typed expression.
    FieldAccess {
        expr: Box<RexNode>,
        field: String,
        data_type: DataType,
    },
    /// The current row of a correlate's left input.
    CorrelVariable { id: CorrelationId, data_type: DataType },
    SubQuery(SubQuery),
}

impl RexNode {
    pub fn data_type(&self) -> &DataType {
        match self {
            RexNode::InputRef { data_type, .. }
            | RexNode::FieldAccess { data_type, .. }
            | RexNode::CorrelVariable { data_type, .. } => data_type,
            RexNode::Literal(literal) => &literal.data_type,
            RexNode::Call(call) => &call.data_type,
            RexNode::SubQuery(sub) => &sub.data_type,
        }
    }

    pub fn as_call(&self) -> Option<&RexCall> {
        match self {
            RexNode::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&RexLiteral> {
        match self {
            RexNode::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn is_null_literal(&self) -> bool {
        self.as_literal().is_some_and(RexLiteral::is_null)
    }

    /// Column-like operands: input references and field accesses.
    pub fn is_column_like(&self) -> bool {
        matches!(self, RexNode::InputRef { .. } | RexNode::FieldAccess { .. })
    }

    pub fn is_always_true(&self) -> bool {
        matches!(
            self,
            RexNode::Literal(RexLiteral {
                value: LiteralValue::Boolean(true),
                ..
            })
        )
    }

    /// Whether any subquery appears in this expression.
    pub fn contains_subquery(&self) -> bool {
        match self {
            RexNode::SubQuery(_) => true,
            RexNode::Call(call) => call.operands.iter().any(RexNode::contains_subquery),
            RexNode::FieldAccess { expr, .. } => expr.contains_subquery(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{call, field, int, literal_null};
    use crate::operators;

    #[test]
    fn test_data_type_of_call() {
        let sum = call(operators::PLUS, vec![int(1), int(2)], DataType::Integer);
        assert_eq!(sum.data_type(), &DataType::Integer);
        assert!(sum.as_call().is_some_and(|c| c.is_kind(SqlKind::Plus)));
    }

    #[test]
    fn test_column_like() {
        assert!(field(0, DataType::Integer).is_column_like());
        assert!(!int(3).is_column_like());
        assert!(literal_null(DataType::varchar()).is_null_literal());
    }

    #[test]
    fn test_correlation_id_display() {
        assert_eq!(CorrelationId(2).to_string(), "$cor2");
    }
}

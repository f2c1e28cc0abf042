//! Fluent construction of algebra trees.
//!
//! Planners normally hand trees over fully built (or as JSON). This module is
//! for building them in code: embedding applications, tests and benchmarks.
//!
//! - **Rex helpers** ([`field`], [`int`], [`decimal`], [`string`], [`call`],
//!   [`cast`], [`eq`], ...) create typed [`RexNode`] leaves and calls.
//! - **[`RelBuilder`]** stacks relational operators bottom-up.
//!
//! ```
//! use relsql::builder::*;
//! use relsql::rel::{DataType, Field, FieldName};
//!
//! // SELECT icol FROM tableOne WHERE icol < 5
//! let scan = RelBuilder::scan("tableOne", vec![Field::new("icol", DataType::Integer)]);
//! let icol = scan.field("icol").unwrap();
//! let rel = scan
//!     .filter(lt(icol.clone(), int(5)))
//!     .project(vec![(icol, FieldName::unquoted("icol"))])
//!     .build();
//! assert_eq!(rel.kind_name(), "Project");
//! ```

use crate::error::{Error, Result};
use crate::function_registry::OperatorRef;
use crate::operators::{self, Operator, SqlKind};
use crate::rel::{
    AggregateCall, CorrelationId, DataType, Field, FieldCollation, FieldName, JoinType, LiteralValue,
    RelNode, RexCall, RexLiteral, RexNode, RowType, SetOpKind, SubQuery, SubQueryKind,
};

/// Reference to field `index` of the input row.
pub fn field(index: usize, data_type: DataType) -> RexNode {
    RexNode::InputRef { index, data_type }
}

pub fn literal(value: LiteralValue, data_type: DataType) -> RexNode {
    RexNode::Literal(RexLiteral { value, data_type })
}

pub fn int(value: i64) -> RexNode {
    literal(LiteralValue::Integer(value), DataType::Integer)
}

/// Exact decimal literal; precision and scale follow the written text.
pub fn decimal(text: &str) -> RexNode {
    let digits = text.chars().filter(char::is_ascii_digit).count() as u32;
    let scale = text
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len() as u32);
    literal(
        LiteralValue::Decimal(text.to_string()),
        DataType::Decimal {
            precision: digits,
            scale,
        },
    )
}

/// Character literal typed `CHAR(<length>)`.
pub fn string(value: &str) -> RexNode {
    literal(
        LiteralValue::String(value.to_string()),
        DataType::Char {
            length: Some(value.chars().count() as u32),
        },
    )
}

pub fn boolean(value: bool) -> RexNode {
    literal(LiteralValue::Boolean(value), DataType::Boolean)
}

pub fn literal_null(data_type: DataType) -> RexNode {
    literal(LiteralValue::Null, data_type)
}

pub fn date(value: &str) -> RexNode {
    literal(LiteralValue::Date(value.to_string()), DataType::Date)
}

pub fn time(value: &str) -> RexNode {
    let precision = value
        .split_once('.')
        .map(|(_, fraction)| fraction.chars().take_while(char::is_ascii_digit).count() as u32);
    literal(LiteralValue::Time(value.to_string()), DataType::Time { precision })
}

pub fn timestamp(value: &str) -> RexNode {
    literal(
        LiteralValue::Timestamp(value.to_string()),
        DataType::Timestamp { precision: None },
    )
}

/// A call to any operator binding.
pub fn call(operator: impl Into<OperatorRef>, operands: Vec<RexNode>, data_type: DataType) -> RexNode {
    RexNode::Call(RexCall {
        operator: operator.into(),
        operands,
        data_type,
    })
}

pub fn cast(expr: RexNode, data_type: DataType) -> RexNode {
    call(operators::CAST, vec![expr], data_type)
}

fn comparison(operator: Operator, left: RexNode, right: RexNode) -> RexNode {
    call(operator, vec![left, right], DataType::Boolean)
}

pub fn eq(left: RexNode, right: RexNode) -> RexNode {
    comparison(operators::EQUALS, left, right)
}

pub fn ne(left: RexNode, right: RexNode) -> RexNode {
    comparison(operators::NOT_EQUALS, left, right)
}

pub fn lt(left: RexNode, right: RexNode) -> RexNode {
    comparison(operators::LESS_THAN, left, right)
}

pub fn gt(left: RexNode, right: RexNode) -> RexNode {
    comparison(operators::GREATER_THAN, left, right)
}

/// Conjunction of all operands; a single operand is returned as is.
pub fn and(mut operands: Vec<RexNode>) -> RexNode {
    if operands.len() == 1 {
        return operands.remove(0);
    }
    call(operators::AND, operands, DataType::Boolean)
}

pub fn not(operand: RexNode) -> RexNode {
    call(operators::NOT, vec![operand], DataType::Boolean)
}

pub fn is_not_null(operand: RexNode) -> RexNode {
    call(operators::IS_NOT_NULL, vec![operand], DataType::Boolean)
}

/// Arithmetic call typed after its left operand.
pub fn arithmetic(operator: Operator, left: RexNode, right: RexNode) -> RexNode {
    let data_type = left.data_type().clone();
    call(operator, vec![left, right], data_type)
}

/// Access a named field of a row-typed expression. Unknown fields type as `ANY`.
pub fn field_access(expr: RexNode, name: &str) -> RexNode {
    let data_type = expr
        .data_type()
        .fields()
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name))
        .map(|f| f.data_type.clone())
        .unwrap_or(DataType::Any);
    RexNode::FieldAccess {
        expr: Box::new(expr),
        field: name.to_string(),
        data_type,
    }
}

/// The current row of correlate `id`, whose left input has `row_type`.
pub fn correl(id: CorrelationId, row_type: &RowType) -> RexNode {
    RexNode::CorrelVariable {
        id,
        data_type: DataType::Row(row_type.fields.clone()),
    }
}

pub fn exists(rel: RelNode) -> RexNode {
    RexNode::SubQuery(SubQuery {
        kind: SubQueryKind::Exists,
        rel: Box::new(rel),
        correlation: None,
        data_type: DataType::Boolean,
    })
}

/// `EXISTS` over a query that references correlate `id` of the enclosing filter.
pub fn correlated_exists(rel: RelNode, id: CorrelationId) -> RexNode {
    RexNode::SubQuery(SubQuery {
        kind: SubQueryKind::Exists,
        rel: Box::new(rel),
        correlation: Some(id),
        data_type: DataType::Boolean,
    })
}

pub fn in_subquery(needles: Vec<RexNode>, rel: RelNode) -> RexNode {
    RexNode::SubQuery(SubQuery {
        kind: SubQueryKind::In { needles },
        rel: Box::new(rel),
        correlation: None,
        data_type: DataType::Boolean,
    })
}

pub fn scalar_subquery(rel: RelNode) -> RexNode {
    let data_type = rel
        .row_type()
        .field(0)
        .map(|f| f.data_type.clone())
        .unwrap_or(DataType::Any);
    RexNode::SubQuery(SubQuery {
        kind: SubQueryKind::Scalar,
        rel: Box::new(rel),
        correlation: None,
        data_type,
    })
}

/// Aggregate call over input fields `args`.
pub fn agg(
    function: impl Into<OperatorRef>,
    args: Vec<usize>,
    distinct: bool,
    name: FieldName,
    data_type: DataType,
) -> AggregateCall {
    AggregateCall {
        function: function.into(),
        args,
        distinct,
        name,
        data_type,
    }
}

/// Builds a [`RelNode`] bottom-up.
#[derive(Debug, Clone)]
pub struct RelBuilder {
    node: RelNode,
}

impl RelBuilder {
    pub fn from_node(node: RelNode) -> Self {
        Self { node }
    }

    pub fn scan(table: &str, fields: Vec<Field>) -> Self {
        Self::scan_qualified(vec![table.to_string()], fields)
    }

    pub fn scan_qualified(table: Vec<String>, fields: Vec<Field>) -> Self {
        Self::from_node(RelNode::TableScan {
            table,
            row_type: RowType::new(fields),
        })
    }

    pub fn values(fields: Vec<Field>, tuples: Vec<Vec<RexLiteral>>) -> Self {
        Self::from_node(RelNode::Values {
            tuples,
            row_type: RowType::new(fields),
        })
    }

    /// The single-row relation a query without `FROM` selects from.
    pub fn one_row() -> Self {
        Self::values(
            vec![Field::new("ZERO", DataType::Integer)],
            vec![vec![RexLiteral {
                value: LiteralValue::Integer(0),
                data_type: DataType::Integer,
            }]],
        )
    }

    /// Reference to a field of the current output by name, ignoring case.
    pub fn field(&self, name: &str) -> Result<RexNode> {
        let row_type = self.node.row_type();
        let index = row_type
            .index_of(name)
            .ok_or_else(|| Error::internal(format!("no field {} in {}", name, self.node.kind_name())))?;
        Ok(field(index, row_type.fields[index].data_type.clone()))
    }

    pub fn row_type(&self) -> RowType {
        self.node.row_type()
    }

    pub fn filter(self, condition: RexNode) -> Self {
        Self::from_node(RelNode::Filter {
            input: Box::new(self.node),
            condition,
        })
    }

    pub fn project(self, exprs: Vec<(RexNode, FieldName)>) -> Self {
        let (exprs, names) = exprs.into_iter().unzip();
        Self::from_node(RelNode::Project {
            input: Box::new(self.node),
            exprs,
            names,
        })
    }

    pub fn aggregate(self, group_set: Vec<usize>, calls: Vec<AggregateCall>) -> Self {
        Self::from_node(RelNode::Aggregate {
            input: Box::new(self.node),
            group_set,
            calls,
        })
    }

    /// `SELECT DISTINCT` over every current field.
    pub fn distinct(self) -> Self {
        let group_set = (0..self.node.row_type().len()).collect();
        self.aggregate(group_set, Vec::new())
    }

    pub fn join(self, right: RelNode, join_type: JoinType, condition: RexNode) -> Self {
        Self::from_node(RelNode::Join {
            left: Box::new(self.node),
            right: Box::new(right),
            join_type,
            condition,
        })
    }

    pub fn correlate(self, right: RelNode, correlation: CorrelationId, join_type: JoinType) -> Self {
        Self::from_node(RelNode::Correlate {
            left: Box::new(self.node),
            right: Box::new(right),
            correlation,
            join_type,
        })
    }

    pub fn sort(self, collation: Vec<FieldCollation>) -> Self {
        Self::from_node(RelNode::Sort {
            input: Box::new(self.node),
            collation,
            offset: None,
            fetch: None,
        })
    }

    /// Attach `OFFSET`/`LIMIT`, folding into a sort that has neither yet.
    pub fn limit(self, offset: Option<u64>, fetch: Option<u64>) -> Self {
        match self.node {
            RelNode::Sort {
                input,
                collation,
                offset: None,
                fetch: None,
            } => Self::from_node(RelNode::Sort {
                input,
                collation,
                offset,
                fetch,
            }),
            node => Self::from_node(RelNode::Sort {
                input: Box::new(node),
                collation: Vec::new(),
                offset,
                fetch,
            }),
        }
    }

    pub fn set_op(self, kind: SetOpKind, all: bool, other: RelNode) -> Self {
        Self::from_node(RelNode::SetOp {
            kind,
            all,
            inputs: vec![self.node, other],
        })
    }

    pub fn union(self, all: bool, other: RelNode) -> Self {
        self.set_op(SetOpKind::Union, all, other)
    }

    pub fn uncollect(self, with_ordinality: bool) -> Self {
        Self::from_node(RelNode::Uncollect {
            input: Box::new(self.node),
            with_ordinality,
        })
    }

    pub fn build(self) -> RelNode {
        self.node
    }
}

/// Whether `rex` is a call of the given kind.
pub fn is_call_of(rex: &RexNode, kind: SqlKind) -> bool {
    rex.as_call().is_some_and(|call| call.is_kind(kind))
}

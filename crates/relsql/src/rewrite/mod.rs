//! Relational algebra to dialect SQL.
//!
//! [`RewriteEngine`] walks a validated [`RelNode`] tree bottom-up. Each node is
//! handled by the first entry of a fixed relational rule list; row expressions
//! go through the target dialect's [`RexRule`] list. The result is an
//! [`Expression`] query that the [`Generator`] prints.
//!
//! ```
//! use relsql::builder::*;
//! use relsql::dialects::TrinoDialect;
//! use relsql::rel::{DataType, Field, FieldName};
//! use relsql::rewrite::RewriteEngine;
//!
//! let scan = RelBuilder::scan("tableOne", vec![Field::new("dcol", DataType::Double)]);
//! let dcol = scan.field("dcol").unwrap();
//! let rel = scan.project(vec![(cast(dcol, DataType::Float), FieldName::Derived)]).build();
//!
//! let sql = RewriteEngine::new(&TrinoDialect).convert(&rel).unwrap();
//! assert_eq!(sql, "SELECT CAST(\"tableOne\".\"dcol\" AS REAL)\nFROM \"tableOne\" AS \"tableOne\"");
//! ```

mod frame;
pub mod rules;
mod subquery;

pub use rules::{RexRule, RuleContext};

use crate::dialects::DialectImpl;
use crate::error::{Error, Result};
use crate::expressions::{
    Expression, Identifier, Join, JoinKind, Ordered, Select, SetOperation, Subquery, TableRef,
    Unnest, Values,
};
use crate::generator::{Generator, GeneratorConfig};
use crate::operators::SqlKind;
use crate::rel::{
    uncollect_row_type, AggregateCall, CorrelationId, DataType, Direction, FieldName, JoinType,
    NullDirection, RelNode, RexCall, RexNode, RowType, SetOpKind, SubQuery, SubQueryKind,
};
use frame::{Clause, Frame};
use std::collections::HashMap;

/// Converts algebra trees into SQL of one target dialect.
pub struct RewriteEngine<'d> {
    dialect: &'d dyn DialectImpl,
    config: GeneratorConfig,
}

impl<'d> RewriteEngine<'d> {
    pub fn new(dialect: &'d dyn DialectImpl) -> Self {
        Self {
            dialect,
            config: dialect.generator_config(),
        }
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Rewrite `rel` into a query expression without printing it.
    pub fn to_expression(&self, rel: &RelNode) -> Result<Expression> {
        let mut converter = Converter::new(self.dialect, &self.config);
        let frame = converter.convert(rel)?;
        Ok(frame.into_query())
    }

    /// Rewrite `rel` and print it.
    pub fn convert(&self, rel: &RelNode) -> Result<String> {
        let query = self.to_expression(rel)?;
        let sql = Generator::with_config(self.config.clone()).generate(&query)?;
        tracing::debug!(
            dialect = %self.dialect.dialect_type(),
            root = rel.kind_name(),
            bytes = sql.len(),
            "converted relational tree"
        );
        Ok(sql)
    }
}

type RelMatcher = fn(&RelNode) -> bool;
type RelConverter = fn(&mut Converter<'_>, &RelNode) -> Result<Frame>;

struct RelRule {
    name: &'static str,
    matches: RelMatcher,
    convert: RelConverter,
}

fn is_scan(rel: &RelNode) -> bool {
    matches!(rel, RelNode::TableScan { .. })
}

fn is_values(rel: &RelNode) -> bool {
    matches!(rel, RelNode::Values { .. })
}

fn is_project(rel: &RelNode) -> bool {
    matches!(rel, RelNode::Project { .. })
}

fn is_subquery_filter(rel: &RelNode) -> bool {
    matches!(rel, RelNode::Filter { condition, .. } if crate::traversal::contains_predicate_subquery(condition))
}

fn is_filter(rel: &RelNode) -> bool {
    matches!(rel, RelNode::Filter { .. })
}

fn is_aggregate(rel: &RelNode) -> bool {
    matches!(rel, RelNode::Aggregate { .. })
}

fn is_join(rel: &RelNode) -> bool {
    matches!(rel, RelNode::Join { .. })
}

fn is_correlate(rel: &RelNode) -> bool {
    matches!(rel, RelNode::Correlate { .. })
}

fn is_sort(rel: &RelNode) -> bool {
    matches!(rel, RelNode::Sort { .. })
}

fn is_set_op(rel: &RelNode) -> bool {
    matches!(rel, RelNode::SetOp { .. })
}

fn is_uncollect(rel: &RelNode) -> bool {
    matches!(rel, RelNode::Uncollect { .. })
}

/// Relational rules in priority order.
static REL_RULES: &[RelRule] = &[
    RelRule { name: "table scan", matches: is_scan, convert: |c, rel| c.visit_scan(rel) },
    RelRule { name: "values", matches: is_values, convert: |c, rel| c.visit_values(rel) },
    RelRule { name: "project", matches: is_project, convert: |c, rel| c.visit_project(rel) },
    RelRule { name: "subquery filter", matches: is_subquery_filter, convert: |c, rel| c.visit_subquery_filter(rel) },
    RelRule { name: "filter", matches: is_filter, convert: |c, rel| c.visit_filter(rel) },
    RelRule { name: "aggregate", matches: is_aggregate, convert: |c, rel| c.visit_aggregate(rel) },
    RelRule { name: "join", matches: is_join, convert: |c, rel| c.visit_join(rel) },
    RelRule { name: "correlate", matches: is_correlate, convert: |c, rel| c.visit_correlate(rel) },
    RelRule { name: "sort", matches: is_sort, convert: |c, rel| c.visit_sort(rel) },
    RelRule { name: "set operation", matches: is_set_op, convert: |c, rel| c.visit_set_op(rel) },
    RelRule { name: "uncollect", matches: is_uncollect, convert: |c, rel| c.visit_uncollect(rel) },
];

/// Output columns of a correlate's left side, visible to its right side.
struct CorrelationScope {
    columns: Vec<Expression>,
    names: Vec<String>,
}

/// Per-conversion state.
pub(crate) struct Converter<'a> {
    dialect: &'a dyn DialectImpl,
    config: &'a GeneratorConfig,
    next_alias: usize,
    correlations: HashMap<CorrelationId, CorrelationScope>,
}

fn relation_alias(name: &str) -> Option<Identifier> {
    Some(Identifier::quoted(name))
}

impl<'a> Converter<'a> {
    fn new(dialect: &'a dyn DialectImpl, config: &'a GeneratorConfig) -> Self {
        Self {
            dialect,
            config,
            next_alias: 0,
            correlations: HashMap::new(),
        }
    }

    fn alias(&mut self) -> String {
        let alias = format!("t{}", self.next_alias);
        self.next_alias += 1;
        alias
    }

    /// Wrap `frame` as a derived table under its reserved alias.
    fn wrap(&mut self, mut frame: Frame) -> Frame {
        let alias = frame.alias.take().unwrap_or_else(|| self.alias());
        frame.wrap(&alias, false)
    }

    pub(crate) fn convert(&mut self, rel: &RelNode) -> Result<Frame> {
        let rule = REL_RULES
            .iter()
            .find(|rule| (rule.matches)(rel))
            .ok_or_else(|| Error::unsupported(rel.kind_name()))?;
        tracing::trace!(rule = rule.name, node = rel.kind_name(), "relational rule matched");
        (rule.convert)(self, rel)
    }

    fn visit_scan(&mut self, rel: &RelNode) -> Result<Frame> {
        let RelNode::TableScan { table, row_type } = rel else {
            return Err(Error::internal("scan rule applied to another node"));
        };
        let name = table
            .last()
            .ok_or_else(|| Error::unsupported("TableScan without a table name"))?;
        let from = Expression::Table(TableRef {
            parts: table.iter().map(Identifier::quoted).collect(),
            alias: relation_alias(name),
        });
        Ok(Frame::relation(from, name, names_of(row_type)))
    }

    fn visit_values(&mut self, rel: &RelNode) -> Result<Frame> {
        let RelNode::Values { tuples, row_type } = rel else {
            return Err(Error::internal("values rule applied to another node"));
        };
        let names = names_of(row_type);
        let from = Expression::Values(Box::new(Values {
            expressions: tuples
                .iter()
                .map(|tuple| tuple.iter().map(rules::literal).collect())
                .collect(),
            alias: relation_alias("t"),
            column_aliases: names.iter().map(Identifier::quoted).collect(),
        }));
        Ok(Frame::relation(from, "t", names))
    }

    fn visit_project(&mut self, rel: &RelNode) -> Result<Frame> {
        let RelNode::Project { input, exprs, names } = rel else {
            return Err(Error::internal("project rule applied to another node"));
        };
        let mut frame = self.convert(input)?;
        if frame.needs_wrap(Clause::Select) {
            frame = self.wrap(frame);
        }
        let columns = exprs
            .iter()
            .map(|expr| self.rex(expr, &frame.columns))
            .collect::<Result<Vec<_>>>()?;
        let names = exprs
            .iter()
            .enumerate()
            .map(|(i, expr)| {
                names
                    .get(i)
                    .unwrap_or(&FieldName::Derived)
                    .resolve(i, Some(expr), self.config.unquoted_casing)
            })
            .collect();
        frame.set_select(columns, names)?;
        frame.add_clause(Clause::Select);
        frame.alias = Some(self.alias());
        Ok(frame)
    }

    fn visit_filter(&mut self, rel: &RelNode) -> Result<Frame> {
        let RelNode::Filter { input, condition } = rel else {
            return Err(Error::internal("filter rule applied to another node"));
        };
        let frame = self.convert(input)?;
        let having = frame.has(Clause::GroupBy) && !frame.needs_wrap(Clause::Having);
        let mut frame = if !having && frame.needs_wrap(Clause::Where) {
            self.wrap(frame)
        } else {
            frame
        };
        let condition = self.rex(condition, &frame.columns)?;
        let select = frame.select_mut()?;
        if having {
            select.having = Some(condition);
            frame.add_clause(Clause::Having);
        } else {
            select.where_clause = Some(condition);
            frame.add_clause(Clause::Where);
        }
        Ok(frame)
    }

    fn visit_subquery_filter(&mut self, rel: &RelNode) -> Result<Frame> {
        let RelNode::Filter { input, condition } = rel else {
            return Err(Error::internal("filter rule applied to another node"));
        };
        let lowered = subquery::lower_filter(input, condition)?;
        let mut frame = self.convert(&lowered)?;
        frame.truncate(input.row_type().len());
        Ok(frame)
    }

    fn visit_aggregate(&mut self, rel: &RelNode) -> Result<Frame> {
        let RelNode::Aggregate {
            input,
            group_set,
            calls,
        } = rel
        else {
            return Err(Error::internal("aggregate rule applied to another node"));
        };
        let mut frame = self.convert(input)?;
        let merge = matches!(input.as_ref(), RelNode::Project { .. })
            && frame.only_uses(&[Clause::Where, Clause::Select]);
        if merge {
            frame.remove_clause(Clause::Select);
        } else if frame.needs_wrap(Clause::GroupBy) {
            frame = self.wrap(frame);
        }

        let input_type = input.row_type_with(self.config.unquoted_casing);
        let mut columns = Vec::with_capacity(group_set.len() + calls.len());
        let mut names = Vec::with_capacity(group_set.len() + calls.len());
        for &index in group_set {
            columns.push(frame.column(index)?);
            names.push(frame.names.get(index).cloned().unwrap_or_default());
        }
        let group_by = columns.clone();
        for (i, call) in calls.iter().enumerate() {
            columns.push(self.aggregate_call(call, &frame.columns, &input_type)?);
            names.push(call.name.resolve(group_set.len() + i, None, self.config.unquoted_casing));
        }

        frame.set_select(columns, names)?;
        frame.select_mut()?.group_by = group_by;
        frame.add_clause(Clause::GroupBy);
        frame.alias = Some(self.alias());
        Ok(frame)
    }

    fn aggregate_call(
        &mut self,
        call: &AggregateCall,
        columns: &[Expression],
        input_type: &RowType,
    ) -> Result<Expression> {
        if call.args.is_empty() && call.function.is_kind(SqlKind::Count) {
            return Ok(Expression::function("COUNT", vec![Expression::Star]));
        }
        let operands = call
            .args
            .iter()
            .map(|&index| column(columns, index))
            .collect::<Result<Vec<_>>>()?;
        let rex = RexCall {
            operator: call.function.clone(),
            operands: call
                .args
                .iter()
                .map(|&index| RexNode::InputRef {
                    index,
                    data_type: input_type
                        .field(index)
                        .map(|f| f.data_type.clone())
                        .unwrap_or(DataType::Any),
                })
                .collect(),
            data_type: call.data_type.clone(),
        };
        let ctx = RuleContext::new(self.dialect, self.config);
        let mut expr = rules::apply_rules(self.dialect.rex_rules(), &rex, operands.clone(), &ctx)?;
        if call.distinct {
            match &mut expr {
                Expression::Function(function) if function.args == operands => {
                    function.distinct = true;
                }
                _ => {
                    return Err(Error::unsupported(format!(
                        "DISTINCT aggregate {}",
                        call.function.name()
                    )))
                }
            }
        }
        Ok(expr)
    }

    /// FROM-with-joins of `frame`, wrapping it first unless it is a bare
    /// relation or a join.
    fn join_source(&mut self, frame: Frame) -> Result<(Select, Vec<Expression>, Vec<String>)> {
        if frame.is_bare_relation() || frame.is_join() {
            frame.into_source()
        } else {
            self.wrap(frame).into_source()
        }
    }

    /// `frame` as a single FROM item.
    fn join_item(&mut self, frame: Frame) -> Result<(Expression, Vec<Expression>, Vec<String>)> {
        if frame.is_bare_relation() {
            frame.into_relation()
        } else {
            self.wrap(frame).into_relation()
        }
    }

    fn visit_join(&mut self, rel: &RelNode) -> Result<Frame> {
        let RelNode::Join {
            left,
            right,
            join_type,
            condition,
        } = rel
        else {
            return Err(Error::internal("join rule applied to another node"));
        };
        let left = self.convert(left)?;
        let (mut select, mut columns, mut names) = self.join_source(left)?;
        let right = self.convert(right)?;
        let (item, right_columns, right_names) = self.join_item(right)?;
        columns.extend(right_columns);
        names.extend(right_names);

        let (kind, on) = match join_type {
            JoinType::Inner if condition.is_always_true() => (JoinKind::Cross, None),
            JoinType::Inner => (JoinKind::Inner, Some(self.rex(condition, &columns)?)),
            JoinType::Left => (JoinKind::Left, Some(self.rex(condition, &columns)?)),
            JoinType::Right => (JoinKind::Right, Some(self.rex(condition, &columns)?)),
            JoinType::Full => (JoinKind::Full, Some(self.rex(condition, &columns)?)),
        };
        select.joins.push(Join { this: item, on, kind });
        Ok(Frame::joined(select, columns, names))
    }

    fn visit_correlate(&mut self, rel: &RelNode) -> Result<Frame> {
        let RelNode::Correlate {
            left,
            right,
            correlation,
            join_type,
        } = rel
        else {
            return Err(Error::internal("correlate rule applied to another node"));
        };
        let kind = match join_type {
            JoinType::Inner => JoinKind::Cross,
            JoinType::Left => JoinKind::Left,
            other => {
                return Err(Error::unsupported(format!("Correlate with {:?} join", other)));
            }
        };

        let cor_alias = correlation.to_string();
        let mut left = self.convert(left)?;
        if left.is_bare_relation() {
            left.realias(&cor_alias)?;
        } else if !left.is_join() {
            left = left.wrap(&cor_alias, false);
        }
        self.correlations.insert(
            *correlation,
            CorrelationScope {
                columns: left.columns.clone(),
                names: left.names.clone(),
            },
        );
        let (mut select, mut columns, mut names) = left.into_source()?;

        let mut right = self.convert(right)?;
        let (item, right_columns, right_names) = if right.is_bare_unnest() {
            right.into_relation()?
        } else {
            let alias = right.alias.take().unwrap_or_else(|| self.alias());
            right.wrap(&alias, true).into_relation()?
        };
        columns.extend(right_columns);
        names.extend(right_names);

        let on = (kind == JoinKind::Left).then_some(Expression::Boolean(true));
        select.joins.push(Join { this: item, on, kind });
        Ok(Frame::joined(select, columns, names))
    }

    fn visit_sort(&mut self, rel: &RelNode) -> Result<Frame> {
        let RelNode::Sort {
            input,
            collation,
            offset,
            fetch,
        } = rel
        else {
            return Err(Error::internal("sort rule applied to another node"));
        };
        let mut frame = self.convert(input)?;
        let first = if collation.is_empty() {
            Clause::Fetch
        } else {
            Clause::OrderBy
        };
        if frame.needs_wrap(first) || frame.has(Clause::SetOp) {
            frame = self.wrap(frame);
        }
        let order_by = collation
            .iter()
            .map(|key| {
                Ok(Ordered {
                    this: frame.column(key.field)?,
                    desc: key.direction == Direction::Descending,
                    nulls_first: key.nulls.map(|nulls| nulls == NullDirection::First),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let select = frame.select_mut()?;
        select.order_by = order_by;
        select.offset = offset.map(|n| Expression::number(n.to_string()));
        select.limit = fetch.map(|n| Expression::number(n.to_string()));
        if !collation.is_empty() {
            frame.add_clause(Clause::OrderBy);
        }
        if offset.is_some() || fetch.is_some() {
            frame.add_clause(Clause::Fetch);
        }
        Ok(frame)
    }

    fn visit_set_op(&mut self, rel: &RelNode) -> Result<Frame> {
        let RelNode::SetOp { kind, all, inputs } = rel else {
            return Err(Error::internal("set operation rule applied to another node"));
        };
        let mut frames = inputs
            .iter()
            .map(|input| self.convert(input))
            .collect::<Result<Vec<_>>>()?
            .into_iter();
        let first = frames
            .next()
            .ok_or_else(|| Error::unsupported("SetOp without inputs"))?;
        let names = first.names.clone();
        let mut query = first.into_query();
        for frame in frames {
            let op = Box::new(SetOperation {
                left: query,
                right: frame.into_query(),
                all: *all,
            });
            query = match kind {
                SetOpKind::Union => Expression::Union(op),
                SetOpKind::Intersect => Expression::Intersect(op),
                SetOpKind::Except => Expression::Except(op),
            };
        }
        Ok(Frame::set_operation(query, names))
    }

    fn visit_uncollect(&mut self, rel: &RelNode) -> Result<Frame> {
        let RelNode::Uncollect {
            input,
            with_ordinality,
        } = rel
        else {
            return Err(Error::internal("uncollect rule applied to another node"));
        };
        let frame = self.convert(input)?;
        if !frame.is_projection_of_values() {
            return Err(Error::unsupported("Uncollect over a non-constant relation"));
        }
        let alias = match &frame.alias {
            Some(alias) => alias.clone(),
            None => self.alias(),
        };
        let row_type = uncollect_row_type(
            &input.row_type_with(self.config.unquoted_casing),
            *with_ordinality,
        );
        let names = names_of(&row_type);
        let from = Expression::Unnest(Box::new(Unnest {
            expressions: frame.columns,
            with_ordinality: *with_ordinality,
            alias: relation_alias(&alias),
            column_aliases: names.iter().map(Identifier::quoted).collect(),
        }));
        Ok(Frame::relation(from, &alias, names))
    }

    /// Convert a row expression whose input columns read as `columns`.
    pub(crate) fn rex(&mut self, rex: &RexNode, columns: &[Expression]) -> Result<Expression> {
        match rex {
            RexNode::InputRef { index, .. } => column(columns, *index),
            RexNode::Literal(literal) => Ok(rules::literal(literal)),
            RexNode::FieldAccess { expr, field, .. } => {
                if let RexNode::CorrelVariable { id, .. } = expr.as_ref() {
                    return self.correlated_column(*id, field);
                }
                let this = self.rex(expr, columns)?;
                Ok(Expression::dot(this, Identifier::quoted(field)))
            }
            RexNode::CorrelVariable { id, .. } => Err(Error::unsupported(format!(
                "correlation variable {} outside a field access",
                id
            ))),
            RexNode::Call(call) => {
                let operands = call
                    .operands
                    .iter()
                    .map(|operand| self.rex(operand, columns))
                    .collect::<Result<Vec<_>>>()?;
                let ctx = RuleContext::new(self.dialect, self.config);
                rules::apply_rules(self.dialect.rex_rules(), call, operands, &ctx)
            }
            RexNode::SubQuery(sub) => self.scalar_subquery(sub),
        }
    }

    fn correlated_column(&self, id: CorrelationId, field: &str) -> Result<Expression> {
        let scope = self
            .correlations
            .get(&id)
            .ok_or_else(|| Error::unsupported(format!("correlation variable {} without a Correlate", id)))?;
        scope
            .names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(field))
            .and_then(|index| scope.columns.get(index).cloned())
            .ok_or_else(|| Error::internal(format!("no field {} in correlation {}", field, id)))
    }

    fn scalar_subquery(&mut self, sub: &SubQuery) -> Result<Expression> {
        match sub.kind {
            SubQueryKind::Scalar if sub.correlation.is_some() => {
                Err(Error::unsupported("correlated scalar subquery"))
            }
            SubQueryKind::Scalar => {
                let frame = self.convert(&sub.rel)?;
                Ok(Expression::Subquery(Box::new(Subquery {
                    this: frame.into_query(),
                    alias: None,
                    column_aliases: Vec::new(),
                    lateral: false,
                })))
            }
            SubQueryKind::Exists => Err(Error::unsupported("EXISTS subquery outside a filter")),
            SubQueryKind::In { .. } => Err(Error::unsupported("IN subquery outside a filter")),
        }
    }
}

fn names_of(row_type: &RowType) -> Vec<String> {
    row_type.names().map(str::to_string).collect()
}

fn column(columns: &[Expression], index: usize) -> Result<Expression> {
    columns.get(index).cloned().ok_or_else(|| {
        Error::internal(format!(
            "input reference ${} out of range for {} columns",
            index,
            columns.len()
        ))
    })
}

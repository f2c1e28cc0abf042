//! SQL syntax tree produced by the rewrite engine.
//!
//! This is the target side of a conversion: the rewrite engine lowers an
//! algebra tree into these nodes, and the [`Generator`](crate::generator::Generator)
//! serializes them. Nodes carry only what the generator needs to print; there
//! is no parser producing them.

use crate::rel::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A SQL identifier: table alias, column name, field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// The raw text, without quote characters.
    pub name: String,
    /// Whether the generator should delimit it.
    pub quoted: bool,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: false,
        }
    }

    pub fn quoted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: true,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.name.replace('"', "\"\""))
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Literal values. Numbers are stored as text so their written scale is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "literal_type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// `'text'`
    String(String),
    /// `42`, `32.00`
    Number(String),
    /// `DATE '2017-10-21'`
    Date(String),
    /// `TIME '13:45:21.011'`
    Time(String),
    /// `TIMESTAMP '2017-10-21 13:45:21'`
    Timestamp(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Number(n) => f.write_str(n),
            Literal::Date(d) => write!(f, "DATE '{}'", d),
            Literal::Time(t) => write!(f, "TIME '{}'", t),
            Literal::Timestamp(ts) => write!(f, "TIMESTAMP '{}'", ts),
        }
    }
}

/// A column reference, optionally qualified by a relation alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    pub name: Identifier,
    pub table: Option<Identifier>,
}

/// A base table in `FROM`, printed with an explicit alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    /// Qualified name parts, outermost first.
    pub parts: Vec<Identifier>,
    pub alias: Option<Identifier>,
}

/// `expr AS alias`, or `relation AS alias (c1, c2)` for relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub this: Expression,
    pub alias: Identifier,
}

impl Alias {
    pub fn new(this: Expression, alias: Identifier) -> Self {
        Self { this, alias }
    }
}

/// Field selection on a row-typed expression: `expr."FIELD"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub this: Expression,
    pub field: Identifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cast {
    pub this: Expression,
    /// Target type, already mapped onto the output dialect.
    pub to: DataType,
}

/// Searched (`operand` is `None`) or simple CASE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub operand: Option<Expression>,
    pub whens: Vec<(Expression, Expression)>,
    pub else_: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryOp {
    pub left: Expression,
    pub right: Expression,
}

impl BinaryOp {
    pub fn new(left: Expression, right: Expression) -> Self {
        Self { left, right }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryOp {
    pub this: Expression,
}

/// `x IS [NOT] NULL`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsNull {
    pub this: Expression,
    pub not: bool,
}

/// `x [NOT] IN (a, b, ...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct In {
    pub this: Expression,
    pub expressions: Vec<Expression>,
    pub not: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Between {
    pub this: Expression,
    pub low: Expression,
    pub high: Expression,
}

/// A function call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub args: Vec<Expression>,
    /// `COUNT(DISTINCT x)`
    pub distinct: bool,
    /// Print the name as a delimited identifier: `"SUBSTR"(...)`.
    pub quoted: bool,
    /// Print without parentheses: `CURRENT_DATE`.
    pub no_parens: bool,
}

impl Function {
    pub fn new(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            args,
            distinct: false,
            quoted: false,
            no_parens: false,
        }
    }
}

/// Parenthesized query used as a relation or a scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subquery {
    pub this: Expression,
    pub alias: Option<Identifier>,
    pub column_aliases: Vec<Identifier>,
    /// `LATERAL (...)`
    pub lateral: bool,
}

/// `(VALUES (..), (..)) AS alias (c1, c2)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Values {
    pub expressions: Vec<Vec<Expression>>,
    pub alias: Option<Identifier>,
    pub column_aliases: Vec<Identifier>,
}

/// `UNNEST(a, b) [WITH ORDINALITY] AS alias (c1, c2)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unnest {
    pub expressions: Vec<Expression>,
    pub with_ordinality: bool,
    pub alias: Option<Identifier>,
    pub column_aliases: Vec<Identifier>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub this: Expression,
    pub on: Option<Expression>,
    pub kind: JoinKind,
}

/// One ORDER BY key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordered {
    pub this: Expression,
    pub desc: bool,
    /// `Some(true)` prints `NULLS FIRST`, `Some(false)` prints `NULLS LAST`.
    pub nulls_first: Option<bool>,
}

/// A SELECT query block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Select {
    /// Select list; empty prints `*`.
    pub expressions: Vec<Expression>,
    pub from: Option<Expression>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<Ordered>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Operands of UNION / INTERSECT / EXCEPT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOperation {
    pub left: Expression,
    pub right: Expression,
    pub all: bool,
}

/// A node of the output SQL tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Literal(Literal),
    Boolean(bool),
    Null,
    Star,
    Column(Column),
    Table(TableRef),
    Dot(Box<Dot>),
    Alias(Box<Alias>),
    Cast(Box<Cast>),
    Case(Box<Case>),

    // binary operators
    And(Box<BinaryOp>),
    Or(Box<BinaryOp>),
    Eq(Box<BinaryOp>),
    Neq(Box<BinaryOp>),
    Lt(Box<BinaryOp>),
    Gt(Box<BinaryOp>),
    Lte(Box<BinaryOp>),
    Gte(Box<BinaryOp>),
    Add(Box<BinaryOp>),
    Sub(Box<BinaryOp>),
    Mul(Box<BinaryOp>),
    Div(Box<BinaryOp>),
    Mod(Box<BinaryOp>),
    Concat(Box<BinaryOp>),
    Like(Box<BinaryOp>),

    // unary operators
    Not(Box<UnaryOp>),
    Neg(Box<UnaryOp>),
    Pos(Box<UnaryOp>),
    IsNull(Box<IsNull>),
    IsTrue(Box<UnaryOp>),
    IsFalse(Box<UnaryOp>),

    In(Box<In>),
    Between(Box<Between>),
    Function(Box<Function>),
    /// `ARRAY[a, b]`
    Array(Vec<Expression>),
    /// `ROW(a, b)`
    Row(Vec<Expression>),

    // relations and queries
    Subquery(Box<Subquery>),
    Values(Box<Values>),
    Unnest(Box<Unnest>),
    Select(Box<Select>),
    Union(Box<SetOperation>),
    Intersect(Box<SetOperation>),
    Except(Box<SetOperation>),
}

impl Expression {
    pub fn number(text: impl Into<String>) -> Self {
        Expression::Literal(Literal::Number(text.into()))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(text.into()))
    }

    /// Quoted, qualified column reference: `"table"."name"`.
    pub fn qualified_column(table: &str, name: &str) -> Self {
        Expression::Column(Column {
            name: Identifier::quoted(name),
            table: Some(Identifier::quoted(table)),
        })
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function(Box::new(Function::new(name, args)))
    }

    /// Call whose name prints as a delimited identifier.
    pub fn quoted_function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        let mut function = Function::new(name, args);
        function.quoted = true;
        Expression::Function(Box::new(function))
    }

    /// Keyword-like call without parentheses.
    pub fn keyword(name: impl Into<String>) -> Self {
        let mut function = Function::new(name, Vec::new());
        function.no_parens = true;
        Expression::Function(Box::new(function))
    }

    pub fn cast(this: Expression, to: DataType) -> Self {
        Expression::Cast(Box::new(Cast { this, to }))
    }

    pub fn alias(this: Expression, alias: Identifier) -> Self {
        Expression::Alias(Box::new(Alias::new(this, alias)))
    }

    pub fn dot(this: Expression, field: Identifier) -> Self {
        Expression::Dot(Box::new(Dot { this, field }))
    }

    pub fn not(this: Expression) -> Self {
        Expression::Not(Box::new(UnaryOp { this }))
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Expression::Eq(Box::new(BinaryOp::new(left, right)))
    }

    pub fn mul(left: Expression, right: Expression) -> Self {
        Expression::Mul(Box::new(BinaryOp::new(left, right)))
    }

    pub fn div(left: Expression, right: Expression) -> Self {
        Expression::Div(Box::new(BinaryOp::new(left, right)))
    }

    /// Left-deep conjunction; `None` for an empty list.
    pub fn and_all(conditions: Vec<Expression>) -> Option<Self> {
        conditions
            .into_iter()
            .reduce(|left, right| Expression::And(Box::new(BinaryOp::new(left, right))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_display_escapes_quotes() {
        assert_eq!(Identifier::quoted("a\"b").to_string(), "\"a\"\"b\"");
        assert_eq!(Identifier::new("element_at").to_string(), "element_at");
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::String("it's".into()).to_string(), "'it''s'");
        assert_eq!(Literal::Date("2017-10-21".into()).to_string(), "DATE '2017-10-21'");
        assert_eq!(Literal::Number("32.00".into()).to_string(), "32.00");
    }

    #[test]
    fn test_and_all() {
        assert!(Expression::and_all(Vec::new()).is_none());
        let single = Expression::and_all(vec![Expression::Boolean(true)]);
        assert_eq!(single, Some(Expression::Boolean(true)));
    }
}

//! Operator catalog.
//!
//! The static set of standard operators (arithmetic, comparison, logical,
//! constructors, casts, the standard built-in functions) plus dialect
//! extensions such as Hive's regex operators. The resolver consults it for
//! unary and binary operator lookup; the rewrite engine matches on
//! [`SqlKind`] to decide how a call prints.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Identity of an operator, independent of its spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlKind {
    // arithmetic
    Plus,
    Minus,
    Times,
    Divide,
    Mod,
    UnaryPlus,
    UnaryMinus,
    DatetimePlus,
    DatetimeMinus,

    // comparison
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Between,
    In,
    NotIn,
    Like,
    RLike,

    // logical
    And,
    Or,
    Not,
    IsNull,
    IsNotNull,
    IsTrue,
    IsFalse,
    Exists,

    // structural
    Case,
    Cast,
    Item,
    ArrayValueConstructor,
    MapValueConstructor,
    Row,
    Concat,

    // functions
    Substring,
    Power,
    Coalesce,
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
    CurrentUser,
    Count,
    Sum,
    Min,
    Max,
    Avg,
    OtherFunction,
}

impl SqlKind {
    pub fn is_aggregate(self) -> bool {
        matches!(
            self,
            SqlKind::Count | SqlKind::Sum | SqlKind::Min | SqlKind::Max | SqlKind::Avg
        )
    }

    /// Niladic pseudo-columns such as `CURRENT_DATE`.
    pub fn is_context_variable(self) -> bool {
        matches!(
            self,
            SqlKind::CurrentDate
                | SqlKind::CurrentTime
                | SqlKind::CurrentTimestamp
                | SqlKind::CurrentUser
        )
    }
}

/// Arity class and surface form of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorSyntax {
    /// `-x`, `NOT x`
    Prefix,
    /// `x IS NULL`
    Postfix,
    /// `x + y`
    Binary,
    /// Operators with bespoke syntax or variadic positional operands (`CASE`, `ITEM`, `+` on datetimes)
    Special,
    /// `f(x, y)`
    Function,
    /// `CURRENT_DATE` without parentheses
    FunctionId,
}

impl OperatorSyntax {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorSyntax::Prefix => "prefix",
            OperatorSyntax::Postfix => "postfix",
            OperatorSyntax::Binary => "binary",
            OperatorSyntax::Special => "special",
            OperatorSyntax::Function => "function",
            OperatorSyntax::FunctionId => "function identifier",
        }
    }
}

/// A built-in operator or function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operator {
    pub name: Cow<'static, str>,
    pub kind: SqlKind,
    pub syntax: OperatorSyntax,
}

impl Operator {
    pub const fn new(name: &'static str, kind: SqlKind, syntax: OperatorSyntax) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind,
            syntax,
        }
    }

    const fn prefix(name: &'static str, kind: SqlKind) -> Self {
        Self::new(name, kind, OperatorSyntax::Prefix)
    }

    const fn postfix(name: &'static str, kind: SqlKind) -> Self {
        Self::new(name, kind, OperatorSyntax::Postfix)
    }

    const fn binary(name: &'static str, kind: SqlKind) -> Self {
        Self::new(name, kind, OperatorSyntax::Binary)
    }

    const fn special(name: &'static str, kind: SqlKind) -> Self {
        Self::new(name, kind, OperatorSyntax::Special)
    }

    const fn function(name: &'static str, kind: SqlKind) -> Self {
        Self::new(name, kind, OperatorSyntax::Function)
    }

    const fn function_id(name: &'static str, kind: SqlKind) -> Self {
        Self::new(name, kind, OperatorSyntax::FunctionId)
    }

    /// A built-in function that has no dedicated [`SqlKind`].
    pub fn named_function(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            kind: SqlKind::OtherFunction,
            syntax: OperatorSyntax::Function,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_unary(&self) -> bool {
        self.syntax == OperatorSyntax::Prefix
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.syntax, OperatorSyntax::Binary | OperatorSyntax::Special)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub const PLUS: Operator = Operator::binary("+", SqlKind::Plus);
pub const MINUS: Operator = Operator::binary("-", SqlKind::Minus);
pub const MULTIPLY: Operator = Operator::binary("*", SqlKind::Times);
pub const DIVIDE: Operator = Operator::binary("/", SqlKind::Divide);
pub const PERCENT_REMAINDER: Operator = Operator::binary("%", SqlKind::Mod);
pub const DATETIME_PLUS: Operator = Operator::special("+", SqlKind::DatetimePlus);
pub const MINUS_DATE: Operator = Operator::special("-", SqlKind::DatetimeMinus);
pub const UNARY_PLUS: Operator = Operator::prefix("+", SqlKind::UnaryPlus);
pub const UNARY_MINUS: Operator = Operator::prefix("-", SqlKind::UnaryMinus);

pub const EQUALS: Operator = Operator::binary("=", SqlKind::Equals);
pub const NOT_EQUALS: Operator = Operator::binary("<>", SqlKind::NotEquals);
pub const LESS_THAN: Operator = Operator::binary("<", SqlKind::LessThan);
pub const GREATER_THAN: Operator = Operator::binary(">", SqlKind::GreaterThan);
pub const LESS_THAN_OR_EQUAL: Operator = Operator::binary("<=", SqlKind::LessThanOrEqual);
pub const GREATER_THAN_OR_EQUAL: Operator = Operator::binary(">=", SqlKind::GreaterThanOrEqual);
pub const BETWEEN: Operator = Operator::special("BETWEEN", SqlKind::Between);
pub const IN: Operator = Operator::binary("IN", SqlKind::In);
pub const NOT_IN: Operator = Operator::binary("NOT IN", SqlKind::NotIn);
pub const LIKE: Operator = Operator::special("LIKE", SqlKind::Like);
pub const CONCAT: Operator = Operator::binary("||", SqlKind::Concat);

pub const AND: Operator = Operator::binary("AND", SqlKind::And);
pub const OR: Operator = Operator::binary("OR", SqlKind::Or);
pub const NOT: Operator = Operator::prefix("NOT", SqlKind::Not);
pub const EXISTS: Operator = Operator::prefix("EXISTS", SqlKind::Exists);
pub const IS_NULL: Operator = Operator::postfix("IS NULL", SqlKind::IsNull);
pub const IS_NOT_NULL: Operator = Operator::postfix("IS NOT NULL", SqlKind::IsNotNull);
pub const IS_TRUE: Operator = Operator::postfix("IS TRUE", SqlKind::IsTrue);
pub const IS_FALSE: Operator = Operator::postfix("IS FALSE", SqlKind::IsFalse);

pub const CASE: Operator = Operator::special("CASE", SqlKind::Case);
pub const CAST: Operator = Operator::special("CAST", SqlKind::Cast);
pub const ITEM: Operator = Operator::special("ITEM", SqlKind::Item);
pub const ARRAY_VALUE_CONSTRUCTOR: Operator =
    Operator::special("ARRAY", SqlKind::ArrayValueConstructor);
pub const MAP_VALUE_CONSTRUCTOR: Operator =
    Operator::special("MAP", SqlKind::MapValueConstructor);
pub const ROW: Operator = Operator::special("ROW", SqlKind::Row);

pub const SUBSTRING: Operator = Operator::function("SUBSTRING", SqlKind::Substring);
pub const POWER: Operator = Operator::function("POWER", SqlKind::Power);
pub const COALESCE: Operator = Operator::function("COALESCE", SqlKind::Coalesce);
pub const ABS: Operator = Operator::function("ABS", SqlKind::OtherFunction);
pub const FLOOR: Operator = Operator::function("FLOOR", SqlKind::OtherFunction);
pub const CEIL: Operator = Operator::function("CEIL", SqlKind::OtherFunction);
pub const LOWER: Operator = Operator::function("LOWER", SqlKind::OtherFunction);
pub const UPPER: Operator = Operator::function("UPPER", SqlKind::OtherFunction);
pub const CHAR_LENGTH: Operator = Operator::function("CHAR_LENGTH", SqlKind::OtherFunction);
pub const MOD: Operator = Operator::function("MOD", SqlKind::Mod);

pub const CURRENT_DATE: Operator = Operator::function_id("CURRENT_DATE", SqlKind::CurrentDate);
pub const CURRENT_TIME: Operator = Operator::function_id("CURRENT_TIME", SqlKind::CurrentTime);
pub const CURRENT_TIMESTAMP: Operator =
    Operator::function_id("CURRENT_TIMESTAMP", SqlKind::CurrentTimestamp);
pub const CURRENT_USER: Operator = Operator::function_id("CURRENT_USER", SqlKind::CurrentUser);

pub const COUNT: Operator = Operator::function("COUNT", SqlKind::Count);
pub const SUM: Operator = Operator::function("SUM", SqlKind::Sum);
pub const MIN: Operator = Operator::function("MIN", SqlKind::Min);
pub const MAX: Operator = Operator::function("MAX", SqlKind::Max);
pub const AVG: Operator = Operator::function("AVG", SqlKind::Avg);

/// Every standard operator, in catalog order.
pub const STANDARD_OPERATORS: &[Operator] = &[
    PLUS,
    MINUS,
    MULTIPLY,
    DIVIDE,
    PERCENT_REMAINDER,
    DATETIME_PLUS,
    MINUS_DATE,
    UNARY_PLUS,
    UNARY_MINUS,
    EQUALS,
    NOT_EQUALS,
    LESS_THAN,
    GREATER_THAN,
    LESS_THAN_OR_EQUAL,
    GREATER_THAN_OR_EQUAL,
    BETWEEN,
    IN,
    NOT_IN,
    LIKE,
    CONCAT,
    AND,
    OR,
    NOT,
    EXISTS,
    IS_NULL,
    IS_NOT_NULL,
    IS_TRUE,
    IS_FALSE,
    CASE,
    CAST,
    ITEM,
    ARRAY_VALUE_CONSTRUCTOR,
    MAP_VALUE_CONSTRUCTOR,
    ROW,
    SUBSTRING,
    POWER,
    COALESCE,
    ABS,
    FLOOR,
    CEIL,
    LOWER,
    UPPER,
    CHAR_LENGTH,
    MOD,
    CURRENT_DATE,
    CURRENT_TIME,
    CURRENT_TIMESTAMP,
    CURRENT_USER,
    COUNT,
    SUM,
    MIN,
    MAX,
    AVG,
];

/// Static operator table consulted for unary/binary lookup.
#[derive(Debug, Clone)]
pub struct OperatorCatalog {
    operators: Vec<Arc<Operator>>,
}

impl OperatorCatalog {
    /// The standard operators only.
    pub fn standard() -> Self {
        Self {
            operators: STANDARD_OPERATORS.iter().cloned().map(Arc::new).collect(),
        }
    }

    /// The standard operators followed by dialect-specific additions.
    pub fn with_extensions(extensions: impl IntoIterator<Item = Operator>) -> Self {
        let mut catalog = Self::standard();
        catalog
            .operators
            .extend(extensions.into_iter().map(Arc::new));
        catalog
    }

    pub fn operators(&self) -> &[Arc<Operator>] {
        &self.operators
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Prefix operators whose name matches `name`, ignoring case.
    pub fn prefix_operators(&self, name: &str) -> Vec<Arc<Operator>> {
        self.matching(name, |op| op.is_unary())
    }

    /// Binary and special operators whose name matches `name`, ignoring case.
    pub fn binary_operators(&self, name: &str) -> Vec<Arc<Operator>> {
        self.matching(name, |op| op.is_binary())
    }

    /// First operator with exactly this canonical name.
    pub fn by_name(&self, name: &str) -> Option<Arc<Operator>> {
        self.operators
            .iter()
            .find(|op| op.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn matching(&self, name: &str, accept: impl Fn(&Operator) -> bool) -> Vec<Arc<Operator>> {
        let lower = name.to_lowercase();
        self.operators
            .iter()
            .filter(|op| op.name.to_lowercase() == lower && accept(op))
            .cloned()
            .collect()
    }
}

impl Default for OperatorCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_and_minus_have_two_binary_candidates() {
        let catalog = OperatorCatalog::standard();
        let plus: Vec<SqlKind> = catalog.binary_operators("+").iter().map(|o| o.kind).collect();
        assert_eq!(plus, vec![SqlKind::Plus, SqlKind::DatetimePlus]);
        let minus: Vec<SqlKind> = catalog.binary_operators("-").iter().map(|o| o.kind).collect();
        assert_eq!(minus, vec![SqlKind::Minus, SqlKind::DatetimeMinus]);
    }

    #[test]
    fn test_prefix_lookup_ignores_case() {
        let catalog = OperatorCatalog::standard();
        let not = catalog.prefix_operators("not");
        assert_eq!(not.len(), 1);
        assert_eq!(*not[0], NOT);
    }

    #[test]
    fn test_extensions_are_appended() {
        let rlike = Operator::new("RLIKE", SqlKind::RLike, OperatorSyntax::Special);
        let catalog = OperatorCatalog::with_extensions([rlike.clone()]);
        assert_eq!(catalog.binary_operators("rlike"), vec![Arc::new(rlike)]);
        assert_eq!(catalog.operators().len(), STANDARD_OPERATORS.len() + 1);
    }
}

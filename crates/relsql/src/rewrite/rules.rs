//! Expression rewrite rules.
//!
//! A [`RexRule`] pairs a predicate over a call with an emitter that builds the
//! output expression from the already-converted operands. Dialects list their
//! rules in priority order; [`apply_rules`] picks the first match and fails
//! when nothing matches.
//!
//! The rules in this module print calls in their standard SQL form and are
//! shared by every target dialect, usually at the end of its list.

use crate::dialects::DialectImpl;
use crate::error::{Error, Result};
use crate::expressions::{Between, BinaryOp, Case, Expression, In, IsNull, Literal, UnaryOp};
use crate::function_registry::OperatorRef;
use crate::generator::GeneratorConfig;
use crate::operators::{OperatorSyntax, SqlKind};
use crate::rel::{DataType, LiteralValue, RexCall, RexLiteral};
use std::fmt;

pub type RuleMatcher = fn(&RexCall) -> bool;
pub type RuleEmitter = fn(&RexCall, Vec<Expression>, &RuleContext<'_>) -> Result<Expression>;

/// One predicate/emitter pair.
#[derive(Clone, Copy)]
pub struct RexRule {
    pub name: &'static str,
    pub matches: RuleMatcher,
    pub emit: RuleEmitter,
}

impl RexRule {
    pub const fn new(name: &'static str, matches: RuleMatcher, emit: RuleEmitter) -> Self {
        Self {
            name,
            matches,
            emit,
        }
    }
}

impl fmt::Debug for RexRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RexRule").field(&self.name).finish()
    }
}

/// What an emitter may consult besides the call itself.
pub struct RuleContext<'a> {
    dialect: &'a dyn DialectImpl,
    config: &'a GeneratorConfig,
}

impl<'a> RuleContext<'a> {
    pub fn new(dialect: &'a dyn DialectImpl, config: &'a GeneratorConfig) -> Self {
        Self { dialect, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        self.config
    }

    /// `data_type` spelled for the target dialect.
    pub fn map_type(&self, data_type: &DataType) -> DataType {
        self.dialect.map_type(data_type)
    }
}

/// Emit `call` with the first rule that matches it.
pub fn apply_rules(
    rules: &[RexRule],
    call: &RexCall,
    operands: Vec<Expression>,
    ctx: &RuleContext<'_>,
) -> Result<Expression> {
    let Some(rule) = rules.iter().find(|rule| (rule.matches)(call)) else {
        let syntax = call
            .operator
            .as_builtin()
            .map_or("function", |op| op.syntax.as_str());
        return Err(Error::unsupported(format!(
            "{} call {}",
            syntax,
            call.operator.name()
        )));
    };
    tracing::trace!(rule = rule.name, operator = call.operator.name(), "rewrite rule matched");
    (rule.emit)(call, operands, ctx)
}

/// Output form of a literal.
pub fn literal(literal: &RexLiteral) -> Expression {
    match &literal.value {
        LiteralValue::Null => Expression::Null,
        LiteralValue::Boolean(b) => Expression::Boolean(*b),
        LiteralValue::Integer(n) => Expression::number(n.to_string()),
        LiteralValue::Decimal(text) => Expression::number(text.as_str()),
        LiteralValue::String(s) => Expression::string(s.as_str()),
        LiteralValue::Date(d) => Expression::Literal(Literal::Date(d.clone())),
        LiteralValue::Time(t) => Expression::Literal(Literal::Time(t.clone())),
        LiteralValue::Timestamp(ts) => Expression::Literal(Literal::Timestamp(ts.clone())),
    }
}

fn syntax_of(call: &RexCall) -> Option<OperatorSyntax> {
    call.operator.as_builtin().map(|op| op.syntax)
}

fn expect_operands(call: &RexCall, operands: &[Expression], count: usize) -> Result<()> {
    if operands.len() == count {
        Ok(())
    } else {
        Err(Error::internal(format!(
            "{} expects {} operands, got {}",
            call.operator.name(),
            count,
            operands.len()
        )))
    }
}

fn first_operand(call: &RexCall, operands: Vec<Expression>) -> Result<Expression> {
    operands
        .into_iter()
        .next()
        .ok_or_else(|| Error::internal(format!("{} without operands", call.operator.name())))
}

// ----------------------------------------------------------------------------
// operators

fn binary_constructor(kind: SqlKind) -> Option<fn(Box<BinaryOp>) -> Expression> {
    Some(match kind {
        SqlKind::Plus => Expression::Add,
        SqlKind::Minus => Expression::Sub,
        SqlKind::Times => Expression::Mul,
        SqlKind::Divide => Expression::Div,
        SqlKind::Mod => Expression::Mod,
        SqlKind::Equals => Expression::Eq,
        SqlKind::NotEquals => Expression::Neq,
        SqlKind::LessThan => Expression::Lt,
        SqlKind::GreaterThan => Expression::Gt,
        SqlKind::LessThanOrEqual => Expression::Lte,
        SqlKind::GreaterThanOrEqual => Expression::Gte,
        SqlKind::And => Expression::And,
        SqlKind::Or => Expression::Or,
        SqlKind::Concat => Expression::Concat,
        SqlKind::Like => Expression::Like,
        _ => return None,
    })
}

fn is_binary_operator(call: &RexCall) -> bool {
    let infix = matches!(syntax_of(call), Some(OperatorSyntax::Binary))
        || call.is_kind(SqlKind::Like);
    infix && call.kind().and_then(binary_constructor).is_some()
}

/// Chains variadic `AND`/`OR` left-deep.
fn emit_binary_operator(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    let constructor = call
        .kind()
        .and_then(binary_constructor)
        .ok_or_else(|| Error::internal(format!("{} is not a binary operator", call.operator.name())))?;
    if operands.len() < 2 {
        return Err(Error::internal(format!(
            "{} expects at least 2 operands, got {}",
            call.operator.name(),
            operands.len()
        )));
    }
    let mut operands = operands.into_iter();
    let first = operands.next().unwrap_or(Expression::Null);
    Ok(operands.fold(first, |left, right| constructor(Box::new(BinaryOp::new(left, right)))))
}

pub const BINARY_OPERATOR: RexRule = RexRule::new("binary operator", is_binary_operator, emit_binary_operator);

fn is_prefix_operator(call: &RexCall) -> bool {
    matches!(
        call.kind(),
        Some(SqlKind::Not | SqlKind::UnaryMinus | SqlKind::UnaryPlus)
    )
}

fn emit_prefix_operator(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    expect_operands(call, &operands, 1)?;
    let this = first_operand(call, operands)?;
    let op = Box::new(UnaryOp { this });
    Ok(match call.kind() {
        Some(SqlKind::UnaryMinus) => Expression::Neg(op),
        Some(SqlKind::UnaryPlus) => Expression::Pos(op),
        _ => Expression::Not(op),
    })
}

pub const PREFIX_OPERATOR: RexRule = RexRule::new("prefix operator", is_prefix_operator, emit_prefix_operator);

fn is_postfix_operator(call: &RexCall) -> bool {
    matches!(
        call.kind(),
        Some(SqlKind::IsNull | SqlKind::IsNotNull | SqlKind::IsTrue | SqlKind::IsFalse)
    )
}

fn emit_postfix_operator(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    expect_operands(call, &operands, 1)?;
    let this = first_operand(call, operands)?;
    Ok(match call.kind() {
        Some(SqlKind::IsNull) => Expression::IsNull(Box::new(IsNull { this, not: false })),
        Some(SqlKind::IsNotNull) => Expression::IsNull(Box::new(IsNull { this, not: true })),
        Some(SqlKind::IsTrue) => Expression::IsTrue(Box::new(UnaryOp { this })),
        _ => Expression::IsFalse(Box::new(UnaryOp { this })),
    })
}

pub const POSTFIX_OPERATOR: RexRule = RexRule::new("postfix operator", is_postfix_operator, emit_postfix_operator);

fn is_between(call: &RexCall) -> bool {
    call.is_kind(SqlKind::Between)
}

fn emit_between(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    expect_operands(call, &operands, 3)?;
    let [this, low, high]: [Expression; 3] = operands
        .try_into()
        .map_err(|_| Error::internal("BETWEEN expects 3 operands"))?;
    Ok(Expression::Between(Box::new(Between { this, low, high })))
}

pub const BETWEEN: RexRule = RexRule::new("between", is_between, emit_between);

fn is_in_list(call: &RexCall) -> bool {
    matches!(call.kind(), Some(SqlKind::In | SqlKind::NotIn)) && call.arity() >= 2
}

fn emit_in_list(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    let mut operands = operands.into_iter();
    let this = operands
        .next()
        .ok_or_else(|| Error::internal("IN without operands"))?;
    Ok(Expression::In(Box::new(In {
        this,
        expressions: operands.collect(),
        not: call.is_kind(SqlKind::NotIn),
    })))
}

pub const IN_LIST: RexRule = RexRule::new("in list", is_in_list, emit_in_list);

// ----------------------------------------------------------------------------
// special forms

fn is_cast(call: &RexCall) -> bool {
    call.is_kind(SqlKind::Cast)
}

fn emit_cast(call: &RexCall, operands: Vec<Expression>, ctx: &RuleContext<'_>) -> Result<Expression> {
    expect_operands(call, &operands, 1)?;
    let this = first_operand(call, operands)?;
    Ok(Expression::cast(this, ctx.map_type(&call.data_type)))
}

/// `CAST(x AS <type>)` with the type mapped onto the target.
pub const CAST: RexRule = RexRule::new("cast", is_cast, emit_cast);

fn is_case(call: &RexCall) -> bool {
    call.is_kind(SqlKind::Case)
}

/// Build a searched CASE from `[when, then, when, then, ..., else]`.
pub fn case_expression(operands: Vec<Expression>) -> Expression {
    let mut whens = Vec::with_capacity(operands.len() / 2);
    let mut operands = operands.into_iter();
    let mut else_ = None;
    while let Some(condition) = operands.next() {
        match operands.next() {
            Some(result) => whens.push((condition, result)),
            None => else_ = Some(condition),
        }
    }
    Expression::Case(Box::new(Case {
        operand: None,
        whens,
        else_,
    }))
}

fn emit_case(_: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    Ok(case_expression(operands))
}

pub const CASE: RexRule = RexRule::new("case", is_case, emit_case);

fn is_context_variable(call: &RexCall) -> bool {
    call.kind().is_some_and(SqlKind::is_context_variable)
}

fn emit_context_variable(call: &RexCall, _: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    Ok(Expression::keyword(call.operator.name()))
}

/// `CURRENT_DATE`, `CURRENT_USER`, ... printed as keywords.
pub const CONTEXT_VARIABLE: RexRule =
    RexRule::new("context variable", is_context_variable, emit_context_variable);

// ----------------------------------------------------------------------------
// function calls

fn is_user_defined(call: &RexCall) -> bool {
    matches!(call.operator, OperatorRef::UserDefined(_))
}

fn emit_user_defined(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    match &call.operator {
        OperatorRef::UserDefined(udf) => Ok(Expression::quoted_function(udf.call_name(), operands)),
        other => Err(Error::internal(format!("{} is not user-defined", other.name()))),
    }
}

/// User-defined functions print under their catalog-driven name when they have one.
pub const USER_DEFINED_FUNCTION: RexRule =
    RexRule::new("user-defined function", is_user_defined, emit_user_defined);

fn is_unresolved(call: &RexCall) -> bool {
    matches!(call.operator, OperatorRef::Unresolved(_))
}

fn emit_unresolved(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    Ok(Expression::quoted_function(call.operator.name(), operands))
}

pub const UNRESOLVED_FUNCTION: RexRule =
    RexRule::new("unresolved function", is_unresolved, emit_unresolved);

fn is_builtin_function(call: &RexCall) -> bool {
    matches!(
        syntax_of(call),
        Some(OperatorSyntax::Function | OperatorSyntax::FunctionId)
    )
}

fn emit_builtin_function(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    if syntax_of(call) == Some(OperatorSyntax::FunctionId) {
        return Ok(Expression::keyword(call.operator.name()));
    }
    Ok(Expression::function(call.operator.name(), operands))
}

/// Any remaining built-in function, printed `NAME(args)`.
pub const BUILTIN_FUNCTION: RexRule =
    RexRule::new("built-in function", is_builtin_function, emit_builtin_function);

/// The rules every target ends with.
pub const STANDARD_RULES: [RexRule; 11] = [
    CAST,
    CASE,
    CONTEXT_VARIABLE,
    IN_LIST,
    BETWEEN,
    PREFIX_OPERATOR,
    POSTFIX_OPERATOR,
    BINARY_OPERATOR,
    USER_DEFINED_FUNCTION,
    UNRESOLVED_FUNCTION,
    BUILTIN_FUNCTION,
];

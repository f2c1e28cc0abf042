//! Trino Dialect
//!
//! Conversion target. Calls are rewritten by the rule list below, checked in
//! order; the standard rules close the list so anything without a dedicated
//! spelling prints in its SQL form.

use super::{DialectImpl, DialectType};
use crate::error::{Error, Result};
use crate::expressions::{BinaryOp, Expression};
use crate::generator::GeneratorConfig;
use crate::operators::SqlKind;
use crate::rel::{DataType, Field, RexCall, TypeFamily};
use crate::rewrite::rules::{self, case_expression, RexRule, RuleContext};

/// Trino dialect
pub struct TrinoDialect;

impl DialectImpl for TrinoDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Trino
    }

    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            identifier_quote: '"',
            ..Default::default()
        }
    }

    fn rex_rules(&self) -> &'static [RexRule] {
        TRINO_RULES
    }

    fn map_type(&self, data_type: &DataType) -> DataType {
        match data_type {
            DataType::Float => DataType::Real,
            // Trino binaries carry no length bound
            DataType::Binary { .. } | DataType::VarBinary { .. } => DataType::VarBinary { length: None },
            DataType::Array(element) => DataType::array(self.map_type(element)),
            DataType::Map { key, value } => DataType::map(self.map_type(key), self.map_type(value)),
            DataType::Row(fields) => DataType::Row(
                fields
                    .iter()
                    .map(|f| Field::new(f.name.clone(), self.map_type(&f.data_type)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

static TRINO_RULES: &[RexRule] = &[
    ELEMENT_AT,
    ARRAY_CONSTRUCTOR,
    MAP_CONSTRUCTOR,
    ROW_CONSTRUCTOR,
    EQUALITY_COERCION,
    CASE_NULL_BRANCH,
    SUBSTR,
    TRUNCATE_TO_SCALE,
    TRUNCATE,
    RANDOM,
    RANDOM_INTEGER,
    CURRENT_TIMESTAMP,
    REGEXP_LIKE,
    COLLECT_SET,
    RENAMED_FUNCTION,
    rules::CAST,
    rules::CASE,
    rules::CONTEXT_VARIABLE,
    rules::IN_LIST,
    rules::BETWEEN,
    rules::PREFIX_OPERATOR,
    rules::POSTFIX_OPERATOR,
    rules::BINARY_OPERATOR,
    rules::USER_DEFINED_FUNCTION,
    rules::UNRESOLVED_FUNCTION,
    rules::BUILTIN_FUNCTION,
];

/// Hive built-ins that exist in Trino under another name with the same arguments.
const RENAMES: &[(&str, &str)] = &[
    ("size", "cardinality"),
    ("instr", "strpos"),
    ("nvl", "coalesce"),
    ("collect_list", "array_agg"),
    ("array_contains", "contains"),
    ("get_json_object", "json_extract_scalar"),
];

fn renamed(call: &RexCall) -> Option<&'static str> {
    RENAMES
        .iter()
        .find(|(from, _)| call.is_named(from))
        .map(|(_, to)| *to)
}

fn operand_count(call: &RexCall, operands: &[Expression], expected: usize) -> Result<()> {
    if operands.len() == expected {
        Ok(())
    } else {
        Err(Error::internal(format!(
            "{} expects {} operands, got {}",
            call.operator.name(),
            expected,
            operands.len()
        )))
    }
}

// ----------------------------------------------------------------------------
// collections

fn is_item(call: &RexCall) -> bool {
    call.is_kind(SqlKind::Item)
}

fn emit_element_at(_: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    Ok(Expression::function("element_at", operands))
}

/// `a[i]` and `m[k]` become `element_at(a, i)`.
const ELEMENT_AT: RexRule = RexRule::new("element_at", is_item, emit_element_at);

fn is_array_constructor(call: &RexCall) -> bool {
    call.is_kind(SqlKind::ArrayValueConstructor)
}

fn emit_array(_: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    Ok(Expression::Array(operands))
}

const ARRAY_CONSTRUCTOR: RexRule = RexRule::new("array constructor", is_array_constructor, emit_array);

fn is_map_constructor(call: &RexCall) -> bool {
    call.is_kind(SqlKind::MapValueConstructor)
}

/// `MAP(k1, v1, k2, v2)` becomes `MAP(ARRAY[k1, k2], ARRAY[v1, v2])`.
fn emit_map(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    if operands.len() % 2 != 0 {
        return Err(Error::internal(format!(
            "{} expects key/value pairs, got {} operands",
            call.operator.name(),
            operands.len()
        )));
    }
    let mut keys = Vec::with_capacity(operands.len() / 2);
    let mut values = Vec::with_capacity(operands.len() / 2);
    for (i, operand) in operands.into_iter().enumerate() {
        if i % 2 == 0 {
            keys.push(operand);
        } else {
            values.push(operand);
        }
    }
    Ok(Expression::function(
        "MAP",
        vec![Expression::Array(keys), Expression::Array(values)],
    ))
}

const MAP_CONSTRUCTOR: RexRule = RexRule::new("map constructor", is_map_constructor, emit_map);

fn is_row_constructor(call: &RexCall) -> bool {
    call.is_kind(SqlKind::Row)
}

fn emit_row(_: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    Ok(Expression::Row(operands))
}

const ROW_CONSTRUCTOR: RexRule = RexRule::new("row constructor", is_row_constructor, emit_row);

// ----------------------------------------------------------------------------
// coercions

/// Operand to cast, and the literal type to cast it to, when an equality
/// compares a column with a numeric or boolean literal of another family.
fn coercion_target(call: &RexCall) -> Option<(usize, &DataType)> {
    if !matches!(call.kind(), Some(SqlKind::Equals | SqlKind::NotEquals)) || call.arity() != 2 {
        return None;
    }
    [(0, 1), (1, 0)].into_iter().find_map(|(column, literal)| {
        let column_rex = &call.operands[column];
        let literal = call.operands[literal].as_literal()?;
        if !column_rex.is_column_like() || literal.is_null() {
            return None;
        }
        let target = &literal.data_type;
        if !matches!(target.family(), TypeFamily::ExactNumeric | TypeFamily::Boolean) {
            return None;
        }
        let source = column_rex.data_type();
        let compatible = source.family() == target.family()
            || (source.is_numeric() && target.is_numeric())
            || matches!(source.family(), TypeFamily::Any | TypeFamily::Null);
        (!compatible).then_some((column, target))
    })
}

fn needs_equality_coercion(call: &RexCall) -> bool {
    coercion_target(call).is_some()
}

fn emit_equality_coercion(call: &RexCall, operands: Vec<Expression>, ctx: &RuleContext<'_>) -> Result<Expression> {
    operand_count(call, &operands, 2)?;
    let (column, target) = coercion_target(call)
        .ok_or_else(|| Error::internal("equality coercion without a target"))?;
    let target = ctx.map_type(target);
    let mut operands: Vec<Expression> = operands
        .into_iter()
        .enumerate()
        .map(|(i, operand)| {
            if i == column {
                Expression::cast(operand, target.clone())
            } else {
                operand
            }
        })
        .collect();
    let right = operands.pop().unwrap_or(Expression::Null);
    let left = operands.pop().unwrap_or(Expression::Null);
    Ok(if call.is_kind(SqlKind::NotEquals) {
        Expression::Neq(Box::new(BinaryOp::new(left, right)))
    } else {
        Expression::eq(left, right)
    })
}

/// `scol = 1` becomes `CAST(scol AS INTEGER) = 1`.
const EQUALITY_COERCION: RexRule =
    RexRule::new("equality coercion", needs_equality_coercion, emit_equality_coercion);

/// Positions of the result operands of a CASE: every THEN and the ELSE.
fn case_result_positions(arity: usize) -> impl Iterator<Item = usize> {
    (1..arity).step_by(2).chain((arity % 2 == 1).then(|| arity - 1))
}

fn has_null_and_character_branch(call: &RexCall) -> bool {
    if !call.is_kind(SqlKind::Case) {
        return false;
    }
    let mut null_branch = false;
    let mut character_branch = false;
    for i in case_result_positions(call.arity()) {
        let result = &call.operands[i];
        if result.is_null_literal() {
            null_branch = true;
        } else if result.data_type().is_character() {
            character_branch = true;
        }
    }
    null_branch && character_branch
}

fn emit_case_null_branch(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    let results: Vec<usize> = case_result_positions(call.arity()).collect();
    let operands = operands
        .into_iter()
        .enumerate()
        .map(|(i, operand)| {
            let rex = &call.operands[i];
            if results.contains(&i) && !rex.is_null_literal() && rex.data_type().is_character() {
                Expression::cast(operand, DataType::varchar())
            } else {
                operand
            }
        })
        .collect();
    Ok(case_expression(operands))
}

/// A CASE mixing a NULL branch with character branches casts the latter to VARCHAR.
const CASE_NULL_BRANCH: RexRule =
    RexRule::new("case null branch", has_null_and_character_branch, emit_case_null_branch);

// ----------------------------------------------------------------------------
// functions

fn is_substring(call: &RexCall) -> bool {
    call.is_kind(SqlKind::Substring)
}

fn emit_substr(_: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    Ok(Expression::quoted_function("SUBSTR", operands))
}

const SUBSTR: RexRule = RexRule::new("substr", is_substring, emit_substr);

fn is_truncate_to_scale(call: &RexCall) -> bool {
    call.is_named("truncate") && call.arity() == 2
}

/// `truncate(x, n)` becomes `TRUNCATE(x * POWER(10, n)) / POWER(10, n)`.
fn emit_truncate_to_scale(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    operand_count(call, &operands, 2)?;
    let mut operands = operands.into_iter();
    let (Some(value), Some(scale)) = (operands.next(), operands.next()) else {
        return Err(Error::internal("truncate expects 2 operands"));
    };
    let power = Expression::function("POWER", vec![Expression::number("10"), scale]);
    let truncated = Expression::function("TRUNCATE", vec![Expression::mul(value, power.clone())]);
    Ok(Expression::div(truncated, power))
}

const TRUNCATE_TO_SCALE: RexRule =
    RexRule::new("truncate to scale", is_truncate_to_scale, emit_truncate_to_scale);

fn is_truncate(call: &RexCall) -> bool {
    call.is_named("truncate") && call.arity() == 1
}

fn emit_truncate(_: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    Ok(Expression::function("TRUNCATE", operands))
}

const TRUNCATE: RexRule = RexRule::new("truncate", is_truncate, emit_truncate);

fn is_rand(call: &RexCall) -> bool {
    call.is_named("rand")
}

/// Trino's random function takes no seed.
fn emit_random(_: &RexCall, _: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    Ok(Expression::quoted_function("RANDOM", Vec::new()))
}

const RANDOM: RexRule = RexRule::new("random", is_rand, emit_random);

fn is_rand_integer(call: &RexCall) -> bool {
    call.is_named("rand_integer") && matches!(call.arity(), 1 | 2)
}

/// `rand_integer([seed,] n)` keeps only the bound.
fn emit_random_integer(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    let bound = operands
        .into_iter()
        .last()
        .ok_or_else(|| Error::internal(format!("{} without a bound", call.operator.name())))?;
    Ok(Expression::quoted_function("RANDOM", vec![bound]))
}

const RANDOM_INTEGER: RexRule = RexRule::new("random integer", is_rand_integer, emit_random_integer);

fn is_current_timestamp(call: &RexCall) -> bool {
    call.is_kind(SqlKind::CurrentTimestamp)
}

fn emit_current_timestamp(_: &RexCall, _: Vec<Expression>, ctx: &RuleContext<'_>) -> Result<Expression> {
    Ok(Expression::cast(
        Expression::keyword("CURRENT_TIMESTAMP"),
        DataType::Timestamp {
            precision: Some(ctx.config().current_timestamp_precision),
        },
    ))
}

const CURRENT_TIMESTAMP: RexRule =
    RexRule::new("current timestamp", is_current_timestamp, emit_current_timestamp);

fn is_regex_match(call: &RexCall) -> bool {
    call.is_kind(SqlKind::RLike)
}

fn emit_regexp_like(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    operand_count(call, &operands, 2)?;
    Ok(Expression::function("regexp_like", operands))
}

/// `x RLIKE p` and `x REGEXP p` become `regexp_like(x, p)`.
const REGEXP_LIKE: RexRule = RexRule::new("regexp_like", is_regex_match, emit_regexp_like);

fn is_collect_set(call: &RexCall) -> bool {
    call.is_named("collect_set")
}

fn emit_collect_set(_: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    Ok(Expression::function(
        "array_distinct",
        vec![Expression::function("array_agg", operands)],
    ))
}

const COLLECT_SET: RexRule = RexRule::new("collect_set", is_collect_set, emit_collect_set);

fn is_renamed(call: &RexCall) -> bool {
    call.operator.as_builtin().is_some() && renamed(call).is_some()
}

fn emit_renamed(call: &RexCall, operands: Vec<Expression>, _: &RuleContext<'_>) -> Result<Expression> {
    let name = renamed(call)
        .ok_or_else(|| Error::internal(format!("no rename for {}", call.operator.name())))?;
    Ok(Expression::function(name, operands))
}

const RENAMED_FUNCTION: RexRule = RexRule::new("renamed function", is_renamed, emit_renamed);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{call, cast, eq, field, int, literal_null, string};
    use crate::generator::Generator;
    use crate::operators::{self, Operator};
    use crate::rel::RexNode;
    use crate::rewrite::rules::apply_rules;

    fn sql(rex: &RexNode, operands: Vec<Expression>) -> String {
        let config = GeneratorConfig::default();
        let ctx = RuleContext::new(&TrinoDialect, &config);
        let call = rex.as_call().unwrap();
        let expr = apply_rules(TRINO_RULES, call, operands, &ctx).unwrap();
        Generator::sql(&expr).unwrap()
    }

    fn col(name: &str) -> Expression {
        Expression::qualified_column("tableOne", name)
    }

    #[test]
    fn test_type_mapping() {
        let trino = TrinoDialect;
        assert_eq!(trino.map_type(&DataType::Float), DataType::Real);
        assert_eq!(
            trino.map_type(&DataType::Binary { length: Some(16) }),
            DataType::VarBinary { length: None }
        );
        assert_eq!(
            trino.map_type(&DataType::array(DataType::Float)),
            DataType::array(DataType::Real)
        );
        assert_eq!(
            trino.map_type(&DataType::VarChar { length: Some(5) }),
            DataType::VarChar { length: Some(5) }
        );
    }

    #[test]
    fn test_cast_to_float_prints_real() {
        let rex = cast(field(0, DataType::Integer), DataType::Float);
        assert_eq!(sql(&rex, vec![col("icol")]), "CAST(\"tableOne\".\"icol\" AS REAL)");
    }

    #[test]
    fn test_equality_coercion_casts_the_column() {
        let rex = eq(field(2, DataType::varchar()), int(1));
        assert_eq!(
            sql(&rex, vec![col("scol"), Expression::number("1")]),
            "CAST(\"tableOne\".\"scol\" AS INTEGER) = 1"
        );

        let same_family = eq(field(0, DataType::BigInt), int(1));
        assert_eq!(
            sql(&same_family, vec![col("icol"), Expression::number("1")]),
            "\"tableOne\".\"icol\" = 1"
        );
    }

    #[test]
    fn test_case_with_null_branch() {
        let rex = call(
            operators::CASE,
            vec![
                eq(field(0, DataType::Integer), int(0)),
                field(2, DataType::varchar()),
                literal_null(DataType::varchar()),
            ],
            DataType::varchar(),
        );
        let operands = vec![
            Expression::eq(col("icol"), Expression::number("0")),
            col("scol"),
            Expression::Null,
        ];
        assert_eq!(
            sql(&rex, operands),
            "CASE WHEN \"tableOne\".\"icol\" = 0 THEN CAST(\"tableOne\".\"scol\" AS VARCHAR) ELSE NULL END"
        );
    }

    #[test]
    fn test_case_without_null_branch_is_untouched() {
        let rex = call(
            operators::CASE,
            vec![
                eq(field(0, DataType::Integer), int(0)),
                field(2, DataType::varchar()),
                string("other"),
            ],
            DataType::varchar(),
        );
        let operands = vec![
            Expression::eq(col("icol"), Expression::number("0")),
            col("scol"),
            Expression::string("other"),
        ];
        assert_eq!(
            sql(&rex, operands),
            "CASE WHEN \"tableOne\".\"icol\" = 0 THEN \"tableOne\".\"scol\" ELSE 'other' END"
        );
    }

    #[test]
    fn test_random_drops_seed() {
        let rand = call(Operator::named_function("RAND"), vec![int(7)], DataType::Double);
        assert_eq!(sql(&rand, vec![Expression::number("7")]), "\"RANDOM\"()");

        let bounded = call(
            Operator::named_function("RAND_INTEGER"),
            vec![int(7), int(10)],
            DataType::Integer,
        );
        let operands = vec![Expression::number("7"), Expression::number("10")];
        assert_eq!(sql(&bounded, operands), "\"RANDOM\"(10)");
    }

    #[test]
    fn test_map_constructor() {
        let rex = call(
            operators::MAP_VALUE_CONSTRUCTOR,
            vec![string("a"), int(1), string("b"), int(2)],
            DataType::map(DataType::varchar(), DataType::Integer),
        );
        let operands = vec![
            Expression::string("a"),
            Expression::number("1"),
            Expression::string("b"),
            Expression::number("2"),
        ];
        assert_eq!(sql(&rex, operands), "MAP(ARRAY['a', 'b'], ARRAY[1, 2])");
    }

    #[test]
    fn test_renames_and_regex() {
        let size = call(
            Operator::named_function("SIZE"),
            vec![field(4, DataType::array(DataType::Integer))],
            DataType::Integer,
        );
        assert_eq!(sql(&size, vec![col("acol")]), "cardinality(\"tableOne\".\"acol\")");

        let rlike = call(
            crate::dialects::hive::RLIKE,
            vec![field(2, DataType::varchar()), string("^a")],
            DataType::Boolean,
        );
        let operands = vec![col("scol"), Expression::string("^a")];
        assert_eq!(sql(&rlike, operands), "regexp_like(\"tableOne\".\"scol\", '^a')");
    }

    #[test]
    fn test_current_timestamp_precision() {
        let rex = call(operators::CURRENT_TIMESTAMP, vec![], DataType::Timestamp { precision: None });
        assert_eq!(sql(&rex, vec![]), "CAST(CURRENT_TIMESTAMP AS TIMESTAMP(3))");
        let today = call(operators::CURRENT_DATE, vec![], DataType::Date);
        assert_eq!(sql(&today, vec![]), "CURRENT_DATE");
    }
}

//! SQL text generation.
//!
//! Serializes an [`Expression`] tree into SQL text. Operators are printed with
//! the minimum parentheses their precedence requires; clauses of a query block
//! are separated by a newline unless `pretty` is turned off.

use crate::error::Result;
use crate::expressions::{
    Between, BinaryOp, Case, Expression, Function, Identifier, In, IsNull, Join, Ordered, Select,
    SetOperation, Subquery, TableRef, Unnest, Values,
};
use crate::rel::IdentifierCasing;
use serde::{Deserialize, Serialize};

/// Output options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Separate clauses with a newline instead of a single space.
    pub pretty: bool,
    /// Character used to delimit quoted identifiers.
    pub identifier_quote: char,
    /// Casing applied to names that were written without quotes.
    pub unquoted_casing: IdentifierCasing,
    /// Fractional-second precision of the cast applied to `CURRENT_TIMESTAMP`.
    pub current_timestamp_precision: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            identifier_quote: '"',
            unquoted_casing: IdentifierCasing::Upper,
            current_timestamp_precision: 3,
        }
    }
}

impl GeneratorConfig {
    /// Read a config document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Binding strength of an expression, higher binds tighter.
fn precedence(expr: &Expression) -> u8 {
    match expr {
        Expression::Or(_) => 1,
        Expression::And(_) => 2,
        Expression::Not(_) => 3,
        Expression::Eq(_)
        | Expression::Neq(_)
        | Expression::Lt(_)
        | Expression::Gt(_)
        | Expression::Lte(_)
        | Expression::Gte(_)
        | Expression::Like(_)
        | Expression::IsNull(_)
        | Expression::IsTrue(_)
        | Expression::IsFalse(_)
        | Expression::In(_)
        | Expression::Between(_) => 4,
        Expression::Add(_) | Expression::Sub(_) | Expression::Concat(_) => 5,
        Expression::Mul(_) | Expression::Div(_) | Expression::Mod(_) => 6,
        Expression::Neg(_) | Expression::Pos(_) => 7,
        Expression::Alias(_) => 0,
        _ => 9,
    }
}

/// Operators where `a op (b op c)` differs from `(a op b) op c`.
fn is_left_associative_only(expr: &Expression) -> bool {
    !matches!(
        expr,
        Expression::Add(_)
            | Expression::Mul(_)
            | Expression::And(_)
            | Expression::Or(_)
            | Expression::Concat(_)
    )
}

/// SQL generator.
pub struct Generator {
    config: GeneratorConfig,
    output: String,
}

impl Generator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            output: String::new(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate SQL with the default configuration.
    pub fn sql(expr: &Expression) -> Result<String> {
        Generator::new().generate(expr)
    }

    /// Generate SQL for `expr`. The generator can be reused.
    pub fn generate(&mut self, expr: &Expression) -> Result<String> {
        self.output.clear();
        self.gen(expr)?;
        Ok(std::mem::take(&mut self.output))
    }

    fn sep(&mut self) {
        if self.config.pretty {
            self.output.push('\n');
        } else {
            self.output.push(' ');
        }
    }

    fn identifier(&mut self, ident: &Identifier) {
        if ident.quoted {
            let quote = self.config.identifier_quote;
            self.output.push(quote);
            for ch in ident.name.chars() {
                if ch == quote {
                    self.output.push(quote);
                }
                self.output.push(ch);
            }
            self.output.push(quote);
        } else {
            self.output.push_str(&ident.name);
        }
    }

    fn list(&mut self, exprs: &[Expression]) -> Result<()> {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.gen(expr)?;
        }
        Ok(())
    }

    fn identifier_list(&mut self, idents: &[Identifier]) {
        if idents.is_empty() {
            return;
        }
        self.output.push_str(" (");
        for (i, ident) in idents.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.identifier(ident);
        }
        self.output.push(')');
    }

    fn relation_alias(&mut self, alias: &Option<Identifier>, columns: &[Identifier]) {
        if let Some(alias) = alias {
            self.output.push_str(" AS ");
            self.identifier(alias);
            self.identifier_list(columns);
        }
    }

    fn wrapped(&mut self, expr: &Expression, parens: bool) -> Result<()> {
        if parens {
            self.output.push('(');
            self.gen(expr)?;
            self.output.push(')');
            Ok(())
        } else {
            self.gen(expr)
        }
    }

    fn gen(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Literal(lit) => {
                self.output.push_str(&lit.to_string());
                Ok(())
            }
            Expression::Boolean(value) => {
                self.output.push_str(if *value { "TRUE" } else { "FALSE" });
                Ok(())
            }
            Expression::Null => {
                self.output.push_str("NULL");
                Ok(())
            }
            Expression::Star => {
                self.output.push('*');
                Ok(())
            }
            Expression::Column(column) => {
                if let Some(table) = &column.table {
                    self.identifier(table);
                    self.output.push('.');
                }
                self.identifier(&column.name);
                Ok(())
            }
            Expression::Table(table) => {
                self.gen_table(table);
                Ok(())
            }
            Expression::Dot(dot) => {
                let parens = precedence(&dot.this) < 9;
                self.wrapped(&dot.this, parens)?;
                self.output.push('.');
                self.identifier(&dot.field);
                Ok(())
            }
            Expression::Alias(alias) => {
                self.gen(&alias.this)?;
                self.output.push_str(" AS ");
                self.identifier(&alias.alias);
                Ok(())
            }
            Expression::Cast(cast) => {
                self.output.push_str("CAST(");
                self.gen(&cast.this)?;
                self.output.push_str(" AS ");
                self.output.push_str(&cast.to.to_string());
                self.output.push(')');
                Ok(())
            }
            Expression::Case(case) => self.gen_case(case),

            Expression::And(op) => self.gen_binary(expr, op, "AND"),
            Expression::Or(op) => self.gen_binary(expr, op, "OR"),
            Expression::Eq(op) => self.gen_binary(expr, op, "="),
            Expression::Neq(op) => self.gen_binary(expr, op, "<>"),
            Expression::Lt(op) => self.gen_binary(expr, op, "<"),
            Expression::Gt(op) => self.gen_binary(expr, op, ">"),
            Expression::Lte(op) => self.gen_binary(expr, op, "<="),
            Expression::Gte(op) => self.gen_binary(expr, op, ">="),
            Expression::Add(op) => self.gen_binary(expr, op, "+"),
            Expression::Sub(op) => self.gen_binary(expr, op, "-"),
            Expression::Mul(op) => self.gen_binary(expr, op, "*"),
            Expression::Div(op) => self.gen_binary(expr, op, "/"),
            Expression::Mod(op) => self.gen_binary(expr, op, "%"),
            Expression::Concat(op) => self.gen_binary(expr, op, "||"),
            Expression::Like(op) => self.gen_binary(expr, op, "LIKE"),

            Expression::Not(op) => {
                self.output.push_str("NOT ");
                let parens = precedence(&op.this) < precedence(expr);
                self.wrapped(&op.this, parens)
            }
            Expression::Neg(op) | Expression::Pos(op) => {
                self.output
                    .push(if matches!(expr, Expression::Neg(_)) { '-' } else { '+' });
                let parens = precedence(&op.this) <= precedence(expr);
                self.wrapped(&op.this, parens)
            }
            Expression::IsNull(is_null) => self.gen_is_null(expr, is_null),
            Expression::IsTrue(op) | Expression::IsFalse(op) => {
                let parens = precedence(&op.this) <= precedence(expr);
                self.wrapped(&op.this, parens)?;
                self.output.push_str(if matches!(expr, Expression::IsTrue(_)) {
                    " IS TRUE"
                } else {
                    " IS FALSE"
                });
                Ok(())
            }
            Expression::In(in_list) => self.gen_in(expr, in_list),
            Expression::Between(between) => self.gen_between(expr, between),
            Expression::Function(function) => self.gen_function(function),
            Expression::Array(elements) => {
                self.output.push_str("ARRAY[");
                self.list(elements)?;
                self.output.push(']');
                Ok(())
            }
            Expression::Row(fields) => {
                self.output.push_str("ROW(");
                self.list(fields)?;
                self.output.push(')');
                Ok(())
            }

            Expression::Subquery(subquery) => self.gen_subquery(subquery),
            Expression::Values(values) => self.gen_values(values),
            Expression::Unnest(unnest) => self.gen_unnest(unnest),
            Expression::Select(select) => self.gen_select(select),
            Expression::Union(op) => self.gen_set_operation(op, "UNION"),
            Expression::Intersect(op) => self.gen_set_operation(op, "INTERSECT"),
            Expression::Except(op) => self.gen_set_operation(op, "EXCEPT"),
        }
    }

    fn gen_table(&mut self, table: &TableRef) {
        for (i, part) in table.parts.iter().enumerate() {
            if i > 0 {
                self.output.push('.');
            }
            self.identifier(part);
        }
        self.relation_alias(&table.alias, &[]);
    }

    fn gen_binary(&mut self, expr: &Expression, op: &BinaryOp, symbol: &str) -> Result<()> {
        let own = precedence(expr);
        let strict = is_left_associative_only(expr);
        let left = precedence(&op.left);
        let left_parens = left < own || (own == 4 && left == own);
        self.wrapped(&op.left, left_parens)?;
        self.output.push(' ');
        self.output.push_str(symbol);
        self.output.push(' ');
        let right = precedence(&op.right);
        let right_parens = right < own || (strict && right == own);
        self.wrapped(&op.right, right_parens)
    }

    fn gen_is_null(&mut self, expr: &Expression, is_null: &IsNull) -> Result<()> {
        let parens = precedence(&is_null.this) <= precedence(expr);
        self.wrapped(&is_null.this, parens)?;
        self.output.push_str(if is_null.not {
            " IS NOT NULL"
        } else {
            " IS NULL"
        });
        Ok(())
    }

    fn gen_in(&mut self, expr: &Expression, in_list: &In) -> Result<()> {
        let parens = precedence(&in_list.this) <= precedence(expr);
        self.wrapped(&in_list.this, parens)?;
        self.output
            .push_str(if in_list.not { " NOT IN (" } else { " IN (" });
        self.list(&in_list.expressions)?;
        self.output.push(')');
        Ok(())
    }

    fn gen_between(&mut self, expr: &Expression, between: &Between) -> Result<()> {
        let own = precedence(expr);
        let parens = precedence(&between.this) <= own;
        self.wrapped(&between.this, parens)?;
        self.output.push_str(" BETWEEN ");
        let parens = precedence(&between.low) <= own;
        self.wrapped(&between.low, parens)?;
        self.output.push_str(" AND ");
        let parens = precedence(&between.high) <= own;
        self.wrapped(&between.high, parens)
    }

    fn gen_case(&mut self, case: &Case) -> Result<()> {
        self.output.push_str("CASE");
        if let Some(operand) = &case.operand {
            self.output.push(' ');
            self.gen(operand)?;
        }
        for (condition, result) in &case.whens {
            self.output.push_str(" WHEN ");
            self.gen(condition)?;
            self.output.push_str(" THEN ");
            self.gen(result)?;
        }
        if let Some(else_) = &case.else_ {
            self.output.push_str(" ELSE ");
            self.gen(else_)?;
        }
        self.output.push_str(" END");
        Ok(())
    }

    fn gen_function(&mut self, function: &Function) -> Result<()> {
        if function.quoted {
            self.identifier(&Identifier::quoted(function.name.as_str()));
        } else {
            self.output.push_str(&function.name);
        }
        if function.no_parens {
            return Ok(());
        }
        self.output.push('(');
        if function.distinct {
            self.output.push_str("DISTINCT ");
        }
        self.list(&function.args)?;
        self.output.push(')');
        Ok(())
    }

    fn gen_subquery(&mut self, subquery: &Subquery) -> Result<()> {
        if subquery.lateral {
            self.output.push_str("LATERAL ");
        }
        self.output.push('(');
        self.gen(&subquery.this)?;
        self.output.push(')');
        self.relation_alias(&subquery.alias, &subquery.column_aliases);
        Ok(())
    }

    fn gen_values(&mut self, values: &Values) -> Result<()> {
        self.output.push_str("(VALUES  ");
        for (i, row) in values.expressions.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.output.push('(');
            self.list(row)?;
            self.output.push(')');
        }
        self.output.push(')');
        self.relation_alias(&values.alias, &values.column_aliases);
        Ok(())
    }

    fn gen_unnest(&mut self, unnest: &Unnest) -> Result<()> {
        self.output.push_str("UNNEST(");
        self.list(&unnest.expressions)?;
        self.output.push(')');
        if unnest.with_ordinality {
            self.output.push_str(" WITH ORDINALITY");
        }
        self.relation_alias(&unnest.alias, &unnest.column_aliases);
        Ok(())
    }

    fn gen_join(&mut self, join: &Join) -> Result<()> {
        self.sep();
        self.output.push_str(join.kind.keyword());
        self.output.push(' ');
        self.gen(&join.this)?;
        if let Some(on) = &join.on {
            self.output.push_str(" ON ");
            self.gen(on)?;
        }
        Ok(())
    }

    fn gen_ordered(&mut self, ordered: &Ordered) -> Result<()> {
        self.gen(&ordered.this)?;
        if ordered.desc {
            self.output.push_str(" DESC");
        }
        match ordered.nulls_first {
            Some(true) => self.output.push_str(" NULLS FIRST"),
            Some(false) => self.output.push_str(" NULLS LAST"),
            None => {}
        }
        Ok(())
    }

    fn gen_select(&mut self, select: &Select) -> Result<()> {
        self.output.push_str("SELECT ");
        if select.expressions.is_empty() {
            self.output.push('*');
        } else {
            self.list(&select.expressions)?;
        }
        if let Some(from) = &select.from {
            self.sep();
            self.output.push_str("FROM ");
            self.gen(from)?;
        }
        for join in &select.joins {
            self.gen_join(join)?;
        }
        if let Some(condition) = &select.where_clause {
            self.sep();
            self.output.push_str("WHERE ");
            self.gen(condition)?;
        }
        if !select.group_by.is_empty() {
            self.sep();
            self.output.push_str("GROUP BY ");
            self.list(&select.group_by)?;
        }
        if let Some(condition) = &select.having {
            self.sep();
            self.output.push_str("HAVING ");
            self.gen(condition)?;
        }
        if !select.order_by.is_empty() {
            self.sep();
            self.output.push_str("ORDER BY ");
            for (i, ordered) in select.order_by.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                self.gen_ordered(ordered)?;
            }
        }
        if let Some(offset) = &select.offset {
            self.sep();
            self.output.push_str("OFFSET ");
            self.gen(offset)?;
        }
        if let Some(limit) = &select.limit {
            self.sep();
            self.output.push_str("LIMIT ");
            self.gen(limit)?;
        }
        Ok(())
    }

    fn gen_set_operation(&mut self, op: &SetOperation, keyword: &str) -> Result<()> {
        self.gen(&op.left)?;
        self.sep();
        self.output.push_str(keyword);
        if op.all {
            self.output.push_str(" ALL");
        }
        self.sep();
        let parens = !matches!(op.right, Expression::Select(_));
        self.wrapped(&op.right, parens)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::{BinaryOp, UnaryOp};

    fn num(n: &str) -> Expression {
        Expression::number(n)
    }

    fn add(l: Expression, r: Expression) -> Expression {
        Expression::Add(Box::new(BinaryOp::new(l, r)))
    }

    fn sub(l: Expression, r: Expression) -> Expression {
        Expression::Sub(Box::new(BinaryOp::new(l, r)))
    }

    #[test]
    fn test_arithmetic_needs_no_parens_when_precedence_agrees() {
        let expr = add(
            num("5"),
            Expression::div(Expression::mul(num("2"), num("10")), num("4")),
        );
        assert_eq!(Generator::sql(&expr).unwrap(), "5 + 2 * 10 / 4");
    }

    #[test]
    fn test_parens_for_right_nested_subtraction() {
        let expr = sub(num("1"), sub(num("2"), num("3")));
        assert_eq!(Generator::sql(&expr).unwrap(), "1 - (2 - 3)");
        let expr = Expression::mul(add(num("1"), num("2")), num("3"));
        assert_eq!(Generator::sql(&expr).unwrap(), "(1 + 2) * 3");
    }

    #[test]
    fn test_not_binds_looser_than_is_null() {
        let expr = Expression::not(Expression::IsNull(Box::new(IsNull {
            this: Expression::qualified_column("t1", "$f0"),
            not: true,
        })));
        assert_eq!(Generator::sql(&expr).unwrap(), "NOT \"t1\".\"$f0\" IS NOT NULL");

        let neg = Expression::Neg(Box::new(UnaryOp {
            this: add(num("1"), num("2")),
        }));
        assert_eq!(Generator::sql(&neg).unwrap(), "-(1 + 2)");
    }

    #[test]
    fn test_compact_output() {
        let mut select = Select::new();
        select.expressions.push(num("1"));
        select.from = Some(Expression::Values(Box::new(Values {
            expressions: vec![vec![num("0")]],
            alias: Some(Identifier::quoted("t")),
            column_aliases: vec![Identifier::quoted("ZERO")],
        })));
        let expr = Expression::Select(Box::new(select));

        let config = GeneratorConfig {
            pretty: false,
            ..Default::default()
        };
        let sql = Generator::with_config(config).generate(&expr).unwrap();
        assert_eq!(sql, "SELECT 1 FROM (VALUES  (0)) AS \"t\" (\"ZERO\")");
    }

    #[test]
    fn test_config_from_json_keeps_defaults() {
        let config = GeneratorConfig::from_json(r#"{"pretty": false}"#).unwrap();
        assert!(!config.pretty);
        assert_eq!(config.identifier_quote, '"');
        assert_eq!(config.current_timestamp_precision, 3);
        assert!(GeneratorConfig::from_json("not json").is_err());
    }
}

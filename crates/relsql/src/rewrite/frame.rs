//! Query blocks under construction.
//!
//! Converting a relational node yields a [`Frame`]: the SELECT block built so
//! far, the clauses it already uses, and how each output column of the node
//! reads inside that block. A parent node adds its clause to the child's frame
//! when SQL clause order allows it, and otherwise wraps the frame as a derived
//! table and starts a fresh block on top.

use crate::error::{Error, Result};
use crate::expressions::{Expression, Identifier, Select, Subquery};
use std::collections::BTreeSet;

/// SQL clauses in the order a query block evaluates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Clause {
    From,
    Where,
    GroupBy,
    Having,
    Select,
    OrderBy,
    Fetch,
    SetOp,
}

#[derive(Debug, Clone)]
enum Body {
    Select(Box<Select>),
    SetOp(Expression),
}

/// A query block plus the scope its columns are expressed in.
#[derive(Debug, Clone)]
pub struct Frame {
    body: Body,
    clauses: BTreeSet<Clause>,
    /// Output column `i` of the converted node, as referenced inside this block.
    pub columns: Vec<Expression>,
    /// Output column names.
    pub names: Vec<String>,
    /// Alias reserved for this block when it gets wrapped.
    pub alias: Option<String>,
}

/// `expr AS "name"`, except for derived `EXPR$n` names which stay implicit.
pub fn select_item(expr: Expression, name: &str) -> Expression {
    if name.starts_with("EXPR$") {
        expr
    } else {
        Expression::alias(expr, Identifier::quoted(name))
    }
}

impl Frame {
    /// `FROM relation`, where `relation` is visible under `alias`.
    pub fn relation(from: Expression, alias: &str, names: Vec<String>) -> Self {
        let columns = names
            .iter()
            .map(|name| Expression::qualified_column(alias, name))
            .collect();
        let mut select = Select::new();
        select.from = Some(from);
        Self {
            body: Body::Select(Box::new(select)),
            clauses: BTreeSet::from([Clause::From]),
            columns,
            names,
            alias: None,
        }
    }

    /// A FROM clause with joins already attached.
    pub fn joined(select: Select, columns: Vec<Expression>, names: Vec<String>) -> Self {
        Self {
            body: Body::Select(Box::new(select)),
            clauses: BTreeSet::from([Clause::From]),
            columns,
            names,
            alias: None,
        }
    }

    pub fn set_operation(query: Expression, names: Vec<String>) -> Self {
        Self {
            body: Body::SetOp(query),
            clauses: BTreeSet::from([Clause::SetOp]),
            columns: Vec::new(),
            names,
            alias: None,
        }
    }

    pub fn has(&self, clause: Clause) -> bool {
        self.clauses.contains(&clause)
    }

    pub fn add_clause(&mut self, clause: Clause) {
        self.clauses.insert(clause);
    }

    pub fn remove_clause(&mut self, clause: Clause) {
        self.clauses.remove(&clause);
    }

    /// Whether adding `clause` would put it before one the block already has.
    pub fn needs_wrap(&self, clause: Clause) -> bool {
        self.clauses.iter().any(|c| *c != Clause::From && *c >= clause)
    }

    /// Clauses used besides FROM are all in `allowed`.
    pub fn only_uses(&self, allowed: &[Clause]) -> bool {
        self.clauses
            .iter()
            .all(|c| *c == Clause::From || allowed.contains(c))
    }

    fn select(&self) -> Option<&Select> {
        match &self.body {
            Body::Select(select) => Some(select),
            Body::SetOp(_) => None,
        }
    }

    pub fn select_mut(&mut self) -> Result<&mut Select> {
        match &mut self.body {
            Body::Select(select) => Ok(select),
            Body::SetOp(_) => Err(Error::internal("set operation has no SELECT block to extend")),
        }
    }

    /// A single relation in FROM and nothing else.
    pub fn is_bare_relation(&self) -> bool {
        self.only_uses(&[])
            && self
                .select()
                .is_some_and(|s| s.joins.is_empty() && s.expressions.is_empty())
    }

    /// A FROM clause with joins and nothing else.
    pub fn is_join(&self) -> bool {
        self.only_uses(&[])
            && self
                .select()
                .is_some_and(|s| !s.joins.is_empty() && s.expressions.is_empty())
    }

    /// The FROM relation, if it is an `UNNEST`.
    pub fn is_bare_unnest(&self) -> bool {
        self.is_bare_relation()
            && self
                .select()
                .is_some_and(|s| matches!(s.from, Some(Expression::Unnest(_))))
    }

    /// A projection straight over a `VALUES` relation.
    pub fn is_projection_of_values(&self) -> bool {
        self.has(Clause::Select)
            && self.only_uses(&[Clause::Select])
            && self
                .select()
                .is_some_and(|s| s.joins.is_empty() && matches!(s.from, Some(Expression::Values(_))))
    }

    /// Output column `index` as referenced inside this block.
    pub fn column(&self, index: usize) -> Result<Expression> {
        self.columns.get(index).cloned().ok_or_else(|| {
            Error::internal(format!(
                "input reference ${} out of range for {} columns",
                index,
                self.columns.len()
            ))
        })
    }

    /// Replace the select list.
    pub fn set_select(&mut self, columns: Vec<Expression>, names: Vec<String>) -> Result<()> {
        let items = columns
            .iter()
            .zip(&names)
            .map(|(column, name)| select_item(column.clone(), name))
            .collect();
        self.select_mut()?.expressions = items;
        self.columns = columns;
        self.names = names;
        Ok(())
    }

    /// Hide every output column from `len` on.
    pub fn truncate(&mut self, len: usize) {
        self.columns.truncate(len);
        self.names.truncate(len);
    }

    /// Rename the alias of a bare relation and requalify its columns.
    pub fn realias(&mut self, alias: &str) -> Result<()> {
        let select = self.select_mut()?;
        let ident = Some(Identifier::quoted(alias));
        match &mut select.from {
            Some(Expression::Table(table)) => table.alias = ident,
            Some(Expression::Values(values)) => values.alias = ident,
            Some(Expression::Unnest(unnest)) => unnest.alias = ident,
            Some(Expression::Subquery(subquery)) => subquery.alias = ident,
            _ => return Err(Error::internal("only a bare relation can be re-aliased")),
        }
        self.columns = self
            .names
            .iter()
            .map(|name| Expression::qualified_column(alias, name))
            .collect();
        Ok(())
    }

    /// The block as a standalone query.
    pub fn into_query(self) -> Expression {
        match self.body {
            Body::SetOp(query) => query,
            Body::Select(mut select) => {
                // a star over joins would also expose hidden columns
                if select.expressions.is_empty() && !select.joins.is_empty() {
                    select.expressions = self
                        .columns
                        .into_iter()
                        .zip(&self.names)
                        .map(|(column, name)| select_item(column, name))
                        .collect();
                }
                Expression::Select(select)
            }
        }
    }

    /// Split into FROM-with-joins, columns and names. Only valid for bare
    /// relations and join frames.
    pub fn into_source(self) -> Result<(Select, Vec<Expression>, Vec<String>)> {
        match self.body {
            Body::Select(select) => Ok((*select, self.columns, self.names)),
            Body::SetOp(_) => Err(Error::internal("set operation used as a join source")),
        }
    }

    /// Split a bare relation into its FROM item, columns and names.
    pub fn into_relation(self) -> Result<(Expression, Vec<Expression>, Vec<String>)> {
        let (select, columns, names) = self.into_source()?;
        let from = select
            .from
            .ok_or_else(|| Error::internal("relation frame without FROM"))?;
        Ok((from, columns, names))
    }

    /// This block as derived table `alias` under a fresh block.
    pub fn wrap(self, alias: &str, lateral: bool) -> Frame {
        let names = self.names.clone();
        let subquery = Expression::Subquery(Box::new(Subquery {
            this: self.into_query(),
            alias: Some(Identifier::quoted(alias)),
            column_aliases: Vec::new(),
            lateral,
        }));
        Frame::relation(subquery, alias, names)
    }
}

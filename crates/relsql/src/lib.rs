//! relsql - function resolution and relational-algebra-to-SQL rewriting
//!
//! This library sits between a SQL planner and a target engine. It binds
//! source-dialect function names to implementations and turns a validated
//! relational algebra tree back into SQL text of another dialect.
//!
//! # Architecture
//!
//! 1. **Operators** - the standard operator table plus dialect extensions
//! 2. **Function registry** - name to descriptor bindings, seeded from static catalogs
//! 3. **Resolver** - operator and function lookup, including catalog-driven
//!    functions declared in table properties
//! 4. **Rewrite engine** - relational and expression rules that build an
//!    [`Expression`] query for the target dialect
//! 5. **Generator** - prints the query
//!
//! Only Trino is a conversion target; Hive is a source dialect.

pub mod builder;
pub mod catalog;
pub mod dialects;
pub mod error;
pub mod expressions;
pub mod function_registry;
pub mod generator;
pub mod operators;
pub mod rel;
pub mod resolver;
pub mod rewrite;
pub mod traversal;

pub use catalog::TableFunctionMetadata;
pub use dialects::{Dialect, DialectImpl, DialectType};
pub use error::{Error, Result};
pub use expressions::Expression;
pub use function_registry::{FunctionDescriptor, FunctionRegistry, OperatorRef};
pub use generator::{Generator, GeneratorConfig};
pub use operators::{Operator, OperatorCatalog, SqlKind};
pub use rel::{RelNode, RexNode};
pub use resolver::FunctionResolver;
pub use rewrite::RewriteEngine;
pub use traversal::RelWalk;

/// Convert a relational tree to SQL of the `write` dialect.
///
/// # Example
/// ```
/// use relsql::builder::*;
/// use relsql::rel::{DataType, Field, FieldName};
/// use relsql::{convert, DialectType};
///
/// let scan = RelBuilder::scan("tableOne", vec![Field::new("icol", DataType::Integer)]);
/// let icol = scan.field("icol").unwrap();
/// let rel = scan.project(vec![(icol, FieldName::unquoted("icol"))]).build();
///
/// let sql = convert(&rel, DialectType::Trino).unwrap();
/// assert_eq!(sql, "SELECT \"tableOne\".\"icol\" AS \"ICOL\"\nFROM \"tableOne\" AS \"tableOne\"");
/// ```
pub fn convert(rel: &RelNode, write: DialectType) -> Result<String> {
    Dialect::get(write).convert(rel)
}

/// Convert with explicit output options.
pub fn convert_with(rel: &RelNode, write: DialectType, config: GeneratorConfig) -> Result<String> {
    Dialect::get(write).convert_with_config(rel, config)
}

/// Convert a relational tree serialized as JSON.
pub fn convert_json(json: &str, write: DialectType) -> Result<String> {
    let rel = RelNode::from_json(json)?;
    convert(&rel, write)
}

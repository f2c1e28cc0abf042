//! Hive dialect
//!
//! Hive is only a source here: it adds its regex match operators to the
//! standard catalog so the resolver and the static function table can bind
//! `RLIKE` and `REGEXP`.

use super::{DialectImpl, DialectType};
use crate::operators::{Operator, OperatorCatalog, OperatorSyntax, SqlKind};

pub const RLIKE: Operator = Operator::new("RLIKE", SqlKind::RLike, OperatorSyntax::Special);
pub const REGEXP: Operator = Operator::new("REGEXP", SqlKind::RLike, OperatorSyntax::Special);

/// Operators Hive adds to the standard catalog.
pub fn operator_extensions() -> Vec<Operator> {
    vec![RLIKE, REGEXP]
}

/// Standard operators plus the Hive extensions.
pub fn operator_catalog() -> OperatorCatalog {
    OperatorCatalog::with_extensions(operator_extensions())
}

/// Hive dialect
pub struct HiveDialect;

impl DialectImpl for HiveDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Hive
    }

    fn operator_extensions(&self) -> Vec<Operator> {
        operator_extensions()
    }
}

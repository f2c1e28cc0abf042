//! SQL dialects.
//!
//! A dialect contributes three things: operators it adds to the standard
//! catalog (source side), and, when it can be a conversion target, a
//! priority-ordered list of rewrite rules plus a type-name mapping.
//!
//! | Dialect | Source operators | Target |
//! |---------|------------------|--------|
//! | [`hive`]  | `RLIKE`, `REGEXP` | no |
//! | [`trino`] | none | yes |

pub mod hive;
pub mod trino;

use crate::error::{Error, Result};
use crate::generator::GeneratorConfig;
use crate::operators::{Operator, OperatorCatalog};
use crate::rel::{DataType, RelNode};
use crate::rewrite::{RewriteEngine, RexRule};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use hive::HiveDialect;
pub use trino::TrinoDialect;

/// Supported dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectType {
    Hive,
    Trino,
}

impl DialectType {
    pub fn as_str(self) -> &'static str {
        match self {
            DialectType::Hive => "hive",
            DialectType::Trino => "trino",
        }
    }
}

impl fmt::Display for DialectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hive" => Ok(DialectType::Hive),
            "trino" | "presto" => Ok(DialectType::Trino),
            _ => Err(Error::unsupported(format!("dialect {}", s))),
        }
    }
}

/// Behaviour a dialect plugs into resolution and rewriting.
pub trait DialectImpl: Send + Sync {
    fn dialect_type(&self) -> DialectType;

    /// Operators this dialect adds on top of the standard catalog.
    fn operator_extensions(&self) -> Vec<Operator> {
        Vec::new()
    }

    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::default()
    }

    /// Expression rewrite rules in priority order; the first match wins.
    /// Dialects without rules cannot be conversion targets.
    fn rex_rules(&self) -> &'static [RexRule] {
        &[]
    }

    /// Spelling of `data_type` in this dialect.
    fn map_type(&self, data_type: &DataType) -> DataType {
        data_type.clone()
    }

    fn is_target(&self) -> bool {
        !self.rex_rules().is_empty()
    }
}

/// A dialect selected by [`DialectType`].
pub struct Dialect {
    inner: Box<dyn DialectImpl>,
}

impl Dialect {
    pub fn get(dialect_type: DialectType) -> Self {
        let inner: Box<dyn DialectImpl> = match dialect_type {
            DialectType::Hive => Box::new(HiveDialect),
            DialectType::Trino => Box::new(TrinoDialect),
        };
        Self { inner }
    }

    pub fn dialect_type(&self) -> DialectType {
        self.inner.dialect_type()
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        self.inner.generator_config()
    }

    /// Standard operators plus this dialect's extensions.
    pub fn operator_catalog(&self) -> OperatorCatalog {
        OperatorCatalog::with_extensions(self.inner.operator_extensions())
    }

    pub fn implementation(&self) -> &dyn DialectImpl {
        self.inner.as_ref()
    }

    /// Rewrite engine targeting this dialect.
    pub fn rewrite_engine(&self) -> Result<RewriteEngine<'_>> {
        if !self.inner.is_target() {
            return Err(Error::unsupported(format!(
                "{} as a conversion target",
                self.dialect_type()
            )));
        }
        Ok(RewriteEngine::new(self.inner.as_ref()))
    }

    /// Convert `rel` to SQL text of this dialect.
    pub fn convert(&self, rel: &RelNode) -> Result<String> {
        self.rewrite_engine()?.convert(rel)
    }

    pub fn convert_with_config(&self, rel: &RelNode, config: GeneratorConfig) -> Result<String> {
        self.rewrite_engine()?.with_config(config).convert(rel)
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("dialect_type", &self.dialect_type())
            .finish()
    }
}

//! Per-table function metadata for catalog-driven ("dynamic") functions.
//!
//! A table can declare functions of its own. Queries over that table call them
//! as `<database>_<table>_<base name>`; the table metadata maps the base name to
//! an implementation class and lists the runtime artifacts the call needs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Table property holding `base_name:implementation.Class` pairs.
pub const FUNCTIONS_PROPERTY: &str = "functions";
/// Table property holding dependency URIs.
pub const DEPENDENCIES_PROPERTY: &str = "dependencies";

/// Function declarations attached to one table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableFunctionMetadata {
    pub database_name: String,
    pub table_name: String,
    /// Base function name to implementation class.
    #[serde(default)]
    pub functions: BTreeMap<String, String>,
    /// Artifacts attached to every function the table declares.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl TableFunctionMetadata {
    pub fn new(database_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Declare `base_name` as a call of `class_name`.
    pub fn with_function(mut self, base_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        self.functions.insert(base_name.into(), class_name.into());
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Read the metadata out of raw table properties.
    ///
    /// `functions` is a whitespace-separated list of `name:class` pairs and
    /// `dependencies` a whitespace-separated list of URIs. Both are optional.
    pub fn from_table_properties(
        database_name: &str,
        table_name: &str,
        properties: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut metadata = Self::new(database_name, table_name);
        if let Some(functions) = properties.get(FUNCTIONS_PROPERTY) {
            for pair in functions.split_whitespace() {
                let (name, class) = pair
                    .split_once(':')
                    .filter(|(name, class)| !name.is_empty() && !class.is_empty())
                    .ok_or_else(|| {
                        Error::deserialize(format!(
                            "malformed function declaration '{}' on {}.{}",
                            pair, database_name, table_name
                        ))
                    })?;
                metadata.functions.insert(name.to_string(), class.to_string());
            }
        }
        if let Some(dependencies) = properties.get(DEPENDENCIES_PROPERTY) {
            metadata.dependencies = dependencies.split_whitespace().map(str::to_string).collect();
        }
        Ok(metadata)
    }

    /// Prefix shared by every catalog-driven name of this table: `<db>_<table>_`.
    pub fn prefix(&self) -> String {
        format!("{}_{}_", self.database_name, self.table_name)
    }

    /// Base name of `function_name` if it carries this table's prefix, ignoring ASCII case.
    pub fn strip_prefix<'a>(&self, function_name: &'a str) -> Option<&'a str> {
        let prefix = self.prefix();
        let head = function_name.get(..prefix.len())?;
        if head.eq_ignore_ascii_case(&prefix) {
            function_name.get(prefix.len()..)
        } else {
            None
        }
    }

    /// Implementation class declared for `base_name`.
    pub fn class_for(&self, base_name: &str) -> Option<&str> {
        self.functions.get(base_name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_table_properties() {
        let properties = props(&[
            ("functions", "square:org.relsql.udf.Square  greet:org.relsql.udf.Greet"),
            ("dependencies", "ivy://org.relsql:udfs:1.0 ivy://org.relsql:extra:2.1"),
        ]);
        let metadata = TableFunctionMetadata::from_table_properties("db", "tbl", &properties).unwrap();
        assert_eq!(metadata.class_for("square"), Some("org.relsql.udf.Square"));
        assert_eq!(metadata.class_for("greet"), Some("org.relsql.udf.Greet"));
        assert_eq!(metadata.dependencies.len(), 2);
    }

    #[test]
    fn test_missing_properties_yield_empty_metadata() {
        let metadata = TableFunctionMetadata::from_table_properties("db", "tbl", &HashMap::new()).unwrap();
        assert!(metadata.functions.is_empty());
        assert!(metadata.dependencies.is_empty());
    }

    #[test]
    fn test_malformed_declaration_is_rejected() {
        let properties = props(&[("functions", "square")]);
        let err = TableFunctionMetadata::from_table_properties("db", "tbl", &properties).unwrap_err();
        assert!(matches!(err, Error::Deserialize(_)));
        assert!(err.to_string().contains("square"));
    }

    #[test]
    fn test_strip_prefix_ignores_case() {
        let metadata = TableFunctionMetadata::new("db", "tbl");
        assert_eq!(metadata.strip_prefix("DB_TBL_square"), Some("square"));
        assert_eq!(metadata.strip_prefix("db_other_square"), None);
        assert_eq!(metadata.strip_prefix("db"), None);
    }
}

//! Process-wide function registry.
//!
//! Maps case-normalized function names to the descriptors they resolve to.
//! Several descriptors under one name are true overloads, left for a later
//! type-aware phase to pick between. The registry only grows: bootstrap
//! registers the static catalogs, and catalog-driven resolution swaps
//! descriptors for dependency-annotated copies through [`FunctionRegistry::replace`].
//!
//! Reads never block each other. A replace holds the shard lock of a single
//! name, so two resolutions enriching the same implementation class under
//! different tables race and the last writer wins.

use crate::dialects::hive;
use crate::operators::{Operator, OperatorCatalog, SqlKind};
use dashmap::DashMap;
use relsql_function_catalogs::{
    register_enabled_catalogs, CatalogSink, FunctionBinding, FunctionEntry, FunctionNameCase,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

pub use relsql_function_catalogs::FunctionSignature;

/// A user-defined implementation class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserDefinedFunction {
    /// Implementation class name.
    pub name: String,
    /// Runtime artifacts the generated call needs.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// The catalog-driven function name that produced this binding, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_origin: Option<String>,
}

impl UserDefinedFunction {
    pub fn new(name: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            dependencies,
            dynamic_origin: None,
        }
    }

    /// Name the call should carry in generated SQL.
    pub fn call_name(&self) -> &str {
        self.dynamic_origin.as_deref().unwrap_or(&self.name)
    }
}

/// Database and table a resolution happened under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableContext {
    pub database: String,
    pub table: String,
}

/// An identifier whose binding is deferred to type-aware analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnresolvedFunction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableContext>,
}

/// What a function name is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperatorRef {
    Builtin(Arc<Operator>),
    UserDefined(Arc<UserDefinedFunction>),
    Unresolved(UnresolvedFunction),
}

impl OperatorRef {
    pub fn builtin(operator: Operator) -> Self {
        OperatorRef::Builtin(Arc::new(operator))
    }

    pub fn name(&self) -> &str {
        match self {
            OperatorRef::Builtin(op) => op.name(),
            OperatorRef::UserDefined(udf) => &udf.name,
            OperatorRef::Unresolved(unresolved) => &unresolved.name,
        }
    }

    /// Kind of a built-in operator; `None` for user-defined and unresolved bindings.
    pub fn kind(&self) -> Option<SqlKind> {
        match self {
            OperatorRef::Builtin(op) => Some(op.kind),
            _ => None,
        }
    }

    pub fn is_kind(&self, kind: SqlKind) -> bool {
        self.kind() == Some(kind)
    }

    pub fn as_builtin(&self) -> Option<&Operator> {
        match self {
            OperatorRef::Builtin(op) => Some(op),
            _ => None,
        }
    }
}

impl From<Operator> for OperatorRef {
    fn from(operator: Operator) -> Self {
        OperatorRef::builtin(operator)
    }
}

/// A registry entry. Never mutated once built; enrichment builds a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub operator: OperatorRef,
    pub dependencies: Vec<String>,
    pub signature: FunctionSignature,
    /// Only exact-case lookups match this entry.
    pub case_sensitive: bool,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, operator: OperatorRef, signature: FunctionSignature) -> Self {
        Self {
            name: name.into(),
            operator,
            dependencies: Vec::new(),
            signature,
            case_sensitive: false,
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Copy of this descriptor annotated with a table's dependencies and the
    /// catalog-driven name that requested it.
    pub fn enriched(&self, dependencies: &[String], function_name: &str) -> Self {
        let operator = match &self.operator {
            OperatorRef::UserDefined(udf) => OperatorRef::UserDefined(Arc::new(UserDefinedFunction {
                name: udf.name.clone(),
                dependencies: dependencies.to_vec(),
                dynamic_origin: Some(function_name.to_string()),
            })),
            other => other.clone(),
        };
        Self {
            name: self.name.clone(),
            operator,
            dependencies: dependencies.to_vec(),
            signature: self.signature,
            case_sensitive: self.case_sensitive,
        }
    }

    /// Same registered function, regardless of enrichment.
    fn same_function(&self, other: &FunctionDescriptor) -> bool {
        self.name == other.name
            && self.signature == other.signature
            && self.operator.name() == other.operator.name()
    }

    fn matches_name(&self, name: &str, case_sensitive: bool) -> bool {
        if case_sensitive || self.case_sensitive {
            self.name == name
        } else {
            self.name.eq_ignore_ascii_case(name)
        }
    }
}

/// Multimap from lower-cased function name to descriptors.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    entries: DashMap<String, Vec<FunctionDescriptor>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every catalog enabled through crate features.
    pub fn with_builtins() -> Self {
        let mut sink = RegistrySink::new(Self::new(), hive::operator_catalog());
        register_enabled_catalogs(&mut sink);
        sink.registry
    }

    /// Shared registry used when callers do not supply their own.
    pub fn global() -> &'static FunctionRegistry {
        &GLOBAL_REGISTRY
    }

    /// Add a descriptor under its own name. Exact duplicates are ignored.
    pub fn register(&self, descriptor: FunctionDescriptor) {
        let mut entry = self.entries.entry(descriptor.name.to_lowercase()).or_default();
        if !entry.contains(&descriptor) {
            entry.push(descriptor);
        }
    }

    /// All descriptors registered under `name`; empty when there are none.
    pub fn lookup(&self, name: &str, case_sensitive: bool) -> Vec<FunctionDescriptor> {
        self.entries
            .get(&name.to_lowercase())
            .map(|entry| {
                entry
                    .iter()
                    .filter(|d| d.matches_name(name, case_sensitive))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Substitute `new` for `old` under `name`.
    ///
    /// When `old` is already gone because another resolution replaced it first,
    /// the entry for the same function is overwritten instead. Returns whether
    /// an existing descriptor was replaced; otherwise `new` is appended.
    pub fn replace(&self, name: &str, old: &FunctionDescriptor, new: FunctionDescriptor) -> bool {
        let mut entry = self.entries.entry(name.to_lowercase()).or_default();
        let position = entry
            .iter()
            .position(|d| d == old)
            .or_else(|| entry.iter().position(|d| d.same_function(old)));
        match position {
            Some(index) => {
                entry[index] = new;
                true
            }
            None => {
                entry.push(new);
                false
            }
        }
    }

    /// Total number of descriptors.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered (lower-cased) names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

static GLOBAL_REGISTRY: LazyLock<FunctionRegistry> = LazyLock::new(FunctionRegistry::with_builtins);

/// Turns static catalog rows into registry descriptors.
struct RegistrySink {
    registry: FunctionRegistry,
    operators: OperatorCatalog,
    name_case: HashMap<&'static str, FunctionNameCase>,
}

impl RegistrySink {
    fn new(registry: FunctionRegistry, operators: OperatorCatalog) -> Self {
        Self {
            registry,
            operators,
            name_case: HashMap::new(),
        }
    }

    fn bind(&self, entry: &FunctionEntry) -> Option<(OperatorRef, Vec<String>)> {
        match entry.binding {
            FunctionBinding::StandardOperator(name) => self
                .operators
                .by_name(name)
                .map(|op| (OperatorRef::Builtin(op), Vec::new())),
            FunctionBinding::Builtin(name) => {
                Some((OperatorRef::builtin(Operator::named_function(name)), Vec::new()))
            }
            FunctionBinding::UserDefined {
                class_name,
                dependencies,
            } => {
                let dependencies: Vec<String> =
                    dependencies.iter().map(|d| d.to_string()).collect();
                let udf = UserDefinedFunction::new(class_name, dependencies.clone());
                Some((OperatorRef::UserDefined(Arc::new(udf)), dependencies))
            }
        }
    }
}

impl CatalogSink for RegistrySink {
    fn set_catalog_name_case(&mut self, catalog: &'static str, name_case: FunctionNameCase) {
        self.name_case.insert(catalog, name_case);
    }

    fn register(&mut self, catalog: &'static str, entry: FunctionEntry) {
        let Some((operator, dependencies)) = self.bind(&entry) else {
            tracing::warn!(
                catalog,
                function = entry.name,
                "catalog entry names an operator that is not in the operator catalog"
            );
            return;
        };
        let case_sensitive = self
            .name_case
            .get(catalog)
            .is_some_and(|case| *case == FunctionNameCase::Sensitive);
        let descriptor = FunctionDescriptor::new(entry.name, operator, entry.signature)
            .with_dependencies(dependencies)
            .case_sensitive(case_sensitive);
        self.registry.register(descriptor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators;

    fn udf_descriptor(class: &str) -> FunctionDescriptor {
        FunctionDescriptor::new(
            class,
            OperatorRef::UserDefined(Arc::new(UserDefinedFunction::new(class, Vec::new()))),
            FunctionSignature::exact(1),
        )
        .case_sensitive(true)
    }

    #[test]
    fn test_lookup_is_case_insensitive_by_default() {
        let registry = FunctionRegistry::new();
        registry.register(FunctionDescriptor::new(
            "substr",
            operators::SUBSTRING.into(),
            FunctionSignature::range(2, 3),
        ));

        assert_eq!(registry.lookup("SUBSTR", false).len(), 1);
        assert!(registry.lookup("SUBSTR", true).is_empty());
        assert!(registry.lookup("missing", false).is_empty());
    }

    #[test]
    fn test_case_sensitive_entries_need_exact_name() {
        let registry = FunctionRegistry::new();
        registry.register(udf_descriptor("com.acme.Square"));

        assert_eq!(registry.lookup("com.acme.Square", false).len(), 1);
        assert!(registry.lookup("com.acme.square", false).is_empty());
    }

    #[test]
    fn test_replace_swaps_one_descriptor() {
        let registry = FunctionRegistry::new();
        let old = udf_descriptor("com.acme.Square");
        registry.register(old.clone());

        let deps = vec!["ivy://com.acme:square:1.0".to_string()];
        let new = old.enriched(&deps, "db_tbl_square");
        assert!(registry.replace("com.acme.Square", &old, new.clone()));

        let found = registry.lookup("com.acme.Square", true);
        assert_eq!(found, vec![new]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_replace_after_concurrent_enrichment_keeps_one_entry() {
        let registry = FunctionRegistry::new();
        let old = udf_descriptor("com.acme.Square");
        registry.register(old.clone());

        let first = old.enriched(&["a".to_string()], "db_one_square");
        let second = old.enriched(&["b".to_string()], "db_two_square");
        registry.replace("com.acme.Square", &old, first);
        registry.replace("com.acme.Square", &old, second.clone());

        assert_eq!(registry.lookup("com.acme.Square", true), vec![second]);
    }

    #[test]
    fn test_enriched_keeps_implementation() {
        let old = udf_descriptor("com.acme.Square");
        let new = old.enriched(&["dep".to_string()], "db_tbl_sq");
        match &new.operator {
            OperatorRef::UserDefined(udf) => {
                assert_eq!(udf.name, "com.acme.Square");
                assert_eq!(udf.dependencies, vec!["dep".to_string()]);
                assert_eq!(udf.call_name(), "db_tbl_sq");
            }
            other => panic!("expected user-defined operator, got {:?}", other),
        }
        assert_eq!(new.dependencies, vec!["dep".to_string()]);
    }

    #[cfg(feature = "catalog-hive")]
    #[test]
    fn test_builtins_bind_standard_operators() {
        let registry = FunctionRegistry::with_builtins();
        let substr = registry.lookup("substr", false);
        assert_eq!(substr.len(), 1);
        assert!(substr[0].operator.is_kind(SqlKind::Substring));

        let rlike = registry.lookup("rlike", false);
        assert!(rlike[0].operator.is_kind(SqlKind::RLike));
        assert!(registry.names().contains(&"to_date".to_string()));
    }
}

//! Function and operator name resolution.
//!
//! [`FunctionResolver`] turns a name written in a source query into the one
//! descriptor it denotes. It owns the disambiguation policy:
//!
//! - unary and binary operators must match exactly one catalog operator,
//!   except that binary `+` and `-` always mean arithmetic;
//! - function overloads are not an error but produce a placeholder bound to an
//!   unresolved identifier, left for type-aware analysis;
//! - names of the form `<db>_<table>_<base>` resolve through the table's
//!   function metadata, enriching the shared registry on the way.

use crate::catalog::TableFunctionMetadata;
use crate::dialects::hive;
use crate::error::{Error, Result};
use crate::function_registry::{
    FunctionDescriptor, FunctionRegistry, FunctionSignature, OperatorRef, TableContext,
    UnresolvedFunction,
};
use crate::operators::{self, OperatorCatalog};

/// Resolves names against a shared registry and an operator catalog.
///
/// Resolvers are cheap and hold no per-request state besides the borrowed
/// registry, so one can be built per conversion or shared across threads.
#[derive(Debug, Clone)]
pub struct FunctionResolver<'r> {
    registry: &'r FunctionRegistry,
    operators: OperatorCatalog,
}

impl<'r> FunctionResolver<'r> {
    /// Resolver using the standard operators plus the Hive extensions.
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Self::with_operators(registry, hive::operator_catalog())
    }

    pub fn with_operators(registry: &'r FunctionRegistry, operators: OperatorCatalog) -> Self {
        Self {
            registry,
            operators,
        }
    }

    pub fn registry(&self) -> &'r FunctionRegistry {
        self.registry
    }

    pub fn operators(&self) -> &OperatorCatalog {
        &self.operators
    }

    /// The single prefix operator named `name`.
    pub fn resolve_unary_operator(&self, name: &str) -> Result<OperatorRef> {
        let mut matches = self.operators.prefix_operators(name);
        match matches.len() {
            0 => Err(Error::unknown_function(name)),
            1 => Ok(OperatorRef::Builtin(matches.remove(0))),
            _ => Err(Error::ambiguous_operator(name, "unary")),
        }
    }

    /// The single binary or special operator named `name`.
    ///
    /// `+` and `-` always resolve to arithmetic; the source dialect has no
    /// date/time arithmetic spelled with them. Names that are not operators
    /// at all fall back to function resolution.
    pub fn resolve_binary_operator(&self, name: &str) -> Result<OperatorRef> {
        match name {
            "+" => return Ok(OperatorRef::builtin(operators::PLUS)),
            "-" => return Ok(OperatorRef::builtin(operators::MINUS)),
            _ => {}
        }
        let mut matches = self.operators.binary_operators(name);
        match matches.len() {
            0 => Ok(self.try_resolve(name, false, None)?.operator),
            1 => Ok(OperatorRef::Builtin(matches.remove(0))),
            _ => Err(Error::ambiguous_operator(name, "binary")),
        }
    }

    /// Plain registry lookup. Never consults table metadata and never fails.
    pub fn resolve(&self, name: &str, case_sensitive: bool) -> Vec<FunctionDescriptor> {
        self.registry.lookup(name, case_sensitive)
    }

    /// Resolve `function_name` to exactly one descriptor.
    ///
    /// With `table` present, a name missing from the registry is tried as a
    /// catalog-driven function of that table. Several candidates yield a
    /// placeholder bound to the first candidate's operator name.
    pub fn try_resolve(
        &self,
        function_name: &str,
        case_sensitive: bool,
        table: Option<&TableFunctionMetadata>,
    ) -> Result<FunctionDescriptor> {
        let mut functions = self.resolve(function_name, case_sensitive);
        if functions.is_empty() {
            if let Some(table) = table {
                functions = self.try_resolve_as_catalog_function(function_name, table)?;
            }
        }
        match functions.len() {
            0 => Err(Error::unknown_function(function_name)),
            1 => Ok(functions.remove(0)),
            _ => Ok(placeholder(function_name, &functions[0], table)),
        }
    }

    /// Resolve a name that encodes `<db>_<table>_<base>` through `table`.
    ///
    /// Returns an empty list when the name lacks the table's prefix or the base
    /// name is not declared by the table. A declared class that the registry
    /// does not know is a broken mapping and fails. Every descriptor found is
    /// replaced in the registry by a copy carrying the table's dependencies.
    pub fn try_resolve_as_catalog_function(
        &self,
        function_name: &str,
        table: &TableFunctionMetadata,
    ) -> Result<Vec<FunctionDescriptor>> {
        let Some(base_name) = table.strip_prefix(function_name) else {
            return Ok(Vec::new());
        };
        let Some(class_name) = table.class_for(base_name) else {
            return Ok(Vec::new());
        };

        let found = self.registry.lookup(class_name, true);
        if found.is_empty() {
            tracing::warn!(
                function = function_name,
                class = class_name,
                database = %table.database_name,
                table = %table.table_name,
                "catalog function maps to a class missing from the registry"
            );
            return Err(Error::broken_catalog_mapping(function_name, class_name));
        }

        let mut enriched = Vec::with_capacity(found.len());
        for descriptor in &found {
            let new = descriptor.enriched(&table.dependencies, function_name);
            self.registry.replace(class_name, descriptor, new.clone());
            tracing::debug!(
                function = function_name,
                class = class_name,
                dependencies = table.dependencies.len(),
                "enriched catalog function"
            );
            enriched.push(new);
        }
        Ok(enriched)
    }
}

fn placeholder(
    function_name: &str,
    first: &FunctionDescriptor,
    table: Option<&TableFunctionMetadata>,
) -> FunctionDescriptor {
    let unresolved = UnresolvedFunction {
        name: first.operator.name().to_string(),
        table: table.map(|t| TableContext {
            database: t.database_name.clone(),
            table: t.table_name.clone(),
        }),
    };
    FunctionDescriptor::new(
        function_name,
        OperatorRef::Unresolved(unresolved),
        FunctionSignature::variadic(0),
    )
}

#![forbid(unsafe_code)]

#[cfg(feature = "catalog-hive")]
mod hive;
#[cfg(feature = "catalog-udfs")]
mod udfs;

/// Function-name casing behavior for lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionNameCase {
    /// Function names are compared case-insensitively.
    #[default]
    Insensitive,
    /// Function names are compared with exact case.
    Sensitive,
}

/// Arity metadata carried alongside each registered function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Minimum number of positional arguments.
    pub min_arity: usize,
    /// Maximum number of positional arguments.
    /// `None` means unbounded/variadic.
    pub max_arity: Option<usize>,
}

impl FunctionSignature {
    /// Build an exact-arity signature.
    pub const fn exact(arity: usize) -> Self {
        Self {
            min_arity: arity,
            max_arity: Some(arity),
        }
    }

    /// Build a bounded arity range signature.
    pub const fn range(min_arity: usize, max_arity: usize) -> Self {
        Self {
            min_arity,
            max_arity: Some(max_arity),
        }
    }

    /// Build a variadic signature with a minimum arity.
    pub const fn variadic(min_arity: usize) -> Self {
        Self {
            min_arity,
            max_arity: None,
        }
    }
}

/// What a registered name binds to once it reaches the function registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionBinding {
    /// One of the standard operators, looked up by its canonical name.
    StandardOperator(&'static str),
    /// A plain built-in function printed under the given canonical name.
    Builtin(&'static str),
    /// A user-defined implementation class together with the artifacts it needs at runtime.
    UserDefined {
        class_name: &'static str,
        dependencies: &'static [&'static str],
    },
}

/// A single catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionEntry {
    /// Name the source dialect uses to call the function.
    pub name: &'static str,
    pub binding: FunctionBinding,
    pub signature: FunctionSignature,
}

/// Sink used by this crate to emit feature-enabled function catalogs.
///
/// The sink abstraction keeps this crate independent of `relsql`.
pub trait CatalogSink {
    /// Set the casing behavior for names registered under a catalog key.
    fn set_catalog_name_case(&mut self, catalog: &'static str, name_case: FunctionNameCase);

    /// Register one function entry under a catalog key.
    fn register(&mut self, catalog: &'static str, entry: FunctionEntry);
}

/// Register all catalogs enabled via crate features into a sink.
#[allow(unused_variables)]
pub fn register_enabled_catalogs<S: CatalogSink>(sink: &mut S) {
    #[cfg(feature = "catalog-hive")]
    hive::register(sink);
    #[cfg(feature = "catalog-udfs")]
    udfs::register(sink);
}

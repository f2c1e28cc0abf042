//! Error types for relsql

use thiserror::Error;

/// The result type for relsql operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during function resolution and SQL rewriting.
///
/// Every variant is fatal to the conversion request that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The name resolves through neither the registry, the catalog-driven path, nor any fallback
    #[error("Unknown function name: {name}")]
    UnknownFunction { name: String },

    /// More than one operator candidate where exactly one is required
    #[error("Ambiguous {arity} operator: {name}")]
    AmbiguousOperator { name: String, arity: String },

    /// A catalog-driven function maps onto an implementation class the registry does not know
    #[error("Catalog function {function} maps to unknown implementation class {class}")]
    BrokenCatalogMapping { function: String, class: String },

    /// The rewrite engine has no rule for an algebra shape
    #[error("Unsupported construct: {node}")]
    UnsupportedConstruct { node: String },

    /// The serialized algebra tree or configuration could not be read
    #[error("Deserialization error: {0}")]
    Deserialize(String),

    /// Internal error (should not happen in normal usage)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an unknown-function error
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Error::UnknownFunction { name: name.into() }
    }

    /// Create an ambiguous-operator error
    pub fn ambiguous_operator(name: impl Into<String>, arity: impl Into<String>) -> Self {
        Error::AmbiguousOperator {
            name: name.into(),
            arity: arity.into(),
        }
    }

    /// Create a broken-catalog-mapping error
    pub fn broken_catalog_mapping(function: impl Into<String>, class: impl Into<String>) -> Self {
        Error::BrokenCatalogMapping {
            function: function.into(),
            class: class.into(),
        }
    }

    /// Create an unsupported-construct error
    pub fn unsupported(node: impl Into<String>) -> Self {
        Error::UnsupportedConstruct { node: node.into() }
    }

    /// Create a deserialization error
    pub fn deserialize(message: impl Into<String>) -> Self {
        Error::Deserialize(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    /// The offending name or node description carried by this error.
    pub fn subject(&self) -> &str {
        match self {
            Error::UnknownFunction { name } | Error::AmbiguousOperator { name, .. } => name,
            Error::BrokenCatalogMapping { class, .. } => class,
            Error::UnsupportedConstruct { node } => node,
            Error::Deserialize(message) | Error::Internal(message) => message,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Deserialize(err.to_string())
    }
}

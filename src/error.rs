use crate::resource::ResourceKind;
use miette::Diagnostic;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FractalError>;

#[derive(Error, Debug, Diagnostic)]
pub enum FractalError {
    #[error("`{operation}` expects a {expected} resource, but was given a {found} resource")]
    #[diagnostic(
        code(scope::invalid_resource),
        help("Wrap the data in the resource variant this entry point accepts, or use the general entry point.")
    )]
    InvalidResource {
        operation: &'static str,
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[error("the data of this resource was already consumed by `{operation}`")]
    #[diagnostic(
        code(scope::resource_consumed),
        help("Resources wrap single-pass iterators. Build a fresh resource for every transformation.")
    )]
    ResourceConsumed { operation: &'static str },

    #[error("include `{include}` is declared by `{transformer}` but never resolved")]
    #[diagnostic(
        code(transformer::missing_include),
        help("Handle this include name in the transformer's `include` method, or remove it from its include lists.")
    )]
    MissingInclude {
        include: String,
        transformer: &'static str,
    },

    #[error("{0}")]
    #[diagnostic(code(transformer::failed))]
    Transformer(Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    #[diagnostic(code(document::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(document::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl FractalError {
    /// Wraps an error raised by user transformation logic. The message is
    /// kept verbatim so callers see the original failure.
    pub fn transformer<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        FractalError::Transformer(error.into())
    }
}

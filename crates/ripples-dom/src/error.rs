use thiserror::Error;

/// Failures raised by DOM construction primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("invalid tag name {0:?}")]
    InvalidTagName(String),
    #[error("cannot insert <{child}> into its own subtree <{parent}>")]
    HierarchyRequest { parent: String, child: String },
}

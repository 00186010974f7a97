use std::fmt::{self, Display};

/// Errors produced by model parsers and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownCatalogKind(String),
    UnknownIdKind(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownCatalogKind(raw) => {
                write!(f, "unknown catalog kind: {raw}")
            }
            ModelError::UnknownIdKind(raw) => write!(f, "unknown id kind: {raw}"),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;

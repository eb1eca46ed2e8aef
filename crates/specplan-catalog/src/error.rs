//! Error types for catalog access.

use thiserror::Error;

use specplan_core::SpecId;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while reading or seeding a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("duplicate spec id: {0}")]
    DuplicateSpecId(SpecId),

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<CatalogError> for specplan_core::SizingError {
    fn from(err: CatalogError) -> Self {
        specplan_core::SizingError::Catalog(err.to_string())
    }
}

//! Error types for specification sizing.

use thiserror::Error;

use crate::types::SpecId;

/// Result type alias for sizing operations.
pub type SizingResult<T> = Result<T, SizingError>;

/// Errors that can occur while sizing a cluster against the catalog.
///
/// An empty candidate list is not an error; it is returned as `Ok(vec![])`.
#[derive(Debug, Error)]
pub enum SizingError {
    #[error("malformed spec {spec_id}: {reason}")]
    MalformedSpec { spec_id: SpecId, reason: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("catalog error: {0}")]
    Catalog(String),
}

impl SizingError {
    pub(crate) fn malformed(spec_id: SpecId, reason: impl Into<String>) -> Self {
        Self::MalformedSpec {
            spec_id,
            reason: reason.into(),
        }
    }
}

//! specplan-core: shared types for specification matching.
//!
//! Holds the catalog-facing [`SpecRecord`], the caller-facing
//! [`SizingRequest`], the per-family capacity model, and the tunables
//! the sizing pipeline reads from [`PlannerConfig`].

pub mod capacity;
pub mod config;
pub mod error;
pub mod types;

pub use config::PlannerConfig;
pub use error::{SizingError, SizingResult};
pub use types::*;

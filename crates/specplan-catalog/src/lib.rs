//! specplan-catalog: where specification records come from.
//!
//! The engine only needs [`SpecCatalog::query`]: every record for one
//! (cluster family, machine role) pair, in no particular order. Real
//! deployments back this with a database; [`MemoryCatalog`] serves tests
//! and embedded callers, and can be seeded from the system spec document.
//!
//! # Components
//!
//! - **`catalog`**: `SpecCatalog` trait and `MemoryCatalog`
//! - **`seed`**: initial spec document parsing and name-deduplicated seeding

pub mod catalog;
pub mod error;
pub mod seed;

pub use catalog::{MemoryCatalog, SpecCatalog};
pub use error::{CatalogError, CatalogResult};
pub use seed::{SeedDocument, SeedEntry};

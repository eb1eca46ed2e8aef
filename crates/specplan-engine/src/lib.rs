//! specplan-engine: pick the specs that can carry a requested cluster.
//!
//! Given a [`SizingRequest`](specplan_core::SizingRequest), the planner loads
//! every catalog spec for the family and role, then runs a four-stage
//! pipeline over the candidates:
//!
//! 1. machine pairs needed to hold the current capacity
//! 2. cluster shard count (family-specific, always a multiple of machine pairs)
//! 3. system filter (fixed shard count, throughput overlap)
//! 4. family ranking
//!
//! # Components
//!
//! - **`candidate`**: a spec plus its derived sizing fields
//! - **`pipeline`**: the shared stages and the stage runner
//! - **`strategy`**: per-family rules and the family → strategy registry
//! - **`window`**: in-memory family candidate-window selection
//! - **`planner`**: the facade that ties catalog and pipeline together

pub mod candidate;
pub mod pipeline;
pub mod planner;
pub mod strategy;
pub mod window;

pub use candidate::Candidate;
pub use pipeline::run_pipeline;
pub use planner::SpecPlanner;
pub use strategy::{FamilyStrategy, StrategyRegistry};

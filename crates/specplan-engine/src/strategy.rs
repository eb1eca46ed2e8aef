//! Family strategies: the per-family halves of the sizing pipeline.
//!
//! Every strategy shares the pipeline skeleton and differs in four places:
//! the machine-pair floor, the shard-count rule, whether throughput is
//! checked, and whether survivors are ranked.

use std::collections::HashMap;

use tracing::{debug, warn};

use specplan_core::{ClusterFamily, PlannerConfig, SizingRequest};

use crate::candidate::Candidate;
use crate::window;

/// Sizing policy for one cluster family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FamilyStrategy {
    /// Shards follow projected capacity, rounded up to whole shards per machine.
    ShardedRelational,
    /// At least three machine pairs; shards sized by a fixed management unit.
    MinPairsKv,
    /// Even per-machine shard count derived from the per-instance ceiling.
    SsdKv,
    /// Windowed selection around the natural fit, with even per-machine shards.
    InMemoryKv,
}

impl FamilyStrategy {
    /// Lower bound on machine pairs for this family.
    pub fn machine_pair_floor(&self, config: &PlannerConfig) -> u32 {
        match self {
            Self::MinPairsKv => config.min_machine_pairs.max(1),
            _ => 1,
        }
    }

    /// Whether the requested throughput range constrains this family.
    pub fn checks_throughput(&self) -> bool {
        matches!(self, Self::ShardedRelational)
    }

    /// Whether survivors are reordered after filtering.
    pub fn ranks_candidates(&self) -> bool {
        !matches!(self, Self::ShardedRelational)
    }

    /// Assign cluster shard counts. The in-memory family also selects which
    /// candidates continue; the others keep every candidate whose shard
    /// count fits in a `u32`.
    pub fn assign_shards(
        &self,
        req: &SizingRequest,
        candidates: Vec<Candidate>,
        config: &PlannerConfig,
    ) -> Vec<Candidate> {
        match self {
            Self::ShardedRelational => candidates
                .into_iter()
                .filter_map(|c| {
                    let raw = ceil_to_u32(req.future_capacity / c.capacity);
                    let shards = round_up_to_multiple(raw, c.machine_pairs);
                    debug!(spec_id = c.spec_id(), raw, ?shards, "relational shard count");
                    with_shards(c, shards)
                })
                .collect(),
            Self::MinPairsKv => {
                let target = config
                    .min_machine_pairs
                    .max(ceil_to_u32(req.current_capacity / config.optimal_manage_unit));
                candidates
                    .into_iter()
                    .filter_map(|c| {
                        let shards = round_up_to_multiple(target, c.machine_pairs);
                        debug!(spec_id = c.spec_id(), target, ?shards, "min-pairs shard count");
                        with_shards(c, shards)
                    })
                    .collect()
            }
            Self::SsdKv => candidates
                .into_iter()
                .filter_map(|c| {
                    let per_machine = (c.capacity / config.single_instance_max).floor() as u32;
                    let per_machine = even_at_least_two(per_machine);
                    let shards = per_machine.and_then(|n| n.checked_mul(c.machine_pairs));
                    debug!(spec_id = c.spec_id(), ?per_machine, ?shards, "ssd shard count");
                    with_shards(c, shards)
                })
                .collect(),
            Self::InMemoryKv => window::select_and_assign(req, candidates, config),
        }
    }
}

/// Maps each cluster family to its strategy.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<ClusterFamily, FamilyStrategy>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ClusterFamily::TenDbCluster, FamilyStrategy::ShardedRelational);
        registry.register(ClusterFamily::TendisPlus, FamilyStrategy::MinPairsKv);
        registry.register(ClusterFamily::TendisSsd, FamilyStrategy::SsdKv);
        registry.register(ClusterFamily::TendisCache, FamilyStrategy::InMemoryKv);
        registry
    }
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Register (or replace) the strategy for a family.
    pub fn register(&mut self, family: ClusterFamily, strategy: FamilyStrategy) -> &mut Self {
        self.strategies.insert(family, strategy);
        self
    }

    pub fn lookup(&self, family: ClusterFamily) -> Option<FamilyStrategy> {
        self.strategies.get(&family).copied()
    }
}

// ── Numeric helpers ────────────────────────────────────────────────

/// Attach `shards`, or drop the candidate when the count overflowed.
pub(crate) fn with_shards(c: Candidate, shards: Option<u32>) -> Option<Candidate> {
    match shards {
        Some(shards) => Some(c.with_shard_count(shards)),
        None => {
            warn!(
                spec_id = c.spec_id(),
                machine_pairs = c.machine_pairs,
                "shard count overflows, dropping candidate"
            );
            None
        }
    }
}

/// `ceil(x)` as a shard or pair count. Saturates on overflow, 0 for NaN.
pub(crate) fn ceil_to_u32(x: f64) -> u32 {
    x.ceil() as u32
}

/// Smallest multiple of `m` that is >= `n`, or `None` past `u32::MAX`.
/// `m == 0` leaves `n` unchanged.
pub(crate) fn round_up_to_multiple(n: u32, m: u32) -> Option<u32> {
    if m == 0 {
        return Some(n);
    }
    n.div_ceil(m).checked_mul(m)
}

/// Bump odd counts to the next even number, with a floor of two.
pub(crate) fn even_at_least_two(n: u32) -> Option<u32> {
    n.checked_add(n & 1).map(|n| n.max(2))
}

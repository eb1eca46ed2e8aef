//! Sizing pipeline: the stages shared by every family.
//!
//! Each stage takes the whole candidate list and returns a new one; no
//! stage starts before the previous one has seen every candidate.

use std::cmp::Ordering;

use tracing::debug;

use specplan_core::{PlannerConfig, SizingRequest};

use crate::candidate::Candidate;
use crate::strategy::{FamilyStrategy, ceil_to_u32};

/// Stage 1: machine pairs needed to hold the current capacity.
pub fn size_machine_pairs(
    req: &SizingRequest,
    candidates: Vec<Candidate>,
    floor: u32,
) -> Vec<Candidate> {
    let throughput_requested = req.throughput.is_some();
    candidates
        .into_iter()
        .map(|c| {
            let pairs = ceil_to_u32(req.current_capacity / c.capacity).max(floor);
            c.with_machine_pairs(pairs, throughput_requested)
        })
        .collect()
}

/// Stage 3: drop candidates that miss the fixed shard count or, when the
/// family checks it, whose cluster throughput misses the requested range.
pub fn system_filter(
    req: &SizingRequest,
    candidates: Vec<Candidate>,
    check_throughput: bool,
) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| {
            if let Some(wanted) = req.shard_count
                && c.shard_count != wanted.get()
            {
                debug!(spec_id = c.spec_id(), shards = c.shard_count, wanted = wanted.get(), "shard count mismatch");
                return false;
            }
            if check_throughput && let Some(wanted) = &req.throughput {
                let overlaps = c
                    .cluster_throughput
                    .is_some_and(|cluster| cluster.intersects(wanted));
                if !overlaps {
                    debug!(spec_id = c.spec_id(), "throughput out of range");
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Stage 4: order key-value candidates.
///
/// With expected growth, more shards come first (finer, more elastic
/// topologies); otherwise fewer shards come first. Ties go to larger
/// capacity, then fewer machine pairs. The sort is stable.
pub fn rank(req: &SizingRequest, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    let growth = req.expects_growth();
    candidates.sort_by(|a, b| rank_order(growth, a, b));
    candidates
}

/// Run all four stages with the given family strategy.
pub fn run_pipeline(
    strategy: FamilyStrategy,
    req: &SizingRequest,
    candidates: Vec<Candidate>,
    config: &PlannerConfig,
) -> Vec<Candidate> {
    let loaded = candidates.len();

    let candidates = size_machine_pairs(req, candidates, strategy.machine_pair_floor(config));
    let candidates = strategy.assign_shards(req, candidates, config);
    let sized = candidates.len();

    let candidates = system_filter(req, candidates, strategy.checks_throughput());
    let filtered = candidates.len();

    let candidates = if strategy.ranks_candidates() {
        rank(req, candidates)
    } else {
        candidates
    };

    debug!(?strategy, loaded, sized, filtered, "pipeline finished");
    candidates
}

/// Ordering used by [`rank`], exposed for callers merging ranked lists.
pub fn rank_order(growth: bool, a: &Candidate, b: &Candidate) -> Ordering {
    let shards = if growth {
        b.shard_count.cmp(&a.shard_count)
    } else {
        a.shard_count.cmp(&b.shard_count)
    };
    shards
        .then_with(|| b.capacity.total_cmp(&a.capacity))
        .then_with(|| a.machine_pairs.cmp(&b.machine_pairs))
}

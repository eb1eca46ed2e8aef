//! In-memory family: candidate-window selection.
//!
//! Rather than sizing every spec, the in-memory family offers a small
//! neighbourhood of shapes around the natural fit:
//!
//! 1. Size against the current capacity, or against the projected one capped
//!    at `current * scale_multiple / 2` when growth is expected.
//! 2. Sort by capacity and take the first spec that holds the current
//!    capacity, plus one smaller spec, plus a second smaller spec when at
//!    least three precede the fit.
//! 3. When the current capacity exceeds the largest spec, take the two
//!    largest specs instead; beyond `scale_multiple` times the largest, the
//!    per-instance unit grows by `scale_multiple` as well.
//! 4. Shards per machine are even and at least two; the cluster gets at
//!    least `min_cache_shards`.
//!
//! Steps depend on each other's ordering, so they stay in one function.

use tracing::debug;

use specplan_core::{PlannerConfig, SizingRequest};

use crate::candidate::Candidate;
use crate::strategy::{ceil_to_u32, even_at_least_two, round_up_to_multiple, with_shards};

/// Select the candidate window and assign shard counts to it.
/// Candidates outside the window are dropped.
pub fn select_and_assign(
    req: &SizingRequest,
    mut candidates: Vec<Candidate>,
    config: &PlannerConfig,
) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let effective_capacity = if req.expects_growth() {
        req.future_capacity
            .min(req.current_capacity * config.scale_multiple / 2.0)
    } else {
        req.current_capacity
    };

    // Stable: equal capacities keep catalog order.
    candidates.sort_by(|a, b| a.capacity.total_cmp(&b.capacity));

    let last = candidates.len() - 1;
    let largest = candidates[last].capacity;
    let mut picked: Vec<usize> = Vec::with_capacity(3);

    if let Some(fit) = candidates
        .iter()
        .position(|c| req.current_capacity <= c.capacity)
    {
        picked.push(fit);
        if fit >= 1 {
            picked.push(fit - 1);
        }
        if fit >= 3 {
            picked.push(fit - 2);
        }
    }

    let instance_unit = if req.current_capacity > largest * config.scale_multiple {
        config.base_instance_unit * config.scale_multiple
    } else {
        config.base_instance_unit
    };

    // Only reachable when no spec fits, so it never duplicates the window.
    if req.current_capacity > largest {
        picked.push(last);
        if last >= 1 {
            picked.push(last - 1);
        }
    }

    debug!(
        effective_capacity,
        instance_unit,
        window = ?picked.iter().map(|&i| candidates[i].spec_id()).collect::<Vec<_>>(),
        "in-memory candidate window"
    );

    let raw = ceil_to_u32(effective_capacity / instance_unit);
    picked
        .into_iter()
        .filter_map(|i| {
            let c = candidates[i].clone();
            let shards = even_at_least_two(raw.div_ceil(c.machine_pairs.max(1)))
                .and_then(|per_machine| per_machine.checked_mul(c.machine_pairs))
                .zip(round_up_to_multiple(config.min_cache_shards, c.machine_pairs))
                .map(|(shards, floor)| shards.max(floor));
            with_shards(c, shards)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use specplan_core::{ClusterFamily, MinMax, SpecRecord};

    fn make_candidate(id: u32, mem_gb: f64, current: f64) -> Candidate {
        let spec = SpecRecord {
            spec_id: id,
            spec_name: format!("{mem_gb}G"),
            cluster_family: ClusterFamily::TendisCache,
            machine_role: "tendiscache".to_string(),
            cpu: None,
            mem: Some(MinMax::new(mem_gb, mem_gb)),
            device_class: vec![],
            storage: vec![],
            throughput: None,
            instance_num: 0,
            desc: None,
        };
        let pairs = (current / mem_gb).ceil() as u32;
        Candidate::new(spec, mem_gb).with_machine_pairs(pairs, false)
    }

    fn catalog(current: f64) -> Vec<Candidate> {
        // Deliberately unsorted.
        [(1, 64.0), (2, 8.0), (3, 128.0), (4, 16.0), (5, 32.0)]
            .into_iter()
            .map(|(id, gb)| make_candidate(id, gb, current))
            .collect()
    }

    fn ids(candidates: &[Candidate]) -> Vec<u32> {
        candidates.iter().map(|c| c.spec_id()).collect()
    }

    #[test]
    fn window_includes_two_smaller_neighbours() {
        // Sorted: 8, 16, 32, 64, 128. Fit for 50 is 64 at index 3.
        let req = SizingRequest::new(ClusterFamily::TendisCache, "tendiscache", 50.0, 50.0);
        let out = select_and_assign(&req, catalog(50.0), &PlannerConfig::default());
        assert_eq!(ids(&out), vec![1, 5, 4]);
    }

    #[test]
    fn window_at_second_position_has_one_neighbour() {
        // Fit for 10 is 16 at index 1.
        let req = SizingRequest::new(ClusterFamily::TendisCache, "tendiscache", 10.0, 10.0);
        let out = select_and_assign(&req, catalog(10.0), &PlannerConfig::default());
        assert_eq!(ids(&out), vec![4, 2]);
    }

    #[test]
    fn window_at_index_two_skips_second_neighbour() {
        // Fit for 20 is 32 at index 2; only one predecessor is added.
        let req = SizingRequest::new(ClusterFamily::TendisCache, "tendiscache", 20.0, 20.0);
        let out = select_and_assign(&req, catalog(20.0), &PlannerConfig::default());
        assert_eq!(ids(&out), vec![5, 4]);
    }

    #[test]
    fn oversize_request_takes_two_largest() {
        let req = SizingRequest::new(ClusterFamily::TendisCache, "tendiscache", 200.0, 200.0);
        let out = select_and_assign(&req, catalog(200.0), &PlannerConfig::default());
        assert_eq!(ids(&out), vec![3, 1]);

        // 200 / 6 -> 34 shards; 128G needs 2 pairs -> 17 per machine -> 18 -> 36.
        assert_eq!(out[0].machine_pairs, 2);
        assert_eq!(out[0].shard_count, 36);
    }

    #[test]
    fn very_large_request_bumps_instance_unit() {
        // 600 > 128 * 4, so the unit becomes 24: ceil(600 / 24) = 25 shards.
        let req = SizingRequest::new(ClusterFamily::TendisCache, "tendiscache", 600.0, 600.0);
        let out = select_and_assign(&req, catalog(600.0), &PlannerConfig::default());

        let largest = &out[0];
        assert_eq!(largest.spec_id(), 3);
        assert_eq!(largest.machine_pairs, 5);
        // 25 / 5 = 5 per machine, bumped to 6 -> 30.
        assert_eq!(largest.shard_count, 30);
    }

    #[test]
    fn growth_is_capped_by_scale_multiple() {
        // Effective capacity: min(1000, 10 * 4 / 2) = 20 -> ceil(20 / 6) = 4 shards.
        let req = SizingRequest::new(ClusterFamily::TendisCache, "tendiscache", 10.0, 1000.0);
        let out = select_and_assign(&req, catalog(10.0), &PlannerConfig::default());

        let fit = &out[0];
        assert_eq!(fit.spec_id(), 4);
        assert_eq!(fit.machine_pairs, 1);
        assert_eq!(fit.shard_count, 4);

        // 8G needs 2 pairs: 4 / 2 = 2 per machine -> 4.
        let smaller = &out[1];
        assert_eq!(smaller.machine_pairs, 2);
        assert_eq!(smaller.shard_count, 4);
    }

    #[test]
    fn shard_floor_and_parity_hold() {
        let config = PlannerConfig::default();
        for current in [1.0, 7.0, 30.0, 90.0, 129.0, 700.0] {
            let req = SizingRequest::new(ClusterFamily::TendisCache, "tendiscache", current, current * 3.0);
            for c in select_and_assign(&req, catalog(current), &config) {
                assert!(c.shard_count >= 4, "{current}: {c:?}");
                assert_eq!(c.shard_count % c.machine_pairs, 0);
                assert_eq!(c.per_machine_shards() % 2, 0);
            }
        }
    }

    #[test]
    fn two_spec_oversize_offers_both() {
        let req = SizingRequest::new(ClusterFamily::TendisCache, "tendiscache", 100.0, 100.0);
        let out = select_and_assign(
            &req,
            vec![make_candidate(1, 16.0, 100.0), make_candidate(2, 32.0, 100.0)],
            &PlannerConfig::default(),
        );
        assert_eq!(ids(&out), vec![2, 1]);
    }

    #[test]
    fn overflowing_candidate_is_dropped() {
        let req = SizingRequest::new(ClusterFamily::TendisCache, "tendiscache", 100.0, 100.0);
        let huge = make_candidate(1, 16.0, 100.0).with_machine_pairs(u32::MAX, false);
        let out = select_and_assign(
            &req,
            vec![huge, make_candidate(2, 32.0, 100.0)],
            &PlannerConfig::default(),
        );
        assert_eq!(ids(&out), vec![2]);
    }

    #[test]
    fn empty_input_is_empty() {
        let req = SizingRequest::new(ClusterFamily::TendisCache, "tendiscache", 10.0, 10.0);
        assert!(select_and_assign(&req, vec![], &PlannerConfig::default()).is_empty());
    }

    #[test]
    fn single_oversize_candidate() {
        let req = SizingRequest::new(ClusterFamily::TendisCache, "tendiscache", 100.0, 100.0);
        let out = select_and_assign(&req, vec![make_candidate(1, 32.0, 100.0)], &PlannerConfig::default());
        assert_eq!(ids(&out), vec![1]);
    }
}

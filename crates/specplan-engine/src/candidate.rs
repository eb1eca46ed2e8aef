//! Candidate: one catalog spec annotated for one request.

use serde::{Deserialize, Serialize};

use specplan_core::capacity::capacity;
use specplan_core::{MinMax, SizingResult, SpecId, SpecRecord};

/// A spec plus the sizing fields derived for a single request.
///
/// Candidates are values: each pipeline stage returns new candidates
/// rather than editing shared ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub spec: SpecRecord,
    /// Usable GB per machine.
    pub capacity: f64,
    /// Machine groups required to hold the current capacity.
    pub machine_pairs: u32,
    /// `machine_pairs * capacity`.
    pub cluster_capacity: f64,
    /// Cluster throughput range, only when the request asked for one.
    pub cluster_throughput: Option<MinMax<u64>>,
    /// Total shards; a multiple of `machine_pairs` once shards are assigned.
    pub shard_count: u32,
}

impl Candidate {
    /// Wrap a spec, computing its capacity once.
    pub fn from_spec(spec: SpecRecord) -> SizingResult<Self> {
        let capacity = capacity(&spec)?;
        Ok(Self::new(spec, capacity))
    }

    /// Wrap a spec with an already known capacity.
    pub fn new(spec: SpecRecord, capacity: f64) -> Self {
        Self {
            spec,
            capacity,
            machine_pairs: 0,
            cluster_capacity: 0.0,
            cluster_throughput: None,
            shard_count: 0,
        }
    }

    pub fn with_machine_pairs(self, machine_pairs: u32, throughput_requested: bool) -> Self {
        let cluster_throughput = if throughput_requested {
            self.spec.throughput.map(|t| {
                let pairs = u64::from(machine_pairs);
                MinMax::new(t.min.saturating_mul(pairs), t.max.saturating_mul(pairs))
            })
        } else {
            None
        };
        Self {
            machine_pairs,
            cluster_capacity: f64::from(machine_pairs) * self.capacity,
            cluster_throughput,
            ..self
        }
    }

    pub fn with_shard_count(self, shard_count: u32) -> Self {
        Self { shard_count, ..self }
    }

    /// Shards placed on each machine group.
    pub fn per_machine_shards(&self) -> u32 {
        if self.machine_pairs == 0 {
            0
        } else {
            self.shard_count / self.machine_pairs
        }
    }

    pub fn spec_id(&self) -> SpecId {
        self.spec.spec_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specplan_core::{ClusterFamily, DiskType, StorageMount};

    fn make_spec(data1: u64, qps: Option<(u64, u64)>) -> SpecRecord {
        SpecRecord {
            spec_id: 11,
            spec_name: "remote-250".to_string(),
            cluster_family: ClusterFamily::TenDbCluster,
            machine_role: "remote".to_string(),
            cpu: None,
            mem: None,
            device_class: vec![],
            storage: vec![StorageMount {
                mount_point: "data1".to_string(),
                size: data1,
                disk_type: DiskType::Ssd,
            }],
            throughput: qps.map(|(min, max)| MinMax::new(min, max)),
            instance_num: 0,
            desc: None,
        }
    }

    #[test]
    fn from_spec_computes_capacity() {
        let candidate = Candidate::from_spec(make_spec(250, None)).unwrap();
        assert_eq!(candidate.capacity, 250.0);
        assert_eq!(candidate.machine_pairs, 0);
        assert_eq!(candidate.shard_count, 0);
    }

    #[test]
    fn machine_pairs_derive_cluster_fields() {
        let candidate = Candidate::from_spec(make_spec(250, Some((100, 300))))
            .unwrap()
            .with_machine_pairs(2, true);

        assert_eq!(candidate.cluster_capacity, 500.0);
        assert_eq!(candidate.cluster_throughput, Some(MinMax::new(200, 600)));
    }

    #[test]
    fn throughput_only_when_requested() {
        let candidate = Candidate::from_spec(make_spec(250, Some((100, 300))))
            .unwrap()
            .with_machine_pairs(2, false);
        assert!(candidate.cluster_throughput.is_none());
    }

    #[test]
    fn per_machine_shards_divides_evenly() {
        let candidate = Candidate::from_spec(make_spec(250, None))
            .unwrap()
            .with_machine_pairs(2, false)
            .with_shard_count(6);
        assert_eq!(candidate.per_machine_shards(), 3);
        assert_eq!(candidate.spec_id(), 11);
    }
}

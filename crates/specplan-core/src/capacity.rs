//! Capacity model: usable GB per machine, by cluster family.
//!
//! Storage engines lay out volumes differently, so the usable figure is
//! not always the raw disk total:
//! - **tendbcluster**: the `data1` mount, else half of `/data` (shared data/log volume)
//! - **SSD / proxy-fronted KV**: the `/data1` mount, else half of `/data`
//! - **in-memory KV**: the memory minimum (min and max are expected equal)
//! - everything else: sum of all mounts

use crate::error::{SizingError, SizingResult};
use crate::types::{ClusterFamily, SpecRecord};

/// Compute the usable capacity of one machine of `spec`.
///
/// Fails with [`SizingError::MalformedSpec`] when the fields the family
/// depends on are missing, or when the result is not a positive number.
pub fn capacity(spec: &SpecRecord) -> SizingResult<f64> {
    let value = match spec.cluster_family {
        // The relational family keys on "data1" without a leading slash.
        ClusterFamily::TenDbCluster => data_or_half(spec, "data1")?,
        ClusterFamily::TendisSsd | ClusterFamily::TendisPlus => data_or_half(spec, "/data1")?,
        ClusterFamily::TendisCache => match &spec.mem {
            Some(mem) => mem.min,
            None => return Err(SizingError::malformed(spec.spec_id, "memory range is missing")),
        },
        _ => {
            if spec.storage.is_empty() {
                return Err(SizingError::malformed(spec.spec_id, "no storage mounts"));
            }
            spec.storage.iter().map(|m| m.size as f64).sum()
        }
    };

    if !value.is_finite() || value <= 0.0 {
        return Err(SizingError::malformed(
            spec.spec_id,
            format!("capacity must be positive, got {value}"),
        ));
    }
    Ok(value)
}

/// Size of `primary` when present and non-zero, otherwise half of `/data`.
fn data_or_half(spec: &SpecRecord, primary: &str) -> SizingResult<f64> {
    if let Some(size) = spec.mount_size(primary).filter(|&s| s > 0) {
        return Ok(size as f64);
    }
    spec.mount_size("/data")
        .map(|size| size as f64 / 2.0)
        .ok_or_else(|| {
            SizingError::malformed(spec.spec_id, format!("neither {primary} nor /data is mounted"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiskType, MinMax, StorageMount};

    fn make_spec(family: ClusterFamily, mounts: &[(&str, u64)]) -> SpecRecord {
        SpecRecord {
            spec_id: 1,
            spec_name: "s".to_string(),
            cluster_family: family,
            machine_role: "role".to_string(),
            cpu: None,
            mem: Some(MinMax::new(16.0, 16.0)),
            device_class: vec![],
            storage: mounts
                .iter()
                .map(|(mp, size)| StorageMount {
                    mount_point: mp.to_string(),
                    size: *size,
                    disk_type: DiskType::All,
                })
                .collect(),
            throughput: None,
            instance_num: 0,
            desc: None,
        }
    }

    #[test]
    fn relational_prefers_data1() {
        let spec = make_spec(ClusterFamily::TenDbCluster, &[("/data", 100), ("data1", 250)]);
        assert_eq!(capacity(&spec).unwrap(), 250.0);
    }

    #[test]
    fn relational_halves_shared_volume() {
        let spec = make_spec(ClusterFamily::TenDbCluster, &[("/data", 301)]);
        assert_eq!(capacity(&spec).unwrap(), 150.5);
    }

    #[test]
    fn relational_ignores_slashed_data1() {
        let spec = make_spec(ClusterFamily::TenDbCluster, &[("/data", 200), ("/data1", 900)]);
        assert_eq!(capacity(&spec).unwrap(), 100.0);
    }

    #[test]
    fn kv_families_use_slashed_data1() {
        for family in [ClusterFamily::TendisSsd, ClusterFamily::TendisPlus] {
            let spec = make_spec(family, &[("/data", 100), ("/data1", 400)]);
            assert_eq!(capacity(&spec).unwrap(), 400.0);

            let spec = make_spec(family, &[("/data", 100)]);
            assert_eq!(capacity(&spec).unwrap(), 50.0);
        }
    }

    #[test]
    fn cache_uses_memory_min() {
        let spec = make_spec(ClusterFamily::TendisCache, &[]);
        assert_eq!(capacity(&spec).unwrap(), 16.0);

        let mut no_mem = spec.clone();
        no_mem.mem = None;
        assert!(matches!(capacity(&no_mem), Err(SizingError::MalformedSpec { .. })));
    }

    #[test]
    fn default_sums_mounts() {
        let spec = make_spec(ClusterFamily::Es, &[("/data", 100), ("/data1", 50), ("/data2", 25)]);
        assert_eq!(capacity(&spec).unwrap(), 175.0);
    }

    #[test]
    fn missing_data_mount_is_malformed() {
        let spec = make_spec(ClusterFamily::TendisSsd, &[("/backup", 100)]);
        let err = capacity(&spec).unwrap_err();
        assert!(err.to_string().contains("/data1"));

        let empty = make_spec(ClusterFamily::Kafka, &[]);
        assert!(capacity(&empty).is_err());
    }

    #[test]
    fn zero_capacity_is_malformed() {
        let spec = make_spec(ClusterFamily::TenDbCluster, &[("/data", 0)]);
        assert!(matches!(capacity(&spec), Err(SizingError::MalformedSpec { .. })));
    }
}

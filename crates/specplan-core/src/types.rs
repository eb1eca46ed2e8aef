//! Domain types for specification matching.
//!
//! A [`SpecRecord`] describes one allocatable hardware shape as stored in
//! the catalog. A [`SizingRequest`] describes the cluster a caller wants to
//! build. Both are plain serde values; the engine never mutates a record.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{SizingError, SizingResult};

/// Catalog identifier of a specification.
pub type SpecId = u32;

/// Machine role within a cluster ("spider", "remote", "tendisplus", ...).
pub type MachineRole = String;

// ── Cluster family ─────────────────────────────────────────────────

/// Database/storage engine category that selects the sizing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClusterFamily {
    /// Sharded relational cluster (spider + remote storage nodes).
    #[serde(rename = "tendbcluster")]
    TenDbCluster,
    /// SSD-backed key-value instances behind twemproxy.
    #[serde(rename = "TwemproxyTendisSSDInstance")]
    TendisSsd,
    /// Proxy-fronted key-value cluster behind predixy.
    #[serde(rename = "PredixyTendisplusCluster")]
    TendisPlus,
    /// Pure in-memory key-value instances behind twemproxy.
    #[serde(rename = "TwemproxyRedisInstance")]
    TendisCache,
    #[serde(rename = "tendbha")]
    TenDbHa,
    #[serde(rename = "tendbsingle")]
    TenDbSingle,
    #[serde(rename = "es")]
    Es,
    #[serde(rename = "kafka")]
    Kafka,
    #[serde(rename = "hdfs")]
    Hdfs,
    #[serde(rename = "pulsar")]
    Pulsar,
    #[serde(rename = "influxdb")]
    Influxdb,
}

impl ClusterFamily {
    /// Wire name, as stored in the catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TenDbCluster => "tendbcluster",
            Self::TendisSsd => "TwemproxyTendisSSDInstance",
            Self::TendisPlus => "PredixyTendisplusCluster",
            Self::TendisCache => "TwemproxyRedisInstance",
            Self::TenDbHa => "tendbha",
            Self::TenDbSingle => "tendbsingle",
            Self::Es => "es",
            Self::Kafka => "kafka",
            Self::Hdfs => "hdfs",
            Self::Pulsar => "pulsar",
            Self::Influxdb => "influxdb",
        }
    }
}

impl fmt::Display for ClusterFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Specification record ───────────────────────────────────────────

/// Inclusive `{min, max}` pair used for cpu, memory, and throughput.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> MinMax<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Two ranges intersect unless one lies entirely past the other.
    pub fn intersects(&self, other: &Self) -> bool {
        !(other.max < self.min || other.min > self.max)
    }
}

/// Disk medium requested for a mount. `ALL` accepts any medium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DiskType {
    All,
    Ssd,
    Hdd,
    Other(String),
}

impl From<String> for DiskType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ALL" => Self::All,
            "SSD" => Self::Ssd,
            "HDD" => Self::Hdd,
            _ => Self::Other(s),
        }
    }
}

impl From<DiskType> for String {
    fn from(t: DiskType) -> Self {
        match t {
            DiskType::All => "ALL".to_string(),
            DiskType::Ssd => "SSD".to_string(),
            DiskType::Hdd => "HDD".to_string(),
            DiskType::Other(s) => s,
        }
    }
}

/// One storage mount of a specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageMount {
    pub mount_point: String,
    /// Size in GB.
    pub size: u64,
    #[serde(rename = "type")]
    pub disk_type: DiskType,
}

/// An allocatable hardware shape, read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecRecord {
    pub spec_id: SpecId,
    pub spec_name: String,
    pub cluster_family: ClusterFamily,
    pub machine_role: MachineRole,
    #[serde(default)]
    pub cpu: Option<MinMax<u32>>,
    /// Memory in GB.
    #[serde(default)]
    pub mem: Option<MinMax<f64>>,
    /// Accepted machine models.
    #[serde(default)]
    pub device_class: Vec<String>,
    #[serde(default, alias = "storage_spec")]
    pub storage: Vec<StorageMount>,
    /// Per-machine throughput (qps).
    #[serde(default, alias = "qps")]
    pub throughput: Option<MinMax<u64>>,
    /// Fixed instance count, only meaningful for `es`.
    #[serde(default)]
    pub instance_num: u32,
    #[serde(default)]
    pub desc: Option<String>,
}

/// Display-oriented projection of a [`SpecRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecSummary {
    pub id: SpecId,
    pub name: String,
    pub cpu: Option<MinMax<u32>>,
    pub mem: Option<MinMax<f64>>,
    pub throughput: Option<MinMax<u64>>,
    pub device_class: Vec<String>,
    pub storage: Vec<StorageMount>,
}

impl SpecRecord {
    /// Size of the mount at exactly `mount_point`, if present.
    pub fn mount_size(&self, mount_point: &str) -> Option<u64> {
        self.storage
            .iter()
            .find(|m| m.mount_point == mount_point)
            .map(|m| m.size)
    }

    /// Smallest mount size, or 0 when there are no mounts.
    pub fn min_mount_size(&self) -> u64 {
        self.storage.iter().map(|m| m.size).min().unwrap_or(0)
    }

    /// Compare smallest mount sizes. With `at_least`, true when this record's
    /// smallest mount is >= the other's; otherwise true when it is <=.
    pub fn compare_storage(&self, other: &SpecRecord, at_least: bool) -> bool {
        let ours = self.min_mount_size();
        let theirs = other.min_mount_size();
        if at_least { ours >= theirs } else { ours <= theirs }
    }

    pub fn summary(&self) -> SpecSummary {
        SpecSummary {
            id: self.spec_id,
            name: self.spec_name.clone(),
            cpu: self.cpu,
            mem: self.mem,
            throughput: self.throughput,
            device_class: self.device_class.clone(),
            storage: self.storage.clone(),
        }
    }

    /// Catalog label in the form `[id]family-role-name`.
    pub fn label(&self) -> String {
        format!(
            "[{}]{}-{}-{}",
            self.spec_id, self.cluster_family, self.machine_role, self.spec_name
        )
    }
}

// ── Sizing request ─────────────────────────────────────────────────

/// What the caller wants to build. Capacities are in GB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingRequest {
    pub current_capacity: f64,
    pub future_capacity: f64,
    pub cluster_family: ClusterFamily,
    pub machine_role: MachineRole,
    #[serde(default)]
    pub throughput: Option<MinMax<u64>>,
    /// Keep only candidates with exactly this many shards. A `0` on the
    /// wire means no filter and deserializes to `None`.
    #[serde(default, deserialize_with = "zero_as_none")]
    pub shard_count: Option<NonZeroU32>,
}

impl SizingRequest {
    pub fn new(
        cluster_family: ClusterFamily,
        machine_role: impl Into<MachineRole>,
        current_capacity: f64,
        future_capacity: f64,
    ) -> Self {
        Self {
            current_capacity,
            future_capacity,
            cluster_family,
            machine_role: machine_role.into(),
            throughput: None,
            shard_count: None,
        }
    }

    pub fn with_throughput(mut self, min: u64, max: u64) -> Self {
        self.throughput = Some(MinMax::new(min, max));
        self
    }

    /// Fix the shard count. `0` clears the filter.
    pub fn with_shard_count(mut self, shard_count: u32) -> Self {
        self.shard_count = NonZeroU32::new(shard_count);
        self
    }

    /// Anticipated growth: the projected size exceeds the current one.
    pub fn expects_growth(&self) -> bool {
        self.future_capacity > self.current_capacity
    }

    pub fn validate(&self) -> SizingResult<()> {
        if !self.current_capacity.is_finite() || self.current_capacity <= 0.0 {
            return Err(SizingError::InvalidRequest(format!(
                "current capacity must be positive, got {}",
                self.current_capacity
            )));
        }
        if !self.future_capacity.is_finite() || self.future_capacity < 0.0 {
            return Err(SizingError::InvalidRequest(format!(
                "future capacity must be non-negative, got {}",
                self.future_capacity
            )));
        }
        if let Some(range) = &self.throughput
            && range.min > range.max
        {
            return Err(SizingError::InvalidRequest(format!(
                "throughput range is inverted: {}..{}",
                range.min, range.max
            )));
        }
        Ok(())
    }
}

fn zero_as_none<'de, D>(deserializer: D) -> Result<Option<NonZeroU32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.and_then(NonZeroU32::new))
}

//! System spec seeding.
//!
//! The initial spec document is nested by family then role:
//!
//! ```json
//! { "tendbcluster": { "remote": [ { "spec_name": "2C4G50G", ... } ] } }
//! ```
//!
//! Seeding is idempotent by name: an entry whose name already exists for
//! the same family and role is skipped, so the document can be re-applied
//! on every start.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use specplan_core::{ClusterFamily, MinMax, SpecId, SpecRecord, StorageMount};

use crate::catalog::MemoryCatalog;
use crate::error::{CatalogError, CatalogResult};

/// One spec in the seed document. Family and role come from the nesting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedEntry {
    #[serde(default)]
    pub spec_id: Option<SpecId>,
    pub spec_name: String,
    #[serde(default)]
    pub cpu: Option<MinMax<u32>>,
    #[serde(default)]
    pub mem: Option<MinMax<f64>>,
    #[serde(default)]
    pub device_class: Vec<String>,
    #[serde(default, alias = "storage_spec")]
    pub storage: Vec<StorageMount>,
    #[serde(default, alias = "qps")]
    pub throughput: Option<MinMax<u64>>,
    #[serde(default)]
    pub instance_num: u32,
    #[serde(default)]
    pub desc: Option<String>,
}

/// family → role → entries.
pub type SeedDocument = BTreeMap<ClusterFamily, BTreeMap<String, Vec<SeedEntry>>>;

impl SeedEntry {
    fn into_record(self, spec_id: SpecId, family: ClusterFamily, role: &str) -> SpecRecord {
        SpecRecord {
            spec_id,
            spec_name: self.spec_name,
            cluster_family: family,
            machine_role: role.to_string(),
            cpu: self.cpu,
            mem: self.mem,
            device_class: self.device_class,
            storage: self.storage,
            throughput: self.throughput,
            instance_num: self.instance_num,
            desc: self.desc,
        }
    }
}

impl MemoryCatalog {
    /// Insert records whose name is new for their family and role.
    /// Returns how many were inserted.
    ///
    /// The batch is applied under one write lock: if any id is already taken,
    /// nothing is inserted.
    pub fn seed(&self, records: impl IntoIterator<Item = SpecRecord>) -> CatalogResult<usize> {
        let mut specs = self.write_specs();
        let keyed = records
            .into_iter()
            .map(|r| (name_key(r.cluster_family, &r.machine_role, &r.spec_name), r))
            .collect();
        let fresh = unseen_names(&specs, keyed);
        commit(&mut specs, fresh)
    }

    /// Seed from a parsed document.
    ///
    /// Entries without an id are numbered past every id already stored and
    /// every explicit id in the document, so the two cannot collide. Like
    /// [`seed`](Self::seed), the document lands whole or not at all.
    pub fn seed_document(&self, doc: SeedDocument) -> CatalogResult<usize> {
        let mut specs = self.write_specs();

        let mut keyed = Vec::new();
        for (family, roles) in doc {
            for (role, entries) in roles {
                for entry in entries {
                    let key = name_key(family, &role, &entry.spec_name);
                    keyed.push((key, (family, role.clone(), entry)));
                }
            }
        }
        let fresh = unseen_names(&specs, keyed);

        let mut next_id = fresh
            .iter()
            .filter_map(|(_, _, entry)| entry.spec_id)
            .chain(specs.keys().copied())
            .max()
            .map_or(1, |id| id.saturating_add(1));
        let records = fresh
            .into_iter()
            .map(|(family, role, entry)| {
                let spec_id = entry.spec_id.unwrap_or_else(|| {
                    let id = next_id;
                    next_id = next_id.saturating_add(1);
                    id
                });
                entry.into_record(spec_id, family, &role)
            })
            .collect();

        let inserted = commit(&mut specs, records)?;
        info!(inserted, total = specs.len(), "system specs seeded");
        Ok(inserted)
    }

    pub fn seed_from_json(&self, content: &str) -> CatalogResult<usize> {
        let doc: SeedDocument = serde_json::from_str(content)?;
        self.seed_document(doc)
    }

    pub fn seed_from_file(&self, path: &Path) -> CatalogResult<usize> {
        let content = std::fs::read_to_string(path)?;
        self.seed_from_json(&content)
    }
}

type NameKey = (ClusterFamily, String, String);

fn name_key(family: ClusterFamily, role: &str, name: &str) -> NameKey {
    (family, role.to_string(), name.to_string())
}

/// Keep items whose name is neither stored nor seen earlier in the batch.
fn unseen_names<T>(specs: &BTreeMap<SpecId, SpecRecord>, items: Vec<(NameKey, T)>) -> Vec<T> {
    let mut seen: HashSet<NameKey> = specs
        .values()
        .map(|s| name_key(s.cluster_family, &s.machine_role, &s.spec_name))
        .collect();
    items
        .into_iter()
        .filter_map(|(key, item)| {
            if seen.contains(&key) {
                debug!(family = %key.0, role = %key.1, name = %key.2, "spec already present, skipping");
                return None;
            }
            seen.insert(key);
            Some(item)
        })
        .collect()
}

/// Check every id before the first insert, then store the batch.
fn commit(specs: &mut BTreeMap<SpecId, SpecRecord>, records: Vec<SpecRecord>) -> CatalogResult<usize> {
    let mut batch_ids = HashSet::with_capacity(records.len());
    for record in &records {
        if specs.contains_key(&record.spec_id) || !batch_ids.insert(record.spec_id) {
            return Err(CatalogError::DuplicateSpecId(record.spec_id));
        }
    }

    let inserted = records.len();
    for record in records {
        debug!(spec_id = record.spec_id, name = %record.spec_name, "spec stored");
        specs.insert(record.spec_id, record);
    }
    Ok(inserted)
}

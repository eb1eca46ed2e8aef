//! Catalog query interface and the in-memory catalog.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tracing::debug;

use specplan_core::{ClusterFamily, SpecId, SpecRecord};

use crate::error::{CatalogError, CatalogResult};

/// Source of specification records.
///
/// Calls are synchronous; timeout and retry policy belong to the caller.
pub trait SpecCatalog {
    /// All records for the family and role. No ordering is guaranteed.
    fn query(&self, family: ClusterFamily, role: &str) -> CatalogResult<Vec<SpecRecord>>;
}

impl<C: SpecCatalog + ?Sized> SpecCatalog for &C {
    fn query(&self, family: ClusterFamily, role: &str) -> CatalogResult<Vec<SpecRecord>> {
        (**self).query(family, role)
    }
}

impl<C: SpecCatalog + ?Sized> SpecCatalog for Arc<C> {
    fn query(&self, family: ClusterFamily, role: &str) -> CatalogResult<Vec<SpecRecord>> {
        (**self).query(family, role)
    }
}

/// Thread-safe in-memory catalog keyed by spec id.
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    specs: Arc<RwLock<BTreeMap<SpecId, SpecRecord>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from records. Fails on repeated ids.
    pub fn from_records(records: impl IntoIterator<Item = SpecRecord>) -> CatalogResult<Self> {
        let catalog = Self::new();
        for record in records {
            catalog.insert(record)?;
        }
        Ok(catalog)
    }

    /// Insert a record. Ids are unique within a catalog.
    pub fn insert(&self, record: SpecRecord) -> CatalogResult<()> {
        let mut specs = self.write_specs();
        if specs.contains_key(&record.spec_id) {
            return Err(CatalogError::DuplicateSpecId(record.spec_id));
        }
        debug!(spec_id = record.spec_id, name = %record.spec_name, "spec stored");
        specs.insert(record.spec_id, record);
        Ok(())
    }

    /// Exclusive access for batch writes that must land all at once.
    pub(crate) fn write_specs(&self) -> RwLockWriteGuard<'_, BTreeMap<SpecId, SpecRecord>> {
        self.specs.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, spec_id: SpecId) -> Option<SpecRecord> {
        self.specs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&spec_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.specs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest id greater than every stored id.
    pub fn next_id(&self) -> SpecId {
        self.specs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .next_back()
            .map_or(1, |id| id + 1)
    }

    /// Whether a record named `name` already exists for the family and role.
    pub fn contains_name(&self, family: ClusterFamily, role: &str, name: &str) -> bool {
        self.specs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .any(|s| s.cluster_family == family && s.machine_role == role && s.spec_name == name)
    }

    /// `(id, label)` pairs sorted by id, optionally filtered by family and role.
    pub fn choices(&self, family: Option<ClusterFamily>, role: Option<&str>) -> Vec<(SpecId, String)> {
        self.specs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|s| family.is_none_or(|f| s.cluster_family == f))
            .filter(|s| role.is_none_or(|r| s.machine_role == r))
            .map(|s| (s.spec_id, s.label()))
            .collect()
    }
}

impl SpecCatalog for MemoryCatalog {
    fn query(&self, family: ClusterFamily, role: &str) -> CatalogResult<Vec<SpecRecord>> {
        let specs = self.specs.read().unwrap_or_else(PoisonError::into_inner);
        let matched: Vec<SpecRecord> = specs
            .values()
            .filter(|s| s.cluster_family == family && s.machine_role == role)
            .cloned()
            .collect();
        debug!(%family, role, count = matched.len(), "catalog query");
        Ok(matched)
    }
}

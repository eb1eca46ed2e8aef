//! Planner facade: catalog lookup plus the sizing pipeline.
//!
//! The planner holds no per-request state; one instance can serve
//! concurrent requests as long as its catalog can.

use tracing::{info, warn};

use specplan_catalog::SpecCatalog;
use specplan_core::{PlannerConfig, SizingError, SizingRequest, SizingResult, SpecRecord};

use crate::candidate::Candidate;
use crate::pipeline::run_pipeline;
use crate::strategy::{FamilyStrategy, StrategyRegistry};

/// Plans cluster specs against a catalog.
pub struct SpecPlanner<C> {
    catalog: C,
    config: PlannerConfig,
    registry: StrategyRegistry,
}

impl<C: SpecCatalog> SpecPlanner<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            config: PlannerConfig::default(),
            registry: StrategyRegistry::default(),
        }
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Load the family's specs and return the surviving candidates, ranked.
    ///
    /// An empty catalog yields `Ok(vec![])`. Records whose capacity cannot be
    /// computed are skipped with a warning.
    pub fn plan(&self, req: &SizingRequest) -> SizingResult<Vec<Candidate>> {
        let strategy = self.strategy_for(req)?;
        let records = self.catalog.query(req.cluster_family, &req.machine_role)?;
        Ok(self.run(strategy, req, records))
    }

    /// Same as [`plan`](Self::plan), over records the caller already holds.
    /// The records are assumed to match the request's family and role.
    pub fn plan_records(
        &self,
        req: &SizingRequest,
        records: Vec<SpecRecord>,
    ) -> SizingResult<Vec<Candidate>> {
        let strategy = self.strategy_for(req)?;
        Ok(self.run(strategy, req, records))
    }

    fn strategy_for(&self, req: &SizingRequest) -> SizingResult<FamilyStrategy> {
        req.validate()?;
        self.registry.lookup(req.cluster_family).ok_or_else(|| {
            SizingError::InvalidRequest(format!(
                "no sizing strategy registered for cluster family {}",
                req.cluster_family
            ))
        })
    }

    fn run(
        &self,
        strategy: FamilyStrategy,
        req: &SizingRequest,
        records: Vec<SpecRecord>,
    ) -> Vec<Candidate> {
        info!(
            family = %req.cluster_family,
            role = %req.machine_role,
            current = req.current_capacity,
            future = req.future_capacity,
            specs = records.len(),
            "planning cluster specs"
        );

        let candidates: Vec<Candidate> = records
            .into_iter()
            .filter_map(|spec| match Candidate::from_spec(spec) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!(error = %e, "skipping spec");
                    None
                }
            })
            .collect();

        if candidates.is_empty() {
            info!(family = %req.cluster_family, "no candidate specs");
            return candidates;
        }

        let planned = run_pipeline(strategy, req, candidates, &self.config);
        info!(candidates = planned.len(), "plan complete");
        planned
    }
}

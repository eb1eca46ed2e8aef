//! Planner tunables, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Numeric policy constants used by the family strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// GB one proxy-fronted KV shard should manage.
    pub optimal_manage_unit: f64,
    /// Largest GB a single SSD-backed instance should hold.
    pub single_instance_max: f64,
    /// Suggested GB per in-memory instance.
    pub base_instance_unit: f64,
    /// In-place scale factor for the in-memory family.
    pub scale_multiple: f64,
    /// Floor on machine pairs (and shards) for the proxy-fronted KV family.
    pub min_machine_pairs: u32,
    /// Floor on the in-memory family's cluster shard count.
    pub min_cache_shards: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            optimal_manage_unit: 300.0,
            single_instance_max: 50.0,
            base_instance_unit: 6.0,
            scale_multiple: 4.0,
            min_machine_pairs: 3,
            min_cache_shards: 4,
        }
    }
}

impl PlannerConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: PlannerConfig = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn check(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("optimal_manage_unit", self.optimal_manage_unit),
            ("single_instance_max", self.single_instance_max),
            ("base_instance_unit", self.base_instance_unit),
            ("scale_multiple", self.scale_multiple),
        ] {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!("{name} must be positive, got {value}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = PlannerConfig::from_toml_str("scale_multiple = 8.0\nmin_cache_shards = 6\n").unwrap();
        assert_eq!(config.scale_multiple, 8.0);
        assert_eq!(config.min_cache_shards, 6);
        assert_eq!(config.optimal_manage_unit, 300.0);
    }

    #[test]
    fn rejects_non_positive_unit() {
        assert!(PlannerConfig::from_toml_str("single_instance_max = 0.0").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_instance_unit = 12.0").unwrap();

        let config = PlannerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_instance_unit, 12.0);
    }

    #[test]
    fn toml_roundtrip_keeps_values() {
        let toml_str = PlannerConfig::default().to_toml_string().unwrap();
        assert!(toml_str.contains("optimal_manage_unit = 300.0"));
    }
}

// src/config.rs
//
// Declarative analysis configuration: which columns to read from each
// source, which region-label variants collapse to which canonical token,
// and which population codes denote summary rows. New datasets and new
// label variants are config additions, not code changes.

use crate::error::{Result, StatError};
use crate::region::{Normalizer, DEFAULT_ALIASES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Column map for the facility registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitySource {
    /// Free-text region label column.
    pub region_column: String,
    /// Facility-type label column.
    pub type_column: String,
    /// Numeric staff-count columns, one per role. Columns absent from a
    /// given file contribute zero.
    #[serde(default)]
    pub staff_columns: Vec<String>,
}

/// Column map for the population registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationSource {
    /// Administrative code column.
    pub code_column: String,
    /// Region label column.
    pub region_column: String,
    /// Total-population column (formatted counts tolerated).
    pub population_column: String,
    /// Code substrings that mark province/city-level summary rows; matching
    /// rows are excluded before the join.
    #[serde(default = "default_aggregate_markers")]
    pub aggregate_markers: Vec<String>,
}

fn default_aggregate_markers() -> Vec<String> {
    // nationwide total and province-level codes carry an all-zero tail in
    // the 10-digit administrative code layout
    vec!["00000000".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub facility: FacilitySource,
    pub population: PopulationSource,
    /// Extra alias entries layered over the built-in table.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl AnalysisConfig {
    /// Read and validate a YAML config file.
    pub fn from_yaml_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let cfg: AnalysisConfig = serde_yaml::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Column map for the hospital registry / resident population pair the
    /// analysis was built around.
    pub fn default_hospital() -> Self {
        Self {
            facility: FacilitySource {
                region_column: "시군구명".to_string(),
                type_column: "종별코드명".to_string(),
                staff_columns: vec!["의사수".to_string(), "간호사수".to_string()],
            },
            population: PopulationSource {
                code_column: "행정기관코드".to_string(),
                region_column: "행정기관".to_string(),
                population_column: "총인구수".to_string(),
                aggregate_markers: default_aggregate_markers(),
            },
            aliases: BTreeMap::new(),
        }
    }

    /// Normalizer over the built-in alias table extended by this config.
    pub fn normalizer(&self) -> Result<Normalizer> {
        let mut aliases = DEFAULT_ALIASES.clone();
        aliases.extend(self.aliases.clone());
        Normalizer::new(aliases)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("facility.region_column", &self.facility.region_column),
            ("facility.type_column", &self.facility.type_column),
            ("population.code_column", &self.population.code_column),
            ("population.region_column", &self.population.region_column),
            ("population.population_column", &self.population.population_column),
        ] {
            if value.trim().is_empty() {
                return Err(StatError::Config(format!("{name} must not be empty")));
            }
        }
        // alias targets are validated when the normalizer is built
        self.normalizer()?;
        Ok(())
    }
}

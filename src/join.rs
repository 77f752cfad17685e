// src/join.rs

use crate::aggregate::RegionStats;
use crate::error::{Result, StatError};
use crate::load::PopulationRecord;
use crate::region::{Normalizer, RegionKey};
use std::collections::BTreeMap;
use tracing::debug;

/// One region after the outer join. A side a region is missing from stays
/// `None`; zero would corrupt the rate math downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRegion {
    pub key: RegionKey,
    pub facility: Option<RegionStats>,
    pub population: Option<u64>,
}

/// Join result: rows in key order, plus population rows whose label failed
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub rows: Vec<JoinedRegion>,
    pub unresolved_population: u64,
}

/// Full outer join of facility aggregates with population figures on the
/// normalized key. Every key from either side appears exactly once.
///
/// The population side must be unique per key; a collision means downstream
/// rates would be ambiguous, so it aborts the run with `DuplicateKey`.
pub fn outer_join(
    stats: BTreeMap<RegionKey, RegionStats>,
    population: &[PopulationRecord],
    normalizer: &Normalizer,
) -> Result<JoinOutcome> {
    let mut population_by_key: BTreeMap<RegionKey, u64> = BTreeMap::new();
    let mut unresolved_population = 0;

    for record in population {
        let key = match normalizer.normalize(&record.region_label) {
            Ok(key) => key,
            Err(err) => {
                debug!(label = %record.region_label, %err, "dropping unresolvable population row");
                unresolved_population += 1;
                continue;
            }
        };
        if population_by_key.insert(key.clone(), record.population).is_some() {
            return Err(StatError::DuplicateKey {
                key: key.to_string(),
            });
        }
    }

    let mut rows: BTreeMap<RegionKey, JoinedRegion> = BTreeMap::new();
    for (key, facility) in stats {
        rows.insert(
            key.clone(),
            JoinedRegion {
                key,
                facility: Some(facility),
                population: None,
            },
        );
    }
    for (key, population) in population_by_key {
        rows.entry(key.clone())
            .or_insert_with(|| JoinedRegion {
                key,
                facility: None,
                population: None,
            })
            .population = Some(population);
    }

    Ok(JoinOutcome {
        rows: rows.into_values().collect(),
        unresolved_population,
    })
}

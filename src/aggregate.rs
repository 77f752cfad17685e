// src/aggregate.rs

use crate::load::FacilityRecord;
use crate::region::{Normalizer, RegionKey};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Facility-side aggregates for one region key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegionStats {
    pub facility_count: u64,
    pub staff_total: u64,
}

/// Aggregation result: per-key stats in key order, plus the number of rows
/// whose region label could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub stats: BTreeMap<RegionKey, RegionStats>,
    pub unresolved: u64,
}

/// Fold facility records into per-region stats. Rows whose label fails
/// normalization are excluded and counted, never silently lost.
pub fn aggregate_facilities(records: &[FacilityRecord], normalizer: &Normalizer) -> Aggregation {
    let mut stats: BTreeMap<RegionKey, RegionStats> = BTreeMap::new();
    let mut unresolved = 0;

    for record in records {
        let key = match normalizer.normalize(&record.region_label) {
            Ok(key) => key,
            Err(err) => {
                debug!(label = %record.region_label, %err, "dropping unresolvable facility row");
                unresolved += 1;
                continue;
            }
        };
        let entry = stats.entry(key).or_default();
        entry.facility_count += 1;
        entry.staff_total += record.staff_counts.values().sum::<u64>();
    }

    Aggregation { stats, unresolved }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn record(label: &str, doctors: u64, nurses: u64) -> FacilityRecord {
        FacilityRecord {
            region_label: label.to_string(),
            facility_type: "hospital".to_string(),
            staff_counts: Map::from([
                ("doctors".to_string(), doctors),
                ("nurses".to_string(), nurses),
            ]),
        }
    }

    #[test]
    fn counts_match_input_multiplicity_per_key() {
        let normalizer = Normalizer::with_defaults();
        let records = vec![
            record("Jeonju Deokjin-gu", 2, 5),
            record(" Jeonju  Deokjin-gu ", 1, 0),
            record("Gunsan", 4, 4),
        ];
        let agg = aggregate_facilities(&records, &normalizer);
        assert_eq!(agg.unresolved, 0);
        assert_eq!(agg.stats.len(), 2);

        let deokjin = agg.stats[&normalizer.normalize("Jeonju Deokjin-gu").unwrap()];
        assert_eq!(deokjin.facility_count, 2);
        assert_eq!(deokjin.staff_total, 8);

        let gunsan = agg.stats[&normalizer.normalize("Gunsan").unwrap()];
        assert_eq!(gunsan.facility_count, 1);
        assert_eq!(gunsan.staff_total, 8);
    }

    #[test]
    fn unresolvable_rows_are_counted_not_lost() {
        let normalizer = Normalizer::with_defaults();
        let records = vec![record("", 1, 1), record("4511000000", 0, 0), record("Gunsan", 1, 1)];
        let agg = aggregate_facilities(&records, &normalizer);
        assert_eq!(agg.unresolved, 2);
        assert_eq!(agg.stats.len(), 1);
    }

    #[test]
    fn aliased_variants_aggregate_together() {
        let normalizer = Normalizer::with_defaults();
        let records = vec![record("전주시 덕진구", 1, 0), record("전주덕진구", 1, 0)];
        let agg = aggregate_facilities(&records, &normalizer);
        assert_eq!(agg.stats.len(), 1);
        assert_eq!(
            agg.stats[&normalizer.normalize("전주덕진구").unwrap()].facility_count,
            2
        );
    }
}

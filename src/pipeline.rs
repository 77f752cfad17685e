// src/pipeline.rs
//
// End-to-end wiring of one analysis pass: extract records, aggregate the
// facility side, outer-join with population, derive rates. Each stage
// consumes the previous stage's immutable output.

use crate::aggregate;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::join;
use crate::load::{self, Table};
use crate::report::{AnalysisReport, Diagnostics};
use tracing::info;

#[tracing::instrument(level = "info", skip_all)]
pub fn run(facility: &Table, population: &Table, cfg: &AnalysisConfig) -> Result<AnalysisReport> {
    let normalizer = cfg.normalizer()?;

    let facility_records = load::facility_records(facility, &cfg.facility)?;
    let population_load = load::population_records(population, &cfg.population)?;

    let aggregation = aggregate::aggregate_facilities(&facility_records, &normalizer);
    let joined = join::outer_join(aggregation.stats, &population_load.records, &normalizer)?;

    let diagnostics = Diagnostics {
        facility_rows: facility_records.len() as u64,
        population_rows: population_load.records.len() as u64,
        unresolved_regions: aggregation.unresolved + joined.unresolved_population,
        summary_rows_excluded: population_load.summary_rows_excluded,
        unparsed_population_rows: population_load.unparsed_rows,
    };
    info!(
        regions = joined.rows.len(),
        unresolved = diagnostics.unresolved_regions,
        "analysis complete"
    );

    Ok(AnalysisReport::from_join(joined.rows, diagnostics))
}

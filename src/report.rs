// src/report.rs
//
// Final table assembly and the two output artifacts the presentation layer
// consumes: the joined/derived region table (CSV) and the run summary
// (JSON).

use crate::error::Result;
use crate::join::JoinedRegion;
use crate::rate;
use chrono::Utc;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One output row. Absent values serialize as empty CSV cells / JSON null,
/// never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    pub region_key: String,
    pub facility_count: Option<u64>,
    pub staff_total: Option<u64>,
    pub population: Option<u64>,
    pub hospitals_per_100k: Option<f64>,
    pub staff_per_100k: Option<f64>,
}

/// Per-run diagnostic counters surfaced alongside the table; the
/// presentation layer shows "N regions unresolved" without failing the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub facility_rows: u64,
    pub population_rows: u64,
    pub unresolved_regions: u64,
    pub summary_rows_excluded: u64,
    pub unparsed_population_rows: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub rows: Vec<RegionReport>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    generated_at: String,
    region_count: usize,
    diagnostics: &'a Diagnostics,
}

impl AnalysisReport {
    /// Flatten joined rows into output rows, deriving the rates.
    pub fn from_join(joined: Vec<JoinedRegion>, diagnostics: Diagnostics) -> AnalysisReport {
        let rows = joined
            .iter()
            .map(|region| {
                let rates = rate::derive(region);
                RegionReport {
                    region_key: region.key.to_string(),
                    facility_count: region.facility.map(|s| s.facility_count),
                    staff_total: region.facility.map(|s| s.staff_total),
                    population: region.population,
                    hospitals_per_100k: rates.hospitals_per_100k.as_option(),
                    staff_per_100k: rates.staff_per_100k.as_option(),
                }
            })
            .collect();
        AnalysisReport { rows, diagnostics }
    }

    /// Write the region table for the presentation layer.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!(path = %path.display(), rows = self.rows.len(), "wrote region table");
        Ok(())
    }

    /// Write the run summary: counts, diagnostics, generation timestamp.
    pub fn write_summary_json(&self, path: &Path) -> Result<()> {
        let summary = RunSummary {
            generated_at: Utc::now().to_rfc3339(),
            region_count: self.rows.len(),
            diagnostics: &self.diagnostics,
        };
        let mut file = File::create(path)?;
        serde_json::to_writer_pretty(&mut file, &summary)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        file.write_all(b"\n")?;
        info!(path = %path.display(), "wrote run summary");
        Ok(())
    }
}

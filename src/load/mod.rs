// src/load/mod.rs
//
// Loading delimited sources into immutable in-memory tables, and extracting
// the typed facility/population records the pipeline runs on.

use crate::config::{FacilitySource, PopulationSource};
use crate::error::{Result, StatError};
use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

pub mod cache;
pub mod coerce;

pub use cache::SourceCache;

/// One loaded dataset: trimmed header row plus rows of string cells.
/// Immutable once built; pipeline stages derive new structures from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a CSV file. Header whitespace is trimmed so the same column name
    /// resolves regardless of how the file was exported. Ragged rows are a
    /// structural error.
    pub fn from_csv_path(path: &Path) -> Result<Table> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }
        debug!(path = %path.display(), rows = rows.len(), "loaded table");
        Ok(Table { headers, rows })
    }

    /// Build a table from already-parsed rows (filter results, tests).
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Table {
        Table { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Column index, or a fatal `MissingField` naming the source.
    pub fn require_column(&self, name: &str, source: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| StatError::MissingField {
            column: name.to_string(),
            source_name: source.to_string(),
        })
    }

    pub fn cell<'a>(&'a self, row: &'a [String], col: usize) -> &'a str {
        row.get(col).map(String::as_str).unwrap_or("")
    }
}

/// One facility registry row.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRecord {
    pub region_label: String,
    pub facility_type: String,
    /// Role name → headcount, for the staff columns present in the file.
    pub staff_counts: BTreeMap<String, u64>,
}

/// One population registry row (leaf districts only; summary rows are
/// excluded at load).
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRecord {
    pub code: String,
    pub region_label: String,
    pub population: u64,
}

/// Extracted population rows plus the load-time diagnostic counts.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationLoad {
    pub records: Vec<PopulationRecord>,
    pub summary_rows_excluded: u64,
    pub unparsed_rows: u64,
}

/// Extract facility records per the source column map.
///
/// The region and type columns are required; a configured staff column
/// missing from the file is warned once and contributes zero, per the
/// field-level recovery policy.
pub fn facility_records(table: &Table, cfg: &FacilitySource) -> Result<Vec<FacilityRecord>> {
    let region_idx = table.require_column(&cfg.region_column, "facility")?;
    let type_idx = table.require_column(&cfg.type_column, "facility")?;

    let mut staff_idx: Vec<(String, usize)> = Vec::with_capacity(cfg.staff_columns.len());
    for column in &cfg.staff_columns {
        match table.column_index(column) {
            Some(idx) => staff_idx.push((column.clone(), idx)),
            None => warn!(column = %column, "staff column missing from facility source, counting as zero"),
        }
    }

    let records = table
        .rows()
        .iter()
        .map(|row| {
            let staff_counts = staff_idx
                .iter()
                .map(|(name, idx)| {
                    let count = coerce::parse_count(table.cell(row, *idx)).unwrap_or(0);
                    (name.clone(), count)
                })
                .collect();
            FacilityRecord {
                region_label: table.cell(row, region_idx).to_string(),
                facility_type: coerce::clean_cell(table.cell(row, type_idx)).to_string(),
                staff_counts,
            }
        })
        .collect();
    Ok(records)
}

/// Extract population records per the source column map.
///
/// Rows whose code matches an aggregate marker are province/city summary
/// rows, not leaf districts; they are excluded and counted. Rows whose
/// population cell cannot be coerced are skipped and counted.
pub fn population_records(table: &Table, cfg: &PopulationSource) -> Result<PopulationLoad> {
    let code_idx = table.require_column(&cfg.code_column, "population")?;
    let region_idx = table.require_column(&cfg.region_column, "population")?;
    let pop_idx = table.require_column(&cfg.population_column, "population")?;

    let mut records = Vec::with_capacity(table.len());
    let mut summary_rows_excluded = 0;
    let mut unparsed_rows = 0;

    for row in table.rows() {
        let code = coerce::clean_cell(table.cell(row, code_idx)).to_string();
        if cfg.aggregate_markers.iter().any(|m| code.contains(m)) {
            debug!(code = %code, "excluding summary row");
            summary_rows_excluded += 1;
            continue;
        }
        let raw_population = table.cell(row, pop_idx);
        let population = match coerce::parse_count(raw_population) {
            Some(p) => p,
            None => {
                warn!(code = %code, value = %raw_population, "unparseable population, skipping row");
                unparsed_rows += 1;
                continue;
            }
        };
        records.push(PopulationRecord {
            code,
            region_label: table.cell(row, region_idx).to_string(),
            population,
        });
    }

    Ok(PopulationLoad {
        records,
        summary_rows_excluded,
        unparsed_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn headers_are_trimmed() -> Result<()> {
        let file = write_csv(" a , b \n1,2\n")?;
        let table = Table::from_csv_path(file.path())?;
        assert_eq!(table.headers(), ["a", "b"]);
        assert_eq!(table.len(), 1);
        Ok(())
    }

    #[test]
    fn missing_required_column_is_fatal() -> Result<()> {
        let file = write_csv("district,kind\nJeonju,clinic\n")?;
        let table = Table::from_csv_path(file.path())?;
        let cfg = FacilitySource {
            region_column: "region".to_string(),
            type_column: "kind".to_string(),
            staff_columns: vec![],
        };
        match facility_records(&table, &cfg) {
            Err(StatError::MissingField { column, source_name }) => {
                assert_eq!(column, "region");
                assert_eq!(source_name, "facility");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn missing_staff_column_counts_as_zero() -> Result<()> {
        let file = write_csv("district,kind,doctors\nJeonju,hospital,3\n")?;
        let table = Table::from_csv_path(file.path())?;
        let cfg = FacilitySource {
            region_column: "district".to_string(),
            type_column: "kind".to_string(),
            staff_columns: vec!["doctors".to_string(), "nurses".to_string()],
        };
        let records = facility_records(&table, &cfg)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].staff_counts.get("doctors"), Some(&3));
        assert_eq!(records[0].staff_counts.get("nurses"), None);
        assert_eq!(records[0].staff_counts.values().sum::<u64>(), 3);
        Ok(())
    }

    #[test]
    fn population_summary_rows_are_excluded_and_counted() -> Result<()> {
        let file = write_csv(
            "code,district,residents\n\
             4500000000,Jeonbuk,\"1,754,757\"\n\
             4511300000,Jeonju Deokjin-gu,\"250,000\"\n\
             4511100000,Jeonju Wansan-gu,garbage\n",
        )?;
        let table = Table::from_csv_path(file.path())?;
        let mut cfg = AnalysisConfig::default_hospital().population;
        cfg.code_column = "code".to_string();
        cfg.region_column = "district".to_string();
        cfg.population_column = "residents".to_string();

        let load = population_records(&table, &cfg)?;
        assert_eq!(load.summary_rows_excluded, 1);
        assert_eq!(load.unparsed_rows, 1);
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.records[0].region_label, "Jeonju Deokjin-gu");
        assert_eq!(load.records[0].population, 250_000);
        Ok(())
    }

    #[test]
    fn ragged_row_is_a_structural_error() -> Result<()> {
        let file = write_csv("a,b\n1,2\n3\n")?;
        assert!(matches!(
            Table::from_csv_path(file.path()),
            Err(StatError::Csv(_))
        ));
        Ok(())
    }
}

// src/explore.rs
//
// Generic dataset exploration: the filter and summary primitives the
// interactive dashboards apply to a loaded table before charting. All pure;
// filters return a new table.

use crate::error::Result;
use crate::load::{coerce, Table};
use serde::Serialize;

/// One user-selected filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Cell equals any of `values` (multiselect).
    IsIn { column: String, values: Vec<String> },
    /// Numeric cell within `[min, max]`; non-numeric cells are excluded.
    Range { column: String, min: f64, max: f64 },
    /// Case-insensitive substring match; empty cells are excluded.
    Contains { column: String, needle: String },
}

impl Predicate {
    fn column(&self) -> &str {
        match self {
            Predicate::IsIn { column, .. }
            | Predicate::Range { column, .. }
            | Predicate::Contains { column, .. } => column,
        }
    }

    fn matches(&self, cell: &str) -> bool {
        match self {
            Predicate::IsIn { values, .. } => {
                let cell = coerce::clean_cell(cell);
                values.iter().any(|v| v == cell)
            }
            Predicate::Range { min, max, .. } => match coerce::parse_f64(cell) {
                Some(v) => *min <= v && v <= *max,
                None => false,
            },
            Predicate::Contains { needle, .. } => cell
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}

/// Apply every predicate (conjunction), returning the surviving rows as a
/// new table. A predicate naming an unknown column is a `MissingField`
/// error.
pub fn filter(table: &Table, predicates: &[Predicate]) -> Result<Table> {
    let indexed: Vec<(usize, &Predicate)> = predicates
        .iter()
        .map(|p| Ok((table.require_column(p.column(), "exploration")?, p)))
        .collect::<Result<_>>()?;

    let rows = table
        .rows()
        .iter()
        .filter(|row| {
            indexed
                .iter()
                .all(|(idx, p)| p.matches(table.cell(row, *idx)))
        })
        .cloned()
        .collect();
    Ok(Table::from_rows(table.headers().to_vec(), rows))
}

/// Summary metrics for one numeric column. With no numeric cells, `count`
/// is 0 and `mean`/`min`/`max` are absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: u64,
    pub sum: f64,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub fn numeric_summary(table: &Table, column: &str) -> Result<NumericSummary> {
    let idx = table.require_column(column, "exploration")?;
    let mut count = 0u64;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for row in table.rows() {
        if let Some(v) = coerce::parse_f64(table.cell(row, idx)) {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
    }

    Ok(if count == 0 {
        NumericSummary {
            count: 0,
            sum: 0.0,
            mean: None,
            min: None,
            max: None,
        }
    } else {
        NumericSummary {
            count,
            sum,
            mean: Some(sum / count as f64),
            min: Some(min),
            max: Some(max),
        }
    })
}

/// Per-value frequencies for one column, descending by count, ties broken
/// by label so the ordering is stable across runs.
pub fn value_counts(table: &Table, column: &str) -> Result<Vec<(String, u64)>> {
    let idx = table.require_column(column, "exploration")?;
    let mut counts = std::collections::BTreeMap::<String, u64>::new();
    for row in table.rows() {
        let cell = coerce::clean_cell(table.cell(row, idx));
        if cell.is_empty() {
            continue;
        }
        *counts.entry(cell.to_string()).or_insert(0) += 1;
    }
    let mut out: Vec<(String, u64)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(out)
}

/// The top-`n` prefix for "Top N" style charts.
pub fn top_n(counts: &[(String, u64)], n: usize) -> &[(String, u64)] {
    &counts[..counts.len().min(n)]
}

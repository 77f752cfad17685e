// src/rate.rs

use crate::join::JoinedRegion;

/// A per-100k rate. `Undefined` marks absent-or-zero population and is
/// distinguishable from a computed zero; no NaN or infinity ever escapes
/// this module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Per100k {
    Undefined,
    Value(f64),
}

impl Per100k {
    /// `count / population * 100_000`, or `Undefined` when the denominator
    /// is absent or zero.
    pub fn from_counts(count: u64, population: Option<u64>) -> Per100k {
        match population {
            None | Some(0) => Per100k::Undefined,
            Some(p) => Per100k::Value(count as f64 / p as f64 * 100_000.0),
        }
    }

    pub fn as_option(self) -> Option<f64> {
        match self {
            Per100k::Undefined => None,
            Per100k::Value(v) => Some(v),
        }
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, Per100k::Undefined)
    }
}

/// Derived rates for one joined region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRates {
    pub hospitals_per_100k: Per100k,
    pub staff_per_100k: Per100k,
}

/// Rates for a joined row. A region present only in the population source
/// contributes zero counts, which is a real `Value(0.0)` rate, not
/// `Undefined`.
pub fn derive(joined: &JoinedRegion) -> RegionRates {
    let (facility_count, staff_total) = match &joined.facility {
        Some(stats) => (stats.facility_count, stats.staff_total),
        None => (0, 0),
    };
    RegionRates {
        hospitals_per_100k: Per100k::from_counts(facility_count, joined.population),
        staff_per_100k: Per100k::from_counts(staff_total, joined.population),
    }
}

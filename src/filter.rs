use crate::catalog::ProductRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Eligibility filters, applied in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// units_in_stock >= threshold
    MinStock,
    /// days_of_inventory <= threshold
    MaxInventoryDays,
    /// rating >= threshold
    MinRating,
    /// profit margin >= threshold
    MinProfitMargin,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::MinStock,
        FilterKind::MaxInventoryDays,
        FilterKind::MinRating,
        FilterKind::MinProfitMargin,
    ];

    /// Name used in the `filters` section
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::MinStock => "min_stock",
            FilterKind::MaxInventoryDays => "max_inventory_days",
            FilterKind::MinRating => "min_rating",
            FilterKind::MinProfitMargin => "min_profit_margin",
        }
    }

    pub fn from_name(name: &str) -> Option<FilterKind> {
        FilterKind::ALL.into_iter().find(|k| k.name() == name.trim())
    }

    pub fn passes(self, record: &ProductRecord, threshold: f64) -> bool {
        match self {
            FilterKind::MinStock => record.units_in_stock as f64 >= threshold,
            FilterKind::MaxInventoryDays => record.days_of_inventory as f64 <= threshold,
            FilterKind::MinRating => record.rating >= threshold,
            FilterKind::MinProfitMargin => record.profit_margin() >= threshold,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configured thresholds. A filter with no threshold always passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterThresholds {
    thresholds: BTreeMap<FilterKind, f64>,
}

impl FilterThresholds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: FilterKind, threshold: f64) -> Self {
        self.thresholds.insert(kind, threshold);
        self
    }

    pub fn without(mut self, kind: FilterKind) -> Self {
        self.thresholds.remove(&kind);
        self
    }

    pub fn get(&self, kind: FilterKind) -> Option<f64> {
        self.thresholds.get(&kind).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Configured filters in application order
    pub fn iter(&self) -> impl Iterator<Item = (FilterKind, f64)> + '_ {
        self.thresholds.iter().map(|(kind, threshold)| (*kind, *threshold))
    }

    /// First configured filter the record fails, if any
    pub fn first_failure(&self, record: &ProductRecord) -> Option<FilterKind> {
        self.iter()
            .find(|(kind, threshold)| !kind.passes(record, *threshold))
            .map(|(kind, _)| kind)
    }
}

/// Records that passed every filter, plus how many each filter removed
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub kept: Vec<ProductRecord>,
    /// One entry per configured filter, in application order
    pub removed: Vec<(FilterKind, usize)>,
}

impl FilterOutcome {
    pub fn removed_by(&self, kind: FilterKind) -> usize {
        self.removed
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn removed_total(&self) -> usize {
        self.removed.iter().map(|(_, count)| count).sum()
    }
}

/// Keep only records passing every configured threshold (logical AND).
///
/// A removed record is counted against the first filter it fails, so the
/// per-filter counts add up to the number of records removed.
pub fn apply_filters(records: Vec<ProductRecord>, filters: &FilterThresholds) -> FilterOutcome {
    let mut removed: BTreeMap<FilterKind, usize> =
        filters.iter().map(|(kind, _)| (kind, 0)).collect();
    let total = records.len();

    let kept: Vec<ProductRecord> = records
        .into_iter()
        .filter(|record| match filters.first_failure(record) {
            Some(kind) => {
                debug!(key = %record.key, filter = %kind, "Filtered out");
                *removed.entry(kind).or_insert(0) += 1;
                false
            }
            None => true,
        })
        .collect();

    let outcome = FilterOutcome {
        kept,
        removed: removed.into_iter().collect(),
    };
    info!(
        before = total,
        after = outcome.kept.len(),
        "Applied {} filter(s)",
        outcome.removed.len()
    );
    outcome
}

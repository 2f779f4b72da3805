use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub key: String,            // SKU when present, otherwise the product name
    pub name: String,
    pub brand: Option<String>,
    pub brand_tier: String,     // e.g. "A", "B", "C"
    pub price_usd: f64,
    pub cost_usd: f64,
    pub units_sold: u64,        // Trailing window (last month)
    pub units_in_stock: u64,
    pub days_of_inventory: u64,
    pub views: u64,             // Trailing window (last month)
    pub rating: f64,
    pub review_count: u64,
}

impl ProductRecord {
    /// Profit margin as a fraction of price. Zero when the price is zero.
    pub fn profit_margin(&self) -> f64 {
        if self.price_usd > 0.0 {
            (self.price_usd - self.cost_usd) / self.price_usd
        } else {
            0.0
        }
    }

    /// Name with the brand prepended when known, e.g. "COSRX Snail Essence"
    pub fn display_name(&self) -> String {
        match &self.brand {
            Some(brand) => format!("{} {}", brand, self.name),
            None => self.name.clone(),
        }
    }
}

/// Why a row was excluded by the loader
#[derive(Debug, Clone, PartialEq)]
pub enum RowIssue {
    MissingField(&'static str),
    Malformed { field: &'static str, value: String },
    Negative { field: &'static str, value: String },
    DuplicateKey,
    Unreadable(String),
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::MissingField(field) => write!(f, "missing required field '{}'", field),
            RowIssue::Malformed { field, value } => {
                write!(f, "field '{}' is not a number: '{}'", field, value)
            }
            RowIssue::Negative { field, value } => {
                write!(f, "field '{}' must be non-negative: '{}'", field, value)
            }
            RowIssue::DuplicateKey => write!(f, "duplicate product key (first occurrence kept)"),
            RowIssue::Unreadable(msg) => write!(f, "unreadable row: {}", msg),
        }
    }
}

/// A row the loader excluded, with its 1-based line in the source
#[derive(Debug, Clone, PartialEq)]
pub struct RowWarning {
    pub line: u64,
    pub key: Option<String>,
    pub issue: RowIssue,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "line {} ({}): {}", self.line, key, self.issue),
            None => write!(f, "line {}: {}", self.line, self.issue),
        }
    }
}

/// Output of one loader pass: every clean record plus the rows it rejected
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub records: Vec<ProductRecord>,
    pub warnings: Vec<RowWarning>,
}

impl LoadReport {
    /// Total rows seen, accepted or not
    pub fn rows_seen(&self) -> usize {
        self.records.len() + self.warnings.len()
    }
}

#[cfg(test)]
pub(crate) fn sample_record(key: &str) -> ProductRecord {
    ProductRecord {
        key: key.to_string(),
        name: key.to_string(),
        brand: Some("Brand".to_string()),
        brand_tier: "A".to_string(),
        price_usd: 100.0,
        cost_usd: 40.0,
        units_sold: 100,
        units_in_stock: 50,
        days_of_inventory: 30,
        views: 1000,
        rating: 4.5,
        review_count: 120,
    }
}

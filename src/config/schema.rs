use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default number of products kept in the ranked output
pub const DEFAULT_TOP_N: i64 = 10;

/// The weights document as written on disk.
///
/// Values are kept loosely typed (`Option<f64>`, free-form names) so that
/// `validate_scoring` can report every problem at once instead of failing on
/// the first one during parsing.
///
/// Example YAML:
/// ```yaml
/// scoring_weights:
///   sales_velocity: 0.4
///   profit_margin: 0.3
///   engagement: 0.2
///   brand_tier: 0.1
/// brand_tier_weights: { A: 1.0, B: 0.7, C: 0.3 }
/// filters:
///   min_stock: 10
///   max_inventory_days: 90
/// top_n_products: 10
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Factor name -> weight. A factor listed without a value is an error.
    #[serde(default)]
    pub scoring_weights: BTreeMap<String, Option<f64>>,

    /// Brand tier label -> weight
    #[serde(default)]
    pub brand_tier_weights: BTreeMap<String, Option<f64>>,

    /// Weight for tiers not listed in `brand_tier_weights`.
    /// Defaults to the lowest configured tier weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_tier_weight: Option<f64>,

    /// Filter name -> threshold. Missing or null means the filter is off.
    #[serde(default)]
    pub filters: BTreeMap<String, Option<f64>>,

    /// Default output size (default: 10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n_products: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<PathsConfig>,
}

/// Default input and output files, overridable on the command line
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let weights = |pairs: &[(&str, f64)]| -> BTreeMap<String, Option<f64>> {
            pairs
                .iter()
                .map(|(name, value)| (name.to_string(), Some(*value)))
                .collect()
        };

        Self {
            scoring_weights: weights(&[
                ("sales_velocity", 0.4),
                ("profit_margin", 0.3),
                ("engagement", 0.2),
                ("brand_tier", 0.1),
            ]),
            brand_tier_weights: weights(&[("A", 1.0), ("B", 0.7), ("C", 0.3)]),
            unknown_tier_weight: None,
            filters: weights(&[("min_stock", 10.0), ("max_inventory_days", 90.0)]),
            top_n_products: Some(DEFAULT_TOP_N),
            paths: None,
        }
    }
}

impl Config {
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.paths.as_ref().and_then(|p| p.input.as_ref())
    }

    pub fn output_path(&self) -> Option<&PathBuf> {
        self.paths.as_ref().and_then(|p| p.output.as_ref())
    }
}

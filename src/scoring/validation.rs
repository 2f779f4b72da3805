use super::config::{Factor, ScoringConfig};
use crate::config::{Config, DEFAULT_TOP_N};
use crate::filter::{FilterKind, FilterThresholds};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Every problem found in a weights document
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigErrors(pub Vec<String>);

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scoring config errors:")?;
        for error in &self.0 {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

fn check_value(path: String, value: Option<f64>, errors: &mut Vec<String>) -> Option<f64> {
    match value {
        None => {
            errors.push(format!("{}: missing value", path));
            None
        }
        Some(v) if !v.is_finite() || v < 0.0 => {
            errors.push(format!("{}: must be a non-negative number, got {}", path, v));
            None
        }
        Some(v) => Some(v),
    }
}

pub(crate) fn known_names<T: Copy>(all: &[T], name: fn(T) -> &'static str) -> String {
    all.iter().map(|item| name(*item)).collect::<Vec<_>>().join(", ")
}

/// Validate a weights document and build the immutable `ScoringConfig`.
/// Returns all validation errors at once (not just the first).
///
/// A factor listed in `scoring_weights` without a weight is an error rather
/// than a silent zero, so a run can never start with a referenced factor
/// that has no weight.
pub fn validate_scoring(config: &Config) -> Result<ScoringConfig, Vec<String>> {
    let mut errors = Vec::new();

    // Factor weights
    if config.scoring_weights.is_empty() {
        errors.push("scoring_weights: at least one factor must be weighted".to_string());
    }
    let mut weights = BTreeMap::new();
    let mut seen_factors = BTreeSet::new();
    for (name, weight) in &config.scoring_weights {
        let path = format!("scoring_weights.{}", name);
        let Some(factor) = Factor::from_name(name) else {
            errors.push(format!(
                "{}: unknown factor (expected one of: {})",
                path,
                known_names(&Factor::ALL, Factor::name)
            ));
            continue;
        };
        // Names are trimmed, so "rating" and "rating " collide
        if !seen_factors.insert(factor) {
            errors.push(format!("{}: factor '{}' is listed more than once", path, factor));
            continue;
        }
        if weight.is_none() {
            errors.push(format!("{}: missing weight", path));
            continue;
        }
        if let Some(w) = check_value(path, *weight, &mut errors) {
            weights.insert(factor, w);
        }
    }

    // Brand tiers
    let mut brand_tiers = BTreeMap::new();
    let mut seen_tiers = BTreeSet::new();
    for (tier, weight) in &config.brand_tier_weights {
        if tier.trim().is_empty() {
            errors.push("brand_tier_weights: tier label must not be empty".to_string());
            continue;
        }
        let path = format!("brand_tier_weights.{}", tier);
        let label = tier.trim();
        if !seen_tiers.insert(label) {
            errors.push(format!("{}: tier '{}' is listed more than once", path, label));
            continue;
        }
        if let Some(w) = check_value(path, *weight, &mut errors) {
            brand_tiers.insert(label.to_string(), w);
        }
    }
    if seen_factors.contains(&Factor::BrandTier) && config.brand_tier_weights.is_empty() {
        errors.push(
            "brand_tier_weights: required when scoring_weights.brand_tier is set".to_string(),
        );
    }

    let unknown_tier_weight = match config.unknown_tier_weight {
        Some(_) => check_value(
            "unknown_tier_weight".to_string(),
            config.unknown_tier_weight,
            &mut errors,
        )
        .unwrap_or(0.0),
        // Unknown tiers fall back to the lowest configured tier
        None => brand_tiers.values().copied().reduce(f64::min).unwrap_or(0.0),
    };

    // Filters
    let mut filters = FilterThresholds::new();
    let mut seen_filters = BTreeSet::new();
    for (name, threshold) in &config.filters {
        let path = format!("filters.{}", name);
        let Some(kind) = FilterKind::from_name(name) else {
            errors.push(format!(
                "{}: unknown filter (expected one of: {})",
                path,
                known_names(&FilterKind::ALL, FilterKind::name)
            ));
            continue;
        };
        if !seen_filters.insert(kind) {
            errors.push(format!("{}: filter '{}' is listed more than once", path, kind));
            continue;
        }
        // null leaves the filter unconfigured
        if threshold.is_none() {
            continue;
        }
        if let Some(t) = check_value(path, *threshold, &mut errors) {
            filters = filters.with(kind, t);
        }
    }

    // Output size
    let top_n = config.top_n_products.unwrap_or(DEFAULT_TOP_N);
    if top_n < 1 {
        errors.push(format!("top_n_products: must be at least 1, got {}", top_n));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let scoring = ScoringConfig {
        weights,
        brand_tiers,
        unknown_tier_weight,
        filters,
        default_top_n: top_n as usize,
    };
    debug!(?scoring, "Validated scoring config");
    Ok(scoring)
}

impl ScoringConfig {
    /// Validate `config`, wrapping the errors so they can travel through `anyhow`
    pub fn from_document(config: &Config) -> Result<Self, ConfigErrors> {
        validate_scoring(config).map_err(ConfigErrors)
    }
}

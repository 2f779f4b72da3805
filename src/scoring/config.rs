use crate::filter::FilterThresholds;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A weighted signal the score engine knows how to compute.
///
/// Factors are ordered; the engine always sums contributions in this order so
/// identical inputs produce bit-identical scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// Units sold over the trailing window
    SalesVelocity,
    /// (price - cost) / price
    ProfitMargin,
    /// Product page views over the trailing window
    Engagement,
    Rating,
    ReviewCount,
    /// Weight of the product's brand tier
    BrandTier,
}

impl Factor {
    pub const ALL: [Factor; 6] = [
        Factor::SalesVelocity,
        Factor::ProfitMargin,
        Factor::Engagement,
        Factor::Rating,
        Factor::ReviewCount,
        Factor::BrandTier,
    ];

    /// Name used in the `scoring_weights` section
    pub fn name(self) -> &'static str {
        match self {
            Factor::SalesVelocity => "sales_velocity",
            Factor::ProfitMargin => "profit_margin",
            Factor::Engagement => "engagement",
            Factor::Rating => "rating",
            Factor::ReviewCount => "review_count",
            Factor::BrandTier => "brand_tier",
        }
    }

    /// Human-readable label for breakdowns
    pub fn label(self) -> &'static str {
        match self {
            Factor::SalesVelocity => "Sales velocity",
            Factor::ProfitMargin => "Profit margin",
            Factor::Engagement => "Engagement",
            Factor::Rating => "Rating",
            Factor::ReviewCount => "Review count",
            Factor::BrandTier => "Brand tier",
        }
    }

    pub fn from_name(name: &str) -> Option<Factor> {
        Factor::ALL.into_iter().find(|f| f.name() == name.trim())
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated scoring configuration.
///
/// Only `validate_scoring` builds one, so every weighted factor is known to
/// have a finite, non-negative weight and `default_top_n` is at least 1.
/// Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub(crate) weights: BTreeMap<Factor, f64>,
    pub(crate) brand_tiers: BTreeMap<String, f64>,
    pub(crate) unknown_tier_weight: f64,
    pub(crate) filters: FilterThresholds,
    pub(crate) default_top_n: usize,
}

impl ScoringConfig {
    /// Weighted factors in summation order
    pub fn weights(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        self.weights.iter().map(|(factor, weight)| (*factor, *weight))
    }

    pub fn weight(&self, factor: Factor) -> Option<f64> {
        self.weights.get(&factor).copied()
    }

    pub fn brand_tiers(&self) -> &BTreeMap<String, f64> {
        &self.brand_tiers
    }

    /// Weight of a known tier label, `None` for unknown labels.
    /// Labels match exactly, so "a" is not tier "A".
    pub fn tier_weight(&self, tier: &str) -> Option<f64> {
        self.brand_tiers.get(tier).copied()
    }

    /// Weight used for tiers missing from `brand_tier_weights`
    pub fn unknown_tier_weight(&self) -> f64 {
        self.unknown_tier_weight
    }

    pub fn filters(&self) -> &FilterThresholds {
        &self.filters
    }

    pub fn default_top_n(&self) -> usize {
        self.default_top_n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_names_roundtrip() {
        for factor in Factor::ALL {
            assert_eq!(Factor::from_name(factor.name()), Some(factor));
        }
    }

    #[test]
    fn test_factor_from_unknown_name() {
        assert_eq!(Factor::from_name("popularity"), None);
    }

    #[test]
    fn test_factor_order_is_declaration_order() {
        let mut shuffled = vec![Factor::BrandTier, Factor::SalesVelocity, Factor::Rating];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Factor::SalesVelocity, Factor::Rating, Factor::BrandTier]
        );
    }
}

use super::config::{Factor, ScoringConfig};
use crate::catalog::ProductRecord;
use std::collections::BTreeMap;

/// Normalized value used when a factor cannot discriminate within the batch
pub const NEUTRAL: f64 = 0.5;

/// Raw value of `factor` for `record`, before normalization.
///
/// For `Factor::BrandTier` this is the tier's configured weight; unknown tiers
/// get `ScoringConfig::unknown_tier_weight`.
pub fn raw_value(factor: Factor, record: &ProductRecord, config: &ScoringConfig) -> f64 {
    match factor {
        Factor::SalesVelocity => record.units_sold as f64,
        Factor::ProfitMargin => record.profit_margin(),
        Factor::Engagement => record.views as f64,
        Factor::Rating => record.rating,
        Factor::ReviewCount => record.review_count as f64,
        Factor::BrandTier => config
            .tier_weight(&record.brand_tier)
            .unwrap_or_else(|| config.unknown_tier_weight()),
    }
}

/// Observed min/max of one factor across a batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorRange {
    pub min: f64,
    pub max: f64,
}

impl FactorRange {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |range, v| match range {
            None => Some(FactorRange { min: v, max: v }),
            Some(r) => Some(FactorRange {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    /// Min-max scale `value` onto [0, 1]. A zero-spread range yields `NEUTRAL`.
    pub fn normalize(&self, value: f64) -> f64 {
        let spread = self.max - self.min;
        if spread <= 0.0 || !spread.is_finite() {
            return NEUTRAL;
        }
        let scaled = (value - self.min) / spread;
        if scaled.is_nan() {
            NEUTRAL
        } else {
            scaled.clamp(0.0, 1.0)
        }
    }
}

/// Per-factor ranges of the batch being scored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRanges {
    ranges: BTreeMap<Factor, FactorRange>,
}

impl BatchRanges {
    /// Compute the range of every weighted factor over `records`
    pub fn compute(records: &[ProductRecord], config: &ScoringConfig) -> Self {
        let ranges = config
            .weights()
            .filter_map(|(factor, _)| {
                FactorRange::from_values(records.iter().map(|r| raw_value(factor, r, config)))
                    .map(|range| (factor, range))
            })
            .collect();
        Self { ranges }
    }

    pub fn get(&self, factor: Factor) -> Option<FactorRange> {
        self.ranges.get(&factor).copied()
    }

    pub fn normalize(&self, factor: Factor, value: f64) -> f64 {
        self.get(factor)
            .map(|range| range.normalize(value))
            .unwrap_or(NEUTRAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::sample_record;
    use crate::config::Config;
    use crate::scoring::validate_scoring;

    #[test]
    fn test_range_from_values() {
        let range = FactorRange::from_values([3.0, 1.0, 7.0]).unwrap();
        assert_eq!(range, FactorRange { min: 1.0, max: 7.0 });
    }

    #[test]
    fn test_range_from_no_values() {
        assert!(FactorRange::from_values(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_normalize_min_max() {
        let range = FactorRange { min: 10.0, max: 110.0 };
        assert_eq!(range.normalize(10.0), 0.0);
        assert_eq!(range.normalize(60.0), 0.5);
        assert_eq!(range.normalize(110.0), 1.0);
    }

    #[test]
    fn test_normalize_clamps_outside_range() {
        let range = FactorRange { min: 0.0, max: 10.0 };
        assert_eq!(range.normalize(-5.0), 0.0);
        assert_eq!(range.normalize(50.0), 1.0);
    }

    #[test]
    fn test_zero_spread_is_neutral() {
        let range = FactorRange { min: 500.0, max: 500.0 };
        assert_eq!(range.normalize(500.0), NEUTRAL);

        let zeros = FactorRange { min: 0.0, max: 0.0 };
        assert_eq!(zeros.normalize(0.0), NEUTRAL);
    }

    #[test]
    fn test_raw_values() {
        let config = validate_scoring(&Config::default()).unwrap();
        let record = sample_record("p1");
        assert_eq!(raw_value(Factor::SalesVelocity, &record, &config), 100.0);
        assert_eq!(raw_value(Factor::Engagement, &record, &config), 1000.0);
        assert_eq!(raw_value(Factor::Rating, &record, &config), 4.5);
        assert_eq!(raw_value(Factor::ReviewCount, &record, &config), 120.0);
        assert_eq!(raw_value(Factor::BrandTier, &record, &config), 1.0);
    }

    #[test]
    fn test_unknown_tier_uses_fallback_weight() {
        let config = validate_scoring(&Config::default()).unwrap();
        let mut record = sample_record("p1");
        record.brand_tier = "Z".to_string();
        assert_eq!(raw_value(Factor::BrandTier, &record, &config), 0.3);
    }

    #[test]
    fn test_tier_lookup_is_case_sensitive() {
        let config = validate_scoring(&Config::default()).unwrap();
        let mut record = sample_record("p1");
        record.brand_tier = "a".to_string();
        assert_eq!(config.tier_weight("a"), None);
        assert_eq!(raw_value(Factor::BrandTier, &record, &config), 0.3);
    }

    #[test]
    fn test_batch_ranges_cover_weighted_factors_only() {
        let config = validate_scoring(&Config::default()).unwrap();
        let mut low = sample_record("low");
        low.units_sold = 10;
        let high = sample_record("high");

        let ranges = BatchRanges::compute(&[low, high], &config);
        assert_eq!(
            ranges.get(Factor::SalesVelocity),
            Some(FactorRange { min: 10.0, max: 100.0 })
        );
        assert!(ranges.get(Factor::Rating).is_none());
        assert_eq!(ranges.normalize(Factor::Rating, 4.0), NEUTRAL);
    }
}

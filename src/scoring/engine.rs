use super::config::{Factor, ScoringConfig};
use super::factors::{raw_value, BatchRanges};
use crate::catalog::ProductRecord;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub factor: Factor,
    pub raw: f64,          // Value before normalization
    pub normalized: f64,   // In [0, 1]
    pub weight: f64,
    pub contribution: f64, // normalized * weight
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProduct {
    pub record: ProductRecord,
    pub score: f64,
    pub contributions: Vec<FactorContribution>,
}

impl ScoredProduct {
    pub fn key(&self) -> &str {
        &self.record.key
    }

    pub fn contribution(&self, factor: Factor) -> Option<&FactorContribution> {
        self.contributions.iter().find(|c| c.factor == factor)
    }
}

/// A record whose brand tier is not configured and was scored with the
/// fallback weight
#[derive(Debug, Clone, PartialEq)]
pub struct TierFallback {
    pub key: String,
    pub tier: String,
    pub weight: f64,
}

impl fmt::Display for TierFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: unknown brand tier '{}', using fallback weight {}",
            self.key, self.tier, self.weight
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoreBatch {
    pub scored: Vec<ScoredProduct>,
    pub tier_fallbacks: Vec<TierFallback>,
}

/// Score one record against the ranges of the batch it belongs to.
///
/// composite = sum over weighted factors of (normalized value x weight),
/// summed in `Factor` order. A pure function of its inputs.
pub fn calculate_score(
    record: &ProductRecord,
    ranges: &BatchRanges,
    config: &ScoringConfig,
) -> ScoredProduct {
    let mut score = 0.0;
    let mut contributions = Vec::new();

    for (factor, weight) in config.weights() {
        let raw = raw_value(factor, record, config);
        let normalized = ranges.normalize(factor, raw);
        let contribution = normalized * weight;
        score += contribution;
        contributions.push(FactorContribution {
            factor,
            raw,
            normalized,
            weight,
            contribution,
        });
    }

    ScoredProduct {
        record: record.clone(),
        score,
        contributions,
    }
}

/// Score every record of a filtered batch.
///
/// Normalization is min-max over this batch, so the batch must already be
/// filtered. Records with an unknown brand tier are scored with the fallback
/// weight and reported in `ScoreBatch::tier_fallbacks`.
pub fn score_batch(records: Vec<ProductRecord>, config: &ScoringConfig) -> ScoreBatch {
    let ranges = BatchRanges::compute(&records, config);

    let mut tier_fallbacks = Vec::new();
    if config.weight(Factor::BrandTier).is_some() {
        for record in &records {
            if config.tier_weight(&record.brand_tier).is_none() {
                let fallback = TierFallback {
                    key: record.key.clone(),
                    tier: record.brand_tier.clone(),
                    weight: config.unknown_tier_weight(),
                };
                warn!("{}", fallback);
                tier_fallbacks.push(fallback);
            }
        }
    }

    let scored: Vec<ScoredProduct> = records
        .iter()
        .map(|record| calculate_score(record, &ranges, config))
        .collect();

    info!(scored = scored.len(), fallbacks = tier_fallbacks.len(), "Scored batch");
    ScoreBatch {
        scored,
        tier_fallbacks,
    }
}

use super::ranker::{RankedList, RankedProduct};
use crate::catalog::ProductRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// The last computed output of a run: the ranked list plus every record that
/// was loaded, so detail lookups also work for products that did not rank.
#[derive(Debug, Clone, Default)]
pub struct RankingSnapshot {
    ranked: RankedList,
    catalog: BTreeMap<String, ProductRecord>,
}

/// One product as seen by a detail lookup
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProductView<'a> {
    pub record: &'a ProductRecord,
    /// `None` when the product was filtered out or fell below top-N
    pub ranked: Option<&'a RankedProduct>,
}

impl RankingSnapshot {
    pub fn new(ranked: RankedList, records: Vec<ProductRecord>) -> Self {
        let catalog = records
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();
        Self { ranked, catalog }
    }

    pub fn ranked(&self) -> &RankedList {
        &self.ranked
    }

    /// Number of loaded records, ranked or not
    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    /// First `n` ranked products. `0`, or more than are ranked, returns all.
    pub fn top(&self, n: usize) -> &[RankedProduct] {
        let entries = self.ranked.entries();
        if n == 0 || n >= entries.len() {
            entries
        } else {
            &entries[..n]
        }
    }

    /// Look up a product by key in the full record set
    pub fn get(&self, key: &str) -> Option<ProductView<'_>> {
        let record = self.catalog.get(key.trim())?;
        Some(ProductView {
            record,
            ranked: self.ranked.find(&record.key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::sample_record;
    use crate::ranking::rank_products;
    use crate::scoring::ScoredProduct;

    fn snapshot() -> RankingSnapshot {
        let records: Vec<ProductRecord> = ["a", "b", "c", "hidden"]
            .iter()
            .map(|key| sample_record(key))
            .collect();
        let scored: Vec<ScoredProduct> = records[..3]
            .iter()
            .zip([0.9, 0.5, 0.1])
            .map(|(record, score)| ScoredProduct {
                record: record.clone(),
                score,
                contributions: vec![],
            })
            .collect();
        RankingSnapshot::new(rank_products(scored, Some(2), 10), records)
    }

    #[test]
    fn test_top_n() {
        let snap = snapshot();
        let top = snap.top(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key(), "a");
    }

    #[test]
    fn test_top_more_than_ranked_returns_all() {
        let snap = snapshot();
        assert_eq!(snap.top(100).len(), 2);
        assert_eq!(snap.top(0).len(), 2);
    }

    #[test]
    fn test_get_ranked_product() {
        let snap = snapshot();
        let view = snap.get("b").unwrap();
        assert_eq!(view.record.key, "b");
        assert_eq!(view.ranked.unwrap().rank, 2);
    }

    #[test]
    fn test_get_unranked_product_from_full_record_set() {
        let snap = snapshot();
        let below_cutoff = snap.get("c").unwrap();
        assert!(below_cutoff.ranked.is_none());

        let filtered = snap.get("hidden").unwrap();
        assert!(filtered.ranked.is_none());
        assert_eq!(snap.catalog_len(), 4);
    }

    #[test]
    fn test_get_unknown_key() {
        assert!(snapshot().get("nope").is_none());
    }

    #[test]
    fn test_get_trims_key() {
        assert!(snapshot().get("  a ").is_some());
    }
}

use crate::scoring::ScoredProduct;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedProduct {
    pub rank: usize, // 1-based
    pub scored: ScoredProduct,
}

impl RankedProduct {
    pub fn key(&self) -> &str {
        self.scored.key()
    }

    pub fn score(&self) -> f64 {
        self.scored.score
    }
}

/// Ranked output of one run: score descending, ties by key ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedList {
    entries: Vec<RankedProduct>,
}

impl RankedList {
    pub fn entries(&self) -> &[RankedProduct] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedProduct> {
        self.entries.iter()
    }

    pub fn find(&self, key: &str) -> Option<&RankedProduct> {
        self.entries.iter().find(|entry| entry.key() == key)
    }
}

/// `None` or `Some(0)` means "use the configured default"
pub fn effective_top_n(requested: Option<usize>, default_top_n: usize) -> usize {
    match requested {
        Some(n) if n > 0 => n,
        _ => default_top_n,
    }
}

/// Primary: score descending. Tie-breaker: key ascending.
pub fn compare_scored(a: &ScoredProduct, b: &ScoredProduct) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.key().cmp(b.key()))
}

/// Order, assign 1-based ranks, and keep the first `top_n` products.
///
/// Fewer products than `top_n` returns all of them.
pub fn rank_products(
    mut scored: Vec<ScoredProduct>,
    requested_top_n: Option<usize>,
    default_top_n: usize,
) -> RankedList {
    let top_n = effective_top_n(requested_top_n, default_top_n);
    scored.sort_by(compare_scored);
    scored.truncate(top_n);

    let entries = scored
        .into_iter()
        .enumerate()
        .map(|(idx, scored)| RankedProduct {
            rank: idx + 1,
            scored,
        })
        .collect();
    RankedList { entries }
}

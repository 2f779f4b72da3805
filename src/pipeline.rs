use anyhow::Result;
use crate::catalog::{load_products, LoadReport, RowWarning};
use crate::config::Config;
use crate::filter::{apply_filters, FilterKind};
use crate::ranking::{effective_top_n, rank_products, RankingSnapshot};
use crate::scoring::{score_batch, ScoringConfig, TierFallback};
use std::io::Read;
use tracing::info;

/// Diagnostics of one run. Every record that did not make it into the
/// ranked list is accounted for by a row warning, a filter count, or the
/// top-N cut.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub rows_seen: usize,
    pub loaded: usize,
    pub row_warnings: Vec<RowWarning>,
    /// Records removed per configured filter, in application order
    pub filtered_out: Vec<(FilterKind, usize)>,
    pub tier_fallbacks: Vec<TierFallback>,
    pub scored: usize,
    pub ranked: usize,
    pub top_n: usize,
}

impl RunReport {
    pub fn warning_count(&self) -> usize {
        self.row_warnings.len() + self.tier_fallbacks.len()
    }

    /// All warnings as display lines, row warnings first
    pub fn warnings(&self) -> Vec<String> {
        self.row_warnings
            .iter()
            .map(|w| w.to_string())
            .chain(self.tier_fallbacks.iter().map(|f| f.to_string()))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RankingRun {
    pub snapshot: RankingSnapshot,
    pub report: RunReport,
}

/// Filter, score and rank a loaded batch.
///
/// Pure: the same batch and config always produce the same snapshot.
pub fn run_pipeline(
    load: LoadReport,
    scoring: &ScoringConfig,
    top_n: Option<usize>,
) -> RankingRun {
    let rows_seen = load.rows_seen();
    let LoadReport { records, warnings } = load;
    let loaded = records.len();
    let catalog = records.clone();

    let filtered = apply_filters(records, scoring.filters());
    let filtered_out = filtered.removed;

    let batch = score_batch(filtered.kept, scoring);
    let scored = batch.scored.len();

    let top_n = effective_top_n(top_n, scoring.default_top_n());
    let ranked = rank_products(batch.scored, Some(top_n), scoring.default_top_n());

    let report = RunReport {
        rows_seen,
        loaded,
        row_warnings: warnings,
        filtered_out,
        tier_fallbacks: batch.tier_fallbacks,
        scored,
        ranked: ranked.len(),
        top_n,
    };
    info!(
        loaded = report.loaded,
        scored = report.scored,
        ranked = report.ranked,
        warnings = report.warning_count(),
        "Ranking complete"
    );

    RankingRun {
        snapshot: RankingSnapshot::new(ranked, catalog),
        report,
    }
}

/// Validate `config`, then load CSV from `reader` and run the pipeline.
///
/// Configuration errors are returned as `ConfigErrors` before any input is
/// read, so a bad config never produces partial output.
pub fn rank_catalog<R: Read>(config: &Config, reader: R, top_n: Option<usize>) -> Result<RankingRun> {
    let scoring = ScoringConfig::from_document(config)?;
    let load = load_products(reader)?;
    Ok(run_pipeline(load, &scoring, top_n))
}

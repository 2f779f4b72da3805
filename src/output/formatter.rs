use std::io::IsTerminal;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::ranking::{ProductView, RankedProduct};
use crate::scoring::ScoredProduct;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a composite score with fixed precision (0.734)
pub fn format_score(score: f64) -> String {
    format!("{:.3}", score)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a product name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format ranked products as a table with columns: Rank, Score, Name, Tier
/// No headers. Rank column: 3 chars (fits "99."), right-aligned.
pub fn format_ranked_table(ranked: &[RankedProduct], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No products ranked.".to_string();
    }

    let term_width = get_terminal_width();

    let rank_width = 3;
    let score_width = 6;
    let separator = "  ";

    ranked
        .iter()
        .map(|entry| {
            let rank_str = format!("{:>2}.", entry.rank);
            let score_padded = format!("{:>width$}", format_score(entry.score()), width = score_width);
            let record = &entry.scored.record;
            let tier = format!("[{}]", record.brand_tier);

            let fixed_width = rank_width + 1 + score_width + separator.len() * 2 + tier.len();
            let display_name = record.display_name();

            let name = if let Some(width) = term_width {
                if width > fixed_width + 10 {
                    truncate_name(&display_name, width - fixed_width)
                } else {
                    truncate_name(&display_name, 20)
                }
            } else {
                // No terminal (pipe), don't truncate
                display_name
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str.dimmed(),
                    score_padded.bold(),
                    separator,
                    name,
                    separator,
                    tier.cyan()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str, score_padded, separator, name, separator, tier
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked products as tab-separated values for scripting
/// Columns: rank, score, key, name, brand, price (no headers, no colors)
pub fn format_tsv(ranked: &[RankedProduct]) -> String {
    ranked
        .iter()
        .map(|entry| {
            let record = &entry.scored.record;
            format!(
                "{}\t{}\t{}\t{}\t{}\t{:.2}",
                entry.rank,
                format_score(entry.score()),
                record.key,
                record.name,
                record.brand.as_deref().unwrap_or(""),
                record.price_usd
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked products as pretty-printed JSON, including breakdowns
pub fn format_json(ranked: &[RankedProduct]) -> Result<String> {
    serde_json::to_string_pretty(ranked).context("Failed to serialize ranked products")
}

/// Per-factor contribution lines, indented for use under a product line
pub fn format_breakdown(scored: &ScoredProduct, use_colors: bool) -> String {
    scored
        .contributions
        .iter()
        .map(|c| {
            let label = format!("{:<16}", c.factor.label());
            let detail = format!(
                "raw {:>10.3}  norm {:.3}  x {:.2}  = {:.3}",
                c.raw, c.normalized, c.weight, c.contribution
            );
            if use_colors {
                format!("    {}{}", label.dimmed(), detail)
            } else {
                format!("    {}{}", label, detail)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line detail for one product, with rank and breakdown when it ranked
pub fn format_product_detail(view: &ProductView<'_>, use_colors: bool) -> String {
    let record = view.record;
    let title = record.display_name();
    let status = match view.ranked {
        Some(entry) => format!("#{} (score {})", entry.rank, format_score(entry.score())),
        None => "not ranked (filtered out or below top-N)".to_string(),
    };

    let mut lines = vec![
        if use_colors {
            format!("{}", title.bold())
        } else {
            title
        },
        format!("  Key: {}", record.key),
        format!("  Rank: {}", status),
        format!("  Brand tier: {}", record.brand_tier),
        format!(
            "  Price: ${:.2}  Cost: ${:.2}  Margin: {:.1}%",
            record.price_usd,
            record.cost_usd,
            record.profit_margin() * 100.0
        ),
        format!(
            "  Sold (last month): {}  In stock: {}  Days of inventory: {}",
            record.units_sold, record.units_in_stock, record.days_of_inventory
        ),
        format!(
            "  Views: {}  Rating: {:.1} ({} reviews)",
            record.views, record.rating, record.review_count
        ),
    ];

    if let Some(entry) = view.ranked {
        lines.push("  Breakdown:".to_string());
        lines.push(format_breakdown(&entry.scored, use_colors));
    }

    lines.join("\n")
}

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::ranking::{RankedList, RankedProduct};

#[derive(Serialize)]
struct CsvRankedRow<'a> {
    rank: usize,
    key: &'a str,
    product_name: &'a str,
    brand: &'a str,
    brand_tier: &'a str,
    price_usd: f64,
    score: f64,
}

impl<'a> From<&'a RankedProduct> for CsvRankedRow<'a> {
    fn from(entry: &'a RankedProduct) -> Self {
        let record = &entry.scored.record;
        Self {
            rank: entry.rank,
            key: &record.key,
            product_name: &record.name,
            brand: record.brand.as_deref().unwrap_or(""),
            brand_tier: &record.brand_tier,
            price_usd: record.price_usd,
            score: entry.score(),
        }
    }
}

/// Persist the ranked list as CSV, replacing `path` atomically.
///
/// A crash mid-write leaves any previous file intact.
pub fn write_ranked_csv(path: &Path, ranked: &RankedList) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory at {}", parent.display())
            })?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(&mut file);
        for entry in ranked.iter() {
            writer
                .serialize(CsvRankedRow::from(entry))
                .context("Failed to write ranked row")?;
        }
        writer.flush().context("Failed to flush ranked output")?;
    }
    file.commit()
        .with_context(|| format!("Failed to save ranked output to {}", path.display()))?;

    info!(rows = ranked.len(), path = %path.display(), "Wrote ranked output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::sample_record;
    use crate::ranking::rank_products;
    use crate::scoring::ScoredProduct;
    use std::env;

    fn ranked() -> RankedList {
        let scored = ["low", "high"]
            .iter()
            .zip([0.1, 0.9])
            .map(|(key, score)| ScoredProduct {
                record: sample_record(key),
                score,
                contributions: vec![],
            })
            .collect();
        rank_products(scored, None, 10)
    }

    #[test]
    fn test_write_ranked_csv() {
        let dir = env::temp_dir().join("shelf_rank_test_writer/nested");
        let path = dir.join("ranked.csv");
        let _ = fs::remove_file(&path);

        write_ranked_csv(&path, &ranked()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "rank,key,product_name,brand,brand_tier,price_usd,score");
        assert!(lines[1].starts_with("1,high,high,Brand,A,"));
        assert!(lines[2].starts_with("2,low,low,Brand,A,"));
        assert_eq!(lines.len(), 3);

        let _ = fs::remove_dir_all(env::temp_dir().join("shelf_rank_test_writer"));
    }

    #[test]
    fn test_write_empty_list_creates_file() {
        let path = env::temp_dir().join("shelf_rank_test_writer_empty.csv");
        write_ranked_csv(&path, &RankedList::default()).unwrap();
        assert!(path.exists());
        let _ = fs::remove_file(&path);
    }
}

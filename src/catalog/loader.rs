use super::types::{LoadReport, ProductRecord, RowIssue, RowWarning};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns the loader understands. Header matching is done on a normalized
/// form of the header ("Price (USD)" -> "price_usd").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Sku,
    Name,
    Brand,
    BrandTier,
    Price,
    Cost,
    UnitsSold,
    Stock,
    InventoryDays,
    Views,
    Rating,
    ReviewCount,
}

impl Column {
    const ALL: [Column; 12] = [
        Column::Sku,
        Column::Name,
        Column::Brand,
        Column::BrandTier,
        Column::Price,
        Column::Cost,
        Column::UnitsSold,
        Column::Stock,
        Column::InventoryDays,
        Column::Views,
        Column::Rating,
        Column::ReviewCount,
    ];

    /// Field name used in warnings
    fn field(self) -> &'static str {
        match self {
            Column::Sku => "sku",
            Column::Name => "product_name",
            Column::Brand => "brand",
            Column::BrandTier => "brand_tier",
            Column::Price => "price_usd",
            Column::Cost => "cost_usd",
            Column::UnitsSold => "units_sold",
            Column::Stock => "units_in_stock",
            Column::InventoryDays => "days_of_inventory",
            Column::Views => "views",
            Column::Rating => "rating",
            Column::ReviewCount => "review_count",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Sku => &["sku", "product_id"],
            Column::Name => &["product_name", "name"],
            Column::Brand => &["brand"],
            Column::BrandTier => &["brand_tier", "tier"],
            Column::Price => &["price_usd", "price", "unit_price"],
            Column::Cost => &["cogs_usd", "cogs", "cost_usd", "cost", "unit_cost"],
            Column::UnitsSold => &["volume_sold_last_month", "units_sold"],
            Column::Stock => &["units_in_stock", "stock_on_hand", "stock"],
            Column::InventoryDays => &["days_of_inventory", "inventory_age_days", "inventory_days"],
            Column::Views => &["views_last_month", "views"],
            Column::Rating => &["rating"],
            Column::ReviewCount => &["review_count", "reviews"],
        }
    }

    fn required(self) -> bool {
        !matches!(
            self,
            Column::Sku | Column::Brand | Column::Views | Column::Rating | Column::ReviewCount
        )
    }
}

/// "Units in Stock" -> "units_in_stock", "Price (USD)" -> "price_usd"
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Header position of each known column
struct ColumnMap {
    positions: Vec<Option<usize>>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let positions: Vec<Option<usize>> = Column::ALL
            .iter()
            .map(|column| {
                normalized
                    .iter()
                    .position(|h| column.aliases().contains(&h.as_str()))
            })
            .collect();

        let missing: Vec<&str> = Column::ALL
            .iter()
            .zip(&positions)
            .filter(|(column, pos)| column.required() && pos.is_none())
            .map(|(column, _)| column.field())
            .collect();
        if !missing.is_empty() {
            anyhow::bail!("Input is missing required column(s): {}", missing.join(", "));
        }

        Ok(Self { positions })
    }

    /// Non-empty value of `column` in `row`
    fn get<'r>(&self, row: &'r StringRecord, column: Column) -> Option<&'r str> {
        let index = Column::ALL.iter().position(|c| *c == column)?;
        self.positions[index]
            .and_then(|pos| row.get(pos))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Best-effort identity for a row that failed to clean
    fn key_hint(&self, row: &StringRecord) -> Option<String> {
        self.get(row, Column::Sku)
            .or_else(|| self.get(row, Column::Name))
            .map(str::to_string)
    }
}

fn required<'r>(map: &ColumnMap, row: &'r StringRecord, column: Column) -> Result<&'r str, RowIssue> {
    map.get(row, column).ok_or(RowIssue::MissingField(column.field()))
}

/// Non-negative finite number. Thousands separators are ignored.
fn parse_amount(column: Column, raw: &str) -> Result<f64, RowIssue> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let malformed = || RowIssue::Malformed {
        field: column.field(),
        value: raw.to_string(),
    };
    let value: f64 = cleaned.trim().parse().map_err(|_| malformed())?;
    if !value.is_finite() {
        return Err(malformed());
    }
    if value < 0.0 {
        return Err(RowIssue::Negative {
            field: column.field(),
            value: raw.to_string(),
        });
    }
    Ok(value)
}

/// Non-negative whole number. Integral decimals such as "12.0" are accepted.
fn parse_count(column: Column, raw: &str) -> Result<u64, RowIssue> {
    let value = parse_amount(column, raw)?;
    if value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(RowIssue::Malformed {
            field: column.field(),
            value: raw.to_string(),
        });
    }
    Ok(value as u64)
}

fn optional_count(map: &ColumnMap, row: &StringRecord, column: Column) -> Result<u64, RowIssue> {
    Ok(map
        .get(row, column)
        .map(|raw| parse_count(column, raw))
        .transpose()?
        .unwrap_or(0))
}

fn clean_row(map: &ColumnMap, row: &StringRecord) -> Result<ProductRecord, RowIssue> {
    let name = required(map, row, Column::Name)?.to_string();
    let key = map
        .get(row, Column::Sku)
        .map(str::to_string)
        .unwrap_or_else(|| name.clone());

    let brand_tier = required(map, row, Column::BrandTier)?.to_string();
    let price_usd = parse_amount(Column::Price, required(map, row, Column::Price)?)?;
    let cost_usd = parse_amount(Column::Cost, required(map, row, Column::Cost)?)?;
    let units_sold = parse_count(Column::UnitsSold, required(map, row, Column::UnitsSold)?)?;
    let units_in_stock = parse_count(Column::Stock, required(map, row, Column::Stock)?)?;
    let days_of_inventory = parse_count(
        Column::InventoryDays,
        required(map, row, Column::InventoryDays)?,
    )?;

    let views = optional_count(map, row, Column::Views)?;
    let review_count = optional_count(map, row, Column::ReviewCount)?;
    let rating = map
        .get(row, Column::Rating)
        .map(|raw| parse_amount(Column::Rating, raw))
        .transpose()?
        .unwrap_or(0.0);

    Ok(ProductRecord {
        key,
        name,
        brand: map.get(row, Column::Brand).map(str::to_string),
        brand_tier,
        price_usd,
        cost_usd,
        units_sold,
        units_in_stock,
        days_of_inventory,
        views,
        rating,
        review_count,
    })
}

fn exclude(report: &mut LoadReport, line: u64, key: Option<String>, issue: RowIssue) {
    let warning = RowWarning { line, key, issue };
    warn!(line = warning.line, "Excluded row: {}", warning);
    report.warnings.push(warning);
}

/// Load and clean product rows from CSV.
///
/// Rows that are missing a required field, hold a value that cannot be
/// coerced, or repeat an earlier key are excluded and recorded in
/// `LoadReport::warnings`; loading always continues with the next row.
/// Duplicate keys keep the first occurrence.
///
/// # Errors
///
/// Fails only when the header row cannot be read or a required column is
/// absent from it.
pub fn load_products<R: Read>(reader: R) -> Result<LoadReport> {
    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("Failed to read CSV header row")?
        .clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut report = LoadReport::default();
    let mut seen_keys = HashSet::new();

    for (index, result) in csv_reader.records().enumerate() {
        // Header occupies line 1
        let fallback_line = index as u64 + 2;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                exclude(&mut report, line, None, RowIssue::Unreadable(e.to_string()));
                continue;
            }
        };
        let line = row.position().map(|p| p.line()).unwrap_or(fallback_line);

        match clean_row(&columns, &row) {
            Ok(record) => {
                if !seen_keys.insert(record.key.clone()) {
                    let key = Some(record.key);
                    exclude(&mut report, line, key, RowIssue::DuplicateKey);
                    continue;
                }
                debug!(line, key = %record.key, "Loaded row");
                report.records.push(record);
            }
            Err(issue) => {
                let key = columns.key_hint(&row);
                exclude(&mut report, line, key, issue);
            }
        }
    }

    info!(
        loaded = report.records.len(),
        excluded = report.warnings.len(),
        "Loaded product catalog"
    );
    Ok(report)
}

/// Load and clean product rows from a CSV file
pub fn load_products_from_path(path: &Path) -> Result<LoadReport> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open product data at {}", path.display()))?;
    load_products(file).with_context(|| format!("Failed to load products from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Product Name,Brand,Brand Tier,Price (USD),COGS (USD),Days of Inventory,Units in Stock,Views Last Month,Volume Sold Last Month\n";

    fn load(body: &str) -> LoadReport {
        load_products(format!("{}{}", HEADER, body).as_bytes()).unwrap()
    }

    #[test]
    fn test_load_long_form_headers() {
        let report = load(
            "Test Product 1,BrandA,A,100,50,30,100,1000,100\n\
             Test Product 2,BrandB,B,80,60,60,50,500,50\n",
        );
        assert_eq!(report.records.len(), 2);
        assert!(report.warnings.is_empty());

        let first = &report.records[0];
        assert_eq!(first.key, "Test Product 1");
        assert_eq!(first.brand.as_deref(), Some("BrandA"));
        assert_eq!(first.brand_tier, "A");
        assert_eq!(first.price_usd, 100.0);
        assert_eq!(first.cost_usd, 50.0);
        assert_eq!(first.days_of_inventory, 30);
        assert_eq!(first.units_in_stock, 100);
        assert_eq!(first.views, 1000);
        assert_eq!(first.units_sold, 100);
        assert_eq!(first.rating, 0.0);
        assert_eq!(first.review_count, 0);
    }

    #[test]
    fn test_missing_required_field_is_excluded_and_reported() {
        let report = load(
            "Good One,BrandA,A,100,50,30,100,1000,100\n\
             No Price,BrandB,B,,60,60,50,500,50\n\
             Good Two,BrandC,C,50,25,20,15,200,20\n",
        );
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].key, "Good One");
        assert_eq!(report.records[1].key, "Good Two");

        assert_eq!(report.warnings.len(), 1);
        let warning = &report.warnings[0];
        assert_eq!(warning.line, 3);
        assert_eq!(warning.key.as_deref(), Some("No Price"));
        assert_eq!(warning.issue, RowIssue::MissingField("price_usd"));
    }

    #[test]
    fn test_malformed_number_is_excluded() {
        let report = load("Bad Stock,BrandA,A,100,50,30,lots,1000,100\n");
        assert!(report.records.is_empty());
        assert_eq!(
            report.warnings[0].issue,
            RowIssue::Malformed {
                field: "units_in_stock",
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn test_negative_number_is_excluded() {
        let report = load("Negative,BrandA,A,-5,50,30,10,1000,100\n");
        assert!(report.records.is_empty());
        assert!(matches!(
            report.warnings[0].issue,
            RowIssue::Negative { field: "price_usd", .. }
        ));
    }

    #[test]
    fn test_fractional_count_is_excluded() {
        let report = load("Half Unit,BrandA,A,10,5,30,10.5,1000,100\n");
        assert!(report.records.is_empty());
        assert!(matches!(
            report.warnings[0].issue,
            RowIssue::Malformed { field: "units_in_stock", .. }
        ));
    }

    #[test]
    fn test_thousands_separator_and_integral_decimal() {
        let report = load("Big Seller,BrandA,A,\"1,200.50\",600,30,12.0,\"5,000\",\"1,500\"\n");
        assert_eq!(report.records.len(), 1);
        let record = &report.records[0];
        assert_eq!(record.price_usd, 1200.5);
        assert_eq!(record.units_in_stock, 12);
        assert_eq!(record.views, 5000);
        assert_eq!(record.units_sold, 1500);
    }

    #[test]
    fn test_nan_is_malformed() {
        let report = load("Weird,BrandA,A,NaN,5,30,10,100,10\n");
        assert!(report.records.is_empty());
        assert!(matches!(report.warnings[0].issue, RowIssue::Malformed { .. }));
    }

    #[test]
    fn test_blank_optional_field_defaults_to_zero() {
        let report = load("Quiet Product,,B,20,10,10,10,,5\n");
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].views, 0);
        assert!(report.records[0].brand.is_none());
    }

    #[test]
    fn test_short_row_reports_missing_field() {
        let report = load("Truncated,BrandA,A,100\n");
        assert!(report.records.is_empty());
        assert_eq!(report.warnings[0].issue, RowIssue::MissingField("cost_usd"));
    }

    #[test]
    fn test_invalid_utf8_row_is_excluded() {
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"Good One,BrandA,A,100,50,30,100,1000,100\n");
        bytes.extend_from_slice(b"Bad \xff\xfe Bytes,BrandB,B,80,60,60,50,500,50\n");
        bytes.extend_from_slice(b"Good Two,BrandC,C,50,25,20,15,200,20\n");

        let report = load_products(bytes.as_slice()).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].key, "Good One");
        assert_eq!(report.records[1].key, "Good Two");

        assert_eq!(report.warnings.len(), 1);
        let warning = &report.warnings[0];
        assert_eq!(warning.line, 3);
        assert!(warning.key.is_none());
        match &warning.issue {
            RowIssue::Unreadable(msg) => assert!(msg.contains("utf-8"), "{}", msg),
            other => panic!("unexpected issue: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_key_keeps_first() {
        let report = load(
            "Twin,BrandA,A,100,50,30,100,1000,100\n\
             Twin,BrandA,A,999,50,30,100,1000,100\n",
        );
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].price_usd, 100.0);
        assert_eq!(report.warnings[0].issue, RowIssue::DuplicateKey);
        assert_eq!(report.warnings[0].line, 3);
        assert_eq!(report.rows_seen(), 2);
    }

    #[test]
    fn test_sku_column_becomes_key() {
        let csv = "sku,product_name,brand_tier,price,cost,units_sold,stock,inventory_days,rating,review_count\n\
                   SK-1,Serum,A,30,10,40,20,15,4.7,320\n\
                   SK-2,Serum,B,25,10,30,20,15,4.1,80\n";
        let report = load_products(csv.as_bytes()).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].key, "SK-1");
        assert_eq!(report.records[1].key, "SK-2");
        assert_eq!(report.records[0].rating, 4.7);
        assert_eq!(report.records[0].review_count, 320);
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let csv = "Product Name,Brand Tier,Price (USD)\nSerum,A,10\n";
        let err = load_products(csv.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cost_usd"));
        assert!(message.contains("units_sold"));
    }

    #[test]
    fn test_empty_input_has_no_rows() {
        let report = load("");
        assert!(report.records.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Price (USD)"), "price_usd");
        assert_eq!(normalize_header(" Units in Stock "), "units_in_stock");
        assert_eq!(normalize_header("review_count"), "review_count");
    }
}

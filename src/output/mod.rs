pub mod formatter;
pub mod writer;

pub use formatter::{
    format_breakdown, format_json, format_product_detail, format_ranked_table, format_score,
    format_tsv, should_use_colors,
};
pub use writer::write_ranked_csv;

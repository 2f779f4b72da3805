pub mod loader;
pub mod types;

pub use loader::{load_products, load_products_from_path};
pub use types::{LoadReport, ProductRecord, RowIssue, RowWarning};

pub mod ranker;
pub mod snapshot;

pub use ranker::{compare_scored, effective_top_n, rank_products, RankedList, RankedProduct};
pub use snapshot::{ProductView, RankingSnapshot};

pub mod catalog;
pub mod config;
pub mod filter;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod scoring;

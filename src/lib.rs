//! Scrape a product catalog page, filter it against a local allow-list of
//! product IDs, and export the survivors to a paginated multi-sheet XLSX
//! report. Retrieval failures restart the whole pipeline from the top.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod index;
pub mod pipeline;
pub mod report;

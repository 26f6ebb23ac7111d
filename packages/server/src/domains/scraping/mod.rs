//! Scraping domain
//!
//! Validates operator requests, drives the remote provider job, normalizes
//! its items and keeps the latest outcome available for the UI and exports.

pub mod actions;
pub mod cache;
pub mod driver;
pub mod error;
pub mod export;
pub mod models;
pub mod normalizer;

pub use actions::*;
pub use cache::LastResultCache;
pub use driver::{DriverOptions, JobDriver, RunMode};
pub use error::ScrapeError;
pub use export::{records_to_csv, CsvLayout};
pub use models::*;
pub use normalizer::{normalize_item, normalize_items};

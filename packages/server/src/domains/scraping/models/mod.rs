//! Scraping domain models

pub mod normalized_record;
pub mod result_snapshot;
pub mod scrape_request;

pub use normalized_record::*;
pub use result_snapshot::*;
pub use scrape_request::*;

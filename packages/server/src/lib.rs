// Comment Scraper - API Core
//
// This crate provides the backend for triggering provider-side comment scrapes,
// serving the latest results and exporting them as CSV.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;

pub mod latest;
pub mod run_scrape;

pub use latest::*;
pub use run_scrape::*;

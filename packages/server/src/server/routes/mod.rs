// HTTP routes
pub mod auth;
pub mod health;
pub mod scrape;

pub use auth::*;
pub use health::*;
pub use scrape::*;

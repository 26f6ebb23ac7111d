use anyhow::{anyhow, bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::domains::scraping::RunMode;

const DEFAULT_ADMIN_USER: &str = "admin";
const DEFAULT_ADMIN_PASS: &str = "1234";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Unset means results live only in the in-process cache
    pub database_url: Option<String>,
    pub admin_user: String,
    pub admin_pass: String,
    pub apify_token_default: String,
    pub apify_base_url: String,
    pub apify_actor_id: String,
    pub apify_run_mode: RunMode,
    pub poll_interval: Duration,
    /// `None` polls until the provider reports a terminal status
    pub poll_deadline: Option<Duration>,
    pub session_ttl_hours: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let admin_user = env::var("ADMIN_USER").unwrap_or_default();
        let admin_pass = env::var("ADMIN_PASS").unwrap_or_default();
        if admin_user.is_empty() || admin_pass.is_empty() {
            tracing::warn!("ADMIN_USER/ADMIN_PASS not set, using built-in test credentials");
        }

        let poll_interval_secs: u64 = env::var("SCRAPE_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "4".to_string())
            .parse()
            .context("SCRAPE_POLL_INTERVAL_SECS must be a whole number of seconds")?;

        let poll_deadline_secs: u64 = env::var("SCRAPE_POLL_DEADLINE_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .context("SCRAPE_POLL_DEADLINE_SECS must be a whole number of seconds")?;

        let session_ttl_hours: i64 = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .context("SESSION_TTL_HOURS must be a number")?;
        if session_ttl_hours <= 0 {
            bail!("SESSION_TTL_HOURS must be positive");
        }

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            admin_user: non_empty_or(admin_user, DEFAULT_ADMIN_USER),
            admin_pass: non_empty_or(admin_pass, DEFAULT_ADMIN_PASS),
            apify_token_default: env::var("APIFY_TOKEN_DEFAULT").unwrap_or_default(),
            apify_base_url: env::var("APIFY_BASE_URL")
                .unwrap_or_else(|_| apify_client::DEFAULT_BASE_URL.to_string()),
            apify_actor_id: env::var("APIFY_ACTOR_ID")
                .unwrap_or_else(|_| "apify~facebook-comments-scraper".to_string()),
            apify_run_mode: env::var("APIFY_RUN_MODE")
                .unwrap_or_else(|_| "async".to_string())
                .parse::<RunMode>()
                .map_err(|e| anyhow!("APIFY_RUN_MODE must be `sync` or `async`: {e}"))?,
            poll_interval: clamp_poll_interval(poll_interval_secs),
            poll_deadline: (poll_deadline_secs > 0).then(|| Duration::from_secs(poll_deadline_secs)),
            session_ttl_hours,
        })
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// The provider is polled every 3 to 5 seconds.
fn clamp_poll_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(3, 5))
}

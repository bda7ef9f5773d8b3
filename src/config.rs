//! Centralized configuration management for cninfo-reports

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};
use crate::query::DEFAULT_PAGE_SIZE;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the stock database snapshot (JSON)
    pub stocks_path: PathBuf,
    /// Number of completed fiscal years to fetch annual reports for
    pub annual_years: i32,
    /// Rate limiting configuration
    pub rate_limits: RateLimits,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// Randomized pause applied after every document actually downloaded
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub download_delay_min_ms: u64,
    pub download_delay_max_ms: u64,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Announcement query host
    pub base_url: String,
    /// Host serving the PDF attachments
    pub static_url: String,
    /// Request timeout in seconds, applied to every request
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Optional session cookie header value
    pub cookie: Option<String>,
    /// Results per query page
    pub page_size: u32,
}

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:110.0) Gecko/20100101 Firefox/110.0";

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            download_delay_min_ms: 500,
            download_delay_max_ms: 1500,
        }
    }
}

impl RateLimits {
    /// No pause at all, for tests and local fixtures
    pub fn disabled() -> Self {
        Self {
            download_delay_min_ms: 0,
            download_delay_max_ms: 0,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.cninfo.com.cn".to_string(),
            static_url: "http://static.cninfo.com.cn".to_string(),
            timeout_seconds: 60,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cookie: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stocks_path: PathBuf::from("assets/stocks.json"),
            annual_years: 5,
            rate_limits: RateLimits::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = HttpConfig::default();

        let stocks_path = std::env::var("CNINFO_STOCKS_PATH")
            .unwrap_or_else(|_| "assets/stocks.json".to_string())
            .into();

        let rate_limits = RateLimits {
            download_delay_min_ms: parse_env_var("CNINFO_DOWNLOAD_DELAY_MIN_MS")?.unwrap_or(500),
            download_delay_max_ms: parse_env_var("CNINFO_DOWNLOAD_DELAY_MAX_MS")?.unwrap_or(1500),
        };

        let http = HttpConfig {
            base_url: std::env::var("CNINFO_BASE_URL").unwrap_or(defaults.base_url),
            static_url: std::env::var("CNINFO_STATIC_URL").unwrap_or(defaults.static_url),
            timeout_seconds: parse_env_var("CNINFO_HTTP_TIMEOUT_SECONDS")?.unwrap_or(60),
            user_agent: std::env::var("CNINFO_USER_AGENT").unwrap_or(defaults.user_agent),
            cookie: std::env::var("CNINFO_COOKIE").ok().filter(|c| !c.is_empty()),
            page_size: parse_env_var("CNINFO_PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE),
        };

        Ok(Config {
            stocks_path,
            annual_years: parse_env_var("CNINFO_ANNUAL_YEARS")?.unwrap_or(5),
            rate_limits,
            http,
        })
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.rate_limits.download_delay_min_ms > self.rate_limits.download_delay_max_ms {
            return Err(anyhow::anyhow!(
                "Download delay minimum ({} ms) exceeds maximum ({} ms)",
                self.rate_limits.download_delay_min_ms,
                self.rate_limits.download_delay_max_ms
            ));
        }

        if self.http.page_size == 0 {
            return Err(anyhow::anyhow!("Page size must be greater than zero"));
        }

        if self.annual_years < 1 {
            return Err(anyhow::anyhow!(
                "Annual year window must cover at least one year, got {}",
                self.annual_years
            ));
        }

        reqwest::Url::parse(&self.http.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.http.base_url))?;
        reqwest::Url::parse(&self.http.static_url)
            .with_context(|| format!("Invalid static URL: {}", self.http.static_url))?;

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

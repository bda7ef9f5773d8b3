//! HTTP transport for the cninfo announcement registry

use crate::cninfo::{AnnouncementPage, CninfoApi, CninfoError};
use crate::config::Config;
use crate::query::QueryPayload;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE, ORIGIN, REFERER};
use reqwest::Client;
use tracing::debug;

/// The two calls the report fetcher makes against the registry
#[async_trait]
pub trait DisclosureSource: Send + Sync {
    /// Fetch the page named by `payload.page_num`
    async fn query_page(&self, payload: &QueryPayload) -> Result<AnnouncementPage, CninfoError>;

    /// Download the attachment at `adjunct_url` (relative to the static host)
    async fn fetch_document(&self, adjunct_url: &str) -> Result<Vec<u8>, CninfoError>;
}

/// reqwest-backed [`DisclosureSource`]
#[derive(Debug, Clone)]
pub struct CninfoClient {
    client: Client,
    query_url: String,
    static_url: String,
}

impl CninfoClient {
    pub fn new(config: &Config) -> Result<Self, CninfoError> {
        let base_url = config.http.base_url.trim_end_matches('/');

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
        );
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(ORIGIN, header_value(base_url)?);
        headers.insert(
            REFERER,
            header_value(&format!("{}{}", base_url, CninfoApi::REFERER_PATH))?,
        );
        if let Some(cookie) = &config.http.cookie {
            headers.insert(COOKIE, header_value(cookie)?);
        }

        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .default_headers(headers)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            query_url: format!("{}{}", base_url, CninfoApi::QUERY_ENDPOINT),
            static_url: config.http.static_url.trim_end_matches('/').to_string(),
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue, CninfoError> {
    HeaderValue::from_str(value)
        .map_err(|e| CninfoError::Config(format!("Invalid header value '{}': {}", value, e)))
}

#[async_trait]
impl DisclosureSource for CninfoClient {
    async fn query_page(&self, payload: &QueryPayload) -> Result<AnnouncementPage, CninfoError> {
        debug!(
            "Querying {} page {} for {} ({})",
            self.query_url, payload.page_num, payload.stock, payload.se_date
        );

        let response = self.client.post(&self.query_url).form(payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CninfoError::ApiError {
                status_code: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_document(&self, adjunct_url: &str) -> Result<Vec<u8>, CninfoError> {
        let url = format!("{}/{}", self.static_url, adjunct_url.trim_start_matches('/'));
        debug!("Downloading document from: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(CninfoError::ApiError {
                status_code: status.as_u16(),
                message: format!("Failed to download {}", url),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

//! HTTP client for the dashboard backend.
//!
//! Every accessor issues exactly one `GET` below the base path and hands back
//! the parsed JSON body. Transport failures, timeouts and non-2xx statuses are
//! returned as they come out of `reqwest`; nothing is retried.

pub mod endpoints;
pub mod params;

use crate::utils::error::{DashError, Result};
use endpoints::RequestDescriptor;
use params::QueryParams;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";
pub const DEFAULT_BASE_PATH: &str = "/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone)]
pub struct StockApi {
    http: Client,
    base: Url,
    timeout: Duration,
}

impl StockApi {
    /// Client with the default base path and timeout, mounted on `origin`.
    pub fn new(origin: &str) -> Result<Self> {
        Self::builder().origin(origin).build()
    }

    pub fn builder() -> StockApiBuilder {
        StockApiBuilder::default()
    }

    /// Base URL every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a descriptor, without the query string.
    pub fn url_for(&self, request: &RequestDescriptor) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| DashError::ConfigValidationError {
                    field: "origin".to_string(),
                    message: format!("{} cannot be used as a base URL", self.base),
                })?;
            segments.pop_if_empty();
            for segment in &request.segments {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    /// Execute a descriptor and decode the body into `T`.
    pub async fn send<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T> {
        let url = self.url_for(&request)?;
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self.http.request(request.method, url);
        if !request.query.is_empty() {
            let pairs: Vec<(&str, String)> = request
                .query
                .iter()
                .map(|(k, v)| (k.as_str(), v.to_string()))
                .collect();
            builder = builder.query(&pairs);
        }

        let response = builder.send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    /// `GET /market/daily-summary`
    pub async fn daily_summary(&self, params: QueryParams) -> Result<serde_json::Value> {
        self.send(endpoints::daily_summary(params)).await
    }

    /// `GET /stocks/screener`
    pub async fn screener(&self, params: QueryParams) -> Result<serde_json::Value> {
        self.send(endpoints::screener(params)).await
    }

    /// `GET /stocks/{ticker}/kline`
    pub async fn get_kline(&self, ticker: &str, params: QueryParams) -> Result<serde_json::Value> {
        self.send(endpoints::kline(ticker, params)).await
    }

    /// `GET /stocks/list`, never with a query string.
    pub async fn get_list(&self) -> Result<serde_json::Value> {
        self.send(endpoints::list()).await
    }

    /// `GET /stocks/{ticker}/detail`
    pub async fn get_detail(&self, ticker: &str, params: QueryParams) -> Result<serde_json::Value> {
        self.send(endpoints::detail(ticker, params)).await
    }
}

#[derive(Debug, Default)]
pub struct StockApiBuilder {
    origin: Option<String>,
    base_path: Option<String>,
    timeout: Option<Duration>,
}

impl StockApiBuilder {
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<StockApi> {
        let origin = self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN);
        crate::utils::validation::validate_url("origin", origin)?;

        let base_path = self.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH);
        let mut base = Url::parse(origin)?;
        base.set_path(base_path);
        base.set_query(None);

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(StockApi {
            http,
            base,
            timeout,
        })
    }
}

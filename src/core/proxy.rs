use crate::config::build_config::ProxyRule;
use crate::utils::error::{DashError, Result};
use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use std::collections::BTreeMap;
use url::Url;

/// Upper bound for buffered request bodies.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ProxyTarget {
    pub prefix: String,
    pub target: Url,
    pub change_origin: bool,
}

impl ProxyTarget {
    /// `scheme://host[:port]` of the target, as sent in a rewritten `Origin`.
    pub fn origin(&self) -> String {
        self.target.origin().ascii_serialization()
    }

    /// Target base followed by the untouched request path and query.
    pub fn target_url(&self, path_and_query: &str) -> Result<Url> {
        let base = self.target.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path_and_query))?)
    }

    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || self.prefix.ends_with('/') || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Proxy rules, longest prefix first.
#[derive(Debug, Clone, Default)]
pub struct ProxyTable {
    targets: Vec<ProxyTarget>,
}

impl ProxyTable {
    pub fn from_rules(rules: &BTreeMap<String, ProxyRule>) -> Result<Self> {
        let mut targets = rules
            .iter()
            .map(|(prefix, rule)| -> Result<ProxyTarget> {
                Ok(ProxyTarget {
                    prefix: prefix.clone(),
                    target: Url::parse(&rule.target)?,
                    change_origin: rule.change_origin,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        targets.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Ok(Self { targets })
    }

    pub fn match_path(&self, path: &str) -> Option<&ProxyTarget> {
        self.targets.iter().find(|t| t.matches(path))
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Drop connection-scoped headers; the length is recomputed for the
/// buffered body.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let hop_by_hop: [HeaderName; 7] = [
        header::CONNECTION,
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::CONTENT_LENGTH,
    ];
    for name in hop_by_hop {
        headers.remove(name);
    }
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source = Some(err as &(dyn std::error::Error + 'static));
    while let Some(e) = source {
        if e.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// Send `req` to the rule's target and relay the answer unchanged.
pub async fn forward(
    client: &reqwest::Client,
    target: &ProxyTarget,
    req: Request,
) -> Result<Response> {
    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = target.target_url(path_and_query)?;

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            if is_length_limit(&e) {
                DashError::PayloadTooLarge {
                    limit: MAX_BODY_BYTES,
                }
            } else {
                DashError::ServerError {
                    message: format!("Failed to read request body: {}", e),
                }
            }
        })?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    if target.change_origin {
        // reqwest fills in Host from the target URL.
        headers.remove(header::HOST);
        if headers.contains_key(header::ORIGIN) {
            let origin =
                HeaderValue::from_str(&target.origin()).map_err(|e| DashError::ServerError {
                    message: format!("Invalid origin header: {}", e),
                })?;
            headers.insert(header::ORIGIN, origin);
        }
    }

    tracing::debug!("proxy {} {} -> {}", parts.method, path_and_query, url);
    let upstream = client
        .request(parts.method, url)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    strip_hop_by_hop(&mut response_headers);
    let bytes = upstream.bytes().await?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

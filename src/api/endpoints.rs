//! Pure mapping from the dashboard's logical queries to request descriptors.
//! Nothing here touches the network.

use crate::api::params::QueryParams;
use reqwest::Method;

/// One outgoing request, relative to the API base path.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path segments below the base path. Ticker segments are kept raw and
    /// percent-encoded when the URL is assembled.
    pub segments: Vec<String>,
    pub query: QueryParams,
}

impl RequestDescriptor {
    fn get<I, S>(segments: I, query: QueryParams) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: Method::GET,
            segments: segments.into_iter().map(Into::into).collect(),
            query,
        }
    }

    /// Unencoded path, e.g. `/stocks/AAPL/kline`.
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            path.push_str(segment);
        }
        path
    }
}

pub fn daily_summary(params: QueryParams) -> RequestDescriptor {
    RequestDescriptor::get(["market", "daily-summary"], params)
}

pub fn screener(params: QueryParams) -> RequestDescriptor {
    RequestDescriptor::get(["stocks", "screener"], params)
}

pub fn kline(ticker: &str, params: QueryParams) -> RequestDescriptor {
    RequestDescriptor::get(["stocks", ticker, "kline"], params)
}

pub fn list() -> RequestDescriptor {
    RequestDescriptor::get(["stocks", "list"], QueryParams::new())
}

pub fn detail(ticker: &str, params: QueryParams) -> RequestDescriptor {
    RequestDescriptor::get(["stocks", ticker, "detail"], params)
}

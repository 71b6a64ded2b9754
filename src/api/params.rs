use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single query-string value. The backend reads everything as text, but
/// callers may hand over numbers directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

/// Query parameters forwarded verbatim. Ordered so that the encoded query
/// string is deterministic.
pub type QueryParams = BTreeMap<String, ParamValue>;

/// Parse a `key=value` command-line argument. The value is kept as typed.
pub fn parse_key_value(arg: &str) -> std::result::Result<(String, ParamValue), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", arg))?;
    if key.trim().is_empty() {
        return Err(format!("missing parameter name in '{}'", arg));
    }
    Ok((key.trim().to_string(), ParamValue::Str(value.to_string())))
}

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }

    fn extend(&self, params: &mut QueryParams) {
        if let Some(start) = self.start_date {
            params.insert("start_date".into(), start.format(DATE_FORMAT).to_string().into());
        }
        if let Some(end) = self.end_date {
            params.insert("end_date".into(), end.format(DATE_FORMAT).to_string().into());
        }
    }
}

impl From<DateRange> for QueryParams {
    fn from(range: DateRange) -> Self {
        let mut params = QueryParams::new();
        range.extend(&mut params);
        params
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenerQuery {
    pub range: DateRange,
    /// Minimum change over the range, in percent.
    pub min_change: Option<f64>,
    pub max_change: Option<f64>,
    pub min_volume: Option<f64>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<ScreenerQuery> for QueryParams {
    fn from(query: ScreenerQuery) -> Self {
        let mut params = QueryParams::from(query.range);
        if let Some(v) = query.min_change {
            params.insert("min_change".into(), v.into());
        }
        if let Some(v) = query.max_change {
            params.insert("max_change".into(), v.into());
        }
        if let Some(v) = query.min_volume {
            params.insert("min_volume".into(), v.into());
        }
        if let Some(v) = query.page {
            params.insert("page".into(), v.into());
        }
        if let Some(v) = query.page_size {
            params.insert("page_size".into(), v.into());
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KLineQuery {
    pub range: DateRange,
    pub period: Option<Period>,
}

impl From<KLineQuery> for QueryParams {
    fn from(query: KLineQuery) -> Self {
        let mut params = QueryParams::from(query.range);
        if let Some(period) = query.period {
            params.insert("period".into(), period.as_str().into());
        }
        params
    }
}

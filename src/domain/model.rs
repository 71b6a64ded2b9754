//! Payloads returned by the dashboard backend.
//!
//! Decode with [`StockApi::send`](crate::api::StockApi::send) when a typed
//! view is wanted; the plain accessors return `serde_json::Value`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    pub trade_date: String,
    pub total_count: u64,
    pub up_count: f64,
    pub down_count: f64,
    pub flat_count: f64,
    pub avg_up_percent: Option<f64>,
    pub avg_down_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub data: Vec<DailyStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenedStock {
    pub ticker: String,
    pub start_price: f64,
    pub end_price: f64,
    pub change_percent: f64,
    pub total_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerPage {
    pub stocks: Vec<ScreenedStock>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// One candle. Moving averages are only present on the daily period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KLineBar {
    pub trade_date: String,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub volume: f64,
    #[serde(default)]
    pub ma_1: Option<f64>,
    #[serde(default)]
    pub ma_2: Option<f64>,
    #[serde(default)]
    pub ma_3: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KLineSeries {
    pub data: Vec<KLineBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockList {
    pub stocks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCurve {
    pub data: Vec<PricePoint>,
}

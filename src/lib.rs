pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use api::{endpoints::RequestDescriptor, params::QueryParams, StockApi};
pub use config::{build_config::BuildConfig, storage::LocalStorage};
pub use core::builder::{BuildManifest, StaticBuilder};
pub use utils::error::{DashError, Result};

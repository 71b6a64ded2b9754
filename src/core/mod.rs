pub mod builder;
pub mod dev_server;
pub mod naming;
pub mod proxy;

pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;

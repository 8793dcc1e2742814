pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod services;

pub use config::ConsumerConfig;
pub use error::{CdcError, Result};

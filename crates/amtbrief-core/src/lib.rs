pub mod config;
pub mod error;
pub mod redact;
pub mod types;

pub use config::AppConfig;
pub use error::{ApiError, Result};

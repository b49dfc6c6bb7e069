//! Error types for module-source

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Module source errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Module source returned {status} for module {module_id}")]
    Upstream { module_id: String, status: u16 },

    #[error("Invalid module identifier: {0}")]
    InvalidModuleId(String),

    #[error("Module source is not configured")]
    NotConfigured,
}

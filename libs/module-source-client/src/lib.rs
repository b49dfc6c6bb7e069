//! External module source adapter
//!
//! Reporting modules are authored in a third-party module service. The registry only
//! needs one thing from it: the XML document for a module, fetched on behalf of a
//! requester. Transport, authentication tokens and timeouts live here; parsing and
//! persistence do not.
//!
//! ```rust,no_run
//! use cde_module_source::{HttpModuleSource, ModuleSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpModuleSource::new("https://modules.example.org/api", None, 30)?;
//! if let Some(xml) = source.fetch_module("lung-nodule", "jane@example.org").await? {
//!     println!("{xml}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;
pub mod memory;

use async_trait::async_trait;

pub use error::{Error, Result};
pub use http::HttpModuleSource;
pub use memory::InMemoryModuleSource;

/// Boundary to the external module service.
#[async_trait]
pub trait ModuleSource: Send + Sync {
    /// Fetch the XML payload of a module.
    ///
    /// Returns `Ok(None)` when the source does not know the module.
    async fn fetch_module(&self, module_id: &str, requester: &str) -> Result<Option<String>>;
}

pub(crate) fn check_module_id(module_id: &str) -> Result<&str> {
    let trimmed = module_id.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(Error::InvalidModuleId(module_id.to_string()));
    }
    Ok(trimmed)
}

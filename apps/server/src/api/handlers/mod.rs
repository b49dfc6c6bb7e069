//! Request handlers, one module per entity family

pub mod elements;
pub mod images;
pub mod index_codes;
pub mod metrics;
pub mod modules;
pub mod organizations;
pub mod persons;
pub mod references;
pub mod sets;
pub mod specialties;
pub mod system;

use serde::Deserialize;

/// `?searchKeyword=` of every search endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_keyword: Option<String>,
}

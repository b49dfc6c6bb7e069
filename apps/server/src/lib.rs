//! CDE Registry - common data element registry service
//!
//! A REST service that stores radiology common data elements and the sets that
//! group them, together with their contributors, index codes, references, images
//! and specialties:
//! - CRUD and keyword search per entity family
//! - Explicit cascade deletes over sets, elements and values
//! - Reporting module XML import and export
//! - Import of modules held by an external module service

#![allow(
    clippy::too_many_arguments,      // Functions with many args are acceptable for domain operations
    clippy::type_complexity,         // Complex types are acceptable when they represent domain concepts
)]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod request_context;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;

//! Error types for the registry server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid module document: {0}")]
    Module(#[from] cde_module::ModuleError),

    #[error("Module source error: {0}")]
    ModuleSource(#[from] cde_module_source::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Single-field validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::default();
        fields.add(field, message);
        Self::Validation(fields)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::Module(_) => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::ModuleSource(cde_module_source::Error::NotConfigured) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::ModuleSource(cde_module_source::Error::InvalidModuleId(_)) => {
                StatusCode::BAD_REQUEST
            }
            Error::ModuleSource(_) => StatusCode::BAD_GATEWAY,
            Error::Database(_) | Error::Storage(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable kind used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_failure",
            Error::NotFound { .. } => "not_found",
            Error::Forbidden(_) => "forbidden",
            Error::Database(_) | Error::Storage(_) => "storage_failure",
            Error::Module(_) => "parse_failure",
            Error::ModuleSource(_) => "module_source_failure",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if matches!(self, Error::ModuleSource(_)) {
            tracing::warn!(error = %self, "Module source request failed");
            self.to_string()
        } else if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "Request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, kind = self.kind(), "Request rejected");
            self.to_string()
        };

        let mut body = json!({
            "status": status.as_u16(),
            "error": self.kind(),
            "message": message,
        });
        if let Error::Validation(fields) = &self {
            body["fields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

/// Field name → messages, collected before any write happens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was collected, otherwise a validation failure.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, list) in errors.field_errors() {
            let name = camel_case(&field.to_string());
            for error in list.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("failed '{}' check", error.code));
                fields.add(&name, message);
            }
        }
        fields
    }
}

impl From<FieldErrors> for Error {
    fn from(fields: FieldErrors) -> Self {
        Error::Validation(fields)
    }
}

/// API field names are camelCase, validator reports struct field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

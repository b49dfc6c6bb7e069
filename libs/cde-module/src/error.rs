//! Error types for module parsing

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModuleError>;

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("expected root element <ReportingModule>, found <{0}>")]
    UnexpectedRoot(String),

    #[error("missing required element <{0}>")]
    MissingElement(String),

    #[error("unsupported data element type <{0}>")]
    UnsupportedElementType(String),

    #[error("data element '{element}': {message}")]
    InvalidElement { element: String, message: String },

    #[error("invalid module: {0}")]
    Invalid(String),

    #[error("XML write error: {0}")]
    XmlWrite(String),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl ModuleError {
    pub(crate) fn element(element: &str, message: impl Into<String>) -> Self {
        Self::InvalidElement {
            element: element.to_string(),
            message: message.into(),
        }
    }
}

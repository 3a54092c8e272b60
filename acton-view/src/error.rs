//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for view rendering
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error while reading a template source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Template parse or execution error
    #[error("Template error: {0}")]
    Template(Box<minijinja::Error>),

    /// No compiled template is registered under the requested path
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// No layout with the requested name was loaded
    #[error("layout not found: {0}")]
    LayoutNotFound(String),

    /// No adapter is registered under the requested name
    #[error("Adapter not found: {0}")]
    AdapterNotFound(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A template helper received arguments it cannot use
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// HTTP status this error maps to when it reaches the client.
    ///
    /// Every failure in this layer is a server-side misconfiguration or
    /// rendering fault, so they all surface as 500.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        Error::Template(Box::new(err))
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Io(std::io::Error::from(err))
    }
}

/// Plain-text response, the last-resort shape used when nothing richer can be rendered.
pub fn plain_text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, body.into()).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("View error: {}", self);
        plain_text(self.status_code(), self.to_string())
    }
}

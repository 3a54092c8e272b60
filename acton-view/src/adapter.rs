//! Output-format adapters.
//!
//! An [`Adapter`] turns a [`ViewResponse`] into an HTTP response for one
//! output format. The crate ships an HTML adapter
//! ([`TemplateAdapter`](crate::templates::TemplateAdapter)) and a JSON adapter
//! ([`JsonAdapter`](crate::json::JsonAdapter)); applications can register
//! their own with [`ViewService::register_adapter`](crate::ViewService::register_adapter).

use axum::{http::StatusCode, response::Response};
use http::request::Parts;

use crate::error::{Error, Result};
use crate::response::ViewResponse;

/// Fixed error pages every adapter can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemPage {
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 401
    Unauthorized,
    /// 405
    MethodNotAllowed,
    /// 503
    Maintenance,
    /// 500
    ServerError,
}

impl SystemPage {
    /// HTTP status of the page
    #[must_use]
    pub fn status(self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Maintenance => StatusCode::SERVICE_UNAVAILABLE,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Template key under `system/`
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Forbidden => "403",
            Self::NotFound => "404",
            Self::Unauthorized => "401",
            Self::MethodNotAllowed => "405",
            Self::Maintenance => "503",
            Self::ServerError => "500",
        }
    }

    /// Template path of the page, e.g. `system/404`
    #[must_use]
    pub fn path(self) -> String {
        format!("system/{}", self.key())
    }

    /// Plain-text body used when no dedicated page exists
    #[must_use]
    pub fn fallback_body(self) -> &'static str {
        match self {
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::Unauthorized => "Unauthorized",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::Maintenance => "Maintenance",
            Self::ServerError => "Internal Server Error",
        }
    }

    /// Message used in JSON failure envelopes
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::Unauthorized => "Unauthorized",
            Self::MethodNotAllowed => "Method not allowed",
            Self::Maintenance => "Maintenance",
            Self::ServerError => "Internal server error",
        }
    }
}

/// Renderer for one output format.
///
/// Implementations must never answer an error path with 200: when a
/// dedicated error page is unavailable they fall back to a plain-text body
/// with the page's status.
///
/// # Example
///
/// ```rust
/// use acton_view::{Adapter, Error, Result, SystemPage, ViewResponse};
/// use axum::response::{IntoResponse, Response};
/// use http::request::Parts;
///
/// struct CsvAdapter;
///
/// impl Adapter for CsvAdapter {
///     fn init(&self) -> Result<()> {
///         Ok(())
///     }
///
///     fn render(&self, _parts: &Parts, resp: ViewResponse) -> Response {
///         let status = resp.status().unwrap_or_default();
///         (status, "id,name\n").into_response()
///     }
///
///     fn render_page(&self, _parts: &Parts, page: SystemPage, _resp: ViewResponse) -> Response {
///         (page.status(), page.fallback_body()).into_response()
///     }
///
///     fn render_system_error(&self, _parts: &Parts, err: &Error, _resp: ViewResponse) -> Response {
///         (err.status_code(), err.to_string()).into_response()
///     }
/// }
/// ```
pub trait Adapter: Send + Sync {
    /// Load or reload backing resources. Must be safe to call repeatedly.
    fn init(&self) -> Result<()>;

    /// Render the happy path
    fn render(&self, parts: &Parts, resp: ViewResponse) -> Response;

    /// Render one of the fixed error pages with its status
    fn render_page(&self, parts: &Parts, page: SystemPage, resp: ViewResponse) -> Response;

    /// Render the system error page for `err` with status 500
    fn render_system_error(&self, parts: &Parts, err: &Error, resp: ViewResponse) -> Response;

    /// 403 page
    fn render_forbidden(&self, parts: &Parts, resp: ViewResponse) -> Response {
        self.render_page(parts, SystemPage::Forbidden, resp)
    }

    /// 404 page
    fn render_not_found(&self, parts: &Parts, resp: ViewResponse) -> Response {
        self.render_page(parts, SystemPage::NotFound, resp)
    }

    /// 401 page
    fn render_unauthorized(&self, parts: &Parts, resp: ViewResponse) -> Response {
        self.render_page(parts, SystemPage::Unauthorized, resp)
    }

    /// 405 page
    fn render_method_not_allowed(&self, parts: &Parts, resp: ViewResponse) -> Response {
        self.render_page(parts, SystemPage::MethodNotAllowed, resp)
    }

    /// 503 page
    fn render_maintenance(&self, parts: &Parts, resp: ViewResponse) -> Response {
        self.render_page(parts, SystemPage::Maintenance, resp)
    }
}

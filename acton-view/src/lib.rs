//! # acton-view
//!
//! View rendering for axum services. Handlers describe *what* to render with a
//! [`ViewResponse`]; a [`ViewService`] decides *how*, dispatching to a named
//! [`Adapter`] (HTML templates or JSON envelopes out of the box).
//!
//! ## Features
//!
//! - **Response builder**: path, layout, title, status, data, headers, caching
//!   and every HTMX response header in one chainable value
//! - **HTML adapter**: minijinja templates compiled once from directories,
//!   embedded assets or memory, with layouts, partials and a helper table
//! - **JSON adapter**: `success` / `fail` / `error` envelopes
//! - **Format dispatch**: `report.json` renders `report` as JSON, custom
//!   adapters handle any other extension
//! - **System pages**: 401, 403, 404, 405, 500 and 503 with plain-text fallbacks
//! - **HTMX helpers**: request predicates, triggers, swaps and locations
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use acton_view::prelude::*;
//! use axum::{
//!     extract::{Request, State},
//!     routing::get,
//!     Router,
//! };
//!
//! async fn home(State(views): State<Arc<ViewService>>, request: Request) -> Response {
//!     let (parts, _body) = request.into_parts();
//!     let resp = ViewResponse::new()
//!         .with_path("home")
//!         .with_title("Home")
//!         .with_data_item("count", 3);
//!     views.render(&parts, resp)
//! }
//!
//! # async fn run() -> Result<()> {
//! // Load configuration
//! let config = Config::load()?;
//!
//! // Initialize tracing
//! init_tracing(&config)?;
//!
//! // Compile templates and register the html and json adapters
//! let views = Arc::new(ViewService::from_config(&config)?);
//!
//! let app: Router = Router::new().route("/", get(home)).with_state(views);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod htmx;
pub mod json;
pub mod observability;
pub mod request;
pub mod response;
pub mod service;
pub mod templates;

pub use adapter::{Adapter, SystemPage};
pub use config::Config;
pub use error::{Error, Result};
pub use json::{Envelope, EnvelopeStatus, JsonAdapter};
pub use response::{view_data, ViewData, ViewResponse};
pub use service::{ViewService, ViewServiceBuilder};
pub use templates::TemplateAdapter;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapter::{Adapter, SystemPage};
    pub use crate::config::{Config, ServiceConfig, ViewsConfig};
    pub use crate::error::{Error, Result};
    pub use crate::htmx::{
        is_any_htmx_request, is_boosted_request, is_htmx_request, Location, Swap, SwapOption,
        TriggerTiming,
    };
    pub use crate::json::{json_error, json_failure, json_redirect, json_success, JsonAdapter};
    pub use crate::observability::init_tracing;
    pub use crate::response::{view_data, ViewData, ViewResponse};
    pub use crate::service::{ViewService, ViewServiceBuilder};
    pub use crate::templates::{DirSource, EmbeddedSource, MemorySource, TemplateAdapter};

    // Re-export axum response types used by handlers
    pub use axum::response::{Html, IntoResponse, Response};
}

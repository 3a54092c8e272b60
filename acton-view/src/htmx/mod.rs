//! HTMX support for server-rendered applications.
//!
//! # Features
//!
//! - **Header names**: `axum-htmx` constants for every HTMX request and response header
//! - **Request predicates**: fragment vs boosted vs plain requests
//! - **Response values**: `HX-Location`, `HX-Reswap` and `HX-Trigger*` builders
//!
//! Response headers are normally set through [`ViewResponse`](crate::ViewResponse):
//!
//! ```rust
//! use acton_view::htmx::{Location, Swap, SwapOption};
//! use acton_view::ViewResponse;
//!
//! let resp = ViewResponse::new()
//!     .with_path("inbox/list")
//!     .hx_push_url("/inbox")
//!     .hx_reswap(Swap::new(SwapOption::OuterHtml))
//!     .hx_location_with(Location::new("/inbox").target("#main"))
//!     .hx_trigger("inboxLoaded", ());
//! assert!(resp.header("hx-push-url").is_some());
//! ```

pub mod headers;
mod helpers;
mod location;
mod swap;
mod triggers;

pub use headers::*;
pub use helpers::{is_any_htmx_request, is_boosted_request, is_htmx_request};
pub use location::Location;
pub use axum_htmx::SwapOption;
pub use swap::{Edge, Swap};
pub use triggers::{TriggerTiming, Triggers};

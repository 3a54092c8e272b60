//! Template data assembled from a response and its request.

use chrono::Datelike;
use http::request::Parts;
use serde::Serialize;
use serde_json::{Map, Value};

use super::ViewResponse;
use crate::{htmx, request};

/// Request-derived values exposed to templates as `view`.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub title: String,
    pub base_url: String,
    pub request_path: String,
    pub request_method: String,
    pub is_htmx_request: bool,
    pub is_boosted_request: bool,
    pub nonce: String,
    pub htmx_nonce: String,
    pub current_year: i32,
    pub error: String,
    pub errors: Map<String, Value>,
    pub has_error: bool,
    pub has_errors: bool,
}

/// The full context handed to a template: page data, `error`, `errors`, `view`.
#[derive(Debug, Clone, Serialize)]
pub struct ViewData {
    #[serde(flatten)]
    page: Map<String, Value>,
    view: View,
}

impl ViewData {
    /// Page data with the `error`/`errors` defaults applied
    #[must_use]
    pub fn page(&self) -> &Map<String, Value> {
        &self.page
    }

    /// The `view` object
    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Page data without the `view` object, as used for JSON payloads
    #[must_use]
    pub fn into_page(self) -> Map<String, Value> {
        self.page
    }
}

/// Build the template context for `resp` rendered in answer to `parts`.
#[must_use]
pub fn view_data(resp: &ViewResponse, parts: &Parts) -> ViewData {
    let mut page = resp.data().clone();
    page.entry("error")
        .or_insert_with(|| Value::String(String::new()));
    page.entry("errors")
        .or_insert_with(|| Value::Object(Map::new()));

    let error = page
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let errors = page
        .get("errors")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let nonce = request::nonce(parts);
    let htmx_nonce = format!(
        "{{\"includeIndicatorStyles\":false,\"inlineScriptNonce\": \"{}\"}}",
        nonce
    );

    let view = View {
        title: resp.title().to_string(),
        base_url: request::base_url(parts),
        request_path: request::url_path(parts),
        request_method: request::method(parts),
        is_htmx_request: htmx::is_htmx_request(&parts.headers),
        is_boosted_request: htmx::is_boosted_request(&parts.headers),
        nonce,
        htmx_nonce,
        current_year: chrono::Utc::now().year(),
        has_error: !error.is_empty(),
        has_errors: !errors.is_empty(),
        error,
        errors,
    };

    ViewData { page, view }
}

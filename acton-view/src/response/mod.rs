//! Per-request view responses.
//!
//! A [`ViewResponse`] collects everything a handler decides about a page
//! (template path, layout, status, headers, page data, HTMX triggers) and is
//! consumed by exactly one adapter render call.
//!
//! ```rust
//! use acton_view::ViewResponse;
//! use serde_json::json;
//!
//! let resp = ViewResponse::new()
//!     .with_path("users/show")
//!     .with_title("User")
//!     .with_data_item("user", json!({"name": "Ada"}))
//!     .status_not_found()
//!     .no_cache_strict();
//!
//! assert_eq!(resp.path(), "users/show");
//! assert_eq!(resp.status().map(|s| s.as_u16()), Some(404));
//! ```

mod data;

pub use data::{view_data, ViewData};

use std::collections::{BTreeMap, HashMap};

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::{Map, Value};

use crate::htmx::{self, Location, TriggerTiming, Triggers};

/// Builder describing a single rendered view.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ViewResponse {
    path: String,
    layout: String,
    title: String,
    status: Option<StatusCode>,
    headers: HashMap<HeaderName, String>,
    data: Map<String, Value>,
    triggers: Triggers,
}

impl ViewResponse {
    /// Create an empty response
    pub fn new() -> Self {
        Self::default()
    }

    /// Template path, optionally ending in a format extension (`users/list.json`)
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Layout to wrap the page in
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Page title, exposed to templates as `view.title`
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the HTTP status
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the HTTP status unless one was already set
    pub fn status_or(mut self, status: StatusCode) -> Self {
        self.status.get_or_insert(status);
        self
    }

    /// 200 OK
    pub fn status_ok(self) -> Self {
        self.with_status(StatusCode::OK)
    }

    /// 401 Unauthorized
    pub fn status_unauthorized(self) -> Self {
        self.with_status(StatusCode::UNAUTHORIZED)
    }

    /// 403 Forbidden
    pub fn status_forbidden(self) -> Self {
        self.with_status(StatusCode::FORBIDDEN)
    }

    /// 404 Not Found
    pub fn status_not_found(self) -> Self {
        self.with_status(StatusCode::NOT_FOUND)
    }

    /// 405 Method Not Allowed
    pub fn status_method_not_allowed(self) -> Self {
        self.with_status(StatusCode::METHOD_NOT_ALLOWED)
    }

    /// 500 Internal Server Error
    pub fn status_server_error(self) -> Self {
        self.with_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// 503 Service Unavailable
    pub fn status_maintenance(self) -> Self {
        self.with_status(StatusCode::SERVICE_UNAVAILABLE)
    }

    /// Merge a map of page data; existing keys are overwritten
    pub fn with_data(mut self, data: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.data.extend(data);
        self
    }

    /// Set one page data entry
    pub fn with_data_item(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Set the page error message and the per-field errors
    pub fn with_errors(
        mut self,
        message: impl Into<String>,
        field_errors: BTreeMap<String, String>,
    ) -> Self {
        let errors: Map<String, Value> = field_errors
            .into_iter()
            .map(|(field, msg)| (field, Value::String(msg)))
            .collect();
        self.data.insert("error".into(), Value::String(message.into()));
        self.data.insert("errors".into(), Value::Object(errors));
        self
    }

    /// Set a response header; the last value for a name wins
    pub fn with_header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.insert(name, value.into());
        self
    }

    // Caching

    /// `Cache-Control: no-cache, no-store, must-revalidate`
    pub fn no_cache_strict(self) -> Self {
        self.cache_control("no-cache, no-store, must-revalidate")
    }

    /// Set `Cache-Control`
    pub fn cache_control(self, value: impl Into<String>) -> Self {
        self.with_header(header::CACHE_CONTROL, value)
    }

    /// Set `ETag`
    pub fn etag(self, etag: impl Into<String>) -> Self {
        self.with_header(header::ETAG, etag)
    }

    /// Set `Last-Modified`
    pub fn last_modified(self, value: impl Into<String>) -> Self {
        self.with_header(header::LAST_MODIFIED, value)
    }

    // HTMX

    /// Client-side navigation to `path` without a full reload
    pub fn hx_location(self, path: impl Into<String>) -> Self {
        self.with_header(htmx::HX_LOCATION, path)
    }

    /// Client-side navigation with target, swap and other options
    pub fn hx_location_with(self, location: Location) -> Self {
        let value = location.to_header_value();
        self.with_header(htmx::HX_LOCATION, value)
    }

    /// Push `url` into the browser history
    pub fn hx_push_url(self, url: impl Into<String>) -> Self {
        self.with_header(htmx::HX_PUSH_URL, url)
    }

    /// Prevent the history from being updated
    pub fn hx_no_push_url(self) -> Self {
        self.with_header(htmx::HX_PUSH_URL, "false")
    }

    /// Client-side redirect with a full page load
    pub fn hx_redirect(self, url: impl Into<String>) -> Self {
        self.with_header(htmx::HX_REDIRECT, url)
    }

    /// Full page refresh
    pub fn hx_refresh(self) -> Self {
        self.with_header(htmx::HX_REFRESH, "true")
    }

    /// Explicitly disable the full page refresh
    pub fn hx_no_refresh(self) -> Self {
        self.with_header(htmx::HX_REFRESH, "false")
    }

    /// Replace the current URL in the location bar
    pub fn hx_replace_url(self, url: impl Into<String>) -> Self {
        self.with_header(htmx::HX_REPLACE_URL, url)
    }

    /// Prevent the location bar from being updated
    pub fn hx_no_replace_url(self) -> Self {
        self.with_header(htmx::HX_REPLACE_URL, "false")
    }

    /// Override how the response is swapped in
    pub fn hx_reswap(self, swap: impl ToString) -> Self {
        self.with_header(htmx::HX_RESWAP, swap.to_string())
    }

    /// Override the element the response is swapped into
    pub fn hx_retarget(self, selector: impl Into<String>) -> Self {
        self.with_header(htmx::HX_RETARGET, selector)
    }

    /// Select which part of the response is swapped in
    pub fn hx_reselect(self, selector: impl Into<String>) -> Self {
        self.with_header(htmx::HX_RESELECT, selector)
    }

    /// Trigger a client-side event as soon as the response arrives
    pub fn hx_trigger(self, event: impl Into<String>, detail: impl Into<Value>) -> Self {
        self.trigger(TriggerTiming::Immediate, event, detail)
    }

    /// Trigger a client-side event after the settle step
    pub fn hx_trigger_after_settle(
        self,
        event: impl Into<String>,
        detail: impl Into<Value>,
    ) -> Self {
        self.trigger(TriggerTiming::AfterSettle, event, detail)
    }

    /// Trigger a client-side event after the swap step
    pub fn hx_trigger_after_swap(self, event: impl Into<String>, detail: impl Into<Value>) -> Self {
        self.trigger(TriggerTiming::AfterSwap, event, detail)
    }

    fn trigger(
        mut self,
        timing: TriggerTiming,
        event: impl Into<String>,
        detail: impl Into<Value>,
    ) -> Self {
        self.triggers.set(timing, event, detail);
        self
    }

    // Accessors

    /// Template path as given
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Layout name, empty when unset
    #[must_use]
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Page title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Explicitly set status
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Page data without the `view` object
    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Value of a header set on this response
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
        self.headers.get(&name).map(String::as_str)
    }

    /// Registered trigger events
    #[must_use]
    pub fn triggers(&self) -> &Triggers {
        &self.triggers
    }

    /// Final header map, trigger headers included.
    ///
    /// Values that are not valid header values are logged and skipped.
    #[must_use]
    pub fn http_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.headers.len() + 3);
        for (name, value) in &self.headers {
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    map.insert(name.clone(), value);
                }
                Err(_) => tracing::warn!("Skipping invalid value for header {}", name),
            }
        }
        for (name, value) in self.triggers.headers() {
            map.insert(name, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::htmx::{Swap, SwapOption};
    use serde_json::json;

    #[test]
    fn test_builder_fields() {
        let resp = ViewResponse::new()
            .with_path("home.json")
            .with_layout("admin")
            .with_title("Home");
        assert_eq!(resp.path(), "home.json");
        assert_eq!(resp.layout(), "admin");
        assert_eq!(resp.title(), "Home");
        assert!(resp.status().is_none());
    }

    #[test]
    fn test_status_or_never_overwrites() {
        let resp = ViewResponse::new()
            .status_forbidden()
            .status_or(StatusCode::OK);
        assert_eq!(resp.status(), Some(StatusCode::FORBIDDEN));

        let resp = ViewResponse::new().status_or(StatusCode::NOT_FOUND);
        assert_eq!(resp.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_named_statuses() {
        let cases = [
            (ViewResponse::new().status_ok(), 200),
            (ViewResponse::new().status_unauthorized(), 401),
            (ViewResponse::new().status_forbidden(), 403),
            (ViewResponse::new().status_not_found(), 404),
            (ViewResponse::new().status_method_not_allowed(), 405),
            (ViewResponse::new().status_server_error(), 500),
            (ViewResponse::new().status_maintenance(), 503),
        ];
        for (resp, code) in cases {
            assert_eq!(resp.status().unwrap().as_u16(), code);
        }
    }

    #[test]
    fn test_data_merges() {
        let mut extra = Map::new();
        extra.insert("b".into(), json!(3));
        extra.insert("c".into(), json!(4));

        let resp = ViewResponse::new()
            .with_data_item("a", 1)
            .with_data_item("b", 2)
            .with_data(extra);

        assert_eq!(resp.data()["a"], json!(1));
        assert_eq!(resp.data()["b"], json!(3));
        assert_eq!(resp.data()["c"], json!(4));
    }

    #[test]
    fn test_with_errors() {
        let mut fields = BTreeMap::new();
        fields.insert("email".to_string(), "is required".to_string());

        let resp = ViewResponse::new().with_errors("Invalid form", fields);
        assert_eq!(resp.data()["error"], json!("Invalid form"));
        assert_eq!(resp.data()["errors"], json!({"email": "is required"}));
    }

    #[test]
    fn test_cache_headers() {
        let resp = ViewResponse::new()
            .no_cache_strict()
            .etag("\"abc\"")
            .last_modified("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(
            resp.header("cache-control"),
            Some("no-cache, no-store, must-revalidate")
        );
        assert_eq!(resp.header("ETag"), Some("\"abc\""));
        assert!(resp.header("last-modified").is_some());

        let resp = resp.cache_control("max-age=60");
        assert_eq!(resp.header("cache-control"), Some("max-age=60"));
    }

    #[test]
    fn test_htmx_headers() {
        let resp = ViewResponse::new()
            .hx_location("/next")
            .hx_push_url("/pushed")
            .hx_redirect("/away")
            .hx_refresh()
            .hx_replace_url("/replaced")
            .hx_reswap(Swap::new(SwapOption::OuterHtml))
            .hx_retarget("#main")
            .hx_reselect("#list");

        assert_eq!(resp.header("hx-location"), Some("/next"));
        assert_eq!(resp.header("hx-push-url"), Some("/pushed"));
        assert_eq!(resp.header("hx-redirect"), Some("/away"));
        assert_eq!(resp.header("hx-refresh"), Some("true"));
        assert_eq!(resp.header("hx-replace-url"), Some("/replaced"));
        assert_eq!(resp.header("hx-reswap"), Some("outerHTML"));
        assert_eq!(resp.header("hx-retarget"), Some("#main"));
        assert_eq!(resp.header("hx-reselect"), Some("#list"));

        let resp = resp.hx_no_push_url().hx_no_refresh().hx_no_replace_url();
        assert_eq!(resp.header("hx-push-url"), Some("false"));
        assert_eq!(resp.header("hx-refresh"), Some("false"));
        assert_eq!(resp.header("hx-replace-url"), Some("false"));
    }

    #[test]
    fn test_http_headers_include_triggers() {
        let resp = ViewResponse::new()
            .with_header(header::CACHE_CONTROL, "no-cache")
            .hx_trigger("saved", ())
            .hx_trigger("closed", ())
            .hx_trigger_after_swap("notify", json!({"level": "info"}));

        let headers = resp.http_headers();
        assert_eq!(headers.get("cache-control").unwrap(), "no-cache");
        assert_eq!(headers.get("hx-trigger").unwrap(), "saved, closed");
        assert_eq!(
            headers.get("hx-trigger-after-swap").unwrap(),
            r#"{"notify":{"level":"info"}}"#
        );
        assert!(headers.get("hx-trigger-after-settle").is_none());
    }

    #[test]
    fn test_invalid_header_value_skipped() {
        let resp = ViewResponse::new().with_header(header::ETAG, "bad\nvalue");
        assert!(resp.http_headers().get("etag").is_none());
    }
}

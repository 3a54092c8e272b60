//! Values for the `HX-Location` response header.
//!
//! See <https://htmx.org/headers/hx-location/>.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Target of an `HX-Location` navigation.
///
/// A location with only a path is sent as the bare path; anything more is
/// sent as the JSON object form.
///
/// ```rust
/// use acton_view::htmx::Location;
///
/// assert_eq!(Location::new("/inbox").to_header_value(), "/inbox");
///
/// let value = Location::new("/inbox").target("#main").to_header_value();
/// assert_eq!(value, r##"{"path":"/inbox","target":"#main"}"##);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    handler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    swap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    select: Option<String>,
}

impl Location {
    /// Navigate to `path`
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Source element of the request
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Event that triggered the request
    #[must_use]
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Callback that handles the response HTML
    #[must_use]
    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Element to swap the response into
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// How the response is swapped in
    #[must_use]
    pub fn swap(mut self, swap: impl ToString) -> Self {
        self.swap = Some(swap.to_string());
        self
    }

    /// Values submitted with the request
    #[must_use]
    pub fn values(mut self, values: Value) -> Self {
        self.values = Some(values);
        self
    }

    /// Add a header submitted with the request
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Select the content to swap from the response
    #[must_use]
    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    fn is_path_only(&self) -> bool {
        *self == Self::new(self.path.clone())
    }

    /// Render as the header value
    #[must_use]
    pub fn to_header_value(&self) -> String {
        if self.is_path_only() {
            return self.path.clone();
        }
        serde_json::to_string(self).unwrap_or_else(|_| self.path.clone())
    }
}

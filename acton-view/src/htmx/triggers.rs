//! Client-side events raised through the `HX-Trigger*` response headers.

use axum::http::{HeaderName, HeaderValue};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::headers::{HX_TRIGGER, HX_TRIGGER_AFTER_SETTLE, HX_TRIGGER_AFTER_SWAP};

/// When to trigger the events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerTiming {
    /// Trigger immediately (HX-Trigger header)
    #[default]
    Immediate,
    /// Trigger after settle (HX-Trigger-After-Settle header)
    AfterSettle,
    /// Trigger after swap (HX-Trigger-After-Swap header)
    AfterSwap,
}

impl TriggerTiming {
    /// Response header carrying events of this timing
    #[must_use]
    pub fn header_name(self) -> HeaderName {
        match self {
            Self::Immediate => HX_TRIGGER,
            Self::AfterSettle => HX_TRIGGER_AFTER_SETTLE,
            Self::AfterSwap => HX_TRIGGER_AFTER_SWAP,
        }
    }
}

/// Ordered events of one timing bucket. `Value::Null` means no detail.
#[derive(Debug, Clone, Default)]
struct Bucket(Vec<(String, Value)>);

/// Serializes as a JSON object whose keys keep registration order.
impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, detail) in &self.0 {
            map.serialize_entry(name, detail)?;
        }
        map.end()
    }
}

impl Bucket {
    fn set(&mut self, name: String, detail: Value) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = detail,
            None => self.0.push((name, detail)),
        }
    }

    fn header_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }

        let all_simple = self.0.iter().all(|(_, detail)| detail.is_null());
        if all_simple {
            let names: Vec<&str> = self.0.iter().map(|(name, _)| name.as_str()).collect();
            return Some(names.join(", "));
        }

        serde_json::to_string(self).ok()
    }
}

/// HTMX trigger events collected on a response, partitioned by timing.
///
/// Setting an event that already exists in the same bucket replaces its
/// detail but keeps its position.
///
/// # Example
///
/// ```rust
/// use acton_view::htmx::{Triggers, TriggerTiming};
/// use serde_json::json;
///
/// let mut triggers = Triggers::new();
/// triggers.set(TriggerTiming::Immediate, "itemSaved", ());
/// triggers.set(TriggerTiming::AfterSettle, "notify", json!({"message": "Saved!"}));
///
/// let headers = triggers.headers();
/// assert_eq!(headers.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Triggers {
    immediate: Bucket,
    after_settle: Bucket,
    after_swap: Bucket,
}

impl Triggers {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an event. Pass `()` for an event without detail.
    pub fn set(&mut self, timing: TriggerTiming, name: impl Into<String>, detail: impl Into<Value>) {
        let bucket = match timing {
            TriggerTiming::Immediate => &mut self.immediate,
            TriggerTiming::AfterSettle => &mut self.after_settle,
            TriggerTiming::AfterSwap => &mut self.after_swap,
        };
        bucket.set(name.into(), detail.into());
    }

    /// Whether no events were registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.immediate.0.is_empty() && self.after_settle.0.is_empty() && self.after_swap.0.is_empty()
    }

    /// Header name/value pairs for every non-empty bucket.
    ///
    /// Buckets whose events all lack detail use the comma-separated form;
    /// otherwise the JSON object form.
    #[must_use]
    pub fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        [
            (TriggerTiming::Immediate, &self.immediate),
            (TriggerTiming::AfterSettle, &self.after_settle),
            (TriggerTiming::AfterSwap, &self.after_swap),
        ]
        .into_iter()
        .filter_map(|(timing, bucket)| {
            let value = bucket.header_value()?;
            match HeaderValue::from_str(&value) {
                Ok(value) => Some((timing.header_name(), value)),
                Err(_) => {
                    tracing::warn!("Dropping HTMX trigger header with invalid value: {}", value);
                    None
                }
            }
        })
        .collect()
    }
}

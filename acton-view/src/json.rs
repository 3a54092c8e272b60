//! JSON envelopes and the JSON adapter.
//!
//! Every JSON body produced here is wrapped in an [`Envelope`]:
//!
//! ```json
//! {
//! 	"status": "fail",
//! 	"message": "Not found",
//! 	"data": null,
//! 	"code": 404
//! }
//! ```
//!
//! Output is tab-indented with a trailing newline and always carries
//! `Content-Type: application/json; charset=UTF-8`.

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use http::request::Parts;
use serde::{Deserialize, Serialize};
use serde_json::{json, ser::PrettyFormatter, Value};

use crate::adapter::{Adapter, SystemPage};
use crate::error::{plain_text, Error, Result};
use crate::response::{view_data, ViewResponse};

/// Content type of every JSON response
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Outcome tag of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    /// The request succeeded
    Success,
    /// The request was understood but rejected
    Fail,
    /// The server failed
    Error,
}

fn is_zero(code: &u16) -> bool {
    *code == 0
}

/// Standard JSON response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Outcome tag
    pub status: EnvelopeStatus,
    /// Human-readable message
    pub message: String,
    /// Payload
    pub data: Value,
    /// HTTP status, omitted when zero
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: u16,
}

impl Envelope {
    /// `success` envelope with message `Success`
    pub fn success(status: StatusCode, data: Value) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: "Success".to_string(),
            data,
            code: status.as_u16(),
        }
    }

    /// `fail` envelope
    pub fn fail(status: StatusCode, message: impl Into<String>, data: Value) -> Self {
        Self {
            status: EnvelopeStatus::Fail,
            message: message.into(),
            data,
            code: status.as_u16(),
        }
    }

    /// `error` envelope without payload
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            message: message.into(),
            data: Value::Null,
            code: status.as_u16(),
        }
    }
}

fn to_tabbed_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Serialize `data` as the whole body with `status` and extra `headers`.
///
/// `headers` replace same-named defaults; the content type is always JSON.
pub fn json_with_headers<T: Serialize + ?Sized>(
    status: StatusCode,
    data: &T,
    headers: HeaderMap,
) -> Result<Response> {
    let body = to_tabbed_json(data)?;
    let mut response = (status, body).into_response();
    let response_headers = response.headers_mut();
    response_headers.extend(headers);
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    Ok(response)
}

/// 200 `success` envelope
pub fn json_success(data: impl Serialize, headers: HeaderMap) -> Result<Response> {
    json_success_with_status(StatusCode::OK, data, headers)
}

/// `success` envelope with an explicit status
pub fn json_success_with_status(
    status: StatusCode,
    data: impl Serialize,
    headers: HeaderMap,
) -> Result<Response> {
    let envelope = Envelope::success(status, serde_json::to_value(data)?);
    json_with_headers(status, &envelope, headers)
}

/// `fail` envelope carrying `data`
pub fn json_failure(
    data: impl Serialize,
    message: &str,
    status: StatusCode,
    headers: HeaderMap,
) -> Result<Response> {
    let envelope = Envelope::fail(status, message, serde_json::to_value(data)?);
    json_with_headers(status, &envelope, headers)
}

/// `error` envelope
pub fn json_error(message: &str, status: StatusCode, headers: HeaderMap) -> Result<Response> {
    json_with_headers(status, &Envelope::error(status, message), headers)
}

/// 303 with `{"Redirect": url}`
pub fn json_redirect(url: &str, headers: HeaderMap) -> Result<Response> {
    json_with_headers(StatusCode::SEE_OTHER, &json!({ "Redirect": url }), headers)
}

/// Adapter rendering page data as JSON envelopes.
///
/// Status defaults to 200. Anything above 299 is sent as a `fail`
/// envelope with the page data as payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAdapter;

impl JsonAdapter {
    /// Create a JSON adapter
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Adapter for JsonAdapter {
    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn render(&self, parts: &Parts, resp: ViewResponse) -> Response {
        let status = resp.status().unwrap_or(StatusCode::OK);
        let headers = resp.http_headers();
        let payload = Value::Object(view_data(&resp, parts).into_page());

        let result = if status.as_u16() > 299 {
            json_failure(payload, "Failure", status, headers)
        } else {
            json_success_with_status(status, payload, headers)
        };

        match result {
            Ok(response) => response,
            Err(err) => self.render_system_error(parts, &err, resp),
        }
    }

    fn render_page(&self, _parts: &Parts, page: SystemPage, _resp: ViewResponse) -> Response {
        json_failure(Value::Null, page.message(), page.status(), HeaderMap::new())
            .unwrap_or_else(|err| plain_text(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
    }

    fn render_system_error(&self, _parts: &Parts, err: &Error, _resp: ViewResponse) -> Response {
        tracing::error!("Rendering JSON system error: {}", err);
        json_error(
            &err.to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
            HeaderMap::new(),
        )
        .unwrap_or_else(|e| plain_text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}

//! HTMX request predicates.
//!
//! HTMX marks its requests with two independent headers: `HX-Request` for
//! every AJAX request it issues and `HX-Boosted` for requests made by
//! `hx-boost` links and forms, which expect a full page back.

use axum::http::HeaderMap;

use super::headers::{HX_BOOSTED, HX_REQUEST};

/// Header is present and not explicitly `false`.
fn flag(headers: &HeaderMap, name: &axum::http::HeaderName) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|s| !s.trim().eq_ignore_ascii_case("false"))
}

/// Check if the request is an HTMX request that expects a fragment.
///
/// True when `HX-Request` is set and `HX-Boosted` is not: boosted requests
/// should get full pages.
///
/// # Example
///
/// ```rust
/// use acton_view::htmx::is_htmx_request;
/// use axum::http::{HeaderMap, HeaderValue};
///
/// let mut headers = HeaderMap::new();
/// headers.insert("hx-request", HeaderValue::from_static("true"));
/// assert!(is_htmx_request(&headers));
///
/// headers.insert("hx-boosted", HeaderValue::from_static("true"));
/// assert!(!is_htmx_request(&headers));
/// ```
#[must_use]
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    flag(headers, &HX_REQUEST) && !flag(headers, &HX_BOOSTED)
}

/// Check if the request is an HTMX boosted request.
///
/// Boosted requests are made by HTMX when using `hx-boost="true"` on links
/// or forms. These requests should typically return full pages rather than
/// fragments.
#[must_use]
pub fn is_boosted_request(headers: &HeaderMap) -> bool {
    flag(headers, &HX_BOOSTED)
}

/// Check if the request was issued by HTMX in any way, boosted or not.
#[must_use]
pub fn is_any_htmx_request(headers: &HeaderMap) -> bool {
    flag(headers, &HX_REQUEST) || flag(headers, &HX_BOOSTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_is_htmx_request() {
        assert!(!is_htmx_request(&headers(&[])));
        assert!(is_htmx_request(&headers(&[("hx-request", "true")])));
        assert!(!is_htmx_request(&headers(&[
            ("hx-request", "true"),
            ("hx-boosted", "true")
        ])));
        assert!(!is_htmx_request(&headers(&[("hx-request", "false")])));
    }

    #[test]
    fn test_is_boosted_request() {
        assert!(!is_boosted_request(&headers(&[])));
        assert!(is_boosted_request(&headers(&[("hx-boosted", "true")])));
        assert!(!is_boosted_request(&headers(&[("hx-boosted", "false")])));
    }

    #[test]
    fn test_is_any_htmx_request() {
        assert!(!is_any_htmx_request(&headers(&[])));
        assert!(is_any_htmx_request(&headers(&[("hx-request", "true")])));
        assert!(is_any_htmx_request(&headers(&[("hx-boosted", "true")])));
        assert!(is_any_htmx_request(&headers(&[
            ("hx-request", "true"),
            ("hx-boosted", "true")
        ])));
    }
}

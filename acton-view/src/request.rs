//! Request inspection helpers.
//!
//! Pure functions over [`http::request::Parts`] that answer the questions a
//! view layer asks about an inbound request: which scheme/host/port the client
//! used (honoring reverse-proxy forwarding headers), who the client is, and
//! whether the request came from HTMX or an `XMLHttpRequest`.
//!
//! Handlers obtain `Parts` by extracting it directly:
//!
//! ```rust,ignore
//! async fn handler(parts: http::request::Parts) -> String {
//!     acton_view::request::base_url(&parts)
//! }
//! ```

use std::net::SocketAddr;
use std::str::FromStr;

use axum::extract::ConnectInfo;
use http::{header, request::Parts, uri::Scheme, HeaderMap};

/// `X-Forwarded-Proto` request header
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
/// `X-Forwarded-Host` request header
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
/// `X-Forwarded-Port` request header
pub const X_FORWARDED_PORT: &str = "x-forwarded-port";
/// `X-Real-IP` request header
pub const X_REAL_IP: &str = "x-real-ip";
/// `X-Requested-With` request header
pub const X_REQUESTED_WITH: &str = "x-requested-with";

/// Content-Security-Policy nonce for the current request.
///
/// Insert it into the request extensions from middleware; views expose it to
/// templates as `view.nonce`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nonce(pub String);

/// Marks a request that arrived over a TLS connection terminated by this server.
///
/// HTTP/1.1 requests carry an origin-form URI (`/path`) with no scheme, so
/// the TLS acceptor or a middleware behind it inserts this extension for
/// [`scheme`] to report `"https"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TlsConnection;

fn is_native_tls(parts: &Parts) -> bool {
    parts.uri.scheme() == Some(&Scheme::HTTPS) || parts.extensions.get::<TlsConnection>().is_some()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Split `host[:port]`, leaving IPv6 literals (`[::1]:8080`) intact.
fn split_host_port(authority: &str) -> (&str, &str) {
    if let Some(end) = authority.rfind(']') {
        let (host, rest) = authority.split_at(end + 1);
        return (host, rest.strip_prefix(':').unwrap_or(""));
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => (host, port),
        None => (authority, ""),
    }
}

/// Scheme, host and port in one pass over the headers.
///
/// Forwarding headers win over the `Host` header, which wins over the request
/// URI authority. Port is empty when nothing states it.
#[must_use]
pub fn scheme_host_port(parts: &Parts) -> (String, String, String) {
    let headers = &parts.headers;

    let scheme = match header_str(headers, X_FORWARDED_PROTO) {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ if is_native_tls(parts) => "https",
        _ => "http",
    };

    let (host, mut port) = if let Some(forwarded) = header_str(headers, X_FORWARDED_HOST) {
        let (h, p) = split_host_port(forwarded);
        (h.to_string(), p.to_string())
    } else if let Some(host_header) = header_str(headers, header::HOST.as_str()) {
        let (h, p) = split_host_port(host_header);
        (h.to_string(), p.to_string())
    } else {
        (
            parts.uri.host().unwrap_or_default().to_string(),
            parts
                .uri
                .port_u16()
                .map(|p| p.to_string())
                .unwrap_or_default(),
        )
    };

    if let Some(forwarded_port) = header_str(headers, X_FORWARDED_PORT) {
        port = forwarded_port.to_string();
    }

    (scheme.to_string(), host, port)
}

/// `"https"` or `"http"`
#[must_use]
pub fn scheme(parts: &Parts) -> String {
    scheme_host_port(parts).0
}

/// Host the client addressed, without port
#[must_use]
pub fn host(parts: &Parts) -> String {
    scheme_host_port(parts).1
}

/// Port the client addressed, or empty if unknown
#[must_use]
pub fn port(parts: &Parts) -> String {
    scheme_host_port(parts).2
}

/// Whether the client reached us over HTTPS (directly or through a proxy)
#[must_use]
pub fn is_secure(parts: &Parts) -> bool {
    scheme(parts) == "https"
}

/// `scheme://host[:port]`, omitting the port when it is the scheme default.
#[must_use]
pub fn base_url(parts: &Parts) -> String {
    let (scheme, host, port) = scheme_host_port(parts);
    let default_port = match scheme.as_str() {
        "https" => "443",
        _ => "80",
    };

    if port.is_empty() || port == default_port {
        format!("{scheme}://{host}")
    } else {
        format!("{scheme}://{host}:{port}")
    }
}

/// Client address: `X-Real-IP` if present, else the socket peer address.
///
/// The peer address is only known when the server was started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[must_use]
pub fn remote_addr(parts: &Parts) -> String {
    if let Some(ip) = header_str(&parts.headers, X_REAL_IP) {
        return ip.to_string();
    }
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default()
}

/// `User-Agent` header value
#[must_use]
pub fn user_agent(parts: &Parts) -> String {
    header_str(&parts.headers, header::USER_AGENT.as_str())
        .unwrap_or_default()
        .to_string()
}

/// `Referer` header value
#[must_use]
pub fn referer(parts: &Parts) -> String {
    header_str(&parts.headers, header::REFERER.as_str())
        .unwrap_or_default()
        .to_string()
}

/// HTTP method name
#[must_use]
pub fn method(parts: &Parts) -> String {
    parts.method.to_string()
}

/// Request path without the query string
#[must_use]
pub fn url_path(parts: &Parts) -> String {
    parts.uri.path().to_string()
}

/// Whether the request was sent by `XMLHttpRequest`
#[must_use]
pub fn is_xml_http_request(parts: &Parts) -> bool {
    header_str(&parts.headers, X_REQUESTED_WITH)
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// CSP nonce stored in the request extensions, or empty
#[must_use]
pub fn nonce(parts: &Parts) -> String {
    parts
        .extensions
        .get::<Nonce>()
        .map(|n| n.0.clone())
        .unwrap_or_default()
}

/// How [`in_path`] compares the request path with its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    /// Path equals the target
    Exact,
    /// Path contains the target
    Contains,
    /// Path ends with the target
    Suffix,
    /// Path starts with the target
    Prefix,
}

impl PathMatch {
    /// Compare `path` against `target`
    #[must_use]
    pub fn matches(self, path: &str, target: &str) -> bool {
        match self {
            Self::Exact => path == target,
            Self::Contains => path.contains(target),
            Self::Suffix => path.ends_with(target),
            Self::Prefix => path.starts_with(target),
        }
    }
}

impl FromStr for PathMatch {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "contains" => Ok(Self::Contains),
            "suffix" => Ok(Self::Suffix),
            "prefix" => Ok(Self::Prefix),
            _ => Err(()),
        }
    }
}

/// Check the request path against `target` using `mode`
/// (`exact`, `contains`, `suffix` or `prefix`).
///
/// An unrecognized mode never matches.
#[must_use]
pub fn in_path(parts: &Parts, target: &str, mode: &str) -> bool {
    mode.parse::<PathMatch>()
        .map(|m| m.matches(parts.uri.path(), target))
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) fn parts_for(uri: &str, headers: &[(&str, &str)]) -> Parts {
    let mut builder = http::Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(()).unwrap().into_parts().0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarded_parts() -> Parts {
        let mut parts = parts_for(
            "http://example.com/",
            &[
                ("X-Forwarded-Proto", "https"),
                ("X-Forwarded-Host", "forwarded.example.com"),
                ("X-Forwarded-Port", "8080"),
                ("X-Real-IP", "10.0.0.1"),
                ("HX-Request", "true"),
                ("HX-Boosted", "true"),
                ("User-Agent", "testUserAgent"),
                ("Referer", "testReferer"),
            ],
        );
        parts
            .extensions
            .insert(ConnectInfo("10.0.0.2:8080".parse::<SocketAddr>().unwrap()));
        parts
    }

    #[test]
    fn test_forwarded_headers() {
        let parts = forwarded_parts();

        assert_eq!(scheme(&parts), "https");
        assert_eq!(host(&parts), "forwarded.example.com");
        assert_eq!(port(&parts), "8080");
        assert_eq!(method(&parts), "GET");
        assert_eq!(url_path(&parts), "/");
        assert_eq!(referer(&parts), "testReferer");
        assert_eq!(remote_addr(&parts), "10.0.0.1");
        assert_eq!(user_agent(&parts), "testUserAgent");

        let (scheme, host, port) = scheme_host_port(&parts);
        assert_eq!(scheme, "https");
        assert_eq!(host, "forwarded.example.com");
        assert_eq!(port, "8080");

        assert_eq!(base_url(&parts), "https://forwarded.example.com:8080");
        assert!(is_secure(&parts));
    }

    #[test]
    fn test_empty_headers() {
        let mut parts = parts_for("http://example.com:1234/", &[]);
        parts
            .extensions
            .insert(ConnectInfo("10.0.0.2:8080".parse::<SocketAddr>().unwrap()));

        assert_eq!(scheme(&parts), "http");
        assert_eq!(host(&parts), "example.com");
        assert_eq!(port(&parts), "1234");
        assert_eq!(base_url(&parts), "http://example.com:1234");
        assert!(!is_secure(&parts));
        assert_eq!(remote_addr(&parts), "10.0.0.2:8080");
        assert_eq!(user_agent(&parts), "");
    }

    #[test]
    fn test_native_tls_scheme() {
        let parts = parts_for("https://example.com/", &[]);
        assert_eq!(scheme(&parts), "https");
        assert_eq!(base_url(&parts), "https://example.com");
    }

    #[test]
    fn test_tls_connection_marker_with_origin_form_uri() {
        let mut parts = parts_for("/", &[("Host", "example.com")]);
        assert_eq!(scheme(&parts), "http");

        parts.extensions.insert(TlsConnection);
        assert_eq!(scheme(&parts), "https");
        assert!(is_secure(&parts));
        assert_eq!(base_url(&parts), "https://example.com");
    }

    #[test]
    fn test_host_header_port() {
        let parts = parts_for("/", &[("Host", "app.local:3000")]);
        assert_eq!(host(&parts), "app.local");
        assert_eq!(port(&parts), "3000");
        assert_eq!(base_url(&parts), "http://app.local:3000");
    }

    #[test]
    fn test_base_url_omits_default_ports() {
        let parts = parts_for("/", &[("Host", "example.com:80")]);
        assert_eq!(base_url(&parts), "http://example.com");

        let parts = parts_for(
            "/",
            &[("X-Forwarded-Proto", "https"), ("X-Forwarded-Host", "example.com:443")],
        );
        assert_eq!(base_url(&parts), "https://example.com");

        let parts = parts_for(
            "/",
            &[("X-Forwarded-Proto", "https"), ("X-Forwarded-Host", "example.com:80")],
        );
        assert_eq!(base_url(&parts), "https://example.com:80");
    }

    #[test]
    fn test_ipv6_host() {
        let parts = parts_for("/", &[("Host", "[::1]:8443")]);
        assert_eq!(host(&parts), "[::1]");
        assert_eq!(port(&parts), "8443");
    }

    #[test]
    fn test_xml_http_request() {
        let parts = parts_for("/", &[("X-Requested-With", "XMLHttpRequest")]);
        assert!(is_xml_http_request(&parts));
        assert!(!is_xml_http_request(&parts_for("/", &[])));
    }

    #[test]
    fn test_nonce() {
        let mut parts = parts_for("/", &[]);
        assert_eq!(nonce(&parts), "");
        parts.extensions.insert(Nonce("abc123".to_string()));
        assert_eq!(nonce(&parts), "abc123");
    }

    #[test]
    fn test_in_path() {
        let parts = parts_for("http://example.com:1234/foo/bar/baz", &[]);
        let cases = [
            ("/foo/bar/baz", "exact", true),
            ("/foo/bar", "exact", false),
            ("/bar/", "contains", true),
            ("/bizzle", "contains", false),
            ("/baz", "suffix", true),
            ("/foo", "suffix", false),
            ("/foo", "prefix", true),
            ("/bar", "prefix", false),
            ("/foo", "regex", false),
            ("/foo/bar/baz", "", false),
        ];
        for (target, mode, want) in cases {
            assert_eq!(in_path(&parts, target, mode), want, "{mode} {target}");
        }
    }
}

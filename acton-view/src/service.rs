//! View service: adapter registry and format dispatch.
//!
//! [`ViewService`] owns the named adapters (`html` and `json` by default),
//! picks one per response and offers the system-page and redirect
//! conveniences handlers need.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
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
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!     let views = Arc::new(ViewService::from_config(&config)?);
//!
//!     let app = Router::new().route("/", get(home)).with_state(views);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use http::request::Parts;
use minijinja::Environment;
use parking_lot::RwLock;
use serde_json::json;

use crate::adapter::{Adapter, SystemPage};
use crate::config::Config;
use crate::error::{plain_text, Error, Result};
use crate::htmx;
use crate::json::JsonAdapter;
use crate::request;
use crate::response::ViewResponse;
use crate::templates::{
    DirSource, FunctionsHook, TemplateAdapter, TemplateSource, DEFAULT_EXTENSION,
    DEFAULT_LAYOUT, ROOT_SOURCE_ID,
};

/// Adapter name for HTML
pub const HTML_ADAPTER: &str = "html";
/// Adapter name for JSON
pub const JSON_ADAPTER: &str = "json";

const REDIRECTING: &str = "redirecting...";

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Split `path` into the path without extension and the extension of its
/// final segment (without the dot).
fn split_extension(path: &str) -> (&str, Option<&str>) {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[segment_start..].rfind('.') {
        Some(dot) => {
            let idx = segment_start + dot;
            (&path[..idx], Some(&path[idx + 1..]))
        }
        None => (path, None),
    }
}

/// Renders [`ViewResponse`]s through named adapters.
///
/// Lookups take a shared lock and registration an exclusive one. Adapters
/// are initialized outside the lock.
pub struct ViewService {
    adapters: RwLock<HashMap<String, Arc<dyn Adapter>>>,
    base_layout: String,
    system_layout: String,
}

impl std::fmt::Debug for ViewService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.adapters.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("ViewService")
            .field("adapters", &names)
            .field("base_layout", &self.base_layout)
            .field("system_layout", &self.system_layout)
            .finish()
    }
}

impl ViewService {
    /// Start building a service
    #[must_use]
    pub fn builder() -> ViewServiceBuilder {
        ViewServiceBuilder::new()
    }

    /// Build a service from the `views` configuration section
    pub fn from_config(config: &Config) -> Result<Self> {
        let views = &config.views;
        let mut builder = ViewServiceBuilder::new()
            .with_layouts(&views.base_layout, &views.system_layout)
            .with_extension(&views.extension);

        if let Some(dir) = &views.template_dir {
            builder = builder.with_template_dir(dir.clone());
        }
        for (id, dir) in &views.sources {
            builder = builder.with_source(id.clone(), DirSource::new(dir));
        }

        builder.build()
    }

    /// Layout applied when a response names none
    #[must_use]
    pub fn base_layout(&self) -> &str {
        &self.base_layout
    }

    /// Layout applied to system pages
    #[must_use]
    pub fn system_layout(&self) -> &str {
        &self.system_layout
    }

    /// Initialize `adapter` and register it under `name`, replacing any previous one.
    ///
    /// Nothing is registered when initialization fails.
    pub fn register_adapter(&self, name: impl Into<String>, adapter: impl Adapter + 'static) -> Result<()> {
        self.register_shared_adapter(name, Arc::new(adapter))
    }

    /// Like [`register_adapter`](Self::register_adapter) for an already shared adapter
    pub fn register_shared_adapter(&self, name: impl Into<String>, adapter: Arc<dyn Adapter>) -> Result<()> {
        let name = name.into();
        adapter.init()?;
        let replaced = self.adapters.write().insert(name.clone(), adapter).is_some();
        tracing::info!(adapter = %name, replaced, "Registered view adapter");
        Ok(())
    }

    /// Register `html` and the JSON adapter under `json`, each only if the name is free
    pub fn register_default_adapters(&self, html: TemplateAdapter) -> Result<()> {
        if self.adapter(HTML_ADAPTER).is_none() {
            self.register_adapter(HTML_ADAPTER, html)?;
        }
        if self.adapter(JSON_ADAPTER).is_none() {
            self.register_adapter(JSON_ADAPTER, JsonAdapter::new())?;
        }
        Ok(())
    }

    /// Adapter registered under `name`
    #[must_use]
    pub fn adapter(&self, name: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters.read().get(name).cloned()
    }

    /// Names of the registered adapters, sorted
    #[must_use]
    pub fn adapter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Re-initialize every adapter, e.g. after templates changed on disk.
    ///
    /// Stops at the first failure. Adapters that fail keep serving what they
    /// had loaded before.
    pub fn reinit(&self) -> Result<()> {
        let adapters: Vec<(String, Arc<dyn Adapter>)> = self
            .adapters
            .read()
            .iter()
            .map(|(name, adapter)| (name.clone(), Arc::clone(adapter)))
            .collect();

        for (name, adapter) in adapters {
            tracing::debug!(adapter = %name, "Reinitializing view adapter");
            adapter.init()?;
        }
        Ok(())
    }

    fn adapter_or_error(&self, key: &str) -> std::result::Result<Arc<dyn Adapter>, Response> {
        let key = if key.is_empty() { HTML_ADAPTER } else { key };
        self.adapter(key).ok_or_else(|| {
            let err = Error::AdapterNotFound(key.to_string());
            tracing::error!("{}", err);
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        })
    }

    /// Render `resp` with the adapter its content type or path extension selects.
    ///
    /// `Content-Type: application/json` selects `json`. Otherwise the
    /// extension of the last path segment decides: none or `html` selects
    /// `html`, anything else the adapter of that name. The extension is
    /// removed from the path before rendering.
    pub fn render(&self, parts: &Parts, resp: ViewResponse) -> Response {
        let (path, extension) = split_extension(resp.path());
        let path = path.to_string();
        let extension = extension.map(str::to_string);

        let wants_json = resp
            .header(header::CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let key = match extension.as_deref() {
            _ if wants_json => JSON_ADAPTER,
            None | Some("") | Some("html") => HTML_ADAPTER,
            Some(other) => other,
        };

        self.render_as(key, parts, resp.with_path(path))
    }

    /// Render `resp` with the adapter registered under `key`
    pub fn render_as(&self, key: &str, parts: &Parts, resp: ViewResponse) -> Response {
        let adapter = match self.adapter_or_error(key) {
            Ok(adapter) => adapter,
            Err(response) => return response,
        };

        let resp = if resp.layout().is_empty() {
            resp.with_layout(&self.base_layout)
        } else {
            resp
        };
        adapter.render(parts, resp)
    }

    /// Render a system page with the adapter registered under `key`
    pub fn render_page_as(&self, key: &str, parts: &Parts, page: SystemPage) -> Response {
        match self.adapter_or_error(key) {
            Ok(adapter) => {
                let resp = self.new_system_response().with_status(page.status());
                adapter.render_page(parts, page, resp)
            }
            Err(response) => response,
        }
    }

    /// 404 page
    pub fn render_not_found(&self, parts: &Parts) -> Response {
        self.render_not_found_as(HTML_ADAPTER, parts)
    }

    /// 404 page with the adapter registered under `key`
    pub fn render_not_found_as(&self, key: &str, parts: &Parts) -> Response {
        self.render_page_as(key, parts, SystemPage::NotFound)
    }

    /// 403 page
    pub fn render_forbidden(&self, parts: &Parts) -> Response {
        self.render_forbidden_as(HTML_ADAPTER, parts)
    }

    /// 403 page with the adapter registered under `key`
    pub fn render_forbidden_as(&self, key: &str, parts: &Parts) -> Response {
        self.render_page_as(key, parts, SystemPage::Forbidden)
    }

    /// 401 page
    pub fn render_unauthorized(&self, parts: &Parts) -> Response {
        self.render_unauthorized_as(HTML_ADAPTER, parts)
    }

    /// 401 page with the adapter registered under `key`
    pub fn render_unauthorized_as(&self, key: &str, parts: &Parts) -> Response {
        self.render_page_as(key, parts, SystemPage::Unauthorized)
    }

    /// 405 page
    pub fn render_method_not_allowed(&self, parts: &Parts) -> Response {
        self.render_method_not_allowed_as(HTML_ADAPTER, parts)
    }

    /// 405 page with the adapter registered under `key`
    pub fn render_method_not_allowed_as(&self, key: &str, parts: &Parts) -> Response {
        self.render_page_as(key, parts, SystemPage::MethodNotAllowed)
    }

    /// 503 page
    pub fn render_maintenance(&self, parts: &Parts) -> Response {
        self.render_maintenance_as(HTML_ADAPTER, parts)
    }

    /// 503 page with the adapter registered under `key`
    pub fn render_maintenance_as(&self, key: &str, parts: &Parts) -> Response {
        self.render_page_as(key, parts, SystemPage::Maintenance)
    }

    /// 500 page for `err`
    pub fn render_system_error(&self, parts: &Parts, err: &Error) -> Response {
        self.render_system_error_as(HTML_ADAPTER, parts, err)
    }

    /// 500 page for `err` with the adapter registered under `key`
    pub fn render_system_error_as(&self, key: &str, parts: &Parts, err: &Error) -> Response {
        match self.adapter_or_error(key) {
            Ok(adapter) => {
                let resp = self.new_system_response().status_server_error();
                adapter.render_system_error(parts, err, resp)
            }
            Err(response) => response,
        }
    }

    /// Empty response using `layout`
    pub fn new_response(&self, layout: impl Into<String>) -> ViewResponse {
        ViewResponse::new().with_layout(layout)
    }

    /// Empty response using the system layout
    pub fn new_system_response(&self) -> ViewResponse {
        ViewResponse::new().with_layout(&self.system_layout)
    }

    /// Redirect in the way the client understands.
    ///
    /// HTMX requests get `HX-Redirect` with 303, `XMLHttpRequest`s a JSON body
    /// with 200 and everything else a 302 `Location` redirect. `GET` and
    /// `HEAD` redirects also carry a small HTML link to the target.
    pub fn redirect(&self, parts: &Parts, url: &str) -> Response {
        if htmx::is_htmx_request(&parts.headers) {
            return self.hx_redirect(url);
        }

        if request::is_xml_http_request(parts) {
            let body = json!({
                "status": "redirect",
                "message": REDIRECTING,
                "url": url,
            });
            return (
                StatusCode::OK,
                [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                body.to_string(),
            )
                .into_response();
        }

        match HeaderValue::from_str(url) {
            Ok(location) if parts.method == Method::GET || parts.method == Method::HEAD => {
                let body = format!("<a href=\"{}\">Found</a>.\n", html_escape(url));
                (
                    StatusCode::FOUND,
                    [
                        (header::LOCATION, location),
                        (header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8")),
                    ],
                    body,
                )
                    .into_response()
            }
            Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            Err(_) => {
                let err = Error::InvalidArgument(format!("invalid redirect URL: {url}"));
                err.into_response()
            }
        }
    }

    /// 303 with `HX-Redirect: url` and a placeholder body
    pub fn hx_redirect(&self, url: &str) -> Response {
        match HeaderValue::from_str(url) {
            Ok(target) => {
                (StatusCode::SEE_OTHER, [(htmx::HX_REDIRECT, target)], REDIRECTING).into_response()
            }
            Err(_) => Error::InvalidArgument(format!("invalid redirect URL: {url}")).into_response(),
        }
    }
}

/// Builder for [`ViewService`].
///
/// ```rust
/// use acton_view::templates::MemorySource;
/// use acton_view::ViewService;
///
/// let views = ViewService::builder()
///     .with_layouts("app", "minimal")
///     .with_root(
///         MemorySource::new()
///             .with("views/layouts/app.tmpl", "{% block content %}{% endblock %}")
///             .with("views/home.tmpl", "{% extends \"layout\" %}{% block content %}Hi{% endblock %}"),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(views.adapter_names(), vec!["html", "json"]);
/// ```
pub struct ViewServiceBuilder {
    base_layout: String,
    system_layout: String,
    extension: String,
    sources: BTreeMap<String, Arc<dyn TemplateSource>>,
    functions: Vec<FunctionsHook>,
    adapters: Vec<(String, Arc<dyn Adapter>)>,
}

impl Default for ViewServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewServiceBuilder {
    /// Builder with `base` layouts, `.tmpl` templates and no sources
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_layout: DEFAULT_LAYOUT.to_string(),
            system_layout: DEFAULT_LAYOUT.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            sources: BTreeMap::new(),
            functions: Vec::new(),
            adapters: Vec::new(),
        }
    }

    /// Base and system layout names
    #[must_use]
    pub fn with_layouts(mut self, base: impl Into<String>, system: impl Into<String>) -> Self {
        self.base_layout = base.into();
        self.system_layout = system.into();
        self
    }

    /// Template file extension
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Mount the root template source
    #[must_use]
    pub fn with_root(self, source: impl TemplateSource + 'static) -> Self {
        self.with_source(ROOT_SOURCE_ID, source)
    }

    /// Mount a directory as the root template source
    #[must_use]
    pub fn with_template_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.with_root(DirSource::new(dir))
    }

    /// Mount a named template source
    #[must_use]
    pub fn with_source(mut self, id: impl Into<String>, source: impl TemplateSource + 'static) -> Self {
        self.sources.insert(id.into(), Arc::new(source));
        self
    }

    /// Add application template functions
    #[must_use]
    pub fn with_functions(
        mut self,
        hook: impl Fn(&mut Environment<'static>) + Send + Sync + 'static,
    ) -> Self {
        self.functions.push(Arc::new(hook));
        self
    }

    /// Register an adapter; adapters named `html` or `json` replace the defaults
    #[must_use]
    pub fn with_adapter(mut self, name: impl Into<String>, adapter: impl Adapter + 'static) -> Self {
        self.adapters.push((name.into(), Arc::new(adapter)));
        self
    }

    /// Initialize every adapter and build the service
    pub fn build(self) -> Result<ViewService> {
        let service = ViewService {
            adapters: RwLock::new(HashMap::new()),
            base_layout: self.base_layout,
            system_layout: self.system_layout,
        };

        for (name, adapter) in self.adapters {
            service.register_shared_adapter(name, adapter)?;
        }

        let mut html = TemplateAdapter::new()
            .with_extension(self.extension)
            .with_default_layout(service.base_layout.clone());
        for (id, source) in self.sources {
            html = html.with_shared_source(id, source);
        }
        for hook in self.functions {
            html = html.with_functions_hook(hook);
        }
        service.register_default_adapters(html)?;

        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::parts_for;
    use crate::templates::MemorySource;
    use axum::body::to_bytes;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn site() -> MemorySource {
        MemorySource::new()
            .with("views/layouts/base.tmpl", "[{% block content %}{% endblock %}]")
            .with("views/layouts/system.tmpl", "<{% block content %}{% endblock %}>")
            .with(
                "views/sample.tmpl",
                "{% extends \"layout\" %}{% block content %}sample {{ n }}{% endblock %}",
            )
            .with(
                "views/system/404.tmpl",
                "{% extends \"layout\" %}{% block content %}missing{% endblock %}",
            )
    }

    fn service() -> ViewService {
        ViewService::builder()
            .with_layouts("base", "system")
            .with_root(site())
            .build()
            .unwrap()
    }

    /// Records calls and answers with a fixed body.
    #[derive(Default)]
    struct Recording {
        inits: AtomicUsize,
        fail_init: bool,
        body: &'static str,
    }

    impl Recording {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                ..Self::default()
            }
        }
    }

    impl Adapter for Recording {
        fn init(&self) -> Result<()> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            if self.fail_init {
                return Err(Error::InvalidArgument("cannot init".into()));
            }
            Ok(())
        }

        fn render(&self, _parts: &Parts, resp: ViewResponse) -> Response {
            format!("{}:{}:{}", self.body, resp.path(), resp.layout()).into_response()
        }

        fn render_page(&self, _parts: &Parts, page: SystemPage, resp: ViewResponse) -> Response {
            (page.status(), format!("{}:{}", self.body, resp.layout())).into_response()
        }

        fn render_system_error(&self, _parts: &Parts, err: &Error, _resp: ViewResponse) -> Response {
            (err.status_code(), self.body).into_response()
        }
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("sample"), ("sample", None));
        assert_eq!(split_extension("sample.html"), ("sample", Some("html")));
        assert_eq!(split_extension("users/list.json"), ("users/list", Some("json")));
        assert_eq!(split_extension("v1.2/list"), ("v1.2/list", None));
        assert_eq!(split_extension("a/b.tar.gz"), ("a/b.tar", Some("gz")));
    }

    #[test]
    fn test_default_adapters() {
        let views = service();
        assert_eq!(views.adapter_names(), vec!["html", "json"]);
        assert!(views.adapter("html").is_some());
        assert!(views.adapter("pdf").is_none());
    }

    #[tokio::test]
    async fn test_dispatch_html() {
        let views = service();
        let parts = parts_for("/", &[]);

        for path in ["sample", "sample.html"] {
            let resp = ViewResponse::new().with_path(path).with_data_item("n", 1);
            let response = views.render(&parts, resp);
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_string(response).await, "[sample 1]");
        }
    }

    #[tokio::test]
    async fn test_dispatch_json() {
        let views = service();
        let parts = parts_for("/", &[]);

        let response = views.render(&parts, ViewResponse::new().with_path("sample.json"));
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        let value: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(value["status"], "success");

        let resp = ViewResponse::new()
            .with_path("sample")
            .with_header(header::CONTENT_TYPE, "application/json");
        let response = views.render(&parts, resp);
        let value: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(value["code"], 200);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_extension() {
        let views = service();
        let response = views.render(&parts_for("/", &[]), ViewResponse::new().with_path("sample.pdf"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("Adapter not found"));
    }

    #[tokio::test]
    async fn test_custom_adapter_gets_stripped_path_and_base_layout() {
        let views = service();
        views.register_adapter("csv", Recording::new("csv")).unwrap();

        let response = views.render(&parts_for("/", &[]), ViewResponse::new().with_path("report.csv"));
        assert_eq!(body_string(response).await, "csv:report:base");

        let resp = ViewResponse::new().with_path("report.csv").with_layout("wide");
        let response = views.render(&parts_for("/", &[]), resp);
        assert_eq!(body_string(response).await, "csv:report:wide");
    }

    #[tokio::test]
    async fn test_register_replaces_adapter() {
        let views = service();
        views.register_adapter("json", Recording::new("custom-json")).unwrap();

        let response = views.render(&parts_for("/", &[]), ViewResponse::new().with_path("x.json"));
        assert_eq!(body_string(response).await, "custom-json:x:base");
    }

    #[test]
    fn test_failed_registration_is_not_inserted() {
        let views = service();
        let adapter = Recording {
            fail_init: true,
            ..Recording::new("broken")
        };
        assert!(views.register_adapter("broken", adapter).is_err());
        assert!(views.adapter("broken").is_none());
    }

    #[test]
    fn test_builder_adapter_overrides_default() {
        let views = ViewService::builder()
            .with_adapter("html", Recording::new("mine"))
            .build()
            .unwrap();
        assert_eq!(views.adapter_names(), vec!["html", "json"]);
    }

    #[test]
    fn test_reinit_initializes_every_adapter() {
        let views = service();
        let recording = Arc::new(Recording::new("r"));
        views
            .register_shared_adapter("r", recording.clone())
            .unwrap();
        assert_eq!(recording.inits.load(Ordering::SeqCst), 1);

        views.reinit().unwrap();
        assert_eq!(recording.inits.load(Ordering::SeqCst), 2);
    }

    /// Checks during `init` whether the adapter map could be written.
    #[derive(Default)]
    struct LockWatcher {
        views: std::sync::OnceLock<std::sync::Weak<ViewService>>,
        map_writable: std::sync::atomic::AtomicBool,
    }

    impl Adapter for LockWatcher {
        fn init(&self) -> Result<()> {
            if let Some(views) = self.views.get().and_then(std::sync::Weak::upgrade) {
                let writable = views.adapters.try_write().is_some();
                self.map_writable.store(writable, Ordering::SeqCst);
            }
            Ok(())
        }

        fn render(&self, _parts: &Parts, _resp: ViewResponse) -> Response {
            StatusCode::NO_CONTENT.into_response()
        }

        fn render_page(&self, _parts: &Parts, page: SystemPage, _resp: ViewResponse) -> Response {
            page.status().into_response()
        }

        fn render_system_error(&self, _parts: &Parts, err: &Error, _resp: ViewResponse) -> Response {
            err.status_code().into_response()
        }
    }

    #[test]
    fn test_reinit_releases_adapter_map_during_init() {
        let views = Arc::new(service());
        let watcher = Arc::new(LockWatcher::default());
        views
            .register_shared_adapter("watch", watcher.clone())
            .unwrap();
        watcher.views.set(Arc::downgrade(&views)).unwrap();

        views.reinit().unwrap();
        assert!(watcher.map_writable.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_system_pages_use_system_layout() {
        let views = service();
        let parts = parts_for("/gone", &[]);

        let response = views.render_not_found(&parts);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "<missing>");

        let response = views.render_forbidden(&parts);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_string(response).await, "Forbidden");

        let response = views.render_maintenance_as("json", &parts);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        views.register_adapter("rec", Recording::new("rec")).unwrap();
        let response = views.render_unauthorized_as("rec", &parts);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_string(response).await, "rec:system");

        let response = views.render_method_not_allowed_as("nope", &parts);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_system_error() {
        let views = service();
        let err = Error::TemplateNotFound("x".into());

        let response = views.render_system_error(&parts_for("/", &[]), &err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "template not found: x");

        let response = views.render_system_error_as("json", &parts_for("/", &[]), &err);
        let value: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(value["status"], "error");
    }

    #[test]
    fn test_new_responses() {
        let views = service();
        assert_eq!(views.new_response("admin").layout(), "admin");
        assert_eq!(views.new_system_response().layout(), "system");
    }

    #[tokio::test]
    async fn test_redirect_htmx() {
        let views = service();
        let parts = parts_for("/", &[("HX-Request", "true")]);
        let response = views.redirect(&parts, "/login");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("hx-redirect").unwrap(), "/login");
        assert_eq!(body_string(response).await, "redirecting...");
    }

    #[tokio::test]
    async fn test_redirect_boosted_is_plain() {
        let views = service();
        let parts = parts_for("/", &[("HX-Request", "true"), ("HX-Boosted", "true")]);
        let response = views.redirect(&parts, "/login");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[tokio::test]
    async fn test_redirect_xhr() {
        let views = service();
        let parts = parts_for("/", &[("X-Requested-With", "XMLHttpRequest")]);
        let response = views.redirect(&parts, "/login");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let value: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            value,
            json!({"status": "redirect", "message": "redirecting...", "url": "/login"})
        );
    }

    #[tokio::test]
    async fn test_redirect_plain() {
        let views = service();
        let response = views.redirect(&parts_for("/", &[]), "/search?q=a&b=<c>");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/search?q=a&b=<c>"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );

        let body = body_string(response).await;
        assert!(body.starts_with("<a href=\""));
        assert!(body.ends_with("\">Found</a>.\n"));
        assert!(body.contains("&amp;"));
        assert!(body.contains("&lt;c&gt;"));
    }

    #[tokio::test]
    async fn test_redirect_plain_post_has_no_body() {
        let views = service();
        let mut parts = parts_for("/form", &[]);
        parts.method = Method::POST;

        let response = views.redirect(&parts, "/done");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/done");
        assert!(body_string(response).await.is_empty());
    }

    #[test]
    fn test_from_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("views/layouts")).unwrap();
        std::fs::write(
            dir.path().join("views/layouts/base.tmpl"),
            "{% block content %}{% endblock %}",
        )
        .unwrap();
        std::fs::write(dir.path().join("views/home.tmpl"), "home").unwrap();

        let mut config = Config::default();
        config.views.template_dir = Some(dir.path().to_path_buf());
        let views = ViewService::from_config(&config).unwrap();
        assert_eq!(views.base_layout(), "base");
        assert_eq!(views.adapter_names(), vec!["html", "json"]);
    }
}

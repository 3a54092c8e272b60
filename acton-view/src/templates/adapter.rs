//! HTML adapter backed by compiled minijinja environments.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use http::request::Parts;
use minijinja::{AutoEscape, Environment};
use parking_lot::RwLock;
use serde::Serialize;

use super::functions;
use super::source::TemplateSource;
use crate::adapter::{Adapter, SystemPage};
use crate::error::{plain_text, Error, Result};
use crate::response::{view_data, ViewResponse};

/// Id of the source whose page keys carry no prefix
pub const ROOT_SOURCE_ID: &str = "__ROOT__";
/// Directory holding shared partials
pub const PARTIALS_DIR: &str = "partials";
/// Directory holding pages
pub const VIEWS_DIR: &str = "views";
/// Directory holding layouts, inside the root source
pub const LAYOUTS_DIR: &str = "views/layouts";
/// Template name every layout is registered under at render time
pub const LAYOUT_TEMPLATE: &str = "layout";
/// Default template file extension
pub const DEFAULT_EXTENSION: &str = ".tmpl";
/// Default layout name
pub const DEFAULT_LAYOUT: &str = "base";

/// Hook adding application functions, filters or globals to the base environment
pub type FunctionsHook = Arc<dyn Fn(&mut Environment<'static>) + Send + Sync>;

struct CompiledPage {
    env: Environment<'static>,
    name: String,
}

#[derive(Default)]
struct Registry {
    pages: HashMap<String, CompiledPage>,
    layouts: HashMap<String, String>,
}

/// A page cloned out of the registry with its layout attached.
///
/// Rendering works on this copy only, so nothing done while rendering can
/// reach the cached page.
pub struct PageInstance {
    env: Environment<'static>,
    name: String,
}

impl PageInstance {
    /// Render with `ctx` as the template context
    pub fn render<S: Serialize>(&self, ctx: S) -> Result<String> {
        let template = self.env.get_template(&self.name)?;
        Ok(template.render(ctx)?)
    }
}

/// Renders HTML from templates in one or more [`TemplateSource`]s.
///
/// Pages live under `views/` and are keyed by their path relative to it
/// without extension (`views/users/show.tmpl` is `users/show`). Pages from a
/// source other than the root are keyed `<id>:<path>`. Each page is compiled
/// into its own copy of a base environment holding every partial under
/// `partials/` plus the helper table.
///
/// Pages pick up their layout with `{% extends "layout" %}`; the layout named
/// by the response (or the default layout) is read from `views/layouts/` of
/// the root source and attached per render.
///
/// ```rust
/// use acton_view::templates::{MemorySource, TemplateAdapter};
/// use acton_view::Adapter;
///
/// let adapter = TemplateAdapter::new()
///     .with_root(
///         MemorySource::new()
///             .with("views/layouts/base.tmpl", "<main>{% block content %}{% endblock %}</main>")
///             .with("views/home.tmpl", "{% extends \"layout\" %}{% block content %}Hi{% endblock %}"),
///     );
/// adapter.init().unwrap();
/// assert!(adapter.has_page("home"));
/// ```
pub struct TemplateAdapter {
    extension: String,
    default_layout: String,
    sources: BTreeMap<String, Arc<dyn TemplateSource>>,
    functions: Vec<FunctionsHook>,
    registry: RwLock<Arc<Registry>>,
}

impl fmt::Debug for TemplateAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateAdapter")
            .field("extension", &self.extension)
            .field("default_layout", &self.default_layout)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("pages", &self.registry.read().pages.len())
            .finish()
    }
}

impl Default for TemplateAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateAdapter {
    /// Adapter without sources, using `.tmpl` files and the `base` layout
    #[must_use]
    pub fn new() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            default_layout: DEFAULT_LAYOUT.to_string(),
            sources: BTreeMap::new(),
            functions: Vec::new(),
            registry: RwLock::new(Arc::new(Registry::default())),
        }
    }

    /// Mount the root source
    #[must_use]
    pub fn with_root(self, source: impl TemplateSource + 'static) -> Self {
        self.with_source(ROOT_SOURCE_ID, source)
    }

    /// Mount a named source; its page keys are prefixed with `id:`
    #[must_use]
    pub fn with_source(
        mut self,
        id: impl Into<String>,
        source: impl TemplateSource + 'static,
    ) -> Self {
        self.sources.insert(id.into(), Arc::new(source));
        self
    }

    /// Mount an already shared source
    #[must_use]
    pub fn with_shared_source(
        mut self,
        id: impl Into<String>,
        source: Arc<dyn TemplateSource>,
    ) -> Self {
        self.sources.insert(id.into(), source);
        self
    }

    /// Template file extension, with or without the leading dot
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = if extension.starts_with('.') {
            extension
        } else {
            format!(".{extension}")
        };
        self
    }

    /// Layout used when a response names none
    #[must_use]
    pub fn with_default_layout(mut self, layout: impl Into<String>) -> Self {
        self.default_layout = layout.into();
        self
    }

    /// Add application functions to every page environment
    #[must_use]
    pub fn with_functions(
        mut self,
        hook: impl Fn(&mut Environment<'static>) + Send + Sync + 'static,
    ) -> Self {
        self.functions.push(Arc::new(hook));
        self
    }

    /// Add an already shared functions hook
    #[must_use]
    pub fn with_functions_hook(mut self, hook: FunctionsHook) -> Self {
        self.functions.push(hook);
        self
    }

    /// Whether a page is registered under `key`
    #[must_use]
    pub fn has_page(&self, key: &str) -> bool {
        self.registry.read().pages.contains_key(key)
    }

    /// Registered page keys, sorted
    #[must_use]
    pub fn page_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.registry.read().pages.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Loaded layout names, sorted
    #[must_use]
    pub fn layout_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.read().layouts.keys().cloned().collect();
        names.sort();
        names
    }

    /// Clone the page `key` and attach `layout` to the copy
    pub fn instantiate(&self, key: &str, layout: &str) -> Result<PageInstance> {
        let registry = self.registry.read().clone();

        let page = registry
            .pages
            .get(key)
            .ok_or_else(|| Error::TemplateNotFound(key.to_string()))?;
        let layout_source = registry
            .layouts
            .get(layout)
            .ok_or_else(|| Error::LayoutNotFound(layout.to_string()))?;

        let mut env = page.env.clone();
        env.add_template_owned(LAYOUT_TEMPLATE, layout_source.clone())?;

        Ok(PageInstance {
            env,
            name: page.name.clone(),
        })
    }

    fn base_environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        functions::register(&mut env);
        for hook in &self.functions {
            hook(&mut env);
        }
        env
    }

    fn template_name(id: &str, path: &str) -> String {
        if id == ROOT_SOURCE_ID {
            path.to_string()
        } else {
            format!("{id}:{path}")
        }
    }

    fn strip_dir_and_extension<'a>(&self, path: &'a str, dir: &str) -> Option<&'a str> {
        path.strip_prefix(dir)?
            .strip_prefix('/')?
            .strip_suffix(self.extension.as_str())
    }

    fn build_registry(&self) -> Result<Registry> {
        let mut base = self.base_environment();
        for (id, source) in &self.sources {
            for path in source.files(PARTIALS_DIR)? {
                if !path.ends_with(&self.extension) {
                    continue;
                }
                let contents = source.read(&path)?;
                base.add_template_owned(Self::template_name(id, &path), contents)?;
            }
        }

        let mut registry = Registry::default();

        if let Some(root) = self.sources.get(ROOT_SOURCE_ID) {
            for path in root.files(LAYOUTS_DIR)? {
                let Some(name) = self.strip_dir_and_extension(&path, LAYOUTS_DIR) else {
                    continue;
                };
                let contents = root.read(&path)?;
                // parse once up front so a broken layout fails init rather than a render
                base.clone()
                    .add_template_owned(LAYOUT_TEMPLATE, contents.clone())?;
                registry.layouts.insert(name.to_string(), contents);
            }
        }

        let layouts_prefix = format!("{LAYOUTS_DIR}/");
        for (id, source) in &self.sources {
            for path in source.files(VIEWS_DIR)? {
                if path.starts_with(&layouts_prefix) {
                    continue;
                }
                let Some(rel) = self.strip_dir_and_extension(&path, VIEWS_DIR) else {
                    continue;
                };
                let key = Self::template_name(id, rel);
                let name = Self::template_name(id, &path);

                let contents = source.read(&path)?;
                let mut env = base.clone();
                env.add_template_owned(name.clone(), contents)?;

                tracing::debug!(page = %key, "Compiled page template");
                registry.pages.insert(key, CompiledPage { env, name });
            }
        }

        Ok(registry)
    }

    fn layout_for<'a>(&'a self, resp: &'a ViewResponse) -> &'a str {
        if resp.layout().is_empty() {
            &self.default_layout
        } else {
            resp.layout()
        }
    }
}

impl Adapter for TemplateAdapter {
    /// Rebuild the registry from the mounted sources.
    ///
    /// The new registry replaces the current one only when every partial,
    /// layout and page compiled; on error the previous registry stays in use.
    fn init(&self) -> Result<()> {
        let registry = self.build_registry()?;
        tracing::info!(
            pages = registry.pages.len(),
            layouts = registry.layouts.len(),
            "Template registry loaded"
        );
        *self.registry.write() = Arc::new(registry);
        Ok(())
    }

    fn render(&self, parts: &Parts, resp: ViewResponse) -> Response {
        let page = match self.instantiate(resp.path(), self.layout_for(&resp)) {
            Ok(page) => page,
            Err(err) => {
                tracing::error!("Template lookup failed: {}", err);
                return plain_text(err.status_code(), err.to_string());
            }
        };

        match page.render(view_data(&resp, parts)) {
            Ok(body) => {
                let status = resp.status().unwrap_or(StatusCode::OK);
                let mut response = (status, Html(body)).into_response();
                response.headers_mut().extend(resp.http_headers());
                response
            }
            Err(err) => {
                tracing::error!(path = resp.path(), "Template execution failed: {}", err);
                if resp.path() == SystemPage::ServerError.path() {
                    plain_text(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("error executing template: {err}"),
                    )
                } else {
                    self.render_system_error(parts, &err, resp)
                }
            }
        }
    }

    fn render_page(&self, parts: &Parts, page: SystemPage, resp: ViewResponse) -> Response {
        let path = page.path();
        if self.has_page(&path) {
            return self.render(parts, resp.with_path(path).with_status(page.status()));
        }
        plain_text(page.status(), page.fallback_body())
    }

    fn render_system_error(&self, parts: &Parts, err: &Error, resp: ViewResponse) -> Response {
        tracing::error!("Server error: {}", err);

        let path = SystemPage::ServerError.path();
        if self.has_page(&path) {
            let resp = resp
                .with_path(path)
                .with_errors(err.to_string(), BTreeMap::new())
                .status_server_error();
            return self.render(parts, resp);
        }
        plain_text(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

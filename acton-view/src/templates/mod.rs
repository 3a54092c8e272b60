//! minijinja-backed HTML rendering.
//!
//! # Features
//!
//! - **Compile once, render many**: every page is compiled at init into its own
//!   environment and cloned per render, so per-request state never leaks into
//!   the cache
//! - **Layouts**: pages `{% extends "layout" %}`; the layout is chosen per response
//! - **Partials**: everything under `partials/` is includable from every page
//! - **Multiple sources**: directories, embedded assets or in-memory maps, with
//!   non-root sources namespaced as `<id>:<page>`
//! - **Helper table**: form, string, number and time helpers (see [`functions`])
//!
//! # Layout of a source
//!
//! ```text
//! partials/nav.tmpl           {% include "partials/nav.tmpl" %}
//! views/home.tmpl             page "home"
//! views/users/show.tmpl       page "users/show"
//! views/layouts/base.tmpl     layout "base"
//! views/system/404.tmpl       not-found page
//! ```
//!
//! ```html
//! <!-- views/layouts/base.tmpl -->
//! <!DOCTYPE html>
//! <html>
//!   <head>
//!     <title>{{ view.title }}</title>
//!     <meta name="htmx-config" content='{{ view.htmx_nonce }}'>
//!   </head>
//!   <body>{% block content %}{% endblock %}</body>
//! </html>
//! ```
//!
//! ```html
//! <!-- views/home.tmpl -->
//! {% extends "layout" %}
//! {% block content %}
//!   {% if view.has_error %}<p class="error">{{ view.error }}</p>{% endif %}
//!   <h1>{{ pluralize(count, "message", "messages") }}</h1>
//! {% endblock %}
//! ```

mod adapter;
pub mod functions;
mod helpers;
mod source;

pub use adapter::{
    FunctionsHook, PageInstance, TemplateAdapter, DEFAULT_EXTENSION, DEFAULT_LAYOUT,
    LAYOUTS_DIR, LAYOUT_TEMPLATE, PARTIALS_DIR, ROOT_SOURCE_ID, VIEWS_DIR,
};
pub use helpers::{
    class_map, humanize, input_attrs, is_blank, is_even, is_odd, not_blank, pluralize, slugify,
    srcset, to_int, truncate, yesno, InputAttrs,
};
pub use source::{DirSource, EmbeddedSource, MemorySource, TemplateSource};

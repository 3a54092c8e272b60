//! Where template files come from.
//!
//! A source exposes the conventional `partials/`, `views/`,
//! `views/layouts/` and `views/system/` directories. Paths are always
//! `/`-separated and relative to the source root.

use std::collections::BTreeMap;
use std::io;
use std::marker::PhantomData;
use std::path::{Component, Path, PathBuf};

use rust_embed::Embed;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Read-only tree of template files.
pub trait TemplateSource: Send + Sync {
    /// Every file below `dir`, recursively, sorted. Empty when `dir` is absent.
    fn files(&self, dir: &str) -> Result<Vec<String>>;

    /// Contents of the file at `path`
    fn read(&self, path: &str) -> Result<String>;
}

fn not_found(path: &str) -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("template source file not found: {path}"),
    ))
}

fn relative_slash_path(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Templates on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Serve templates below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateSource for DirSource {
    fn files(&self, dir: &str) -> Result<Vec<String>> {
        let base = self.root.join(dir);
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&base).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(rel) = relative_slash_path(entry.path(), &self.root) {
                files.push(rel);
            }
        }
        Ok(files)
    }

    fn read(&self, path: &str) -> Result<String> {
        let full = self.root.join(path);
        std::fs::read_to_string(&full).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => not_found(path),
            _ => Error::Io(err),
        })
    }
}

/// Templates compiled into the binary with `rust-embed`.
///
/// ```rust,ignore
/// use acton_view::templates::EmbeddedSource;
/// use rust_embed::Embed;
///
/// #[derive(Embed)]
/// #[folder = "templates/"]
/// struct Templates;
///
/// let source = EmbeddedSource::<Templates>::new();
/// ```
pub struct EmbeddedSource<E> {
    _assets: PhantomData<fn() -> E>,
}

impl<E: Embed> EmbeddedSource<E> {
    /// Serve the files embedded by `E`
    #[must_use]
    pub fn new() -> Self {
        Self {
            _assets: PhantomData,
        }
    }
}

impl<E: Embed> Default for EmbeddedSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Embed> TemplateSource for EmbeddedSource<E> {
    fn files(&self, dir: &str) -> Result<Vec<String>> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        let mut files: Vec<String> = E::iter()
            .filter(|name| name.starts_with(&prefix))
            .map(|name| name.into_owned())
            .collect();
        files.sort();
        Ok(files)
    }

    fn read(&self, path: &str) -> Result<String> {
        let file = E::get(path).ok_or_else(|| not_found(path))?;
        String::from_utf8(file.data.into_owned())
            .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
    }
}

/// Templates held in memory.
///
/// ```rust
/// use acton_view::templates::{MemorySource, TemplateSource};
///
/// let source = MemorySource::new()
///     .with("views/home.tmpl", "Hello")
///     .with("views/layouts/base.tmpl", "{% block content %}{% endblock %}");
/// assert_eq!(source.files("views/layouts").unwrap(), vec!["views/layouts/base.tmpl"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    /// Empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Add or replace a file
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl TemplateSource for MemorySource {
    fn files(&self, dir: &str) -> Result<Vec<String>> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        Ok(self
            .files
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .cloned()
            .collect())
    }

    fn read(&self, path: &str) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| not_found(path))
    }
}

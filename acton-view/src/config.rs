//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `ACTON_VIEW_`, nesting separated by `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/acton-view/{service_name}/config.toml
//! 4. System directory: /etc/acton-view/{service_name}/config.toml
//! 5. Default values
//!
//! ```toml
//! [service]
//! name = "storefront"
//! log_level = "debug"
//!
//! [views]
//! extension = ".tmpl"
//! base_layout = "base"
//! system_layout = "system"
//! template_dir = "./templates"
//!
//! [views.sources]
//! blog = "./plugins/blog/templates"
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// View rendering configuration
    #[serde(default)]
    pub views: ViewsConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Log level (trace, debug, info, warn, error) or a full `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Template and layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewsConfig {
    /// File extension of template sources, including the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Layout used when a response does not name one
    #[serde(default = "default_layout")]
    pub base_layout: String,

    /// Layout used for system pages (404, 500, ...)
    #[serde(default = "default_layout")]
    pub system_layout: String,

    /// Root template directory (mounted as the root source)
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Additional named template directories; their page keys are prefixed with the name
    #[serde(default)]
    pub sources: BTreeMap<String, PathBuf>,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            base_layout: default_layout(),
            system_layout: default_layout(),
            template_dir: None,
            sources: BTreeMap::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_extension() -> String {
    ".tmpl".to_string()
}

fn default_layout() -> String {
    "base".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Environment variables (`ACTON_VIEW_` prefix) override all file-based configs.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "acton-view".to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so that higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed("ACTON_VIEW_").split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses XDG directories and loads directly from the given path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("ACTON_VIEW_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// Find all possible config file paths for a service, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("acton-view");
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Some(path) = xdg_dirs.find_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc/acton-view")
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "acton-view".to_string(),
                log_level: default_log_level(),
            },
            views: ViewsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.views.extension, ".tmpl");
        assert_eq!(config.views.base_layout, "base");
        assert_eq!(config.views.system_layout, "base");
        assert!(config.views.template_dir.is_none());
        assert!(config.views.sources.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "storefront"

[views]
extension = ".html"
system_layout = "minimal"
template_dir = "/srv/templates"

[views.sources]
blog = "/srv/blog"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "storefront");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.views.extension, ".html");
        assert_eq!(config.views.base_layout, "base");
        assert_eq!(config.views.system_layout, "minimal");
        assert_eq!(
            config.views.template_dir,
            Some(PathBuf::from("/srv/templates"))
        );
        assert_eq!(
            config.views.sources.get("blog"),
            Some(&PathBuf::from("/srv/blog"))
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_from("/nonexistent/acton-view/config.toml").unwrap();
        assert_eq!(config.service.name, "acton-view");
        assert_eq!(config.views.extension, ".tmpl");
    }
}

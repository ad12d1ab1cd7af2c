//! `docs.toml` loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use demoblock_server::DevServerConfig;
use demoblock_static::BuildConfig;
use demoblock_transform::{PartialOptions, DEFAULT_DEBOUNCE, DEFAULT_TARGET};

/// Configuration file structure (docs.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub docs: DocsConfig,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub demo: DemoSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize)]
pub struct DocsConfig {
    #[serde(default = "default_docs_dir")]
    pub dir: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Paths to CSS stylesheets to include
    #[serde(default)]
    pub styles: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            dir: default_docs_dir(),
            output: default_output(),
            title: default_title(),
            base_url: default_base_url(),
            styles: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_minify")]
    pub minify: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

/// Site-wide demo options plus the transpiler target.
#[derive(Debug, Deserialize, Default)]
pub struct DemoSettings {
    #[serde(flatten)]
    pub options: PartialOptions,
    pub target: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// Quiet period before editor input is transformed
    pub debounce_ms: Option<u64>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            debounce_ms: None,
        }
    }
}

fn default_docs_dir() -> String {
    "docs".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_title() -> String {
    "Documentation".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_minify() -> bool {
    true
}
fn default_port() -> u16 {
    7777
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl ConfigFile {
    /// Load configuration if the file exists.
    ///
    /// Returns an error if the config file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Settings for a static build.
    pub fn build_config(&self) -> BuildConfig {
        BuildConfig {
            docs_dir: PathBuf::from(&self.docs.dir),
            output_dir: PathBuf::from(&self.docs.output),
            minify: self.build.minify,
            base_url: self.docs.base_url.clone(),
            title: self.docs.title.clone(),
            styles: self.docs.styles.clone(),
            demo: self.demo.options.clone(),
            target: self
                .demo
                .target
                .clone()
                .unwrap_or_else(|| DEFAULT_TARGET.to_string()),
        }
    }

    /// Settings for the dev server.
    pub fn server_config(&self) -> DevServerConfig {
        DevServerConfig {
            site: self.build_config(),
            port: self.server.port,
            host: self.server.host.clone(),
            open: true,
            debounce: self
                .server
                .debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_DEBOUNCE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demoblock_transform::Layout;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let config = ConfigFile::load(&temp.path().join("docs.toml")).unwrap();

        let build = config.build_config();
        assert_eq!(build.docs_dir, PathBuf::from("docs"));
        assert_eq!(build.target, DEFAULT_TARGET);
        assert_eq!(build.demo, PartialOptions::default());
        assert_eq!(config.server_config().debounce, DEFAULT_DEBOUNCE);
    }

    #[test]
    fn reads_all_sections() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("docs.toml");
        fs::write(
            &path,
            r#"
[docs]
dir = "site"
title = "Demos"
styles = ["theme.css"]

[build]
minify = false

[demo]
layout = "column"
showCodeByDefault = true
target = "es2020"

[demo.scope]
dayjs = "https://unpkg.com/dayjs"

[server]
port = 8080
debounce_ms = 150
"#,
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap();
        let build = config.build_config();

        assert_eq!(build.docs_dir, PathBuf::from("site"));
        assert_eq!(build.title, "Demos");
        assert!(!build.minify);
        assert_eq!(build.target, "es2020");
        assert_eq!(build.demo.layout, Some(Layout::Column));
        assert_eq!(build.demo.show_code_by_default, Some(true));
        assert_eq!(
            build.demo.scope.unwrap().get("dayjs").map(String::as_str),
            Some("https://unpkg.com/dayjs")
        );

        let server = config.server_config();
        assert_eq!(server.port, 8080);
        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.debounce, Duration::from_millis(150));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("docs.toml");
        fs::write(&path, "[docs\ndir = ").unwrap();

        assert!(ConfigFile::load(&path).is_err());
    }

    #[test]
    fn rejects_unknown_layout() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("docs.toml");
        fs::write(&path, "[demo]\nlayout = \"diagonal\"\n").unwrap();

        assert!(ConfigFile::load(&path).is_err());
    }
}

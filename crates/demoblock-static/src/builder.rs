//! Static site builder.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use demoblock_transform::{PartialOptions, TranspilerCache, DEFAULT_TARGET};

use crate::assets::AssetPipeline;
use crate::render::{prepare_demo, render_page, RenderMode};
use crate::site::{build_navigation, discover_pages, Page};
use crate::templates::{NavItem, TemplateEngine};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source docs directory
    pub docs_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,

    /// Base URL for the site
    pub base_url: String,

    /// Site title
    pub title: String,

    /// Paths to CSS stylesheets to include
    pub styles: Vec<String>,

    /// Site-wide demo options, applied below each block's directive
    pub demo: PartialOptions,

    /// Transpiler target
    pub target: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("dist"),
            minify: true,
            base_url: "/".to_string(),
            title: "Documentation".to_string(),
            styles: vec![],
            demo: PartialOptions::default(),
            target: DEFAULT_TARGET.to_string(),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Number of demo blocks rendered
    pub demos: usize,

    /// Demo blocks that rendered an error display
    pub failed_demos: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read docs directory: {0}")]
    ReadError(String),

    #[error("Failed to parse page: {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

impl From<minijinja::Error> for BuildError {
    fn from(e: minijinja::Error) -> Self {
        Self::TemplateError(e.to_string())
    }
}

/// Demo markup for one page, keyed by block id.
#[derive(Debug, Default)]
struct PageDemos {
    markup: HashMap<String, String>,
    failed: usize,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    cache: Arc<TranspilerCache>,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder with an oxc transpiler for the configured target.
    pub fn new(config: BuildConfig) -> Self {
        let cache = Arc::new(TranspilerCache::oxc(config.target.clone()));
        Self::with_cache(config, cache)
    }

    /// Create a builder that shares an existing transpiler cache.
    pub fn with_cache(config: BuildConfig, cache: Arc<TranspilerCache>) -> Self {
        Self {
            config,
            cache,
            templates: TemplateEngine::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let pages = discover_pages(&self.config.docs_dir, &self.config.base_url)?;
        let nav = build_navigation(&pages, &self.config.base_url);

        // Transforms share one transpiler and run on the async side; page
        // rendering is synchronous and fans out over rayon.
        let mut demos = Vec::with_capacity(pages.len());
        for page in &pages {
            demos.push(self.prepare_page_demos(page).await?);
        }

        let rendered: Vec<Result<(), BuildError>> = pages
            .par_iter()
            .zip(demos.par_iter())
            .map(|(page, demos)| self.build_page(page, &nav, demos))
            .collect();

        for result in rendered {
            result?;
        }

        self.generate_assets()?;
        self.generate_search_index(&pages)?;
        self.generate_sitemap(&pages)?;

        let result = BuildResult {
            pages: pages.len(),
            demos: demos.iter().map(|d| d.markup.len()).sum(),
            failed_demos: demos.iter().map(|d| d.failed).sum(),
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        };

        tracing::debug!(
            "Built {} pages with {} demos ({} failed)",
            result.pages,
            result.demos,
            result.failed_demos
        );

        Ok(result)
    }

    /// Transform and render every demo block of a page.
    async fn prepare_page_demos(&self, page: &Page) -> Result<PageDemos, BuildError> {
        let mut demos = PageDemos::default();

        for block in page.doc.demo_blocks() {
            let (demo, markup) = prepare_demo(
                &self.templates,
                &self.cache,
                block,
                &self.config.demo,
                RenderMode::Static,
            )
            .await?;

            let ok = demo.map_or(false, |d| !d.result().is_error());
            if !ok {
                tracing::warn!(
                    "Demo {} in {} rendered an error",
                    block.id,
                    page.source_path.display()
                );
                demos.failed += 1;
            }
            demos.markup.insert(block.id.clone(), markup);
        }

        Ok(demos)
    }

    /// Render and write a single page.
    fn build_page(&self, page: &Page, nav: &[NavItem], demos: &PageDemos) -> Result<(), BuildError> {
        let html = render_page(&self.templates, &self.config, page, nav, &demos.markup, vec![])?;

        let output_path = page.output_path(&self.config.output_dir, &self.config.base_url);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(&output_path, html).map_err(|e| BuildError::WriteError(e.to_string()))?;
        Ok(())
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");
        fs::create_dir_all(&assets_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Failed to minify CSS: {}", e);
                css
            })
        } else {
            css
        };
        fs::write(assets_dir.join("main.css"), css)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(assets_dir.join("main.js"), AssetPipeline::generate_js())
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        for style_path in &self.config.styles {
            let source_path = Path::new(style_path);
            if !source_path.exists() {
                tracing::warn!("Stylesheet not found: {}", style_path);
                continue;
            }

            let filename = source_path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("style.css");
            let content = fs::read_to_string(source_path)
                .map_err(|e| BuildError::ReadError(format!("Failed to read stylesheet: {}", e)))?;
            fs::write(assets_dir.join(filename), content)
                .map_err(|e| BuildError::WriteError(e.to_string()))?;
            tracing::info!("Copied stylesheet from {}", style_path);
        }

        Ok(())
    }

    /// Generate search index.
    fn generate_search_index(&self, pages: &[Page]) -> Result<(), BuildError> {
        let index: Vec<serde_json::Value> = pages
            .iter()
            .map(|page| {
                let description = page
                    .doc
                    .frontmatter
                    .as_ref()
                    .and_then(|f| f.description.clone())
                    .unwrap_or_default();

                let content = page
                    .doc
                    .content
                    .lines()
                    .filter(|l| !l.starts_with('#') && !l.starts_with("```"))
                    .take(10)
                    .collect::<Vec<_>>()
                    .join(" ");

                serde_json::json!({
                    "title": page.title(),
                    "description": description,
                    "url": page.url,
                    "content": content,
                    "demos": page.doc.demo_blocks().count(),
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&index)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(self.config.output_dir.join("search-index.json"), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }

    /// Generate sitemap and robots.txt.
    fn generate_sitemap(&self, pages: &[Page]) -> Result<(), BuildError> {
        let urls: Vec<String> = pages
            .iter()
            .map(|page| format!("  <url>\n    <loc>{}</loc>\n  </url>", page.url))
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );

        fs::write(self.config.output_dir.join("sitemap.xml"), sitemap)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}sitemap.xml",
            self.config.base_url
        );
        fs::write(self.config.output_dir.join("robots.txt"), robots)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demoblock_transform::Layout;
    use tempfile::tempdir;

    const COUNTER: &str = r#"---
title: Counter
---
# Counter

```html vanilla layout=column
<template><button id="inc">0</button></template>
<script>
const button = document.getElementById('inc');
button.addEventListener('click', () => { button.textContent = Number(button.textContent) + 1; });
</script>
```

```jsx react showCode=false
ReactDOM.createRoot(CONTAINER).render(<p>Hello</p>);
```

```html vanilla live=window.x
<b>broken</b>
```
"#;

    fn site(files: &[(&str, &str)]) -> (tempfile::TempDir, BuildConfig) {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        for (name, content) in files {
            let path = docs.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        let config = BuildConfig {
            docs_dir: docs,
            output_dir: temp.path().join("dist"),
            ..Default::default()
        };
        (temp, config)
    }

    #[tokio::test]
    async fn builds_simple_site() {
        let (_temp, config) = site(&[("index.mdx", "---\ntitle: Home\n---\n# Welcome\n")]);
        let out = config.output_dir.clone();

        let result = StaticBuilder::new(config).build().await.unwrap();

        assert_eq!(result.pages, 1);
        assert_eq!(result.demos, 0);
        assert!(out.join("index.html").exists());
        assert!(out.join("assets/main.css").exists());
        assert!(out.join("assets/main.js").exists());
        assert!(out.join("sitemap.xml").exists());
        assert!(out.join("robots.txt").exists());
    }

    #[tokio::test]
    async fn renders_demo_blocks() {
        let (_temp, config) = site(&[("counter.md", COUNTER)]);
        let out = config.output_dir.clone();

        let result = StaticBuilder::new(config).build().await.unwrap();

        assert_eq!(result.demos, 3);
        assert_eq!(result.failed_demos, 1);

        let html = fs::read_to_string(out.join("counter/index.html")).unwrap();
        assert!(html.contains("dpdb__container-column"));
        assert!(html.contains(r#"data-kind="react""#));
        assert!(html.contains("React.createElement"));
        assert!(html.contains("dpdb--invalid"));
        assert!(!html.contains("```"));
    }

    #[tokio::test]
    async fn applies_site_demo_options() {
        let (_temp, mut config) = site(&[(
            "index.md",
            "# Demo\n\n```html vanilla\n<template><i>x</i></template>\n```\n",
        )]);
        config.demo = PartialOptions {
            layout: Some(Layout::RowReverse),
            show_code_by_default: Some(true),
            ..Default::default()
        };
        let out = config.output_dir.clone();

        StaticBuilder::new(config).build().await.unwrap();

        let html = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(html.contains("dpdb__container-row-reverse"));
        assert!(html.contains("Hide code"));
    }

    #[tokio::test]
    async fn invalid_target_renders_error_demos() {
        let (_temp, mut config) = site(&[("index.md", COUNTER)]);
        config.target = "es1999".to_string();

        let result = StaticBuilder::new(config).build().await.unwrap();

        assert_eq!(result.demos, 3);
        assert_eq!(result.failed_demos, 3);
    }

    #[tokio::test]
    async fn generates_search_index() {
        let (_temp, config) = site(&[("index.mdx", "---\ntitle: Test\n---\n# Searchable Content")]);
        let out = config.output_dir.clone();

        StaticBuilder::new(config).build().await.unwrap();

        let index = fs::read_to_string(out.join("search-index.json")).unwrap();
        assert!(index.contains("Test"));
    }

    #[tokio::test]
    async fn missing_docs_dir_fails() {
        let temp = tempdir().unwrap();
        let builder = StaticBuilder::new(BuildConfig {
            docs_dir: temp.path().join("nope"),
            output_dir: temp.path().join("dist"),
            ..Default::default()
        });

        assert!(matches!(builder.build().await, Err(BuildError::ReadError(_))));
    }
}

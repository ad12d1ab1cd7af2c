//! Demo block markup.

use std::collections::HashMap;
use std::path::Path;

use demoblock_mdx::CodeBlock;
use demoblock_transform::{preview_document, DemoBlock, PartialOptions, TranspilerCache};

use crate::builder::BuildConfig;
use crate::site::Page;
use crate::templates::{Context, DemoView, NavItem, TemplateEngine};

/// How demo blocks are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Read-only code panel (static output).
    #[default]
    Static,
    /// Editable code panel for live demos (dev server).
    Live,
}

/// Build the view model for a demo in its current state.
pub fn demo_view(id: &str, demo: &DemoBlock, mode: RenderMode, dark: bool) -> DemoView {
    let options = demo.options();
    DemoView {
        id: id.to_string(),
        kind: demo.kind().to_string(),
        layout: options.layout.as_str().to_string(),
        direction: demo.direction().as_str().to_string(),
        language: demo.kind().editor_language().to_string(),
        show_code: options.show_code,
        code_visible: demo.code_visible(),
        editable: mode == RenderMode::Live && demo.is_live(),
        source: demo.code().to_string(),
        srcdoc: preview_document(demo.result(), &options.scope, dark),
    }
}

/// Build the demo for a code block, transform it and render its markup.
///
/// Returns the demo alongside the markup so callers can keep its state. An
/// invalid directive yields no demo and an error fragment instead.
pub async fn prepare_demo(
    templates: &TemplateEngine,
    cache: &TranspilerCache,
    block: &CodeBlock,
    site: &PartialOptions,
    mode: RenderMode,
) -> Result<(Option<DemoBlock>, String), minijinja::Error> {
    match DemoBlock::new(&block.source, &block.meta, site) {
        Ok(mut demo) => {
            let result = demo.refresh(cache).await;
            if result.is_error() {
                tracing::warn!("Demo {} failed to transform", block.id);
            }
            let markup = templates.render_demo(&demo_view(&block.id, &demo, mode, false))?;
            Ok((Some(demo), markup))
        }
        Err(e) => {
            tracing::warn!("Demo {} has an invalid directive: {}", block.id, e);
            let markup = templates.render_demo_error(&block.id, &e.to_string(), &block.source)?;
            Ok((None, markup))
        }
    }
}

/// Render a full page, substituting prepared demo markup by block id.
pub fn render_page(
    templates: &TemplateEngine,
    config: &BuildConfig,
    page: &Page,
    nav: &[NavItem],
    demos: &HashMap<String, String>,
    scripts: Vec<String>,
) -> Result<String, minijinja::Error> {
    let content = page.doc.render_html(|block| demos.get(&block.id).cloned());

    let context = Context {
        title: page.title(),
        site_title: config.title.clone(),
        content,
        nav: nav.to_vec(),
        toc: page.toc(),
        base_url: config.base_url.clone(),
        styles: config
            .styles
            .iter()
            .map(|s| {
                let filename = Path::new(s)
                    .file_name()
                    .and_then(|f| f.to_str())
                    .unwrap_or("style.css");
                format!("{}assets/{}", config.base_url, filename)
            })
            .collect(),
        scripts,
    };

    templates.render_page("doc.html", &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use demoblock_transform::{DemoKind, Layout};

    fn block(info: &str, source: &str) -> CodeBlock {
        CodeBlock::new(info, source.to_string(), 5)
    }

    #[test]
    fn view_reflects_options() {
        let demo = DemoBlock::new(
            "<template><b>x</b></template>",
            "vanilla layout=column-reverse&showCodeByDefault=true",
            &PartialOptions::default(),
        )
        .unwrap();

        let view = demo_view("demo-5", &demo, RenderMode::Static, false);

        assert_eq!(view.layout, Layout::ColumnReverse.as_str());
        assert_eq!(view.direction, "column");
        assert_eq!(view.language, "html");
        assert!(view.code_visible);
        assert!(!view.editable);
        assert_eq!(view.kind, DemoKind::Vanilla.as_str());
    }

    #[test]
    fn live_mode_needs_live_option() {
        let live = DemoBlock::new("x", "react", &PartialOptions::default()).unwrap();
        let fixed = DemoBlock::new("x", "react live=false", &PartialOptions::default()).unwrap();

        assert!(demo_view("a", &live, RenderMode::Live, false).editable);
        assert!(!demo_view("b", &fixed, RenderMode::Live, false).editable);
        assert!(!demo_view("a", &live, RenderMode::Static, false).editable);
    }

    #[tokio::test]
    async fn prepares_transformed_demo() {
        let templates = TemplateEngine::new();
        let cache = TranspilerCache::default();

        let (demo, markup) = prepare_demo(
            &templates,
            &cache,
            &block("html vanilla transpile=false", "<template><i>hi</i></template>"),
            &PartialOptions::default(),
            RenderMode::Static,
        )
        .await
        .unwrap();

        let demo = demo.unwrap();
        assert_eq!(demo.result().html, "<i>hi</i>");
        assert!(markup.contains(r#"id="demo-5""#));
        assert!(markup.contains("srcdoc="));
        assert!(!cache.is_loaded());
    }

    #[tokio::test]
    async fn invalid_directive_renders_error_fragment() {
        let templates = TemplateEngine::new();
        let cache = TranspilerCache::default();

        let (demo, markup) = prepare_demo(
            &templates,
            &cache,
            &block("html vanilla live=alert(1)", "<b>x</b>"),
            &PartialOptions::default(),
            RenderMode::Static,
        )
        .await
        .unwrap();

        assert!(demo.is_none());
        assert!(markup.contains("dpdb--invalid"));
        assert!(markup.contains("&lt;b&gt;x"));
    }
}

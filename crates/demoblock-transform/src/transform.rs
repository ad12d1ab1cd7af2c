//! Snippet to runnable artifact transform.
//!
//! Each [`DemoKind`] has its own extraction and assembly strategy. The result
//! always carries four strings; failures are folded into an inline error
//! display instead of being returned.

use std::fmt;

use serde::Serialize;

use crate::extract::{section_content, Section, Sections};
use crate::kind::DemoKind;
use crate::transpile::{Preset, TranspileError, TranspilerCache, SCRIPT_PRESETS, VUE_PRESETS};

/// Id of the element Vue and React demos mount into.
pub const CONTAINER_ID: &str = "app";

/// Opening of the markup produced for a failed transform.
pub const ERROR_PREFIX: &str = r#"<pre style="color: red">"#;

/// Runnable output of one snippet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// Markup placed in the preview body
    pub html: String,

    /// Stylesheet text
    pub css: String,

    /// Script executed in the preview
    pub js: String,

    /// Untranspiled script, for display
    pub origin_js: String,

    /// Kind the snippet was transformed as
    pub kind: DemoKind,
}

impl TransformResult {
    /// A result with every field empty.
    pub fn empty(kind: DemoKind) -> Self {
        Self {
            html: String::new(),
            css: String::new(),
            js: String::new(),
            origin_js: String::new(),
            kind,
        }
    }

    /// A result whose markup displays `error`.
    pub fn failed(kind: DemoKind, error: &dyn fmt::Display) -> Self {
        Self {
            html: format!("{ERROR_PREFIX}{}</pre>", escape_html(&error.to_string())),
            ..Self::empty(kind)
        }
    }

    /// Whether this result is an error display.
    pub fn is_error(&self) -> bool {
        self.html.starts_with(ERROR_PREFIX)
    }
}

/// Transform a snippet into markup, styles and scripts.
///
/// Never fails: transpiler errors become an error display in `html` and the
/// other fields stay empty.
pub async fn transform_snippet(
    cache: &TranspilerCache,
    code: &str,
    kind: DemoKind,
    transpile: bool,
) -> TransformResult {
    let result = match kind {
        DemoKind::Vanilla => transform_vanilla(cache, code, transpile).await,
        DemoKind::Vue => transform_vue(cache, code, transpile).await,
        DemoKind::React => transform_react(cache, code, transpile).await,
    };

    result.unwrap_or_else(|e| {
        tracing::warn!("Failed to transform {} snippet: {}", kind, e);
        TransformResult::failed(kind, &e)
    })
}

async fn transform_vanilla(
    cache: &TranspilerCache,
    code: &str,
    transpile: bool,
) -> Result<TransformResult, TranspileError> {
    let sections = Sections::extract(code);

    let js = if transpile {
        run_transpiler(cache, &sections.script, SCRIPT_PRESETS).await?
    } else {
        sections.script.clone()
    };

    Ok(TransformResult {
        html: sections.template,
        css: sections.style,
        js,
        origin_js: sections.script,
        kind: DemoKind::Vanilla,
    })
}

async fn transform_vue(
    cache: &TranspilerCache,
    code: &str,
    transpile: bool,
) -> Result<TransformResult, TranspileError> {
    let template = section_content(code, Section::Template);
    let css = section_content(code, Section::Style);
    let script = section_content(code, Section::Script).replacen("export default", "var App =", 1);

    let compiled = if transpile {
        run_transpiler(cache, &script, VUE_PRESETS).await?
    } else {
        script.clone()
    };

    let js = format!(
        "var CONTAINER = document.getElementById('{CONTAINER_ID}');\n{compiled};\nVue.createApp(App).mount(CONTAINER);\n"
    );
    let origin_js = format!(
        "const CONTAINER = document.getElementById('{CONTAINER_ID}');\n{script}\nVue.createApp(App).mount(CONTAINER);"
    )
    .trim()
    .to_string();

    Ok(TransformResult {
        html: format!(r#"<div id="{CONTAINER_ID}">{template}</div>"#),
        css,
        js,
        origin_js,
        kind: DemoKind::Vue,
    })
}

async fn transform_react(
    cache: &TranspilerCache,
    code: &str,
    transpile: bool,
) -> Result<TransformResult, TranspileError> {
    let compiled = if transpile {
        run_transpiler(cache, code, SCRIPT_PRESETS).await?
    } else {
        code.to_string()
    };

    let js = format!("var CONTAINER = document.getElementById('{CONTAINER_ID}');\n{compiled}\n");
    let origin_js = format!(
        "const CONTAINER = document.getElementById('{CONTAINER_ID}');\n{}",
        code.trim()
    );

    Ok(TransformResult {
        html: format!(r#"<div id="{CONTAINER_ID}"></div>"#),
        css: String::new(),
        js,
        origin_js,
        kind: DemoKind::React,
    })
}

async fn run_transpiler(
    cache: &TranspilerCache,
    source: &str,
    presets: &[Preset],
) -> Result<String, TranspileError> {
    let transpiler = cache.get().await?;
    transpiler.transform(source, presets)
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

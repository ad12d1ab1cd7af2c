//! Preview document assembly.
//!
//! The preview pane is an iframe whose `srcdoc` is built here from a
//! [`TransformResult`] and the demo's scope bindings.

use std::sync::LazyLock;

use regex::Regex;

use crate::options::Scope;
use crate::transform::{escape_html, TransformResult};

/// Build the standalone HTML document rendered inside the preview iframe.
pub fn preview_document(result: &TransformResult, scope: &Scope, dark: bool) -> String {
    let mut doc = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");

    if !result.is_error() && !result.js.is_empty() {
        for url in scope.values() {
            doc.push_str(&format!(
                "<script src=\"{}\"></script>\n",
                escape_html(url)
            ));
        }
    }

    doc.push_str(&format!(
        "<style>\nhtml {{ color-scheme: {}; }}\nbody {{ margin: 0; padding: 1rem; font-family: system-ui, sans-serif; }}\n{}\n</style>\n",
        if dark { "dark" } else { "light" },
        escape_style(&result.css)
    ));
    doc.push_str("</head>\n<body>\n");
    doc.push_str(&result.html);
    doc.push('\n');

    if !result.js.is_empty() {
        doc.push_str("<script>\n");
        doc.push_str(&escape_script(&result.js));
        doc.push_str("\n</script>\n");
    }

    doc.push_str("</body>\n</html>\n");
    doc
}

/// Keep a script body from closing its own `<script>` element.
///
/// Raw-text end tags match case-insensitively.
fn escape_script(js: &str) -> String {
    static SCRIPT_CLOSE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)</(script)").expect("Invalid script close regex"));
    SCRIPT_CLOSE_RE.replace_all(js, r"<\/$1").into_owned()
}

fn escape_style(css: &str) -> String {
    static STYLE_CLOSE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)</(style)").expect("Invalid style close regex"));
    STYLE_CLOSE_RE.replace_all(css, r"<\/$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::DemoKind;
    use std::collections::BTreeMap;

    fn result(js: &str) -> TransformResult {
        TransformResult {
            html: "<div id=\"app\"></div>".to_string(),
            css: "p { color: red; }".to_string(),
            js: js.to_string(),
            origin_js: js.to_string(),
            kind: DemoKind::React,
        }
    }

    fn scope() -> Scope {
        BTreeMap::from([("React".to_string(), "https://cdn/react.js".to_string())])
    }

    #[test]
    fn assembles_scope_styles_markup_and_script() {
        let doc = preview_document(&result("render();"), &scope(), false);

        assert!(doc.contains(r#"<script src="https://cdn/react.js"></script>"#));
        assert!(doc.contains("p { color: red; }"));
        assert!(doc.contains("<div id=\"app\"></div>"));
        assert!(doc.contains("<script>\nrender();\n</script>"));
        assert!(doc.contains("color-scheme: light"));

        let head_end = doc.find("</head>").unwrap();
        let scope_pos = doc.find("cdn/react.js").unwrap();
        assert!(scope_pos < head_end);
    }

    #[test]
    fn script_cannot_break_out() {
        let doc = preview_document(&result("s = '</script><b>x</b>';"), &scope(), true);

        assert!(doc.contains(r"<\/script><b>"));
        assert_eq!(doc.matches("</script>").count(), 2);
    }

    #[test]
    fn mixed_case_closers_cannot_break_out() {
        let mut mixed = result("s = '</SCRIPT><b>x</b>'; t = '</Script>';");
        mixed.css = "p::after { content: '</Style>'; }".to_string();
        let doc = preview_document(&mixed, &scope(), false);
        let lower = doc.to_lowercase();

        assert!(doc.contains(r"<\/SCRIPT><b>"));
        assert!(doc.contains(r"<\/Script>"));
        assert!(doc.contains(r"<\/Style>"));
        assert_eq!(lower.matches("</script").count(), 2);
        assert_eq!(lower.matches("</style").count(), 1);
    }

    #[test]
    fn error_results_skip_scope_and_script() {
        let failed = TransformResult::failed(DemoKind::Vue, &"boom");
        let doc = preview_document(&failed, &scope(), false);

        assert!(!doc.contains("cdn/react.js"));
        assert!(!doc.contains("<script>"));
        assert!(doc.contains("boom"));
    }
}

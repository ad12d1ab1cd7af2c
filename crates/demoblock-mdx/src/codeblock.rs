//! Fenced code blocks and their info strings.

use demoblock_transform::{directive_kind, DemoKind};

/// A fenced code block from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Unique identifier within the page (format: demo-{line_number})
    pub id: String,

    /// First word of the info string (e.g. `html`, `jsx`)
    pub language: String,

    /// Rest of the info string, the demo directive when present
    pub meta: String,

    /// Fence body
    pub source: String,

    /// Line of the opening fence (1-indexed)
    pub line_number: usize,
}

impl CodeBlock {
    /// Create a block from a fence info string.
    pub fn new(info: &str, source: String, line_number: usize) -> Self {
        let (language, meta) = split_info(info);
        Self {
            id: format!("demo-{}", line_number),
            language: language.to_string(),
            meta: meta.to_string(),
            source,
            line_number,
        }
    }

    /// Kind of demo this block declares, if any.
    ///
    /// Only the kind word is inspected; options are validated when the demo is
    /// built, so a malformed option still marks the block as a demo.
    pub fn demo_kind(&self) -> Option<DemoKind> {
        directive_kind(&self.meta)
    }

    pub fn is_demo(&self) -> bool {
        self.demo_kind().is_some()
    }
}

/// Split a fence info string into its language word and the remaining meta.
pub fn split_info(info: &str) -> (&str, &str) {
    let info = info.trim();
    match info.split_once(char::is_whitespace) {
        Some((language, meta)) => (language, meta.trim_start()),
        None => (info, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_info_string() {
        assert_eq!(split_info("html vanilla live=false"), ("html", "vanilla live=false"));
        assert_eq!(split_info("jsx   react"), ("jsx", "react"));
        assert_eq!(split_info("rust"), ("rust", ""));
        assert_eq!(split_info(""), ("", ""));
    }

    #[test]
    fn detects_demo_blocks() {
        let demo = CodeBlock::new("jsx react layout=column", String::new(), 3);
        assert_eq!(demo.demo_kind(), Some(DemoKind::React));
        assert_eq!(demo.id, "demo-3");

        let plain = CodeBlock::new("jsx", String::new(), 9);
        assert!(!plain.is_demo());

        let unknown = CodeBlock::new("html preview", String::new(), 1);
        assert!(!unknown.is_demo());
    }

    #[test]
    fn malformed_options_still_mark_a_demo() {
        let block = CodeBlock::new("html vanilla live=maybe()", String::new(), 1);
        assert_eq!(block.demo_kind(), Some(DemoKind::Vanilla));
    }
}

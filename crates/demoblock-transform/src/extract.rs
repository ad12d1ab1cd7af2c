//! Tagged section extraction.

use std::sync::LazyLock;

use regex::Regex;

/// A tagged section of a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Template,
    Style,
    Script,
}

impl Section {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Style => "style",
            Self::Script => "script",
        }
    }

    fn pattern(&self) -> &'static Regex {
        static TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| section_regex("template"));
        static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| section_regex("style"));
        static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| section_regex("script"));

        match self {
            Self::Template => &*TEMPLATE_RE,
            Self::Style => &*STYLE_RE,
            Self::Script => &*SCRIPT_RE,
        }
    }
}

fn section_regex(tag: &str) -> Regex {
    // Greedy: spans from the first opening tag to the last closing tag.
    Regex::new(&format!(r"(?i)<{tag}>([\s\S]+)</{tag}>")).expect("Invalid section regex")
}

/// Content of a section, or the empty string when the section is absent.
pub fn section_content(code: &str, section: Section) -> String {
    section
        .pattern()
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// The three sections of a markup snippet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    pub template: String,
    pub style: String,
    pub script: String,
}

impl Sections {
    pub fn extract(code: &str) -> Self {
        Self {
            template: section_content(code, Section::Template),
            style: section_content(code, Section::Style),
            script: section_content(code, Section::Script),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_all_sections() {
        let code = r#"<template>
  <button id="btn">Count</button>
</template>

<style>
#btn { color: red; }
</style>

<script>
document.getElementById('btn').onclick = () => {};
</script>
"#;

        let sections = Sections::extract(code);

        assert_eq!(sections.template, "\n  <button id=\"btn\">Count</button>\n");
        assert_eq!(sections.style, "\n#btn { color: red; }\n");
        assert!(sections.script.contains("onclick"));
    }

    #[test]
    fn missing_section_is_empty() {
        let sections = Sections::extract("<template><p>hi</p></template>");

        assert_eq!(sections.template, "<p>hi</p>");
        assert_eq!(sections.style, "");
        assert_eq!(sections.script, "");
    }

    #[test]
    fn matches_tags_case_insensitively() {
        assert_eq!(section_content("<STYLE>p {}</Style>", Section::Style), "p {}");
    }

    #[test]
    fn match_is_greedy_across_repeated_sections() {
        let code = "<script>a()</script>\n<script>b()</script>";
        assert_eq!(
            section_content(code, Section::Script),
            "a()</script>\n<script>b()"
        );
    }

    #[test]
    fn empty_section_is_empty() {
        assert_eq!(section_content("<style></style>", Section::Style), "");
    }
}

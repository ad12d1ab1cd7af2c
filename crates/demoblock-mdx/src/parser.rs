//! Document parsing and HTML rendering.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::codeblock::CodeBlock;
use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};

/// A parsed document.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown body (without frontmatter)
    pub content: String,

    /// Lines taken by the frontmatter block
    pub line_offset: usize,

    /// Fenced code blocks, demos and plain ones alike
    pub code_blocks: Vec<CodeBlock>,

    /// Table of contents entries
    pub toc: Vec<TocEntry>,
}

impl ParsedDoc {
    /// Frontmatter title, or the first level-1 heading.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter
            .as_ref()
            .and_then(|f| f.title.as_deref())
            .or_else(|| {
                self.toc
                    .iter()
                    .find(|e| e.level == 1)
                    .map(|e| e.title.as_str())
            })
    }

    /// Code blocks that declare a demo kind.
    pub fn demo_blocks(&self) -> impl Iterator<Item = &CodeBlock> {
        self.code_blocks.iter().filter(|b| b.is_demo())
    }

    /// Render the body to HTML, letting `replace` substitute markup for blocks.
    pub fn render_html<F>(&self, replace: F) -> String
    where
        F: FnMut(&CodeBlock) -> Option<String>,
    {
        render_html(&self.content, self.line_offset, replace)
    }
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Errors that can occur when parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Parse a document: frontmatter, code blocks and headings.
pub fn parse_mdx(source: &str) -> Result<ParsedDoc, ParseError> {
    let (frontmatter, content, line_offset) = extract_frontmatter(source)?;

    let mut code_blocks = Vec::new();
    let mut toc = Vec::new();

    let mut current_block: Option<(String, usize, String)> = None; // (info, line, body)
    let mut current_heading: Option<(u8, String)> = None;

    for (event, range) in Parser::new_ext(content, markdown_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                let line = line_offset + line_at(content, range.start);
                current_block = Some((info, line, String::new()));
            }

            Event::End(TagEnd::CodeBlock) => {
                if let Some((info, line, body)) = current_block.take() {
                    code_blocks.push(CodeBlock::new(&info, body, line));
                }
            }

            Event::Start(Tag::Heading { level, .. }) => {
                current_heading = Some((level as u8, String::new()));
            }

            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, title)) = current_heading.take() {
                    let id = slugify(&title);
                    toc.push(TocEntry { title, id, level });
                }
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, body)) = current_block.as_mut() {
                    body.push_str(&text);
                } else if let Some((_, title)) = current_heading.as_mut() {
                    title.push_str(&text);
                }
            }

            _ => {}
        }
    }

    Ok(ParsedDoc {
        frontmatter,
        content: content.to_string(),
        line_offset,
        code_blocks,
        toc,
    })
}

/// Render markdown to HTML.
///
/// Headings get slug anchors matching the TOC. Each fenced block is offered to
/// `replace`; returning `Some(html)` substitutes that markup for the block.
/// `line_offset` must match the one [`parse_mdx`] reported so block ids agree.
pub fn render_html<F>(content: &str, line_offset: usize, mut replace: F) -> String
where
    F: FnMut(&CodeBlock) -> Option<String>,
{
    let mut events: Vec<Event> = Vec::new();
    let mut block: Option<(String, usize, Vec<Event>)> = None;
    let mut heading: Option<Vec<Event>> = None;

    for (event, range) in Parser::new_ext(content, markdown_options()).into_offset_iter() {
        if let Some((info, line, buffered)) = block.as_mut() {
            if matches!(event, Event::End(TagEnd::CodeBlock)) {
                buffered.push(event);
                let (info, line, buffered) = (info.clone(), *line, std::mem::take(buffered));
                block = None;

                let body: String = buffered
                    .iter()
                    .filter_map(|e| match e {
                        Event::Text(t) => Some(t.as_ref()),
                        _ => None,
                    })
                    .collect();
                let code_block = CodeBlock::new(&info, body, line);

                match replace(&code_block) {
                    Some(markup) => events.push(Event::Html(CowStr::from(markup))),
                    None => events.extend(buffered),
                }
            } else {
                buffered.push(event);
            }
            continue;
        }

        if let Some(buffered) = heading.as_mut() {
            let done = matches!(event, Event::End(TagEnd::Heading(_)));
            buffered.push(event);
            if done {
                events.extend(with_heading_anchor(std::mem::take(buffered)));
                heading = None;
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(ref kind)) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                let line = line_offset + line_at(content, range.start);
                block = Some((info, line, vec![event]));
            }
            Event::Start(Tag::Heading { .. }) => heading = Some(vec![event]),
            _ => events.push(event),
        }
    }

    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

/// Give a buffered heading an id derived from its text, unless it has one.
fn with_heading_anchor(mut events: Vec<Event>) -> Vec<Event> {
    let text: String = events
        .iter()
        .filter_map(|e| match e {
            Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
            _ => None,
        })
        .collect();

    if let Some(Event::Start(Tag::Heading {
        level,
        id: None,
        classes,
        attrs,
    })) = events.first().cloned()
    {
        events[0] = Event::Start(Tag::Heading {
            level,
            id: Some(CowStr::from(slugify(&text))),
            classes,
            attrs,
        });
    }

    events
}

/// 1-indexed line of a byte offset.
fn line_at(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use demoblock_transform::DemoKind;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"---
title: Counter
---

# Counter demo

```html vanilla live=false
<template><button>+</button></template>
```

## React `useState`

```jsx react
ReactDOM.createRoot(CONTAINER).render(<p>hi</p>);
```

```css
p { color: red; }
```
"#;

    #[test]
    fn parses_demo_blocks_with_file_lines() {
        let doc = parse_mdx(PAGE).unwrap();

        assert_eq!(doc.title(), Some("Counter"));
        assert_eq!(doc.code_blocks.len(), 3);

        let demos: Vec<_> = doc.demo_blocks().collect();
        assert_eq!(demos.len(), 2);
        assert_eq!(demos[0].demo_kind(), Some(DemoKind::Vanilla));
        assert_eq!(demos[0].meta, "vanilla live=false");
        assert_eq!(demos[0].line_number, 7);
        assert_eq!(demos[0].id, "demo-7");
        assert_eq!(demos[0].source, "<template><button>+</button></template>\n");
        assert_eq!(demos[1].demo_kind(), Some(DemoKind::React));
        assert_eq!(demos[1].language, "jsx");
    }

    #[test]
    fn builds_toc_including_inline_code() {
        let doc = parse_mdx(PAGE).unwrap();

        assert_eq!(doc.toc.len(), 2);
        assert_eq!(doc.toc[1].title, "React useState");
        assert_eq!(doc.toc[1].id, "react-usestate");
        assert_eq!(doc.toc[1].level, 2);
    }

    #[test]
    fn title_falls_back_to_first_heading() {
        let doc = parse_mdx("Intro\n\n# Real Title\n").unwrap();
        assert_eq!(doc.title(), Some("Real Title"));
    }

    #[test]
    fn render_replaces_selected_blocks() {
        let doc = parse_mdx(PAGE).unwrap();
        let mut seen = Vec::new();

        let html = doc.render_html(|block| {
            seen.push(block.id.clone());
            block
                .is_demo()
                .then(|| format!("<div class=\"demo\" data-id=\"{}\"></div>", block.id))
        });

        assert_eq!(seen, vec!["demo-7", "demo-13", "demo-17"]);
        assert!(html.contains(r#"<div class="demo" data-id="demo-7"></div>"#));
        assert!(html.contains(r#"data-id="demo-13""#));
        assert!(html.contains("p { color: red; }"));
        assert!(!html.contains("&lt;template&gt;"));
    }

    #[test]
    fn render_adds_heading_anchors() {
        let html = render_html("## Getting Started\n", 0, |_| None);
        assert!(html.contains(r#"<h2 id="getting-started">Getting Started</h2>"#));
    }

    #[test]
    fn slugify_works() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Button (Primary)"), "button-primary");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
    }
}

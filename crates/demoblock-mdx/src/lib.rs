//! Markdown/MDX parsing for demo pages.
//!
//! This crate extracts YAML frontmatter, headings and fenced code blocks, and
//! recognizes fences whose info string carries a demo directive
//! (` ```jsx react layout=column `).

pub mod codeblock;
pub mod frontmatter;
pub mod parser;

pub use codeblock::{split_info, CodeBlock};
pub use frontmatter::Frontmatter;
pub use parser::{parse_mdx, render_html, slugify, ParseError, ParsedDoc, TocEntry};

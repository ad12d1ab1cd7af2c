//! YAML frontmatter.

use serde::Deserialize;

/// Page metadata from the leading `---` block.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Page title; falls back to the first heading when absent
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Position in navigation (lower = first)
    #[serde(default)]
    pub order: Option<i32>,

    /// Hide the page from navigation with `nav: false`
    #[serde(default)]
    pub nav: Option<bool>,

    /// Output path override
    #[serde(default)]
    pub slug: Option<String>,
}

impl Frontmatter {
    pub fn in_nav(&self) -> bool {
        self.nav.unwrap_or(true)
    }
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Split a document into its frontmatter and body.
///
/// The body is returned together with the number of lines the frontmatter
/// block occupied, so callers can report body positions as file lines.
pub fn extract_frontmatter(
    source: &str,
) -> Result<(Option<Frontmatter>, &str, usize), FrontmatterError> {
    let Some(rest) = source.strip_prefix("---") else {
        return Ok((None, source, 0));
    };
    if !rest.starts_with('\n') && !rest.starts_with("\r\n") {
        return Ok((None, source, 0));
    }

    let close = rest.find("\n---").ok_or(FrontmatterError::Unclosed)?;
    let yaml = &rest[..close];

    let after_close = &rest[close + 4..];
    let body = match after_close.find('\n') {
        Some(newline) => &after_close[newline + 1..],
        None => "",
    };

    let frontmatter = if yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    let offset = source[..source.len() - body.len()].matches('\n').count();
    Ok((Some(frontmatter), body, offset))
}

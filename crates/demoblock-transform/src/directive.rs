//! Directive string parsing.
//!
//! A demo fence carries a directive after its language word:
//!
//! ```text
//! ```html vanilla layout=column&showCode=false
//! ```
//!
//! The first token names the [`DemoKind`]; the second, if present, is a list of
//! `key=value` pairs joined by `&`. Values are literals only:
//!
//! - `true` / `false`
//! - decimal numbers (`1`, `-2.5`, `1e3`)
//! - quoted strings (`'text'`, `"text"`, with `\\`, `\'` and `\"` escapes)
//! - a small allow-list of bare identifiers (layout names)
//!
//! A pair may pin the expected type with `key:bool=`, `key:num=` or `key:str=`.
//! With `:str` the raw unquoted text is taken as the string. Nothing is ever
//! evaluated; anything outside this grammar is an [`DirectiveError::InvalidOption`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::kind::DemoKind;

/// Bare identifiers accepted as string values.
pub const ALLOWED_IDENTIFIERS: &[&str] = &["row", "row-reverse", "column", "column-reverse"];

/// A literal option value from a directive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl OptionValue {
    /// Name of the value's type as written in a `key:type=` annotation.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "num",
            Self::String(_) => "str",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// A parsed directive: the snippet kind plus inline option overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub kind: DemoKind,
    pub options: BTreeMap<String, OptionValue>,
}

/// Errors produced while parsing a directive string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DirectiveError {
    #[error("Missing demo kind in directive")]
    MissingKind,

    #[error("Unknown demo kind: {0}")]
    UnknownKind(String),

    #[error("Invalid option `{key}`: {reason}")]
    InvalidOption { key: String, reason: String },
}

impl DirectiveError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)(?::([A-Za-z]+))?=(.*)$").expect("Invalid pair regex")
});

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").expect("Invalid number regex")
});

/// Parse a full directive string.
pub fn parse_directive(meta: &str) -> Result<Directive, DirectiveError> {
    let tokens = split_tokens(meta);
    let mut tokens = tokens.into_iter();

    let kind_word = tokens.next().ok_or(DirectiveError::MissingKind)?;
    let kind = kind_word.parse::<DemoKind>()?;

    let options = match tokens.next() {
        Some(option_str) => parse_options(&option_str)?,
        None => BTreeMap::new(),
    };

    let ignored: Vec<String> = tokens.collect();
    if !ignored.is_empty() {
        tracing::debug!("Ignoring trailing directive tokens: {:?}", ignored);
    }

    Ok(Directive { kind, options })
}

/// Read just the kind word of a directive, without validating options.
pub fn directive_kind(meta: &str) -> Option<DemoKind> {
    meta.split_whitespace().next().and_then(DemoKind::from_word)
}

/// Parse an `&`-joined option string into literal values.
pub fn parse_options(option_str: &str) -> Result<BTreeMap<String, OptionValue>, DirectiveError> {
    let mut options = BTreeMap::new();

    for pair in option_str.split('&').filter(|p| !p.is_empty()) {
        let caps = PAIR_RE
            .captures(pair)
            .ok_or_else(|| DirectiveError::invalid(pair, "expected key=value"))?;

        let key = &caps[1];
        let raw = &caps[3];
        let value = match caps.get(2).map(|m| m.as_str()) {
            None => parse_literal(key, raw)?,
            Some("str") if !is_quoted(raw) => OptionValue::String(raw.to_string()),
            Some(ty @ ("bool" | "num" | "str")) => {
                let value = parse_literal(key, raw)?;
                if value.type_name() != ty {
                    return Err(DirectiveError::invalid(
                        key,
                        format!("expected {ty}, found {}", value.type_name()),
                    ));
                }
                value
            }
            Some(other) => {
                return Err(DirectiveError::invalid(key, format!("unknown type `{other}`")))
            }
        };

        options.insert(key.to_string(), value);
    }

    Ok(options)
}

fn parse_literal(key: &str, raw: &str) -> Result<OptionValue, DirectiveError> {
    match raw {
        "" => Err(DirectiveError::invalid(key, "missing value")),
        "true" => Ok(OptionValue::Bool(true)),
        "false" => Ok(OptionValue::Bool(false)),
        _ if NUMBER_RE.is_match(raw) => raw
            .parse::<f64>()
            .map(OptionValue::Number)
            .map_err(|e| DirectiveError::invalid(key, e.to_string())),
        _ if is_quoted(raw) => unquote(raw)
            .map(OptionValue::String)
            .ok_or_else(|| DirectiveError::invalid(key, "malformed string literal")),
        _ if ALLOWED_IDENTIFIERS.contains(&raw) => Ok(OptionValue::String(raw.to_string())),
        _ => Err(DirectiveError::invalid(
            key,
            format!("`{raw}` is not a literal"),
        )),
    }
}

fn is_quoted(raw: &str) -> bool {
    raw.len() >= 2
        && ((raw.starts_with('\'') && raw.ends_with('\''))
            || (raw.starts_with('"') && raw.ends_with('"')))
}

/// Strip quotes and resolve escapes. Returns `None` on a stray quote or a
/// dangling backslash.
fn unquote(raw: &str) -> Option<String> {
    let quote = raw.chars().next()?;
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                e @ ('\\' | '\'' | '"') => out.push(e),
                _ => return None,
            },
            c if c == quote => return None,
            c => out.push(c),
        }
    }

    Some(out)
}

/// Split on whitespace, keeping quoted runs together.
fn split_tokens(meta: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in meta.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => {
                current.push(c);
                escaped = true;
            }
            (Some(q), c) if c == q => {
                current.push(c);
                quote = None;
            }
            (None, '\'' | '"') => {
                current.push(c);
                quote = Some(c);
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_kind_and_literals() {
        let directive = parse_directive("vanilla key=1&flag=true").unwrap();

        assert_eq!(directive.kind, DemoKind::Vanilla);
        assert_eq!(
            directive.options,
            BTreeMap::from([
                ("key".to_string(), OptionValue::Number(1.0)),
                ("flag".to_string(), OptionValue::Bool(true)),
            ])
        );
    }

    #[test]
    fn parses_kind_without_options() {
        let directive = parse_directive("react").unwrap();
        assert_eq!(directive.kind, DemoKind::React);
        assert!(directive.options.is_empty());
    }

    #[test]
    fn parses_strings_and_identifiers() {
        let directive =
            parse_directive(r#"vue layout=column-reverse&title='Hello world'&note="a \"b\"""#)
                .unwrap();

        assert_eq!(
            directive.options.get("layout"),
            Some(&OptionValue::String("column-reverse".to_string()))
        );
        assert_eq!(
            directive.options.get("title"),
            Some(&OptionValue::String("Hello world".to_string()))
        );
        assert_eq!(
            directive.options.get("note"),
            Some(&OptionValue::String("a \"b\"".to_string()))
        );
    }

    #[test]
    fn parses_numbers() {
        let options = parse_options("a=-2.5&b=1e3&c=.5").unwrap();
        assert_eq!(options["a"], OptionValue::Number(-2.5));
        assert_eq!(options["b"], OptionValue::Number(1000.0));
        assert_eq!(options["c"], OptionValue::Number(0.5));
    }

    #[test]
    fn typed_pairs_enforce_type() {
        let options = parse_options("live:bool=false&name:str=plain&n:num=3").unwrap();
        assert_eq!(options["live"], OptionValue::Bool(false));
        assert_eq!(options["name"], OptionValue::String("plain".to_string()));
        assert_eq!(options["n"], OptionValue::Number(3.0));

        let err = parse_options("live:bool=1").unwrap_err();
        assert!(matches!(err, DirectiveError::InvalidOption { ref key, .. } if key == "live"));

        let err = parse_options("live:list=1").unwrap_err();
        assert!(matches!(err, DirectiveError::InvalidOption { .. }));
    }

    #[test]
    fn rejects_expressions() {
        for input in [
            "x=alert(1)",
            "x=1+1",
            "x={a:1}",
            "x=window",
            "x=null",
            "x=NaN",
            "x=inf",
            "x=",
            "=1",
            "x",
            "x='unterminated",
        ] {
            let result = parse_options(input);
            assert!(
                matches!(result, Err(DirectiveError::InvalidOption { .. })),
                "{input} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn rejects_unknown_or_missing_kind() {
        assert_eq!(parse_directive("   "), Err(DirectiveError::MissingKind));
        assert_eq!(
            parse_directive("angular live=true"),
            Err(DirectiveError::UnknownKind("angular".to_string()))
        );
    }

    #[test]
    fn skips_empty_pairs() {
        let options = parse_options("live=true&&showCode=false&").unwrap();
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn ignores_trailing_tokens() {
        let directive = parse_directive("vanilla live=false title=\"x\"").unwrap();
        assert_eq!(directive.options.len(), 1);
    }

    #[test]
    fn reads_kind_word_only() {
        assert_eq!(directive_kind("vue live=oops()"), Some(DemoKind::Vue));
        assert_eq!(directive_kind("title=\"x\""), None);
        assert_eq!(directive_kind(""), None);
    }
}

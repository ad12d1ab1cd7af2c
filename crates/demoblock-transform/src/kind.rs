//! Snippet kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::directive::DirectiveError;

/// Which extraction and assembly strategy applies to a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoKind {
    /// Plain markup: `<template>`, `<style>` and `<script>` sections.
    Vanilla,
    /// Vue-style single-file component mounted into a container.
    Vue,
    /// React-style snippet, the whole body is script.
    React,
}

impl DemoKind {
    /// All kinds, in declaration order.
    pub const ALL: [DemoKind; 3] = [DemoKind::Vanilla, DemoKind::Vue, DemoKind::React];

    /// The word used for this kind in a directive string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vanilla => "vanilla",
            Self::Vue => "vue",
            Self::React => "react",
        }
    }

    /// Look up a kind by its directive word.
    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == word)
    }

    /// Highlight language for the editor and the static code panel.
    pub fn editor_language(&self) -> &'static str {
        match self {
            Self::Vanilla | Self::Vue => "html",
            Self::React => "jsx",
        }
    }
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemoKind {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_word(s).ok_or_else(|| DirectiveError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_words() {
        assert_eq!("vanilla".parse::<DemoKind>().unwrap(), DemoKind::Vanilla);
        assert_eq!("vue".parse::<DemoKind>().unwrap(), DemoKind::Vue);
        assert_eq!("react".parse::<DemoKind>().unwrap(), DemoKind::React);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "svelte".parse::<DemoKind>().unwrap_err();
        assert!(matches!(err, DirectiveError::UnknownKind(ref k) if k == "svelte"));
    }

    #[test]
    fn kind_words_are_case_sensitive() {
        assert_eq!(DemoKind::from_word("React"), None);
    }
}

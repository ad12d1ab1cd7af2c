//! Demo options and their three-layer merge.
//!
//! Options come from built-in defaults, the site-wide `[demo]` table in
//! `docs.toml`, and the inline overrides of a single directive. Later layers
//! override earlier ones key by key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::directive::{DirectiveError, OptionValue};

/// Pinned CDN builds bound into every preview unless overridden.
pub const DEFAULT_SCOPE: &[(&str, &str)] = &[
    (
        "React",
        "https://unpkg.com/react@18.3.1/umd/react.development.js",
    ),
    (
        "ReactDOM",
        "https://unpkg.com/react-dom@18.3.1/umd/react-dom.development.js",
    ),
    ("Vue", "https://unpkg.com/vue@3.4.38/dist/vue.global.js"),
];

/// Global binding name to the script URL providing it.
pub type Scope = BTreeMap<String, String>;

/// Where the code panel sits relative to the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

/// Leading axis of a [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Row,
    Column,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::RowReverse => "row-reverse",
            Self::Column => "column",
            Self::ColumnReverse => "column-reverse",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "row" => Some(Self::Row),
            "row-reverse" => Some(Self::RowReverse),
            "column" => Some(Self::Column),
            "column-reverse" => Some(Self::ColumnReverse),
            _ => None,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Row | Self::RowReverse => Direction::Row,
            Self::Column | Self::ColumnReverse => Direction::Column,
        }
    }
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }
}

/// Fully resolved options for one demo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Placement of code panel and preview
    pub layout: Layout,

    /// Render an editable code panel
    pub live: bool,

    /// Render the code panel at all
    pub show_code: bool,

    /// Code panel starts expanded
    pub show_code_by_default: bool,

    /// Run the script through the transpiler
    pub transpile: bool,

    /// Global bindings loaded into the preview
    pub scope: Scope,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            layout: Layout::Row,
            live: true,
            show_code: true,
            show_code_by_default: false,
            transpile: true,
            scope: DEFAULT_SCOPE
                .iter()
                .map(|(name, url)| (name.to_string(), url.to_string()))
                .collect(),
        }
    }
}

/// One layer of options. Unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialOptions {
    #[serde(default)]
    pub layout: Option<Layout>,

    #[serde(default)]
    pub live: Option<bool>,

    #[serde(default, alias = "showCode")]
    pub show_code: Option<bool>,

    #[serde(default, alias = "showCodeByDefault")]
    pub show_code_by_default: Option<bool>,

    #[serde(default)]
    pub transpile: Option<bool>,

    #[serde(default)]
    pub scope: Option<Scope>,
}

impl PartialOptions {
    /// Build a layer from inline directive values.
    ///
    /// Known keys must carry the right literal type. Unknown keys are ignored.
    pub fn from_directive(
        values: &BTreeMap<String, OptionValue>,
    ) -> Result<Self, DirectiveError> {
        let mut layer = Self::default();

        for (key, value) in values {
            match key.as_str() {
                "layout" => {
                    let name = value.as_str().ok_or_else(|| mismatch(key, "layout name", value))?;
                    let layout = Layout::from_name(name).ok_or_else(|| {
                        DirectiveError::InvalidOption {
                            key: key.clone(),
                            reason: format!("unknown layout `{name}`"),
                        }
                    })?;
                    layer.layout = Some(layout);
                }
                "live" => layer.live = Some(expect_bool(key, value)?),
                "showCode" | "show_code" => layer.show_code = Some(expect_bool(key, value)?),
                "showCodeByDefault" | "show_code_by_default" => {
                    layer.show_code_by_default = Some(expect_bool(key, value)?)
                }
                "transpile" => layer.transpile = Some(expect_bool(key, value)?),
                _ => {
                    tracing::warn!("Ignoring unknown demo option `{}` = {}", key, value);
                }
            }
        }

        Ok(layer)
    }
}

fn expect_bool(key: &str, value: &OptionValue) -> Result<bool, DirectiveError> {
    value.as_bool().ok_or_else(|| mismatch(key, "bool", value))
}

fn mismatch(key: &str, expected: &str, value: &OptionValue) -> DirectiveError {
    DirectiveError::InvalidOption {
        key: key.to_string(),
        reason: format!("expected {expected}, found {value}"),
    }
}

impl Options {
    /// Merge the three layers in order: defaults, site-wide, per-demo.
    pub fn merge(defaults: &Options, site: &PartialOptions, local: &PartialOptions) -> Options {
        let mut merged = defaults.clone();
        merged.apply(site);
        merged.apply(local);
        merged
    }

    /// Overlay one layer onto these options.
    pub fn apply(&mut self, layer: &PartialOptions) {
        if let Some(layout) = layer.layout {
            self.layout = layout;
        }
        if let Some(live) = layer.live {
            self.live = live;
        }
        if let Some(show_code) = layer.show_code {
            self.show_code = show_code;
        }
        if let Some(show_code_by_default) = layer.show_code_by_default {
            self.show_code_by_default = show_code_by_default;
        }
        if let Some(transpile) = layer.transpile {
            self.transpile = transpile;
        }
        if let Some(scope) = &layer.scope {
            self.scope
                .extend(scope.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn later_layers_win_key_by_key() {
        let site = PartialOptions {
            layout: Some(Layout::Column),
            live: Some(false),
            ..Default::default()
        };
        let local = PartialOptions {
            live: Some(true),
            show_code_by_default: Some(true),
            ..Default::default()
        };

        let merged = Options::merge(&Options::default(), &site, &local);

        assert_eq!(merged.layout, Layout::Column);
        assert!(merged.live);
        assert!(merged.show_code);
        assert!(merged.show_code_by_default);
        assert!(merged.transpile);
    }

    #[test]
    fn scope_merges_per_binding() {
        let site = PartialOptions {
            scope: Some(BTreeMap::from([
                ("Vue".to_string(), "/vendor/vue.js".to_string()),
                ("dayjs".to_string(), "/vendor/dayjs.js".to_string()),
            ])),
            ..Default::default()
        };

        let merged = Options::merge(&Options::default(), &site, &PartialOptions::default());

        assert_eq!(merged.scope["Vue"], "/vendor/vue.js");
        assert_eq!(merged.scope["dayjs"], "/vendor/dayjs.js");
        assert!(merged.scope.contains_key("React"));
    }

    #[test]
    fn directive_layer_maps_known_keys() {
        let values = BTreeMap::from([
            ("layout".to_string(), OptionValue::String("column-reverse".to_string())),
            ("showCode".to_string(), OptionValue::Bool(false)),
            ("unknown".to_string(), OptionValue::Number(1.0)),
        ]);

        let layer = PartialOptions::from_directive(&values).unwrap();

        assert_eq!(layer.layout, Some(Layout::ColumnReverse));
        assert_eq!(layer.show_code, Some(false));
        assert_eq!(layer.live, None);
    }

    #[test]
    fn directive_layer_rejects_wrong_types() {
        let values = BTreeMap::from([("live".to_string(), OptionValue::Number(1.0))]);
        let err = PartialOptions::from_directive(&values).unwrap_err();
        assert!(matches!(err, DirectiveError::InvalidOption { ref key, .. } if key == "live"));

        let values = BTreeMap::from([("layout".to_string(), OptionValue::String("grid".to_string()))]);
        assert!(PartialOptions::from_directive(&values).is_err());
    }

    #[test]
    fn deserializes_site_layer() {
        let layer: PartialOptions = from_json(
            r#"{"layout": "row-reverse", "showCodeByDefault": true, "scope": {"lodash": "/l.js"}}"#,
        );

        assert_eq!(layer.layout, Some(Layout::RowReverse));
        assert_eq!(layer.show_code_by_default, Some(true));
        assert_eq!(layer.scope.unwrap()["lodash"], "/l.js");
    }

    fn from_json(json: &str) -> PartialOptions {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn layout_direction() {
        assert_eq!(Layout::RowReverse.direction(), Direction::Row);
        assert_eq!(Layout::Column.direction(), Direction::Column);
    }
}

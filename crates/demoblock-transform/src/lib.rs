//! Live demo transforms for documentation code blocks.
//!
//! This crate turns the body of a demo fence into runnable preview artifacts:
//! it parses the fence directive, merges demo options, extracts
//! template/style/script sections, transpiles scripts, and tracks per-demo
//! edit state so stale transforms never overwrite newer output.

pub mod debounce;
pub mod demo;
pub mod directive;
pub mod extract;
pub mod kind;
pub mod options;
pub mod preview;
pub mod transform;
pub mod transpile;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use demo::{DemoBlock, PendingTransform};
pub use directive::{directive_kind, parse_directive, Directive, DirectiveError, OptionValue};
pub use kind::DemoKind;
pub use options::{Direction, Layout, Options, PartialOptions, Scope};
pub use preview::preview_document;
pub use transform::{escape_html, transform_snippet, TransformResult, CONTAINER_ID, ERROR_PREFIX};
pub use transpile::{
    OxcTranspiler, Preset, TranspileError, Transpiler, TranspilerCache, DEFAULT_TARGET,
};

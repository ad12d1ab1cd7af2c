//! Static site generator for demoblock documentation.
//!
//! Builds a static site from Markdown/MDX pages, rendering each demo fence as
//! a code panel plus a sandboxed preview.

pub mod assets;
pub mod builder;
pub mod render;
pub mod site;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use render::{demo_view, prepare_demo, render_page, RenderMode};
pub use site::{build_navigation, discover_pages, is_page_file, page_url, Page};
pub use templates::{DemoView, TemplateEngine};

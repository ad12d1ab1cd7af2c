//! Script transpilation and the process-wide transpiler handle.
//!
//! Snippets are written in modern syntax and, for React demos, JSX. Before they
//! reach the preview they go through a [`Transpiler`] with a preset list in the
//! style of Babel (`env`, `react`). The bundled implementation runs on oxc.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{JsxRuntime, TransformOptions, Transformer};
use tokio::sync::OnceCell;

/// Default syntax target for the `env` preset.
pub const DEFAULT_TARGET: &str = "es2015";

/// A transpilation preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Lower modern syntax to the configured target
    Env,
    /// Compile JSX to `React.createElement` calls
    React,
}

/// Presets for snippets that may contain JSX.
pub const SCRIPT_PRESETS: &[Preset] = &[Preset::Env, Preset::React];

/// Presets for Vue component scripts.
pub const VUE_PRESETS: &[Preset] = &[Preset::Env];

/// Errors from acquiring or running a transpiler.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TranspileError {
    #[error("Failed to load transpiler: {0}")]
    Load(String),

    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error("TransformError: {0}")]
    Transform(String),
}

/// A script transpilation service.
pub trait Transpiler: Send + Sync {
    /// Transpile `source` with the given presets.
    fn transform(&self, source: &str, presets: &[Preset]) -> Result<String, TranspileError>;
}

/// Transpiler built on oxc's parser, transformer and code generator.
#[derive(Debug, Clone)]
pub struct OxcTranspiler {
    target: String,
}

impl OxcTranspiler {
    /// Create a transpiler lowering to `target` (e.g. `es2015`, `chrome80`).
    pub fn new(target: impl Into<String>) -> Result<Self, TranspileError> {
        let target = target.into();
        TransformOptions::from_target(&target)
            .map_err(|e| TranspileError::Load(format!("invalid target `{target}`: {e}")))?;
        Ok(Self { target })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn options(&self, presets: &[Preset]) -> Result<TransformOptions, TranspileError> {
        let mut options = if presets.contains(&Preset::Env) {
            TransformOptions::from_target(&self.target)
                .map_err(|e| TranspileError::Transform(e.to_string()))?
        } else {
            TransformOptions::default()
        };
        // Previews load React as a global, so no runtime imports.
        options.jsx.runtime = JsxRuntime::Classic;
        Ok(options)
    }
}

impl Default for OxcTranspiler {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
        }
    }
}

impl Transpiler for OxcTranspiler {
    fn transform(&self, source: &str, presets: &[Preset]) -> Result<String, TranspileError> {
        let allocator = Allocator::default();
        let jsx = presets.contains(&Preset::React);
        let source_type = SourceType::mjs().with_jsx(jsx);

        let parsed = Parser::new(&allocator, source, source_type).parse();
        if !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
            return Err(TranspileError::Syntax(messages.join("\n")));
        }

        let mut program = parsed.program;
        let scoping = SemanticBuilder::new()
            .build(&program)
            .semantic
            .into_scoping();

        let options = self.options(presets)?;
        let path = if jsx { "demo.jsx" } else { "demo.js" };
        let transformed = Transformer::new(&allocator, Path::new(path), &options)
            .build_with_scoping(scoping, &mut program);

        if !transformed.errors.is_empty() {
            let messages: Vec<String> = transformed.errors.iter().map(|e| e.to_string()).collect();
            return Err(TranspileError::Transform(messages.join("\n")));
        }

        Ok(Codegen::new().build(&program).code)
    }
}

type LoadFuture = Pin<Box<dyn Future<Output = Result<Arc<dyn Transpiler>, TranspileError>> + Send>>;

/// Lazily acquired, process-wide transpiler handle.
///
/// Concurrent first-time callers share a single in-flight acquisition and all
/// receive the same instance. A failed acquisition leaves the cache empty, so
/// the next call tries again.
pub struct TranspilerCache {
    cell: OnceCell<Arc<dyn Transpiler>>,
    loader: Box<dyn Fn() -> LoadFuture + Send + Sync>,
}

impl TranspilerCache {
    /// Create a cache around an async loader.
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn Transpiler>, TranspileError>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            loader: Box::new(move || -> LoadFuture { Box::pin(loader()) }),
        }
    }

    /// Cache whose loader builds an [`OxcTranspiler`] for `target`.
    pub fn oxc(target: impl Into<String>) -> Self {
        let target = target.into();
        Self::new(move || {
            let target = target.clone();
            async move {
                let transpiler = OxcTranspiler::new(target)?;
                Ok(Arc::new(transpiler) as Arc<dyn Transpiler>)
            }
        })
    }

    /// Cache pre-filled with an existing transpiler.
    pub fn with_transpiler(transpiler: Arc<dyn Transpiler>) -> Self {
        let fallback = Arc::clone(&transpiler);
        Self {
            cell: OnceCell::new_with(Some(transpiler)),
            loader: Box::new(move || -> LoadFuture {
                let transpiler = Arc::clone(&fallback);
                Box::pin(async move { Ok::<_, TranspileError>(transpiler) })
            }),
        }
    }

    /// Get the transpiler, acquiring it on first use.
    pub async fn get(&self) -> Result<Arc<dyn Transpiler>, TranspileError> {
        let transpiler = self
            .cell
            .get_or_try_init(|| async {
                tracing::debug!("Acquiring transpiler");
                let result = (self.loader)().await;
                if let Err(e) = &result {
                    tracing::warn!("Transpiler acquisition failed: {}", e);
                }
                result
            })
            .await?;
        Ok(Arc::clone(transpiler))
    }

    /// Whether a transpiler has been acquired.
    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}

impl Default for TranspilerCache {
    fn default() -> Self {
        Self::oxc(DEFAULT_TARGET)
    }
}

impl std::fmt::Debug for TranspilerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspilerCache")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

//! Demo state: current code, current output and the edit sequence.
//!
//! Every change to the code (an edit, or new upstream content after a hot
//! reload) bumps a sequence number. A transform runs against a snapshot taken
//! at some sequence number, and its result is only installed if nothing newer
//! has been displayed in the meantime. That keeps a slow transform of an old
//! edit from overwriting the output of a newer one.

use crate::directive::{parse_directive, DirectiveError};
use crate::kind::DemoKind;
use crate::options::{Direction, Options, PartialOptions};
use crate::transform::{transform_snippet, TransformResult};
use crate::transpile::TranspilerCache;

/// Code to transform, stamped with the sequence number it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransform {
    pub seq: u64,
    pub code: String,
}

/// State of one demo block.
#[derive(Debug, Clone)]
pub struct DemoBlock {
    kind: DemoKind,
    options: Options,
    upstream: String,
    code: String,
    code_visible: bool,
    result: TransformResult,
    seq: u64,
    displayed_seq: u64,
}

impl DemoBlock {
    /// Create a demo from its fence body and directive string.
    ///
    /// Options are merged from built-in defaults, `site` and the directive.
    pub fn new(source: &str, directive: &str, site: &PartialOptions) -> Result<Self, DirectiveError> {
        let directive = parse_directive(directive)?;
        let local = PartialOptions::from_directive(&directive.options)?;
        let options = Options::merge(&Options::default(), site, &local);
        Ok(Self::with_options(source, directive.kind, options))
    }

    /// Create a demo from already resolved options.
    pub fn with_options(source: &str, kind: DemoKind, options: Options) -> Self {
        Self {
            kind,
            code_visible: options.show_code_by_default,
            options,
            upstream: source.to_string(),
            code: source.to_string(),
            result: TransformResult::empty(kind),
            seq: 1,
            displayed_seq: 0,
        }
    }

    pub fn kind(&self) -> DemoKind {
        self.kind
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Current code, including unsynced edits.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Last content received from upstream.
    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// Output currently displayed.
    pub fn result(&self) -> &TransformResult {
        &self.result
    }

    /// Sequence number of the current code.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Sequence number of the displayed output, `0` before the first transform.
    pub fn displayed_seq(&self) -> u64 {
        self.displayed_seq
    }

    pub fn code_visible(&self) -> bool {
        self.code_visible
    }

    pub fn direction(&self) -> Direction {
        self.options.layout.direction()
    }

    /// Whether the code panel is an editor.
    pub fn is_live(&self) -> bool {
        self.options.live && self.options.show_code
    }

    /// Flip code panel visibility and return the new state.
    pub fn toggle_code(&mut self) -> bool {
        self.code_visible = !self.code_visible;
        self.code_visible
    }

    /// Replace the code with an edit. Returns the new sequence number.
    pub fn edit(&mut self, code: impl Into<String>) -> u64 {
        self.code = code.into();
        self.seq += 1;
        self.seq
    }

    /// Adopt new upstream content if it differs from what was last seen.
    ///
    /// Local edits are discarded in favor of the new content.
    pub fn sync_upstream(&mut self, source: &str) -> Option<u64> {
        if source == self.upstream {
            return None;
        }
        self.upstream = source.to_string();
        Some(self.edit(source))
    }

    /// Snapshot to transform, if the displayed output is behind the code.
    pub fn pending(&self) -> Option<PendingTransform> {
        (self.displayed_seq < self.seq).then(|| PendingTransform {
            seq: self.seq,
            code: self.code.clone(),
        })
    }

    /// Install a finished transform. Results older than the displayed one are
    /// discarded; returns whether the result was installed.
    pub fn complete(&mut self, seq: u64, result: TransformResult) -> bool {
        if seq <= self.displayed_seq {
            tracing::debug!(
                "Discarding stale {} result (seq {} <= displayed {})",
                self.kind,
                seq,
                self.displayed_seq
            );
            return false;
        }
        self.displayed_seq = seq;
        self.result = result;
        true
    }

    /// Run the transform for a snapshot without touching demo state.
    pub async fn run(
        &self,
        cache: &TranspilerCache,
        pending: &PendingTransform,
    ) -> TransformResult {
        transform_snippet(cache, &pending.code, self.kind, self.options.transpile).await
    }

    /// Transform the current code if needed and install the result.
    pub async fn refresh(&mut self, cache: &TranspilerCache) -> &TransformResult {
        if let Some(pending) = self.pending() {
            let result = self.run(cache, &pending).await;
            self.complete(pending.seq, result);
        }
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Layout;
    use crate::transform::CONTAINER_ID;

    const SNIPPET: &str = "<template><b>hi</b></template>";

    fn demo() -> DemoBlock {
        DemoBlock::new(SNIPPET, "vanilla transpile=false", &PartialOptions::default()).unwrap()
    }

    #[test]
    fn merges_site_and_directive_options() {
        let site = PartialOptions {
            layout: Some(Layout::Column),
            show_code_by_default: Some(true),
            ..Default::default()
        };

        let demo = DemoBlock::new(SNIPPET, "vue showCodeByDefault=false&live=false", &site).unwrap();

        assert_eq!(demo.kind(), DemoKind::Vue);
        assert_eq!(demo.direction(), Direction::Column);
        assert!(!demo.code_visible());
        assert!(!demo.is_live());
    }

    #[test]
    fn invalid_directive_is_contained() {
        let err = DemoBlock::new(SNIPPET, "vanilla live=alert(1)", &PartialOptions::default())
            .unwrap_err();
        assert!(matches!(err, DirectiveError::InvalidOption { .. }));
    }

    #[tokio::test]
    async fn refresh_transforms_once_per_change() {
        let cache = TranspilerCache::default();
        let mut demo = demo();

        assert!(demo.pending().is_some());
        assert_eq!(demo.refresh(&cache).await.html, "<b>hi</b>");
        assert!(demo.pending().is_none());

        demo.edit("<template><i>edited</i></template>");
        assert_eq!(demo.refresh(&cache).await.html, "<i>edited</i>");
        assert_eq!(demo.displayed_seq(), demo.seq());
    }

    #[tokio::test]
    async fn stale_completion_is_discarded() {
        let cache = TranspilerCache::default();
        let mut demo = demo();

        demo.edit("<template>first</template>");
        let slow = demo.pending().unwrap();
        demo.edit("<template>second</template>");
        let fast = demo.pending().unwrap();

        let fast_result = demo.run(&cache, &fast).await;
        let slow_result = demo.run(&cache, &slow).await;

        assert!(demo.complete(fast.seq, fast_result));
        assert!(!demo.complete(slow.seq, slow_result));
        assert_eq!(demo.result().html, "second");
    }

    #[test]
    fn sync_upstream_only_on_change() {
        let mut demo = demo();
        demo.edit("<template>local</template>");

        assert_eq!(demo.sync_upstream(SNIPPET), None);
        assert_eq!(demo.code(), "<template>local</template>");

        let seq = demo.sync_upstream("<template>reloaded</template>").unwrap();
        assert_eq!(seq, demo.seq());
        assert_eq!(demo.code(), "<template>reloaded</template>");
        assert_eq!(demo.upstream(), "<template>reloaded</template>");
    }

    #[test]
    fn toggles_code_visibility() {
        let mut demo = demo();
        assert!(!demo.code_visible());
        assert!(demo.toggle_code());
        assert!(!demo.toggle_code());
    }

    #[tokio::test]
    async fn vue_demo_output_mounts_into_markup_container() {
        let cache = TranspilerCache::default();
        let source = "<template><p>x</p></template><script>export default {}</script>";
        let mut demo = DemoBlock::new(source, "vue", &PartialOptions::default()).unwrap();

        let result = demo.refresh(&cache).await.clone();

        assert!(result.html.contains(&format!("id=\"{CONTAINER_ID}\"")));
        assert!(result.js.contains(&format!("getElementById('{CONTAINER_ID}')")));
    }
}

//! Demo state kept by the dev server.
//!
//! Every demo on a visited page lives here as a [`DemoBlock`]. File changes
//! are applied with `sync_upstream`, editor input goes through a per-demo
//! [`Debouncer`], and every transform result passes `DemoBlock::complete`
//! before it reaches a client.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;

use demoblock_mdx::ParsedDoc;
use demoblock_static::{
    build_navigation, demo_view, discover_pages, render_page, BuildConfig, BuildError, Page,
    RenderMode, TemplateEngine,
};
use demoblock_transform::{preview_document, DemoBlock, Debouncer, TranspilerCache};

use crate::server::ServerError;
use crate::websocket::{HmrHub, HmrMessage};

/// Script tag the dev client is loaded from.
pub const CLIENT_SCRIPT: &str = "/__hmr.js";

/// One demo fence on a page.
#[derive(Debug, Clone)]
struct DemoEntry {
    source: String,
    /// The demo, or the message of its invalid directive
    demo: Result<DemoBlock, String>,
}

/// Demo state of a visited page.
#[derive(Debug, Clone)]
struct PageState {
    /// Page markup with demos cut out, used to tell demo-only edits apart
    skeleton: String,
    demos: HashMap<String, DemoEntry>,
}

type EditorKey = (String, String);

/// Pages, demos and live editors of a dev server.
pub struct DemoStore {
    config: BuildConfig,
    cache: Arc<TranspilerCache>,
    templates: TemplateEngine,
    hmr: HmrHub,
    debounce: Duration,
    pages: Mutex<HashMap<String, PageState>>,
    editors: Mutex<HashMap<EditorKey, Debouncer<String>>>,
}

impl DemoStore {
    pub fn new(config: BuildConfig, hmr: HmrHub, debounce: Duration) -> Self {
        let cache = Arc::new(TranspilerCache::oxc(config.target.clone()));
        Self::with_cache(config, hmr, debounce, cache)
    }

    /// Create a store that shares an existing transpiler cache.
    pub fn with_cache(
        config: BuildConfig,
        hmr: HmrHub,
        debounce: Duration,
        cache: Arc<TranspilerCache>,
    ) -> Self {
        Self {
            config,
            cache,
            templates: TemplateEngine::new(),
            hmr,
            debounce,
            pages: Mutex::new(HashMap::new()),
            editors: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn hub(&self) -> &HmrHub {
        &self.hmr
    }

    /// Render the page at `url`, or `None` if no page has that URL.
    pub async fn render(&self, url: &str) -> Result<Option<String>, ServerError> {
        let pages = discover_pages(&self.config.docs_dir, &self.config.base_url)?;
        let Some(page) = pages.iter().find(|p| p.url == url) else {
            return Ok(None);
        };

        // Demos are transformed without holding the page lock
        let loaded = self.pages.lock().await.contains_key(&page.url);
        if !loaded {
            let state = self.load_page(page).await;
            self.pages
                .lock()
                .await
                .entry(page.url.clone())
                .or_insert(state);
        }

        let mut markup = HashMap::new();
        {
            let states = self.pages.lock().await;
            if let Some(state) = states.get(&page.url) {
                for (id, entry) in &state.demos {
                    markup.insert(id.clone(), self.render_entry(id, entry)?);
                }
            }
        }

        let nav = build_navigation(&pages, &self.config.base_url);
        let html = render_page(
            &self.templates,
            &self.config,
            page,
            &nav,
            &markup,
            vec![CLIENT_SCRIPT.to_string()],
        )
        .map_err(BuildError::from)?;
        Ok(Some(html))
    }

    /// Apply a changed page source and notify clients.
    ///
    /// Demo-only changes are pushed as `update_demo`; anything else reloads.
    pub async fn page_changed(&self, path: &Path) -> Result<(), ServerError> {
        let page = Page::load(&self.config.docs_dir, path, &self.config.base_url)?;
        let page_skeleton = skeleton(&page.doc);

        let mut jobs = Vec::new();
        let reload = {
            let mut states = self.pages.lock().await;
            let same_layout = states
                .get(&page.url)
                .map(|state| state.skeleton == page_skeleton);

            match same_layout {
                None => true,
                Some(false) => {
                    tracing::debug!("Page {} changed outside its demos", page.url);
                    states.remove(&page.url);
                    true
                }
                Some(true) => {
                    if let Some(state) = states.get_mut(&page.url) {
                        for block in page.doc.demo_blocks() {
                            let Some(entry) = state.demos.get_mut(&block.id) else {
                                continue;
                            };
                            let source_changed = entry.source != block.source;
                            entry.source = block.source.clone();

                            if let Ok(demo) = entry.demo.as_mut() {
                                let Some(seq) = demo.sync_upstream(&block.source) else {
                                    continue;
                                };
                                tracing::debug!(
                                    "Demo {} on {} changed on disk (seq {})",
                                    block.id,
                                    page.url,
                                    seq
                                );
                                if let Some(pending) = demo.pending() {
                                    jobs.push((block.id.clone(), demo.clone(), pending));
                                }
                            } else if source_changed {
                                let html = self.render_entry(&block.id, entry)?;
                                self.send_update(&page.url, &block.id, html);
                            }
                        }
                    }
                    false
                }
            }
        };

        if reload {
            self.forget_editors(Some(&page.url)).await;
            self.hmr.send(HmrMessage::Reload);
            return Ok(());
        }

        let mut results = Vec::with_capacity(jobs.len());
        for (id, snapshot, pending) in jobs {
            let result = snapshot.run(&self.cache, &pending).await;
            results.push((id, pending.seq, result));
        }

        let mut states = self.pages.lock().await;
        let Some(state) = states.get_mut(&page.url) else {
            return Ok(());
        };
        for (id, seq, result) in results {
            let Some(entry) = state.demos.get_mut(&id) else {
                continue;
            };
            let accepted = entry
                .demo
                .as_mut()
                .is_ok_and(|demo| demo.complete(seq, result));
            if accepted {
                let html = self.render_entry(&id, entry)?;
                self.send_update(&page.url, &id, html);
            }
        }

        Ok(())
    }

    /// Forget cached pages and editors, then reload clients.
    pub async fn invalidate(&self) {
        self.pages.lock().await.clear();
        self.forget_editors(None).await;
        self.hmr.send(HmrMessage::Reload);
    }

    /// Queue editor input for a demo.
    ///
    /// Input is debounced per demo; each settled value is applied with
    /// [`apply_edit`]. Input for demos that are not loaded and live is
    /// dropped.
    pub async fn edit(store: &Arc<Self>, page: String, id: String, code: String) {
        if !store.accepts_edits(&page, &id).await {
            tracing::debug!("Ignoring edit for unknown or read-only demo {} on {}", id, page);
            return;
        }

        let mut editors = store.editors.lock().await;
        let key = (page, id);

        let delivered = editors
            .get(&key)
            .is_some_and(|debouncer| debouncer.push(code.clone()));
        if delivered {
            return;
        }

        let (debouncer, mut settled) = Debouncer::new(store.debounce);
        debouncer.push(code);
        editors.insert(key.clone(), debouncer);

        let weak: Weak<Self> = Arc::downgrade(store);
        tokio::spawn(async move {
            while let Some(code) = settled.recv().await {
                let Some(store) = weak.upgrade() else {
                    break;
                };
                apply_edit(&store, &key.0, &key.1, code).await;
            }
        });
    }

    async fn accepts_edits(&self, page: &str, id: &str) -> bool {
        let states = self.pages.lock().await;
        let live = states
            .get(page)
            .and_then(|s| s.demos.get(id))
            .and_then(|e| e.demo.as_ref().ok())
            .is_some_and(DemoBlock::is_live);
        live
    }

    /// Drop the editors of one page, or of every page. Dropping a debouncer
    /// ends its forwarding task.
    async fn forget_editors(&self, page: Option<&str>) {
        let mut editors = self.editors.lock().await;
        match page {
            Some(url) => editors.retain(|(editor_page, _), _| editor_page != url),
            None => editors.clear(),
        }
    }

    fn send_update(&self, page: &str, id: &str, html: String) {
        self.hmr.send(HmrMessage::UpdateDemo {
            page: page.to_string(),
            id: id.to_string(),
            html,
        });
    }

    async fn load_page(&self, page: &Page) -> PageState {
        let mut demos = HashMap::new();

        for block in page.doc.demo_blocks() {
            let demo = match DemoBlock::new(&block.source, &block.meta, &self.config.demo) {
                Ok(mut demo) => {
                    demo.refresh(&self.cache).await;
                    Ok(demo)
                }
                Err(e) => {
                    tracing::warn!("Demo {} on {} has an invalid directive: {}", block.id, page.url, e);
                    Err(e.to_string())
                }
            };

            demos.insert(
                block.id.clone(),
                DemoEntry {
                    source: block.source.clone(),
                    demo,
                },
            );
        }

        PageState {
            skeleton: skeleton(&page.doc),
            demos,
        }
    }

    fn render_entry(&self, id: &str, entry: &DemoEntry) -> Result<String, ServerError> {
        let html = match &entry.demo {
            Ok(demo) => self
                .templates
                .render_demo(&demo_view(id, demo, RenderMode::Live, false)),
            Err(message) => self.templates.render_demo_error(id, message, &entry.source),
        };
        Ok(html.map_err(BuildError::from)?)
    }
}

/// Stamp an edit, transform it off the lock and publish the result if it is
/// still the newest.
pub async fn apply_edit(store: &Arc<DemoStore>, page: &str, id: &str, code: String) {
    let (snapshot, pending) = {
        let mut states = store.pages.lock().await;
        let Some(demo) = states
            .get_mut(page)
            .and_then(|s| s.demos.get_mut(id))
            .and_then(|e| e.demo.as_mut().ok())
        else {
            tracing::debug!("Ignoring edit for unknown demo {} on {}", id, page);
            return;
        };

        if !demo.is_live() {
            tracing::warn!("Ignoring edit for read-only demo {} on {}", id, page);
            return;
        }

        demo.edit(code);
        let Some(pending) = demo.pending() else {
            return;
        };
        (demo.clone(), pending)
    };

    let store = Arc::clone(store);
    let (page, id) = (page.to_string(), id.to_string());
    tokio::spawn(async move {
        let result = snapshot.run(&store.cache, &pending).await;

        let mut states = store.pages.lock().await;
        let Some(demo) = states
            .get_mut(&page)
            .and_then(|s| s.demos.get_mut(&id))
            .and_then(|e| e.demo.as_mut().ok())
        else {
            return;
        };

        if demo.complete(pending.seq, result) {
            store.hmr.send(HmrMessage::DemoResult {
                page,
                id,
                seq: pending.seq,
                srcdoc: preview_document(demo.result(), &demo.options().scope, false),
                is_error: demo.result().is_error(),
            });
        }
    });
}

/// Page markup with each demo replaced by a marker.
fn skeleton(doc: &ParsedDoc) -> String {
    let body = doc.render_html(|block| block.is_demo().then(|| format!("<!--{}-->", block.id)));
    format!("{:?}\n{}", doc.frontmatter, body)
}

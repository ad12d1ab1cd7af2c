//! Development server implementation.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path as UrlPath, State,
    },
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use demoblock_static::assets::AssetPipeline;
use demoblock_static::{BuildConfig, BuildError};
use demoblock_transform::{escape_html, DEFAULT_DEBOUNCE};

use crate::store::DemoStore;
use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{hmr_client_script, ClientMessage, HmrHub, HmrMessage};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Site settings shared with static builds
    pub site: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Quiet period before editor input is transformed
    pub debounce: Duration,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            site: BuildConfig::default(),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    Build(#[from] BuildError),
}

type SharedState = Arc<DemoStore>;

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr_str = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|_| ServerError::InvalidAddress(addr_str.clone()))?;

        // Pages are always served from the root
        let site = BuildConfig {
            base_url: "/".to_string(),
            ..self.config.site.clone()
        };
        let docs_dir = site.docs_dir.clone();

        let mut watch_paths = vec![docs_dir.clone()];
        watch_paths.extend(site.styles.iter().map(Into::into));

        let store = Arc::new(DemoStore::new(site, HmrHub::new(), self.config.debounce));

        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        let watch_store = Arc::clone(&store);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&watch_store, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(store, &docs_dir);

        tracing::info!("Starting dev server at http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::debug!("Could not open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Routes of the dev server.
fn router(store: SharedState, docs_dir: &Path) -> Router {
    Router::new()
        .route("/__hmr", get(ws_handler))
        .route("/__hmr.js", get(hmr_script_handler))
        .route("/assets/{file}", get(asset_handler))
        .nest_service("/static", ServeDir::new(docs_dir))
        .fallback(page_handler)
        .with_state(store)
}

/// Handle file watch events.
async fn handle_watch_event(store: &SharedState, event: WatchEvent) {
    match event {
        WatchEvent::PageModified(path) => {
            tracing::info!("Page modified: {}", path.display());
            if let Err(e) = store.page_changed(&path).await {
                tracing::warn!("Failed to apply {}: {}", path.display(), e);
                store.invalidate().await;
            }
        }

        WatchEvent::Created(path) | WatchEvent::Deleted(path) | WatchEvent::Modified(path) => {
            tracing::debug!("Changed: {}", path.display());
            store.invalidate().await;
        }
    }
}

/// Normalize a request path to a page URL.
fn page_url(path: &str) -> String {
    let path = path.trim_end_matches("index.html");
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Render the page matching the request path.
async fn page_handler(State(store): State<SharedState>, uri: Uri) -> Response {
    let url = page_url(uri.path());

    match store.render(&url).await {
        Ok(Some(html)) => Html(html).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Html(format!("<h1>No page at {}</h1>", url)))
            .into_response(),
        Err(e) => {
            tracing::warn!("Failed to render {}: {}", url, e);
            let message = escape_html(&e.to_string());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("<pre style=\"color: red\">{}</pre>", message)),
            )
                .into_response()
        }
    }
}

/// Serve generated assets and configured stylesheets.
async fn asset_handler(State(store): State<SharedState>, UrlPath(file): UrlPath<String>) -> Response {
    match file.as_str() {
        "main.css" => {
            ([(header::CONTENT_TYPE, "text/css")], AssetPipeline::generate_css()).into_response()
        }
        "main.js" => (
            [(header::CONTENT_TYPE, "application/javascript")],
            AssetPipeline::generate_js(),
        )
            .into_response(),
        _ => {
            let style = store
                .config()
                .styles
                .iter()
                .map(Path::new)
                .find(|p| p.file_name().and_then(|f| f.to_str()) == Some(file.as_str()));

            match style.map(std::fs::read_to_string) {
                Some(Ok(css)) => ([(header::CONTENT_TYPE, "text/css")], css).into_response(),
                _ => StatusCode::NOT_FOUND.into_response(),
            }
        }
    }
}

/// Handler for the WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(store): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, store))
}

/// Forward broadcasts to the client and apply its edits.
async fn handle_ws(mut socket: WebSocket, store: SharedState) {
    let mut rx = store.hub().subscribe();

    if !send_message(&mut socket, &HmrMessage::Connected).await {
        return;
    }

    loop {
        tokio::select! {
            broadcast = rx.recv() => match broadcast {
                Ok(msg) => {
                    if !send_message(&mut socket, &msg).await {
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Client lagged behind by {} messages", skipped);
                }
                Err(_) => break,
            },

            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientMessage>(text.as_str()) {
                        Ok(ClientMessage::Edit { page, id, code }) => {
                            DemoStore::edit(&store, page, id, code).await;
                        }
                        Err(e) => tracing::warn!("Ignoring malformed client message: {}", e),
                    }
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &HmrMessage) -> bool {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Failed to encode message: {}", e);
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Handler for the client script.
async fn hmr_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        hmr_client_script("/__hmr"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());
        assert_eq!(server.config.port, 7777);
        assert_eq!(server.config.debounce, DEFAULT_DEBOUNCE);
    }

    #[test]
    fn normalizes_page_urls() {
        assert_eq!(page_url("/"), "/");
        assert_eq!(page_url("/counter"), "/counter/");
        assert_eq!(page_url("/vue/todo/"), "/vue/todo/");
        assert_eq!(page_url("/vue/index.html"), "/vue/");
    }

    #[tokio::test]
    async fn rejects_invalid_address() {
        let server = DevServer::new(DevServerConfig {
            host: "not an address".to_string(),
            open: false,
            ..Default::default()
        });

        assert!(matches!(
            server.start().await,
            Err(ServerError::InvalidAddress(_))
        ));
    }
}

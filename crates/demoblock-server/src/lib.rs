//! Development server for demoblock docs.
//!
//! Serves pages rendered on request, reloads them when sources change, and
//! runs live demo edits sent from the browser.

pub mod server;
pub mod store;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use store::DemoStore;
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ClientMessage, HmrHub, HmrMessage};

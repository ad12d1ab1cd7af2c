//! WebSocket protocol for hot reload and live editing.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Messages sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HmrMessage {
    /// Full page reload
    Reload,

    /// Replace a demo block after its source changed on disk
    UpdateDemo {
        /// Page URL path
        page: String,
        /// Demo block id
        id: String,
        /// New demo markup
        html: String,
    },

    /// Output of a live edit
    DemoResult {
        page: String,
        id: String,
        /// Sequence number of the edit this output belongs to
        seq: u64,
        /// Preview document
        srcdoc: String,
        is_error: bool,
    },

    /// Connection established
    Connected,
}

/// Messages received from clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The code of a live demo was edited
    Edit {
        page: String,
        id: String,
        code: String,
    },
}

/// Hub for broadcasting messages to all connected clients.
#[derive(Debug, Clone)]
pub struct HmrHub {
    sender: broadcast::Sender<HmrMessage>,
}

impl HmrHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected clients.
    pub fn send(&self, msg: HmrMessage) {
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HmrMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for HmrHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client script: applies server messages and sends editor input.
///
/// `ws_path` is resolved against the page's own host.
pub fn hmr_client_script(ws_path: &str) -> String {
    format!(
        r#"
(function() {{
  'use strict';

  const path = location.pathname.replace(/index\.html$/, '');
  const page = path.endsWith('/') ? path : path + '/';
  const protocol = location.protocol === 'https:' ? 'wss:' : 'ws:';
  const ws = new WebSocket(protocol + '//' + location.host + '{}');
  const shown = {{}};
  let reconnectAttempts = 0;
  const maxReconnectAttempts = 10;

  ws.onopen = function() {{
    console.log('[demoblock] Connected');
    reconnectAttempts = 0;
  }};

  ws.onmessage = function(event) {{
    const msg = JSON.parse(event.data);

    switch (msg.type) {{
      case 'reload':
        location.reload();
        break;

      case 'update_demo': {{
        if (msg.page !== page) break;
        const el = document.getElementById(msg.id);
        if (!el) {{
          location.reload();
          break;
        }}
        el.outerHTML = msg.html;
        delete shown[msg.id];
        break;
      }}

      case 'demo_result': {{
        if (msg.page !== page) break;
        if ((shown[msg.id] || 0) >= msg.seq) break;
        shown[msg.id] = msg.seq;
        const demo = document.getElementById(msg.id);
        const runner = demo && demo.querySelector('.dpdb__runner');
        if (runner) runner.srcdoc = msg.srcdoc;
        break;
      }}

      case 'connected':
        break;
    }}
  }};

  document.addEventListener('input', function(event) {{
    const editor = event.target.closest('.dpdb__editor');
    if (!editor || ws.readyState !== WebSocket.OPEN) return;
    ws.send(JSON.stringify({{
      type: 'edit',
      page: page,
      id: editor.dataset.demo,
      code: editor.value,
    }}));
  }});

  ws.onclose = function() {{
    console.log('[demoblock] Disconnected');
    if (reconnectAttempts < maxReconnectAttempts) {{
      reconnectAttempts++;
      setTimeout(function() {{
        location.reload();
      }}, 1000 * reconnectAttempts);
    }}
  }};

  ws.onerror = function(e) {{
    console.error('[demoblock] WebSocket error:', e);
  }};
}})();
"#,
        ws_path
    )
}

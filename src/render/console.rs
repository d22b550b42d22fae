// src/render/console.rs
use super::Renderer;
use crate::status::CheckState;
use serde_json::Value;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::warn;

/// Paints the widget as plain text lines.
pub struct ConsoleRenderer<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleRenderer {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            warn!("Failed to render: {}", e);
        }
    }
}

impl<W: Write + Send> Renderer for ConsoleRenderer<W> {
    fn on_state_change(&self, state: CheckState) {
        let marker = match state {
            CheckState::Online => "●",
            CheckState::Offline => "○",
            CheckState::Idle | CheckState::Checking => "◌",
        };
        self.write_line(&format!("{} API status: {}", marker, state));
    }

    fn on_payload(&self, payload: &Value) {
        match serde_json::to_string_pretty(payload) {
            Ok(text) => self.write_line(&text),
            Err(e) => warn!("Failed to format payload: {}", e),
        }
    }

    fn on_version(&self, version: &str) {
        self.write_line(&format!("Version: {}", version));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rendered(f: impl FnOnce(&ConsoleRenderer<Vec<u8>>)) -> String {
        let renderer = ConsoleRenderer::new(Vec::new());
        f(&renderer);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn status_lines_use_display_text() {
        let out = rendered(|r| {
            r.on_state_change(CheckState::Checking);
            r.on_state_change(CheckState::Online);
        });
        assert_eq!(out, "◌ API status: Checking...\n● API status: Online\n");
    }

    #[test]
    fn payload_is_pretty_printed() {
        let out = rendered(|r| r.on_payload(&json!({"status": "ok"})));
        assert_eq!(out, "{\n  \"status\": \"ok\"\n}\n");
    }

    #[test]
    fn version_line() {
        assert_eq!(rendered(|r| r.on_version("2.3.1")), "Version: 2.3.1\n");
    }
}

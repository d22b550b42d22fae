// src/render/mod.rs
mod console;

pub use console::ConsoleRenderer;

use crate::status::CheckState;
use serde_json::Value;

/// Observer notified by the status controller. Callbacks are synchronous
/// and must not block.
pub trait Renderer: Send + Sync {
    fn on_state_change(&self, state: CheckState);

    /// Raw payload to pretty-print.
    fn on_payload(&self, payload: &Value);

    fn on_version(&self, version: &str);
}

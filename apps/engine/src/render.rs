//! Board rendering contract. The payload is opaque to the engine and is
//! forwarded to the notifier without interpretation.

use serde_json::Value;

use crate::domain::state::GameState;

pub trait BoardRenderer: Send + Sync {
    fn render(&self, state: &GameState) -> Value;
}

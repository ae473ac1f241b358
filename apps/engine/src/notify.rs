//! Notification contract: everything the engine tells the chat platform.
//!
//! The engine never formats platform markup; it hands over text, labeled
//! buttons, and opaque board payloads.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::state::{Game, UserId};
use crate::error::EngineError;

/// A labeled button attached to an action message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    pub custom_id: String,
}

impl ActionButton {
    pub fn new(label: impl Into<String>, custom_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            custom_id: custom_id.into(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Create the channel group for a new game; implementations fill in
    /// `game.channels` out of band and report the ids back through save.
    async fn create_channel_group(&self, game: &Game) -> Result<(), EngineError>;

    /// Tear down the channel group. Best-effort after `Ended`.
    async fn delete_channel_group(&self, game: &Game) -> Result<(), EngineError>;

    /// Post a rendered board payload, forwarded without interpretation.
    async fn post_board(&self, game: &Game, payload: Value) -> Result<(), EngineError>;

    /// Post an action message with zero or more labeled buttons.
    async fn post_action(
        &self,
        game: &Game,
        text: &str,
        buttons: &[ActionButton],
    ) -> Result<(), EngineError>;

    /// Send a private message to one participant.
    async fn send_private(
        &self,
        game: &Game,
        user_id: UserId,
        text: &str,
    ) -> Result<(), EngineError>;

    /// Open an ephemeral discussion thread for the current auction.
    async fn create_bidding_thread(&self, game: &Game, topic: &str) -> Result<(), EngineError>;

    /// Post into the current bidding thread.
    async fn post_bidding_thread(&self, game: &Game, text: &str) -> Result<(), EngineError>;

    /// Archive the current bidding thread.
    async fn archive_bidding_thread(&self, game: &Game) -> Result<(), EngineError>;
}

//! Test doubles for the engine's collaborators: an in-memory repository, a
//! recording notifier, and a trivial JSON renderer.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::snapshot;
use crate::domain::state::{Game, GameId, GameState, UserId};
use crate::error::EngineError;
use crate::notify::{ActionButton, Notifier};
use crate::render::BoardRenderer;
use crate::repos::GameRepo;

/// In-memory repository storing aggregates as snapshot blobs, the way a real
/// store would.
#[derive(Default)]
pub struct InMemoryGames {
    blobs: Mutex<HashMap<GameId, Vec<u8>>>,
    pub save_count: Mutex<u32>,
}

impl InMemoryGames {
    pub fn contains(&self, id: GameId) -> bool {
        self.blobs.lock().unwrap().contains_key(&id)
    }

    pub fn saves(&self) -> u32 {
        *self.save_count.lock().unwrap()
    }
}

#[async_trait]
impl GameRepo for InMemoryGames {
    async fn load(&self, id: GameId) -> Result<Option<Game>, EngineError> {
        let blobs = self.blobs.lock().unwrap();
        blobs
            .get(&id)
            .map(|blob| snapshot::from_blob(blob))
            .transpose()
    }

    async fn save(&self, game: &Game) -> Result<(), EngineError> {
        let blob = snapshot::to_blob(game)?;
        self.blobs.lock().unwrap().insert(game.id, blob);
        *self.save_count.lock().unwrap() += 1;
        Ok(())
    }

    async fn delete(&self, id: GameId) -> Result<(), EngineError> {
        self.blobs.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// Everything a test notifier saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
    ChannelGroupCreated,
    ChannelGroupDeleted,
    BoardPosted,
    Action { text: String, buttons: usize },
    Private { user_id: UserId, text: String },
    ThreadCreated { topic: String },
    ThreadPost { text: String },
    ThreadArchived,
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<NotifyEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<NotifyEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn actions_containing(&self, needle: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, NotifyEvent::Action { text, .. } if text.contains(needle)))
            .count()
    }

    pub fn privates_to(&self, user_id: UserId) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                NotifyEvent::Private { user_id: to, text } if to == user_id => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: NotifyEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn create_channel_group(&self, _game: &Game) -> Result<(), EngineError> {
        self.record(NotifyEvent::ChannelGroupCreated);
        Ok(())
    }

    async fn delete_channel_group(&self, _game: &Game) -> Result<(), EngineError> {
        self.record(NotifyEvent::ChannelGroupDeleted);
        Ok(())
    }

    async fn post_board(&self, _game: &Game, _payload: Value) -> Result<(), EngineError> {
        self.record(NotifyEvent::BoardPosted);
        Ok(())
    }

    async fn post_action(
        &self,
        _game: &Game,
        text: &str,
        buttons: &[ActionButton],
    ) -> Result<(), EngineError> {
        self.record(NotifyEvent::Action {
            text: text.to_string(),
            buttons: buttons.len(),
        });
        Ok(())
    }

    async fn send_private(
        &self,
        _game: &Game,
        user_id: UserId,
        text: &str,
    ) -> Result<(), EngineError> {
        self.record(NotifyEvent::Private {
            user_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn create_bidding_thread(&self, _game: &Game, topic: &str) -> Result<(), EngineError> {
        self.record(NotifyEvent::ThreadCreated {
            topic: topic.to_string(),
        });
        Ok(())
    }

    async fn post_bidding_thread(&self, _game: &Game, text: &str) -> Result<(), EngineError> {
        self.record(NotifyEvent::ThreadPost {
            text: text.to_string(),
        });
        Ok(())
    }

    async fn archive_bidding_thread(&self, _game: &Game) -> Result<(), EngineError> {
        self.record(NotifyEvent::ThreadArchived);
        Ok(())
    }
}

/// Minimal renderer: a handful of scalar fields, opaque to the engine.
#[derive(Default)]
pub struct JsonBoardRenderer;

impl BoardRenderer for JsonBoardRenderer {
    fn render(&self, state: &GameState) -> Value {
        json!({
            "turn": state.turn,
            "phase": format!("{:?}", state.phase),
            "storm": state.storm_location,
            "factions": state.factions.len(),
        })
    }
}

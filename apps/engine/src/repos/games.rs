//! Game aggregate persistence contract.
//!
//! The host owns storage. The engine saves after each successful command and
//! deletes the aggregate when a game reaches `Ended`; it never retries.

use async_trait::async_trait;

use crate::domain::state::{Game, GameId};
use crate::error::EngineError;

#[async_trait]
pub trait GameRepo: Send + Sync {
    /// Load a game by id, or `None` if no such game exists.
    async fn load(&self, id: GameId) -> Result<Option<Game>, EngineError>;

    /// Persist the aggregate. Implementations typically store
    /// `domain::snapshot::to_blob` output.
    async fn save(&self, game: &Game) -> Result<(), EngineError>;

    /// Remove the aggregate entirely.
    async fn delete(&self, id: GameId) -> Result<(), EngineError>;
}

/// Load a game or fail with `NotFound`.
pub async fn require_game(repo: &dyn GameRepo, id: GameId) -> Result<Game, EngineError> {
    repo.load(id).await?.ok_or_else(|| {
        EngineError::not_found(crate::error::NotFoundKind::Game, format!("game {id} not found"))
    })
}

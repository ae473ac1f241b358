//! Phase orchestration: drives the state machine, persists after each
//! transition, and notifies the platform.

pub mod handlers;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::state::{Game, Phase};
use crate::error::EngineError;
use crate::notify::Notifier;
use crate::render::BoardRenderer;
use crate::repos::GameRepo;

pub use handlers::{handler_for, PhaseHandler};

pub struct PhaseManager {
    repo: Arc<dyn GameRepo>,
    notifier: Arc<dyn Notifier>,
    renderer: Arc<dyn BoardRenderer>,
}

impl PhaseManager {
    pub fn new(
        repo: Arc<dyn GameRepo>,
        notifier: Arc<dyn Notifier>,
        renderer: Arc<dyn BoardRenderer>,
    ) -> Self {
        Self {
            repo,
            notifier,
            renderer,
        }
    }

    /// Advance the state machine one step: compute the next phase from the
    /// current handler, enter it, run its entry action, then persist and
    /// notify. A transition into `Ended` tears the game down instead; nothing
    /// is persisted past that point.
    pub async fn advance_phase(&self, game: &mut Game) -> Result<Phase, EngineError> {
        let current = handler_for(game.state.phase)?;
        let next = current.next_phase(&game.state);
        debug!(
            game_id = %game.id,
            from = ?game.state.phase,
            to = ?next,
            "Transition"
        );
        game.state.phase = next;

        if next == Phase::Ended {
            self.teardown(game).await;
            return Ok(next);
        }

        let entry = handler_for(next)?;
        entry.run_phase(game, self.notifier.as_ref()).await?;
        self.notifier
            .post_action(game, entry.description(), &[])
            .await?;

        self.repo.save(game).await?;
        let payload = self.renderer.render(&game.state);
        self.notifier.post_board(game, payload).await?;
        Ok(next)
    }

    /// Best-effort teardown once a game reaches `Ended`: the channel group
    /// and the stored aggregate go away, and failures are logged, not
    /// propagated.
    async fn teardown(&self, game: &Game) {
        info!(game_id = %game.id, "Game ended, tearing down");
        if let Err(err) = self.notifier.delete_channel_group(game).await {
            warn!(game_id = %game.id, error = %err, "Failed to delete channel group");
        }
        if let Err(err) = self.repo.delete(game.id).await {
            warn!(game_id = %game.id, error = %err, "Failed to delete game aggregate");
        }
    }
}

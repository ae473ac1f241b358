//! Opaque blob round-trip for persistence.
//!
//! Repository implementations store the aggregate as a serialized blob with a
//! few scalar fields exposed for routing; they never interpret the interior.

use serde_json::Value;

use crate::domain::state::Game;
use crate::error::EngineError;

pub fn to_blob(game: &Game) -> Result<Vec<u8>, EngineError> {
    serde_json::to_vec(game)
        .map_err(|e| EngineError::conflict(format!("failed to serialize game snapshot: {e}")))
}

pub fn from_blob(bytes: &[u8]) -> Result<Game, EngineError> {
    serde_json::from_slice(bytes)
        .map_err(|e| EngineError::conflict(format!("failed to deserialize game snapshot: {e}")))
}

/// Routing view of a snapshot: id, name, phase, turn. Useful for listings
/// without deserializing the whole aggregate into domain types.
pub fn routing_fields(bytes: &[u8]) -> Result<Value, EngineError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| EngineError::conflict(format!("unreadable game snapshot: {e}")))?;
    Ok(serde_json::json!({
        "id": value.get("id").cloned().unwrap_or(Value::Null),
        "name": value.get("name").cloned().unwrap_or(Value::Null),
        "phase": value.pointer("/state/phase").cloned().unwrap_or(Value::Null),
        "turn": value.pointer("/state/turn").cloned().unwrap_or(Value::Null),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::{Game, Phase};
    use uuid::Uuid;

    #[test]
    fn snapshot_round_trips_the_aggregate() {
        let mut game = Game::new(Uuid::new_v4(), "trial-by-storm", 7);
        game.state.turn = 3;
        game.state.phase = Phase::Bidding;
        game.state.log_action("something happened");

        let blob = to_blob(&game).unwrap();
        let restored = from_blob(&blob).unwrap();
        assert_eq!(restored, game);

        let routing = routing_fields(&blob).unwrap();
        assert_eq!(routing["turn"], 3);
        assert_eq!(routing["phase"], "Bidding");
    }
}

#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod notify;
pub mod render;
pub mod repos;
pub mod services;

#[cfg(test)]
pub mod test_support;

// Re-exports for public API
pub use config::GameRules;
pub use domain::state::{Game, GameId, GameState, Phase, UserId};
pub use engine::GameEngine;
pub use error::EngineError;
pub use notify::{ActionButton, Notifier};
pub use render::BoardRenderer;
pub use repos::GameRepo;
pub use services::game_flow::PhaseManager;

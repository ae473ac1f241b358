//! Persistence contract between the engine and its host.

pub mod games;

pub use games::GameRepo;

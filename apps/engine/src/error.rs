//! Engine-wide error type used across services and the phase orchestrator.
//!
//! Rule violations are reported as synchronous failures with human-readable
//! messages at the point of detection. Every variant is non-retryable and the
//! detail string is surfaced verbatim to the caller.

use thiserror::Error;

/// What kind of thing was missing, for `NotFound` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    Faction,
    Player,
    Territory,
    Battle,
    Leader,
    Card,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Not found: {detail}")]
    NotFound { kind: NotFoundKind, detail: String },
    #[error("Invalid phase: {detail}")]
    InvalidPhase { detail: String },
    #[error("Not your turn: {detail}")]
    NotYourTurn { detail: String },
    #[error("Insufficient resource: {detail}")]
    InsufficientResource { detail: String },
    #[error("Invalid target: {detail}")]
    InvalidTarget { detail: String },
    #[error("Rule violation: {detail}")]
    RuleViolation { detail: String },
    #[error("Conflict: {detail}")]
    Conflict { detail: String },
}

impl EngineError {
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            detail: detail.into(),
        }
    }

    pub fn invalid_phase(detail: impl Into<String>) -> Self {
        Self::InvalidPhase {
            detail: detail.into(),
        }
    }

    pub fn not_your_turn(detail: impl Into<String>) -> Self {
        Self::NotYourTurn {
            detail: detail.into(),
        }
    }

    pub fn insufficient(detail: impl Into<String>) -> Self {
        Self::InsufficientResource {
            detail: detail.into(),
        }
    }

    pub fn invalid_target(detail: impl Into<String>) -> Self {
        Self::InvalidTarget {
            detail: detail.into(),
        }
    }

    pub fn rule_violation(detail: impl Into<String>) -> Self {
        Self::RuleViolation {
            detail: detail.into(),
        }
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict {
            detail: detail.into(),
        }
    }

    /// The `NotFound` kind, if this is a not-found error.
    pub fn not_found_kind(&self) -> Option<NotFoundKind> {
        match self {
            Self::NotFound { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

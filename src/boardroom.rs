//! Boardroom conversation orchestration
//!
//! A session seeds a transcript with the product, then alternates between
//! the turn executor (one model call per persona turn) and the rotation
//! policy (pure decision: who speaks next, or stop) until the policy
//! terminates. Snapshots are produced lazily, one per completed turn.

pub mod rotation;
pub mod session;
pub mod state;
pub mod turn;

#[cfg(test)]
mod proptests;

pub use rotation::{Rotation, RotationPolicy};
pub use session::{Session, Snapshot};
pub use state::StopCondition;
pub use turn::TurnExecutor;

use crate::llm::LlmError;
use crate::persona::UnknownPersona;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a session
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error(transparent)]
    UnknownPersona(#[from] UnknownPersona),
    #[error("Upstream generation failed: {0}")]
    UpstreamGeneration(#[from] LlmError),
    #[error("Session timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

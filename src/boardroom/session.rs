//! Session driver
//!
//! Drives the turn executor and rotation policy from the seed transcript to
//! termination, as a lazy stream of snapshots. Nothing runs unless the
//! stream is polled, so dropping it stops the session before its next turn.

use super::rotation::{Decision, Rotation, StopReason};
use super::state::{ConversationState, StopCondition};
use super::turn::TurnExecutor;
use super::SessionError;
use crate::persona::Persona;
use futures::stream::{self, Stream};
use serde::Serialize;
use tokio::time::Instant;

/// Transcript state after a completed turn, or the terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub session_id: String,
    pub transcript: String,
    /// Persona whose turn produced this snapshot; `None` when no turn was taken
    pub speaker: Option<Persona>,
    pub turns_taken: u32,
    pub finished: bool,
    pub stop_reason: Option<StopReason>,
}

pub struct Session {
    id: String,
    state: ConversationState,
    executor: TurnExecutor,
    rotation: Rotation,
}

enum Phase {
    Start(Box<Session>),
    Turn(Box<Session>),
}

impl Phase {
    /// Produce the next snapshot and the phase that follows it, if any.
    async fn advance(self) -> (Result<Snapshot, SessionError>, Option<Phase>) {
        match self {
            Phase::Start(mut session) => {
                match session.rotation.initial(session.state.stop, Instant::now()) {
                    Decision::Speak(persona) => {
                        session.state.current_speaker = persona;
                        session.take_turn().await
                    }
                    Decision::Terminate(reason) => {
                        session.log_finished(reason);
                        (Ok(session.snapshot(None, Some(reason))), None)
                    }
                }
            }
            Phase::Turn(session) => session.take_turn().await,
        }
    }
}

impl Session {
    pub fn new(
        executor: TurnExecutor,
        rotation: Rotation,
        product_description: &str,
        stop: StopCondition,
    ) -> Self {
        let initial = rotation.first_speaker().unwrap_or(Persona::Ceo);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            state: ConversationState::new(product_description, initial, stop),
            executor,
            rotation,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Lazily run the session, yielding one snapshot per completed turn.
    ///
    /// The last item has `finished` set. A session whose stop condition is
    /// already met yields a single finished snapshot holding only the
    /// product line. After an error the stream ends.
    pub fn stream(self) -> impl Stream<Item = Result<Snapshot, SessionError>> + Send + 'static {
        self.log_started();
        stream::unfold(Some(Phase::Start(Box::new(self))), |phase| async move {
            let (item, next) = phase?.advance().await;
            Some((item, next))
        })
    }

    /// Run to completion and return the final snapshot.
    pub async fn run(self) -> Result<Snapshot, SessionError> {
        self.log_started();
        let mut phase = Phase::Start(Box::new(self));
        loop {
            let (item, next) = phase.advance().await;
            let snapshot = item?;
            match next {
                Some(following) => phase = following,
                None => return Ok(snapshot),
            }
        }
    }

    async fn take_turn(mut self: Box<Self>) -> (Result<Snapshot, SessionError>, Option<Phase>) {
        let speaker = self.state.current_speaker;
        let transcript = match self.executor.execute(&self.state.transcript, speaker).await {
            Ok(transcript) => transcript,
            Err(e) => {
                tracing::error!(
                    session_id = %self.id,
                    persona = %speaker,
                    turns_taken = self.state.turns_taken,
                    error = %e,
                    "Session aborted"
                );
                return (Err(e), None);
            }
        };
        self.state.commit_turn(speaker, transcript);

        tracing::info!(
            session_id = %self.id,
            persona = %speaker,
            turns_taken = self.state.turns_taken,
            "Turn completed"
        );

        match self.rotation.next(&self.state, Instant::now()) {
            Ok(Decision::Speak(next)) => {
                let snapshot = self.snapshot(Some(speaker), None);
                self.state.current_speaker = next;
                (Ok(snapshot), Some(Phase::Turn(self)))
            }
            Ok(Decision::Terminate(reason)) => {
                self.log_finished(reason);
                (Ok(self.snapshot(Some(speaker), Some(reason))), None)
            }
            Err(e) => (Err(e.into()), None),
        }
    }

    fn snapshot(&self, speaker: Option<Persona>, stop_reason: Option<StopReason>) -> Snapshot {
        Snapshot {
            session_id: self.id.clone(),
            transcript: self.state.transcript.as_str().to_string(),
            speaker,
            turns_taken: self.state.turns_taken,
            finished: stop_reason.is_some(),
            stop_reason,
        }
    }

    fn log_started(&self) {
        tracing::info!(
            session_id = %self.id,
            policy = ?self.rotation.policy(),
            stop = ?self.state.stop,
            "Starting boardroom session"
        );
    }

    fn log_finished(&self, reason: StopReason) {
        tracing::info!(
            session_id = %self.id,
            turns_taken = self.state.turns_taken,
            reason = ?reason,
            "Session finished"
        );
    }
}

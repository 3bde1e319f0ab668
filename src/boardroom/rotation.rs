//! Rotation policy: who speaks next, or whether the session ends.
//!
//! Decisions are a function of the conversation state, the current time and
//! an injected random source; the policy performs no I/O.

use super::state::{ConversationState, StopCondition};
use crate::persona::{Persona, UnknownPersona};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tokio::time::Instant;

/// How the next speaker is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPolicy {
    /// Uniformly random among every persona except the one who just spoke.
    /// The stop condition is checked after every turn.
    Random,
    /// Fixed roster order, wrapping around. A deadline is only checked after
    /// the last persona in the roster speaks; turn limits after every turn.
    RoundRobin,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TurnLimitReached,
    DeadlinePassed,
    /// The roster leaves nobody eligible to speak
    NoEligibleSpeaker,
}

/// Outcome of a rotation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Speak(Persona),
    Terminate(StopReason),
}

/// A rotation policy bound to a roster and a random source
#[derive(Debug, Clone)]
pub struct Rotation {
    policy: RotationPolicy,
    roster: Vec<Persona>,
    rng: StdRng,
}

impl Rotation {
    pub fn new(policy: RotationPolicy, roster: Vec<Persona>, rng: StdRng) -> Self {
        Self {
            policy,
            roster,
            rng,
        }
    }

    /// Rotation seeded from the operating system.
    pub fn from_entropy(policy: RotationPolicy, roster: Vec<Persona>) -> Self {
        Self::new(policy, roster, StdRng::from_entropy())
    }

    /// Rotation with a fixed seed, for reproducible sessions.
    #[cfg(test)]
    pub fn seeded(policy: RotationPolicy, roster: Vec<Persona>, seed: u64) -> Self {
        Self::new(policy, roster, StdRng::seed_from_u64(seed))
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// The persona that opens the session.
    pub fn first_speaker(&self) -> Option<Persona> {
        self.roster.first().copied()
    }

    /// Decision taken before any turn: degenerate stop conditions end the
    /// session immediately, otherwise the first roster entry speaks.
    pub fn initial(&self, stop: StopCondition, now: Instant) -> Decision {
        if stop.is_degenerate(now) {
            return Decision::Terminate(stop_reason(stop));
        }
        match self.first_speaker() {
            Some(persona) => Decision::Speak(persona),
            None => Decision::Terminate(StopReason::NoEligibleSpeaker),
        }
    }

    /// Decision taken after a completed turn.
    pub fn next(
        &mut self,
        state: &ConversationState,
        now: Instant,
    ) -> Result<Decision, UnknownPersona> {
        let current = state.current_speaker;
        let position = self
            .roster
            .iter()
            .position(|p| *p == current)
            .ok_or_else(|| UnknownPersona(current.id().to_string()))?;

        if let StopCondition::TurnLimit(limit) = state.stop {
            if state.turns_taken >= limit {
                return Ok(Decision::Terminate(StopReason::TurnLimitReached));
            }
        }

        match self.policy {
            RotationPolicy::Random => {
                if deadline_passed(state.stop, now) {
                    return Ok(Decision::Terminate(StopReason::DeadlinePassed));
                }
                let candidates: Vec<Persona> = self
                    .roster
                    .iter()
                    .copied()
                    .filter(|p| *p != current)
                    .collect();
                Ok(candidates
                    .choose(&mut self.rng)
                    .map_or(Decision::Terminate(StopReason::NoEligibleSpeaker), |p| {
                        Decision::Speak(*p)
                    }))
            }
            RotationPolicy::RoundRobin => {
                let at_checkpoint = position + 1 == self.roster.len();
                if at_checkpoint && deadline_passed(state.stop, now) {
                    return Ok(Decision::Terminate(StopReason::DeadlinePassed));
                }
                Ok(Decision::Speak(self.roster[(position + 1) % self.roster.len()]))
            }
        }
    }
}

fn deadline_passed(stop: StopCondition, now: Instant) -> bool {
    matches!(stop, StopCondition::Deadline(deadline) if now >= deadline)
}

fn stop_reason(stop: StopCondition) -> StopReason {
    match stop {
        StopCondition::TurnLimit(_) => StopReason::TurnLimitReached,
        StopCondition::Deadline(_) => StopReason::DeadlinePassed,
    }
}

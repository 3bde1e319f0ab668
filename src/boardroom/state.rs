//! Conversation state types

use crate::persona::Persona;
use tokio::time::Instant;

/// Append-only record of the discussion.
///
/// The only way to change a transcript is [`Transcript::with_turn`], so an
/// earlier transcript is always a prefix of a later one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript(String);

impl Transcript {
    /// Seed line naming the product: `**Product**: <description>\n`.
    pub fn new(product_description: &str) -> Self {
        Self(format!("**Product**: {product_description}\n"))
    }

    /// A copy of this transcript with one more attributed utterance.
    #[must_use]
    pub fn with_turn(&self, persona: Persona, utterance: &str) -> Self {
        let mut text = self.0.clone();
        text.push_str(&turn_line(persona, utterance));
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `\n**<DisplayName>**: <utterance>\n`
pub fn turn_line(persona: Persona, utterance: &str) -> String {
    format!("\n**{}**: {}\n", persona.display_name(), utterance)
}

/// When a session stops producing turns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// Stop once this many turns have been taken
    TurnLimit(u32),
    /// Start no new turn after this instant
    Deadline(Instant),
}

impl StopCondition {
    /// True when the condition is already met before any turn is taken.
    pub fn is_degenerate(self, now: Instant) -> bool {
        match self {
            StopCondition::TurnLimit(limit) => limit == 0,
            StopCondition::Deadline(deadline) => now >= deadline,
        }
    }
}

/// Mutable state of one session. Created per request, never shared.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub transcript: Transcript,
    /// The persona who spoke most recently (the initial persona before any turn)
    pub current_speaker: Persona,
    pub turns_taken: u32,
    pub stop: StopCondition,
}

impl ConversationState {
    pub fn new(product_description: &str, initial_speaker: Persona, stop: StopCondition) -> Self {
        Self {
            transcript: Transcript::new(product_description),
            current_speaker: initial_speaker,
            turns_taken: 0,
            stop,
        }
    }

    /// Record a completed turn by `speaker`.
    pub fn commit_turn(&mut self, speaker: Persona, transcript: Transcript) {
        debug_assert!(transcript.as_str().starts_with(self.transcript.as_str()));
        self.transcript = transcript;
        self.current_speaker = speaker;
        self.turns_taken += 1;
    }
}

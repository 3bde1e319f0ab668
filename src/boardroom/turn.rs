//! Turn executor: one persona, one model call, one transcript line.

use super::state::Transcript;
use super::SessionError;
use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::persona::{Persona, PersonaRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone)]
pub struct TurnExecutor {
    llm: Arc<dyn LlmService>,
    registry: Arc<PersonaRegistry>,
    call_timeout: Duration,
}

impl TurnExecutor {
    pub fn new(
        llm: Arc<dyn LlmService>,
        registry: Arc<PersonaRegistry>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            llm,
            registry,
            call_timeout,
        }
    }

    /// Generate `persona`'s next utterance and return the extended transcript.
    ///
    /// The persona instruction is sent as system context and the whole
    /// transcript so far as the user message.
    pub async fn execute(
        &self,
        transcript: &Transcript,
        persona: Persona,
    ) -> Result<Transcript, SessionError> {
        let instruction = self.registry.lookup(persona.id())?;
        let request = LlmRequest::single_turn(instruction, transcript.as_str());

        let response = timeout(self.call_timeout, self.llm.complete(&request))
            .await
            .map_err(|_| {
                LlmError::timeout(format!(
                    "{persona} turn timed out after {}s",
                    self.call_timeout.as_secs()
                ))
            })??;

        if !response.end_turn {
            tracing::warn!(persona = %persona, "Model output may be truncated");
        }

        Ok(transcript.with_turn(persona, response.text().trim()))
    }
}

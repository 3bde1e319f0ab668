//! HTTP API
//!
//! JSON chat endpoints, an SSE variant that streams each turn, and the
//! Slack slash-command and OAuth callbacks.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::boardroom::{Rotation, RotationPolicy, Session, StopCondition, TurnExecutor};
use crate::config::AppConfig;
use crate::llm::LlmService;
use crate::persona::PersonaRegistry;
use crate::slack::{OAuthClient, ResponseUrlClient};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub llm: Arc<dyn LlmService>,
    pub personas: Arc<PersonaRegistry>,
    pub slack_delivery: ResponseUrlClient,
    pub slack_oauth: OAuthClient,
}

impl AppState {
    pub fn new(config: AppConfig, llm: Arc<dyn LlmService>) -> Self {
        Self {
            slack_oauth: OAuthClient::new(config.slack.clone()),
            slack_delivery: ResponseUrlClient::new(config.slack.http_timeout),
            personas: Arc::new(PersonaRegistry::default()),
            llm,
            config: Arc::new(config),
        }
    }

    /// A fresh, independent session for one request.
    pub fn new_session(
        &self,
        product_description: &str,
        policy: RotationPolicy,
        stop: StopCondition,
    ) -> Session {
        let executor = TurnExecutor::new(
            self.llm.clone(),
            self.personas.clone(),
            self.config.llm.timeout,
        );
        let rotation = Rotation::from_entropy(policy, self.personas.roster());
        Session::new(executor, rotation, product_description, stop)
    }
}

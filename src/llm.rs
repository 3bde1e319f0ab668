//! LLM provider abstraction
//!
//! Every persona turn is one `complete` call. The service handed to sessions
//! is a stack of wrappers around the provider: logging outermost, then the
//! process-wide concurrency cap.

mod error;
mod gemini;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::GeminiService;
pub use types::*;

use crate::config::LlmConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Build the service stack described by the configuration.
///
/// Without an API key the server still starts; every call fails with an
/// auth error instead.
pub fn build_service(config: &LlmConfig) -> Arc<dyn LlmService> {
    let provider: Arc<dyn LlmService> = match config.api_key.as_deref() {
        Some(key) => match GeminiService::new(key, &config.model, &config.base_url) {
            Ok(service) => Arc::new(service),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create Gemini client");
                Arc::new(UnconfiguredService::new(&config.model, e.message))
            }
        },
        None => Arc::new(UnconfiguredService::new(
            &config.model,
            "no API key configured (set GEMINI_API_KEY)",
        )),
    };

    let limited = LimitedService::new(provider, config.max_concurrency);
    Arc::new(LoggingService::new(Arc::new(limited)))
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Caps the number of in-flight calls across all sessions.
pub struct LimitedService {
    inner: Arc<dyn LlmService>,
    permits: Semaphore,
}

impl LimitedService {
    pub fn new(inner: Arc<dyn LlmService>, max_concurrency: usize) -> Self {
        Self {
            inner,
            permits: Semaphore::new(max_concurrency.max(1)),
        }
    }
}

#[async_trait]
impl LlmService for LimitedService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| LlmError::unknown("LLM concurrency limiter closed"))?;
        self.inner.complete(request).await
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

/// Stand-in used when the provider could not be configured.
pub struct UnconfiguredService {
    model_id: String,
    reason: String,
}

impl UnconfiguredService {
    pub fn new(model_id: &str, reason: impl Into<String>) -> Self {
        Self {
            model_id: model_id.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LlmService for UnconfiguredService {
    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        Err(LlmError::auth(self.reason.clone()))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

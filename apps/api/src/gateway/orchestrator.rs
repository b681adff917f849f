//! Resilient call orchestrator: one logical inference call with timeout,
//! bounded retry and a per-failure-kind fixed backoff.
//!
//! Attempt loop (`max_retries + 1` attempts):
//! - dispatch through the worker pool, wait at most `timeout`;
//! - non-empty reply → return immediately;
//! - timeout / service error / empty reply → pause `retry_pause`, retry;
//! - rate limited → pause `rate_limit_pause`, retry;
//! - unclassified → return at once, no retry.
//!
//! Once attempts run out the last failure is returned as-is.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::gateway::failure::{BackoffPolicy, CallFailure, CallOutcome, FailureKind};
use crate::gateway::worker_pool::{DispatchError, WorkerPool};
use crate::llm_client::{ChatMessage, ChatRequest, ChatTransport};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;

/// Process-wide defaults, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub worker_pool_size: usize,
    pub backoff: BackoffPolicy,
}

/// One logical call. Built with the consuming `with_*` methods, read-only after.
#[derive(Debug, Clone)]
pub struct CallRequest {
    conversation: Vec<ChatMessage>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    timeout: Duration,
    max_retries: u32,
}

impl CallRequest {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn conversation(&self) -> &[ChatMessage] {
        &self.conversation
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total dispatches allowed, first attempt included.
    pub fn attempts(&self) -> u32 {
        self.max_retries().saturating_add(1)
    }

    fn to_chat_request(&self) -> ChatRequest {
        ChatRequest {
            model: self.model().to_string(),
            messages: self.conversation().to_vec(),
            temperature: self.temperature(),
            max_tokens: self.max_output_tokens(),
        }
    }
}

// Per-call overrides of the process-wide defaults; handlers always use the defaults.
#[cfg(test)]
impl CallRequest {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

pub struct CallOrchestrator {
    transport: Arc<dyn ChatTransport>,
    pool: WorkerPool,
    config: GatewayConfig,
}

impl CallOrchestrator {
    pub fn new(transport: Arc<dyn ChatTransport>, config: GatewayConfig) -> Self {
        Self {
            transport,
            pool: WorkerPool::new(config.worker_pool_size),
            config,
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// A request carrying the process-wide model, timeout and retry budget.
    pub fn request(&self, conversation: Vec<ChatMessage>) -> CallRequest {
        CallRequest {
            conversation,
            model: self.config.model.clone(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout: self.config.timeout,
            max_retries: self.config.max_retries,
        }
    }

    pub async fn invoke(&self, request: &CallRequest) -> CallOutcome {
        let attempts = request.attempts();
        let mut attempt = 1;

        loop {
            info!(
                "Inference call attempt {attempt}/{attempts} (model: {}, timeout: {:?})",
                request.model(),
                request.timeout()
            );

            let failure = match self.dispatch(request).await {
                Ok(text) => {
                    info!(
                        "Inference call successful, response length: {}",
                        text.len()
                    );
                    return Ok(text);
                }
                Err(failure) => failure,
            };

            match failure.kind {
                FailureKind::Timeout => warn!("Attempt {attempt} timed out"),
                FailureKind::RateLimited => warn!("Attempt {attempt} rate limited"),
                FailureKind::ServiceError | FailureKind::ProtocolError => {
                    error!("Attempt {attempt} failed: {}", failure.message)
                }
                FailureKind::Unclassified => {
                    error!("Unexpected error in inference call: {}", failure.message)
                }
            }

            let Some(pause) = self.config.backoff.pause_after(failure.kind) else {
                return Err(failure);
            };
            if attempt >= attempts {
                return Err(failure);
            }

            tokio::time::sleep(pause).await;
            attempt += 1;
        }
    }

    async fn dispatch(&self, request: &CallRequest) -> Result<String, CallFailure> {
        let transport = Arc::clone(&self.transport);
        let chat = request.to_chat_request();

        let result = self
            .pool
            .run(
                async move { transport.complete(&chat).await },
                request.timeout(),
            )
            .await;

        match result {
            Ok(Ok(completion)) => match completion.content.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => Ok(text.to_string()),
                _ => Err(CallFailure::protocol()),
            },
            Ok(Err(transport_err)) => Err(transport_err.into()),
            Err(DispatchError::TimedOut(after)) => Err(CallFailure::timeout(after)),
            Err(err @ (DispatchError::Closed | DispatchError::Worker(_))) => {
                Err(CallFailure::unclassified(err))
            }
        }
    }
}

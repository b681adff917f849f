use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::llm_client::TransportError;

/// Why an inference attempt failed. Drives the retry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    RateLimited,
    ServiceError,
    /// The service answered but with no usable content.
    ProtocolError,
    /// Anything not known to be transient. Never retried.
    Unclassified,
}

impl FailureKind {
    pub fn is_transient(self) -> bool {
        !matches!(self, FailureKind::Unclassified)
    }
}

/// Final failure of an inference call, after retries.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct CallFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl CallFailure {
    pub fn timeout(after: Duration) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: format!("AI request timed out after {} seconds", after.as_secs_f64()),
        }
    }

    pub fn rate_limited() -> Self {
        Self {
            kind: FailureKind::RateLimited,
            message: "Rate limit exceeded. Please try again in a moment.".to_string(),
        }
    }

    pub fn service(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: FailureKind::ServiceError,
            message: format!("AI service error: {detail}"),
        }
    }

    pub fn protocol() -> Self {
        Self {
            kind: FailureKind::ProtocolError,
            message: "Empty response from AI service".to_string(),
        }
    }

    pub fn unclassified(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: FailureKind::Unclassified,
            message: format!("Unexpected error: {detail}"),
        }
    }
}

impl From<TransportError> for CallFailure {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::RateLimited(_) => CallFailure::rate_limited(),
            TransportError::Service(detail) => CallFailure::service(detail),
            TransportError::Unexpected(detail) => CallFailure::unclassified(detail),
        }
    }
}

/// Result of one logical inference call: the reply text or the last failure.
pub type CallOutcome = Result<String, CallFailure>;

/// Fixed pauses between attempts. Not exponential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// After timeouts, service errors and empty replies.
    pub retry_pause: Duration,
    pub rate_limit_pause: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            retry_pause: Duration::from_secs(1),
            rate_limit_pause: Duration::from_secs(2),
        }
    }
}

impl BackoffPolicy {
    /// Pause before the next attempt, or `None` when the failure must not be retried.
    pub fn pause_after(&self, kind: FailureKind) -> Option<Duration> {
        match kind {
            FailureKind::Timeout | FailureKind::ServiceError | FailureKind::ProtocolError => {
                Some(self.retry_pause)
            }
            FailureKind::RateLimited => Some(self.rate_limit_pause),
            FailureKind::Unclassified => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pauses() {
        let policy = BackoffPolicy::default();
        assert_eq!(
            policy.pause_after(FailureKind::Timeout),
            Some(Duration::from_secs(1))
        );
        assert_eq!(
            policy.pause_after(FailureKind::ServiceError),
            Some(Duration::from_secs(1))
        );
        assert_eq!(
            policy.pause_after(FailureKind::ProtocolError),
            Some(Duration::from_secs(1))
        );
        assert_eq!(
            policy.pause_after(FailureKind::RateLimited),
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_unclassified_is_never_retried() {
        assert_eq!(
            BackoffPolicy::default().pause_after(FailureKind::Unclassified),
            None
        );
        assert!(!FailureKind::Unclassified.is_transient());
        assert!(FailureKind::RateLimited.is_transient());
    }

    #[test]
    fn test_transport_errors_map_to_kinds() {
        let failure: CallFailure = TransportError::RateLimited("429".to_string()).into();
        assert_eq!(failure.kind, FailureKind::RateLimited);

        let failure: CallFailure = TransportError::Service("status 503".to_string()).into();
        assert_eq!(failure.kind, FailureKind::ServiceError);
        assert!(failure.message.contains("status 503"));

        let failure: CallFailure = TransportError::Unexpected("bad json".to_string()).into();
        assert_eq!(failure.kind, FailureKind::Unclassified);
    }

    #[test]
    fn test_timeout_message_names_duration() {
        let failure = CallFailure::timeout(Duration::from_secs(60));
        assert_eq!(failure.message, "AI request timed out after 60 seconds");
        assert_eq!(failure.to_string(), failure.message);
    }
}

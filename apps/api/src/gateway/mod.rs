// Resilient external-call gateway.
// All inference traffic goes through CallOrchestrator; handlers pair it with a TtlCache.

pub mod failure;
pub mod orchestrator;
pub mod worker_pool;

pub use failure::{BackoffPolicy, CallFailure};
pub use orchestrator::{CallOrchestrator, GatewayConfig};

//! Structured logging setup and submission lifecycle events

use crate::errors::MplxError;
use crate::observability::CorrelationId;
use crate::rpc::ConfirmationLevel;
use solana_sdk::signature::Signature;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the defaults when set. Safe to call more than once;
/// later calls are ignored.
pub fn init_logging(verbose: bool, json: bool) {
    let default_filter = if verbose { "mplx=debug,info" } else { "mplx=info,warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}

/// Structured logger for one transaction submission
#[derive(Debug, Clone)]
pub struct SubmissionLogger {
    correlation_id: CorrelationId,
}

impl SubmissionLogger {
    pub fn new() -> Self {
        Self {
            correlation_id: CorrelationId::new(),
        }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    pub fn log_compiled(&self, instruction_count: usize, signer_count: usize) {
        tracing::debug!(
            correlation_id = %self.correlation_id,
            instructions = instruction_count,
            signers = signer_count,
            "Transaction compiled and signed"
        );
    }

    pub fn log_sent(&self, signature: &Signature) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            signature = %signature,
            "Transaction sent"
        );
    }

    pub fn log_confirmed(&self, signature: &Signature, level: ConfirmationLevel, latency_ms: u64) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            signature = %signature,
            level = %level,
            latency_ms = latency_ms,
            "Transaction confirmed"
        );
    }

    pub fn log_failed(&self, signature: &Signature, error: &MplxError) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            signature = %signature,
            category = error.category(),
            error = %error,
            "{}",
            failure_summary(error)
        );
    }

    pub fn log_unconfirmed(&self, signature: &Signature, level: ConfirmationLevel, reason: &str) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            signature = %signature,
            level = %level,
            reason = %reason,
            "Transaction unconfirmed; state must be re-queried"
        );
    }
}

impl Default for SubmissionLogger {
    fn default() -> Self {
        Self::new()
    }
}

fn failure_summary(error: &MplxError) -> &'static str {
    match error {
        MplxError::TransactionFailed { .. } => "Transaction failed on chain",
        MplxError::Rpc(_) => "Transaction status query failed",
        _ => "Transaction submission failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::RpcError;

    #[test]
    fn test_failure_summary_names_the_failure() {
        let on_chain = MplxError::TransactionFailed {
            signature: Signature::default(),
            reason: "custom program error".to_string(),
        };
        assert_eq!(failure_summary(&on_chain), "Transaction failed on chain");

        let rpc = MplxError::Rpc(RpcError::Internal("boom".to_string()));
        assert_eq!(failure_summary(&rpc), "Transaction status query failed");

        let config = MplxError::Configuration("bad".to_string());
        assert_eq!(failure_summary(&config), "Transaction submission failed");
    }
}

use solana_client::client_error::ClientError;
use thiserror::Error;

/// Transport-layer errors raised by an [`RpcClientLike`](super::RpcClientLike)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Transport-level errors (network, connection)
    #[error("Transport error: {message} (endpoint: {endpoint})")]
    Transport { endpoint: String, message: String },

    /// Timeout errors
    #[error("Timeout after {timeout_ms}ms (endpoint: {endpoint})")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// RPC response errors (from the RPC server)
    #[error("RPC response error: {message} (endpoint: {endpoint}, code: {code:?})")]
    RpcResponse {
        endpoint: String,
        message: String,
        code: Option<i64>,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded (endpoint: {endpoint})")]
    RateLimitExceeded { endpoint: String },

    #[error("Blockhash not found (endpoint: {endpoint})")]
    BlockhashNotFound { endpoint: String },

    /// The node rejected the transaction before execution (preflight)
    #[error("Transaction rejected: {message} (endpoint: {endpoint})")]
    TransactionRejected { endpoint: String, message: String },

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RpcError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            // Retryable errors
            RpcError::Transport { .. } => true,
            RpcError::Timeout { .. } => true,
            RpcError::RateLimitExceeded { .. } => true,
            RpcError::BlockhashNotFound { .. } => true,

            // Non-retryable errors
            RpcError::TransactionRejected { .. } => false,
            RpcError::Internal(_) => false,

            // Retry on server errors (5xx)
            RpcError::RpcResponse { code, .. } => matches!(code, Some(c) if (500..600).contains(c)),
        }
    }

    /// Get the endpoint associated with this error, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            RpcError::Transport { endpoint, .. }
            | RpcError::Timeout { endpoint, .. }
            | RpcError::RpcResponse { endpoint, .. }
            | RpcError::RateLimitExceeded { endpoint }
            | RpcError::BlockhashNotFound { endpoint }
            | RpcError::TransactionRejected { endpoint, .. } => Some(endpoint),
            RpcError::Internal(_) => None,
        }
    }

    /// Create from ClientError with context
    pub fn from_client_error(err: ClientError, endpoint: &str) -> Self {
        Self::classify(&err.to_string(), endpoint)
    }

    /// Classify an error message from the RPC client
    pub fn classify(message: &str, endpoint: &str) -> Self {
        let err_str = message.to_lowercase();
        let endpoint = endpoint.to_string();

        if err_str.contains("blockhash not found") {
            RpcError::BlockhashNotFound { endpoint }
        } else if err_str.contains("transaction simulation failed")
            || err_str.contains("preflight")
        {
            // Checked before rate limiting: simulation logs and signatures may contain "429"
            RpcError::TransactionRejected {
                endpoint,
                message: message.to_string(),
            }
        } else if err_str.contains("rate limit")
            || err_str.contains("too many requests")
            || err_str.contains("status 429")
            || err_str.contains("status: 429")
        {
            RpcError::RateLimitExceeded { endpoint }
        } else if err_str.contains("timeout") || err_str.contains("timed out") {
            RpcError::Timeout {
                endpoint,
                timeout_ms: 0,
            }
        } else if err_str.contains("connection")
            || err_str.contains("error sending request")
            || err_str.contains("dns")
        {
            RpcError::Transport {
                endpoint,
                message: message.to_string(),
            }
        } else {
            // Extract error code if available
            let code = err_str
                .split("code:")
                .nth(1)
                .and_then(|s| s.split_whitespace().next())
                .and_then(|s| s.trim_end_matches(|c: char| !c.is_ascii_digit()).parse::<i64>().ok());

            RpcError::RpcResponse {
                endpoint,
                message: message.to_string(),
                code,
            }
        }
    }
}

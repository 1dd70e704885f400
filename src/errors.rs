//! Error types for the mplx toolkit
//!
//! One error enum covers dispatch, transaction building, submission and
//! account reads, so that an operation handler's failure flows back through
//! the dispatcher unchanged. Errors are designed to be:
//! - Diagnosable: every variant carries the address, kind or key involved
//! - Classifiable: `category()` and `is_retryable()` drive logging and metrics
//! - Composable: transport errors convert from [`RpcError`] via `?`

use crate::rpc::{ConfirmationLevel, RpcError};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::fmt;
use thiserror::Error;

/// Why a submitted transaction was not reported as confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnconfirmedReason {
    /// The confirmation wait exceeded `ConfirmOptions::timeout`
    Timeout,
    /// The caller's cancel signal fired before the level was observed
    Cancelled,
}

impl fmt::Display for UnconfirmedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Comprehensive error type for all mplx operations
#[derive(Error, Debug)]
pub enum MplxError {
    /// An expected account does not exist on chain
    #[error("Account not found: {kind} at {address}")]
    AccountNotFound {
        /// Address that was queried
        address: Pubkey,
        /// Expected account kind (e.g. "Metadata", "AuctionHouse")
        kind: &'static str,
    },

    /// Account bytes exist but do not decode against the expected layout
    #[error("Failed to parse {kind} account at {address}: {reason}")]
    Parse {
        address: Pubkey,
        kind: &'static str,
        reason: String,
    },

    /// A transaction builder with zero steps was submitted
    #[error("No instructions to send for {operation}")]
    NoInstructionsToSend {
        /// The operation (or call site) that produced the empty builder
        operation: String,
    },

    /// No handler is registered for the operation kind
    #[error("No handler registered for operation {kind}")]
    UnregisteredOperation { kind: String },

    /// A handler is already bound to the operation kind
    #[error("Operation {kind} already has a registered handler")]
    OperationAlreadyRegistered { kind: String },

    /// The registered handler serves a different operation type under the same tag
    #[error("Handler registered for {kind} does not match the requested operation type")]
    OperationTypeMismatch { kind: String },

    /// Transport-level failure talking to the cluster
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// The transaction was sent but the requested level was not observed
    ///
    /// The transaction may or may not have landed; re-query state to find out.
    #[error("Transaction {signature} unconfirmed at {level}: {reason}")]
    Unconfirmed {
        signature: Signature,
        level: ConfirmationLevel,
        reason: UnconfirmedReason,
    },

    /// The cluster executed the transaction and reported an error
    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed { signature: Signature, reason: String },

    /// A signer could not produce a signature
    #[error("Signing failed for {signer}: {reason}")]
    Signing { signer: Pubkey, reason: String },

    /// The compiled message requires a signature no available signer can provide
    #[error("Missing signer for required account {signer}")]
    MissingSigner { signer: Pubkey },

    /// Invalid configuration or input
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl MplxError {
    /// Check if this error is potentially retryable
    ///
    /// Unconfirmed submissions are retryable only after the caller has
    /// re-queried state; the flag says "may succeed if tried again", not
    /// "safe to blindly resend".
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Rpc(err) => err.is_retryable(),
            Self::Unconfirmed { .. } => true,

            Self::AccountNotFound { .. }
            | Self::Parse { .. }
            | Self::NoInstructionsToSend { .. }
            | Self::UnregisteredOperation { .. }
            | Self::OperationAlreadyRegistered { .. }
            | Self::OperationTypeMismatch { .. }
            | Self::TransactionFailed { .. }
            | Self::Signing { .. }
            | Self::MissingSigner { .. }
            | Self::Configuration(_) => false,
        }
    }

    /// Get the error category for metrics and observability
    pub fn category(&self) -> &'static str {
        match self {
            Self::AccountNotFound { .. } => "not_found",
            Self::Parse { .. } | Self::Configuration(_) => "validation",
            Self::NoInstructionsToSend { .. } => "composition",
            Self::UnregisteredOperation { .. }
            | Self::OperationAlreadyRegistered { .. }
            | Self::OperationTypeMismatch { .. } => "dispatch",
            Self::Rpc(_) | Self::Unconfirmed { .. } | Self::TransactionFailed { .. } => "network",
            Self::Signing { .. } | Self::MissingSigner { .. } => "authorization",
        }
    }
}

// Convenience constructors for common error scenarios
impl MplxError {
    pub fn account_not_found(address: Pubkey, kind: &'static str) -> Self {
        Self::AccountNotFound { address, kind }
    }

    pub fn parse(address: Pubkey, kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Parse {
            address,
            kind,
            reason: reason.into(),
        }
    }

    pub fn no_instructions(operation: impl Into<String>) -> Self {
        Self::NoInstructionsToSend {
            operation: operation.into(),
        }
    }

    pub fn signing(signer: Pubkey, reason: impl Into<String>) -> Self {
        Self::Signing {
            signer,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type MplxResult<T> = std::result::Result<T, MplxError>;

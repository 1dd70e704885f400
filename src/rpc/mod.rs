//! RPC capability
//!
//! The toolkit depends only on the narrow [`RpcClientLike`] contract: account
//! reads, blockhash lookup, transaction submission and signature status.
//! [`SolanaRpc`] implements it over the nonblocking Solana RPC client; tests use
//! `test_utils::MockRpc`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_sdk::{
    account::Account,
    commitment_config::{CommitmentConfig, CommitmentLevel},
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use solana_transaction_status::TransactionConfirmationStatus;
use std::fmt;
use std::str::FromStr;

// Submodules
pub mod rpc_errors;
pub mod solana_rpc;

// Re-exports for convenience
pub use rpc_errors::RpcError;
pub use solana_rpc::SolanaRpc;

/// Durability threshold at which a submission counts as done
///
/// Ordered: `Processed < Confirmed < Finalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationLevel {
    Processed,
    Confirmed,
    Finalized,
}

impl ConfirmationLevel {
    /// Matching commitment for RPC reads
    pub fn commitment(self) -> CommitmentConfig {
        match self {
            Self::Processed => CommitmentConfig::processed(),
            Self::Confirmed => CommitmentConfig::confirmed(),
            Self::Finalized => CommitmentConfig::finalized(),
        }
    }

    /// Whether an observed level satisfies this requested level
    pub fn is_satisfied_by(self, observed: ConfirmationLevel) -> bool {
        observed >= self
    }
}

impl Default for ConfirmationLevel {
    fn default() -> Self {
        Self::Confirmed
    }
}

impl fmt::Display for ConfirmationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processed => write!(f, "processed"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

impl FromStr for ConfirmationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            other => Err(format!("unknown confirmation level '{}'", other)),
        }
    }
}

impl From<CommitmentLevel> for ConfirmationLevel {
    fn from(level: CommitmentLevel) -> Self {
        match level {
            CommitmentLevel::Processed => Self::Processed,
            CommitmentLevel::Confirmed => Self::Confirmed,
            CommitmentLevel::Finalized => Self::Finalized,
        }
    }
}

impl From<&TransactionConfirmationStatus> for ConfirmationLevel {
    fn from(status: &TransactionConfirmationStatus) -> Self {
        match status {
            TransactionConfirmationStatus::Processed => Self::Processed,
            TransactionConfirmationStatus::Confirmed => Self::Confirmed,
            TransactionConfirmationStatus::Finalized => Self::Finalized,
        }
    }
}

/// Raw account as returned by the cluster, before any layout decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsedAccount {
    pub address: Pubkey,
    /// `false` when the cluster has no account at `address`
    pub exists: bool,
    pub lamports: u64,
    pub owner: Pubkey,
    pub executable: bool,
    pub data: Vec<u8>,
}

impl UnparsedAccount {
    /// Placeholder for an address with no account
    pub fn missing(address: Pubkey) -> Self {
        Self {
            address,
            exists: false,
            lamports: 0,
            owner: Pubkey::default(),
            executable: false,
            data: Vec::new(),
        }
    }

    pub fn from_account(address: Pubkey, account: Account) -> Self {
        Self {
            address,
            exists: true,
            lamports: account.lamports,
            owner: account.owner,
            executable: account.executable,
            data: account.data,
        }
    }

    /// Build from an optional RPC value
    pub fn from_optional(address: Pubkey, account: Option<Account>) -> Self {
        match account {
            Some(account) => Self::from_account(address, account),
            None => Self::missing(address),
        }
    }
}

/// Status of a submitted signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    pub slot: u64,
    /// Highest level observed so far; `None` when the node has not reported one
    pub level: Option<ConfirmationLevel>,
    /// Execution error reported by the cluster, if the transaction failed
    pub err: Option<String>,
}

/// Async RPC capability consumed by the toolkit
#[async_trait]
pub trait RpcClientLike: Send + Sync {
    /// Endpoint label used in logs and errors
    fn endpoint(&self) -> &str;

    /// Fetch one account; absence is reported via `UnparsedAccount::exists`
    async fn get_account(
        &self,
        address: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<UnparsedAccount, RpcError>;

    /// Fetch several accounts, results in request order
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
        commitment: CommitmentConfig,
    ) -> Result<Vec<UnparsedAccount>, RpcError> {
        let mut accounts = Vec::with_capacity(addresses.len());
        for address in addresses {
            accounts.push(self.get_account(address, commitment).await?);
        }
        Ok(accounts)
    }

    async fn get_latest_blockhash(&self, commitment: CommitmentConfig) -> Result<Hash, RpcError>;

    /// Submit a signed transaction, returning its first signature
    async fn send_transaction(&self, transaction: &VersionedTransaction)
        -> Result<Signature, RpcError>;

    /// Current status of a signature; `None` when the node has not seen it
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, RpcError>;
}

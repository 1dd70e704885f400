//! [`RpcClientLike`] over the nonblocking Solana RPC client

use super::{ConfirmationLevel, RpcClientLike, RpcError, SignatureStatus, UnparsedAccount};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Maximum addresses per `getMultipleAccounts` request accepted by public nodes
const MAX_MULTIPLE_ACCOUNTS: usize = 100;

/// Solana JSON-RPC implementation of the RPC capability
pub struct SolanaRpc {
    url: String,
    client: Arc<RpcClient>,
}

impl std::fmt::Debug for SolanaRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpc")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl SolanaRpc {
    pub fn new(url: impl Into<String>, timeout: Duration, commitment: CommitmentConfig) -> Self {
        let url = url.into();
        let client = Arc::new(RpcClient::new_with_timeout_and_commitment(
            url.clone(),
            timeout,
            commitment,
        ));
        Self { url, client }
    }

    /// Wrap an already configured client
    pub fn from_client(client: Arc<RpcClient>) -> Self {
        Self {
            url: client.url(),
            client,
        }
    }

    /// Underlying client, for calls outside the capability
    pub fn client(&self) -> &Arc<RpcClient> {
        &self.client
    }
}

#[async_trait]
impl RpcClientLike for SolanaRpc {
    fn endpoint(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(endpoint = %self.url))]
    async fn get_account(
        &self,
        address: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<UnparsedAccount, RpcError> {
        let start = Instant::now();
        let account = self
            .client
            .get_account_with_commitment(address, commitment)
            .await
            .map_err(|e| RpcError::from_client_error(e, &self.url))?
            .value;

        debug!(
            address = %address,
            exists = account.is_some(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Account fetched"
        );
        Ok(UnparsedAccount::from_optional(*address, account))
    }

    #[instrument(skip(self, addresses), fields(endpoint = %self.url, count = addresses.len()))]
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
        commitment: CommitmentConfig,
    ) -> Result<Vec<UnparsedAccount>, RpcError> {
        let mut results = Vec::with_capacity(addresses.len());

        for batch in addresses.chunks(MAX_MULTIPLE_ACCOUNTS) {
            let accounts = self
                .client
                .get_multiple_accounts_with_commitment(batch, commitment)
                .await
                .map_err(|e| RpcError::from_client_error(e, &self.url))?
                .value;

            if accounts.len() != batch.len() {
                return Err(RpcError::Internal(format!(
                    "getMultipleAccounts returned {} entries for {} addresses",
                    accounts.len(),
                    batch.len()
                )));
            }

            results.extend(
                batch
                    .iter()
                    .zip(accounts)
                    .map(|(address, account)| UnparsedAccount::from_optional(*address, account)),
            );
        }

        Ok(results)
    }

    async fn get_latest_blockhash(&self, commitment: CommitmentConfig) -> Result<Hash, RpcError> {
        let (blockhash, _last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(commitment)
            .await
            .map_err(|e| RpcError::from_client_error(e, &self.url))?;
        Ok(blockhash)
    }

    #[instrument(skip(self, transaction), fields(endpoint = %self.url))]
    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, RpcError> {
        self.client
            .send_transaction(transaction)
            .await
            .map_err(|e| RpcError::from_client_error(e, &self.url))
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, RpcError> {
        let statuses = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| RpcError::from_client_error(e, &self.url))?
            .value;

        Ok(statuses.into_iter().next().flatten().map(|status| SignatureStatus {
            slot: status.slot,
            level: status
                .confirmation_status
                .as_ref()
                .map(ConfirmationLevel::from),
            err: status.err.as_ref().map(|e| format!("{:?}", e)),
        }))
    }
}

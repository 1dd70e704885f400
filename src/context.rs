//! The `Mplx` context
//!
//! Everything an operation handler needs: the RPC capability, the identity
//! signer, the operation registry, an HTTP client for off-chain metadata and
//! the default confirmation options. Cloning is cheap; every clone shares the
//! same registry and connections.

use crate::config::Config;
use crate::errors::{MplxError, MplxResult};
use crate::operation::{MplxPlugin, Operation, OperationHandler, OperationKind, OperationRegistry};
use crate::plugins::{
    auction_house_module::{AuctionHouseClient, AuctionHouseModule},
    candy_machine_module::{CandyMachineClient, CandyMachineModule},
    nft_module::{NftClient, NftModule},
};
use crate::rpc::{RpcClientLike, SolanaRpc};
use crate::signer::{KeypairSigner, SignerService};
use crate::tx_builder::ConfirmOptions;
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub struct Mplx {
    rpc: Arc<dyn RpcClientLike>,
    identity: Arc<dyn SignerService>,
    operations: Arc<OperationRegistry>,
    http: reqwest::Client,
    confirm_options: ConfirmOptions,
    commitment: CommitmentConfig,
}

impl std::fmt::Debug for Mplx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mplx")
            .field("endpoint", &self.rpc.endpoint())
            .field("identity", &self.identity.pubkey())
            .field("operations", &self.operations)
            .field("commitment", &self.commitment.commitment)
            .finish()
    }
}

impl Mplx {
    pub fn builder(rpc: Arc<dyn RpcClientLike>, identity: Arc<dyn SignerService>) -> MplxBuilder {
        MplxBuilder::new(rpc, identity)
    }

    /// Context with the NFT, auction house and candy machine plugins installed
    pub fn new(rpc: Arc<dyn RpcClientLike>, identity: Arc<dyn SignerService>) -> MplxResult<Self> {
        Ok(Self::builder(rpc, identity).with_core_plugins()?.build())
    }

    /// Build a context from loaded configuration
    ///
    /// Without a configured keypair an ephemeral identity is generated; it can
    /// read but any submission it pays for will fail for lack of funds.
    pub fn from_config(config: &Config) -> MplxResult<Self> {
        let commitment = config.rpc.commitment.commitment();
        let rpc = SolanaRpc::new(
            config.rpc.url.clone(),
            Duration::from_secs(config.rpc.timeout_secs),
            commitment,
        );

        let identity = match &config.wallet.keypair_path {
            Some(path) => KeypairSigner::from_file(path)?,
            None => {
                warn!("No keypair configured, using an ephemeral identity");
                KeypairSigner::generate()
            }
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.json_metadata.timeout_secs))
            .build()
            .map_err(|e| MplxError::Configuration(format!("HTTP client: {}", e)))?;

        let mx = Self::builder(Arc::new(rpc), identity.into_shared())
            .http_client(http)
            .commitment(commitment)
            .confirm_options(config.confirm_options())
            .with_core_plugins()?
            .build();

        info!(
            endpoint = mx.rpc.endpoint(),
            identity = %mx.identity.pubkey(),
            operations = mx.operations.len(),
            "Context ready"
        );
        Ok(mx)
    }

    pub fn rpc(&self) -> &Arc<dyn RpcClientLike> {
        &self.rpc
    }

    pub fn identity(&self) -> &Arc<dyn SignerService> {
        &self.identity
    }

    pub fn operations(&self) -> &OperationRegistry {
        &self.operations
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn confirm_options(&self) -> &ConfirmOptions {
        &self.confirm_options
    }

    /// Default commitment for reads
    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }

    /// Dispatch an operation to its registered handler
    pub async fn execute<K: OperationKind>(&self, operation: Operation<K>) -> MplxResult<K::Output> {
        self.operations.execute(operation, self).await
    }

    pub fn nfts(&self) -> NftClient<'_> {
        NftClient::new(self)
    }

    pub fn candy_machines(&self) -> CandyMachineClient<'_> {
        CandyMachineClient::new(self)
    }

    pub fn auction_houses(&self) -> AuctionHouseClient<'_> {
        AuctionHouseClient::new(self)
    }
}

/// Assembles an [`Mplx`] and populates its registry
pub struct MplxBuilder {
    rpc: Arc<dyn RpcClientLike>,
    identity: Arc<dyn SignerService>,
    operations: OperationRegistry,
    http: Option<reqwest::Client>,
    confirm_options: ConfirmOptions,
    commitment: CommitmentConfig,
}

impl MplxBuilder {
    pub fn new(rpc: Arc<dyn RpcClientLike>, identity: Arc<dyn SignerService>) -> Self {
        Self {
            rpc,
            identity,
            operations: OperationRegistry::new(),
            http: None,
            confirm_options: ConfirmOptions::default(),
            commitment: CommitmentConfig::confirmed(),
        }
    }

    pub fn plugin(self, plugin: &dyn MplxPlugin) -> MplxResult<Self> {
        self.operations.install(plugin)?;
        Ok(self)
    }

    pub fn register<K, H>(self, handler: H) -> MplxResult<Self>
    where
        K: OperationKind,
        H: OperationHandler<K> + 'static,
    {
        self.operations.register::<K, H>(handler)?;
        Ok(self)
    }

    pub fn with_core_plugins(self) -> MplxResult<Self> {
        self.plugin(&NftModule)?
            .plugin(&AuctionHouseModule)?
            .plugin(&CandyMachineModule)
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn confirm_options(mut self, options: ConfirmOptions) -> Self {
        self.confirm_options = options;
        self
    }

    pub fn commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn build(self) -> Mplx {
        Mplx {
            rpc: self.rpc,
            identity: self.identity,
            operations: Arc::new(self.operations),
            http: self.http.unwrap_or_default(),
            confirm_options: self.confirm_options,
            commitment: self.commitment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockRpc, MockSigner};

    #[test]
    fn test_core_plugins_registered() {
        let mx = Mplx::new(Arc::new(MockRpc::new()), MockSigner::new().into_shared()).unwrap();

        assert_eq!(
            mx.operations().registered_kinds(),
            vec![
                "FindAuctionHouseByAddressOperation",
                "FindCandyMachineByAddressOperation",
                "FindNftByMintOperation",
                "UpdateCandyMachineOperation",
            ]
        );
    }

    #[test]
    fn test_installing_plugin_twice_fails() {
        let result = Mplx::builder(Arc::new(MockRpc::new()), MockSigner::new().into_shared())
            .plugin(&NftModule)
            .and_then(|b| b.plugin(&NftModule));

        assert!(matches!(
            result.err(),
            Some(MplxError::OperationAlreadyRegistered { .. })
        ));
    }

    #[test]
    fn test_clones_share_registry() {
        let mx = Mplx::builder(Arc::new(MockRpc::new()), MockSigner::new().into_shared()).build();
        let clone = mx.clone();
        assert!(Arc::ptr_eq(&mx.operations, &clone.operations));
    }
}

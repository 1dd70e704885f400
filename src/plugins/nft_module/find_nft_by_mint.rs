use super::accounts::{
    find_master_edition_pda, find_metadata_pda, MasterEditionAccount, MetadataAccount,
};
use super::models::{JsonMetadata, Nft};
use crate::accounts::{find_accounts, parse_account, parse_optional_account};
use crate::context::Mplx;
use crate::errors::{MplxError, MplxResult};
use crate::metrics::metrics;
use crate::operation::{Operation, OperationHandler, OperationKind};
use crate::utils::fetch_json;
use async_trait::async_trait;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use tracing::debug;

pub struct FindNftByMintOperation;

impl OperationKind for FindNftByMintOperation {
    const KIND: &'static str = "FindNftByMintOperation";
    type Input = FindNftByMintInput;
    type Output = Nft;
}

#[derive(Debug, Clone)]
pub struct FindNftByMintInput {
    pub mint: Pubkey,
    /// Fetch the off-chain JSON behind the metadata URI
    pub load_json: bool,
    pub commitment: Option<CommitmentConfig>,
}

impl FindNftByMintInput {
    pub fn new(mint: Pubkey) -> Self {
        Self {
            mint,
            load_json: true,
            commitment: None,
        }
    }

    pub fn without_json(mut self) -> Self {
        self.load_json = false;
        self
    }

    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = Some(commitment);
        self
    }
}

pub fn find_nft_by_mint_operation(input: FindNftByMintInput) -> Operation<FindNftByMintOperation> {
    Operation::new(input)
}

pub struct FindNftByMintHandler;

#[async_trait]
impl OperationHandler<FindNftByMintOperation> for FindNftByMintHandler {
    async fn handle(
        &self,
        operation: Operation<FindNftByMintOperation>,
        mx: &Mplx,
    ) -> MplxResult<Nft> {
        let input = operation.into_input();
        let commitment = input.commitment.unwrap_or_else(|| mx.commitment());

        let addresses = [find_metadata_pda(&input.mint), find_master_edition_pda(&input.mint)];
        let mut accounts = find_accounts(mx.rpc().as_ref(), &addresses, commitment)
            .await?
            .into_iter();

        let (Some(metadata), Some(edition)) = (accounts.next(), accounts.next()) else {
            return Err(MplxError::Configuration(
                "Batch read returned fewer accounts than requested".to_string(),
            ));
        };

        let metadata = parse_account::<MetadataAccount>(metadata)?;
        let master_edition = parse_optional_account::<MasterEditionAccount>(edition)?;

        let mut nft = Nft::new(metadata, master_edition, None);
        let uri = nft.uri();
        let uri = uri.trim();
        if input.load_json && !uri.is_empty() {
            nft.json = load_json(mx, uri).await;
        }

        Ok(nft)
    }
}

/// Best-effort JSON load; any failure yields `None`
async fn load_json(mx: &Mplx, uri: &str) -> Option<JsonMetadata> {
    match fetch_json::<JsonMetadata>(mx.http(), uri).await {
        Ok(json) => Some(json),
        Err(e) => {
            metrics().json_fetch_failures.inc();
            debug!(uri = %uri, error = %e, "Off-chain metadata unavailable");
            None
        }
    }
}

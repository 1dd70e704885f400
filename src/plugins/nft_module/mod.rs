//! NFT module: Token Metadata accounts and the `Nft` read model

pub mod accounts;
mod find_nft_by_mint;
mod models;

pub use accounts::{
    find_master_edition_pda, find_metadata_pda, Collection, Creator, MasterEditionAccount,
    MetadataAccount, TokenStandard, UseMethod, Uses, TOKEN_METADATA_PROGRAM_ID,
};
pub use find_nft_by_mint::{
    find_nft_by_mint_operation, FindNftByMintHandler, FindNftByMintInput, FindNftByMintOperation,
};
pub use models::{JsonAttribute, JsonMetadata, Nft};

use crate::context::Mplx;
use crate::errors::MplxResult;
use crate::operation::{MplxPlugin, OperationRegistry};
use solana_sdk::pubkey::Pubkey;

/// Registers the NFT operations
pub struct NftModule;

impl MplxPlugin for NftModule {
    fn install(&self, registry: &OperationRegistry) -> MplxResult<()> {
        registry.register::<FindNftByMintOperation, _>(FindNftByMintHandler)
    }
}

/// NFT operations bound to one context
pub struct NftClient<'a> {
    mx: &'a Mplx,
}

impl<'a> NftClient<'a> {
    pub fn new(mx: &'a Mplx) -> Self {
        Self { mx }
    }

    pub async fn find_by_mint(&self, mint: Pubkey) -> MplxResult<Nft> {
        self.find_by_mint_with(FindNftByMintInput::new(mint)).await
    }

    pub async fn find_by_mint_with(&self, input: FindNftByMintInput) -> MplxResult<Nft> {
        self.mx.execute(find_nft_by_mint_operation(input)).await
    }
}

//! Auction House module

pub mod accounts;

pub use accounts::{AuctionHouseAccount, AUCTION_HOUSE_PROGRAM_ID, NATIVE_MINT};

use crate::accounts::{find_account, Account};
use crate::context::Mplx;
use crate::errors::MplxResult;
use crate::operation::{MplxPlugin, Operation, OperationHandler, OperationKind, OperationRegistry};
use async_trait::async_trait;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

/// Auction house read model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionHouse {
    pub address: Pubkey,
    pub creator: Pubkey,
    pub authority: Pubkey,
    pub treasury_mint: Pubkey,
    pub fee_account: Pubkey,
    pub treasury_account: Pubkey,
    pub fee_withdrawal_destination: Pubkey,
    pub treasury_withdrawal_destination: Pubkey,
    pub seller_fee_basis_points: u16,
    pub requires_sign_off: bool,
    pub can_change_sale_price: bool,
    pub bump: u8,
    pub fee_payer_bump: u8,
    pub treasury_bump: u8,
}

impl AuctionHouse {
    /// Trades settle in SOL rather than an SPL token
    pub fn is_native(&self) -> bool {
        self.treasury_mint == NATIVE_MINT
    }
}

impl From<Account<AuctionHouseAccount>> for AuctionHouse {
    fn from(account: Account<AuctionHouseAccount>) -> Self {
        let data = account.data;
        Self {
            address: account.address,
            creator: data.creator,
            authority: data.authority,
            treasury_mint: data.treasury_mint,
            fee_account: data.auction_house_fee_account,
            treasury_account: data.auction_house_treasury,
            fee_withdrawal_destination: data.fee_withdrawal_destination,
            treasury_withdrawal_destination: data.treasury_withdrawal_destination,
            seller_fee_basis_points: data.seller_fee_basis_points,
            requires_sign_off: data.requires_sign_off,
            can_change_sale_price: data.can_change_sale_price,
            bump: data.bump,
            fee_payer_bump: data.fee_payer_bump,
            treasury_bump: data.treasury_bump,
        }
    }
}

pub struct FindAuctionHouseByAddressOperation;

impl OperationKind for FindAuctionHouseByAddressOperation {
    const KIND: &'static str = "FindAuctionHouseByAddressOperation";
    type Input = FindAuctionHouseByAddressInput;
    type Output = AuctionHouse;
}

#[derive(Debug, Clone)]
pub struct FindAuctionHouseByAddressInput {
    pub address: Pubkey,
    pub commitment: Option<CommitmentConfig>,
}

pub fn find_auction_house_by_address_operation(
    input: FindAuctionHouseByAddressInput,
) -> Operation<FindAuctionHouseByAddressOperation> {
    Operation::new(input)
}

pub struct FindAuctionHouseByAddressHandler;

#[async_trait]
impl OperationHandler<FindAuctionHouseByAddressOperation> for FindAuctionHouseByAddressHandler {
    async fn handle(
        &self,
        operation: Operation<FindAuctionHouseByAddressOperation>,
        mx: &Mplx,
    ) -> MplxResult<AuctionHouse> {
        let input = operation.into_input();
        let commitment = input.commitment.unwrap_or_else(|| mx.commitment());

        let account =
            find_account::<AuctionHouseAccount>(mx.rpc().as_ref(), &input.address, commitment)
                .await?;
        Ok(account.into())
    }
}

pub struct AuctionHouseModule;

impl MplxPlugin for AuctionHouseModule {
    fn install(&self, registry: &OperationRegistry) -> MplxResult<()> {
        registry.register::<FindAuctionHouseByAddressOperation, _>(FindAuctionHouseByAddressHandler)
    }
}

pub struct AuctionHouseClient<'a> {
    mx: &'a Mplx,
}

impl<'a> AuctionHouseClient<'a> {
    pub fn new(mx: &'a Mplx) -> Self {
        Self { mx }
    }

    pub async fn find_by_address(&self, address: Pubkey) -> MplxResult<AuctionHouse> {
        self.mx
            .execute(find_auction_house_by_address_operation(
                FindAuctionHouseByAddressInput {
                    address,
                    commitment: None,
                },
            ))
            .await
    }
}

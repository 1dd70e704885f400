//! Auction House program account layout

use crate::accounts::{decode_anchor_account, pubkey_borsh, AccountLayout};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{pubkey, pubkey::Pubkey};

pub const AUCTION_HOUSE_PROGRAM_ID: Pubkey = pubkey!("hausS13jsjafwWwGqZTUQRmWyvyxn9EQpqMwV1PBBmk");

/// Wrapped SOL mint; an auction house trading in it is "native"
pub const NATIVE_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");

/// Decoded `AuctionHouse` account
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct AuctionHouseAccount {
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    pub auction_house_fee_account: Pubkey,
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    pub auction_house_treasury: Pubkey,
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    pub treasury_withdrawal_destination: Pubkey,
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    pub fee_withdrawal_destination: Pubkey,
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    pub treasury_mint: Pubkey,
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    pub authority: Pubkey,
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    pub creator: Pubkey,
    pub bump: u8,
    pub treasury_bump: u8,
    pub fee_payer_bump: u8,
    pub seller_fee_basis_points: u16,
    pub requires_sign_off: bool,
    pub can_change_sale_price: bool,
}

impl AccountLayout for AuctionHouseAccount {
    const KIND: &'static str = "AuctionHouse";

    fn decode(data: &[u8]) -> Result<Self, String> {
        decode_anchor_account("AuctionHouse", data)
    }
}

#[cfg(any(test, feature = "test_utils"))]
impl AuctionHouseAccount {
    /// Anchor account bytes, discriminator first, with trailing padding
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = crate::accounts::anchor_discriminator("account", "AuctionHouse").to_vec();
        bytes.extend(borsh::to_vec(self).unwrap_or_default());
        bytes.resize(bytes.len() + 64, 0);
        bytes
    }
}

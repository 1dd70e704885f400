//! Candy Machine v2 account layout
//!
//! `CandyMachineData` is both the account payload and the argument of the
//! `update_candy_machine` instruction, so one type serves decoding and
//! encoding.

use crate::accounts::{decode_anchor_account, pubkey_borsh, AccountLayout};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{pubkey, pubkey::Pubkey};

pub const CANDY_MACHINE_PROGRAM_ID: Pubkey = pubkey!("cndy3Z4yapfJBmL3ShUp5exZKqR3z33thTzeNMm2gRZ");

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
pub enum EndSettingType {
    Date = 0,
    Amount = 1,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct EndSettings {
    pub end_setting_type: EndSettingType,
    /// Unix timestamp or item count, depending on `end_setting_type`
    pub number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CandyMachineCreator {
    #[borsh(
        serialize_with = "pubkey_borsh::serialize",
        deserialize_with = "pubkey_borsh::deserialize"
    )]
    pub address: Pubkey,
    pub verified: bool,
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct HiddenSettings {
    pub name: String,
    pub uri: String,
    pub hash: [u8; 32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
pub enum WhitelistMintMode {
    BurnEveryTime = 0,
    NeverBurn = 1,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct WhitelistMintSettings {
    pub mode: WhitelistMintMode,
    #[borsh(
        serialize_with = "pubkey_borsh::serialize",
        deserialize_with = "pubkey_borsh::deserialize"
    )]
    pub mint: Pubkey,
    pub presale: bool,
    pub discount_price: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GatekeeperConfig {
    #[borsh(
        serialize_with = "pubkey_borsh::serialize",
        deserialize_with = "pubkey_borsh::deserialize"
    )]
    pub gatekeeper_network: Pubkey,
    pub expire_on_use: bool,
}

/// Settable configuration of a candy machine
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CandyMachineData {
    pub uuid: String,
    pub price: u64,
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    pub max_supply: u64,
    pub is_mutable: bool,
    pub retain_authority: bool,
    /// Unix timestamp, seconds
    pub go_live_date: Option<i64>,
    pub end_settings: Option<EndSettings>,
    pub creators: Vec<CandyMachineCreator>,
    pub hidden_settings: Option<HiddenSettings>,
    pub whitelist_mint_settings: Option<WhitelistMintSettings>,
    pub items_available: u64,
    pub gatekeeper: Option<GatekeeperConfig>,
}

/// Decoded `CandyMachine` account; config lines after it are not read
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CandyMachineAccount {
    #[borsh(
        serialize_with = "pubkey_borsh::serialize",
        deserialize_with = "pubkey_borsh::deserialize"
    )]
    pub authority: Pubkey,
    #[borsh(
        serialize_with = "pubkey_borsh::serialize",
        deserialize_with = "pubkey_borsh::deserialize"
    )]
    pub wallet: Pubkey,
    #[borsh(
        serialize_with = "pubkey_borsh::serialize_option",
        deserialize_with = "pubkey_borsh::deserialize_option"
    )]
    pub token_mint: Option<Pubkey>,
    pub items_redeemed: u64,
    pub data: CandyMachineData,
}

impl AccountLayout for CandyMachineAccount {
    const KIND: &'static str = "CandyMachine";

    fn decode(data: &[u8]) -> Result<Self, String> {
        decode_anchor_account("CandyMachine", data)
    }
}

#[cfg(any(test, feature = "test_utils"))]
impl CandyMachineAccount {
    /// Anchor account bytes followed by an empty config line region
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = crate::accounts::anchor_discriminator("account", "CandyMachine").to_vec();
        bytes.extend(borsh::to_vec(self).unwrap_or_default());
        bytes.resize(bytes.len() + 128, 0);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account() -> CandyMachineAccount {
        CandyMachineAccount {
            authority: Pubkey::new_unique(),
            wallet: Pubkey::new_unique(),
            token_mint: None,
            items_redeemed: 3,
            data: CandyMachineData {
                uuid: "ABC123".to_string(),
                price: 1_000_000_000,
                symbol: "CNDY".to_string(),
                seller_fee_basis_points: 500,
                max_supply: 0,
                is_mutable: true,
                retain_authority: true,
                go_live_date: Some(1_650_000_000),
                end_settings: Some(EndSettings {
                    end_setting_type: EndSettingType::Amount,
                    number: 100,
                }),
                creators: vec![CandyMachineCreator {
                    address: Pubkey::new_unique(),
                    verified: true,
                    share: 100,
                }],
                hidden_settings: None,
                whitelist_mint_settings: Some(WhitelistMintSettings {
                    mode: WhitelistMintMode::NeverBurn,
                    mint: Pubkey::new_unique(),
                    presale: true,
                    discount_price: Some(500_000_000),
                }),
                items_available: 100,
                gatekeeper: None,
            },
        }
    }

    #[test]
    fn test_decode_with_config_line_padding() {
        let account = sample_account();
        let decoded = CandyMachineAccount::decode(&account.to_bytes()).unwrap();
        assert_eq!(decoded, account);
    }

    #[test]
    fn test_token_mint_option_encoding() {
        let mut account = sample_account();
        let mint = Pubkey::new_unique();
        account.token_mint = Some(mint);

        let decoded = CandyMachineAccount::decode(&account.to_bytes()).unwrap();
        assert_eq!(decoded.token_mint, Some(mint));
    }

    #[test]
    fn test_wrong_discriminator() {
        let mut bytes = sample_account().to_bytes();
        bytes[..8].copy_from_slice(&crate::accounts::anchor_discriminator("account", "AuctionHouse"));
        assert!(CandyMachineAccount::decode(&bytes).is_err());
    }
}

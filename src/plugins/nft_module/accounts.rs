//! Token Metadata account layouts and addresses

use crate::accounts::{decode_borsh, pubkey_borsh, AccountLayout};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{pubkey, pubkey::Pubkey};

pub const TOKEN_METADATA_PROGRAM_ID: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;

/// Leading `Key` byte of every Token Metadata account
pub mod key {
    pub const EDITION_V1: u8 = 1;
    pub const MASTER_EDITION_V1: u8 = 2;
    pub const METADATA_V1: u8 = 4;
    pub const MASTER_EDITION_V2: u8 = 6;
}

/// `["metadata", program, mint]`
pub fn find_metadata_pda(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"metadata",
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

/// `["metadata", program, mint, "edition"]`
pub fn find_master_edition_pda(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"metadata",
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
            b"edition",
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub address: Pubkey,
    pub verified: bool,
    /// Percentage of royalties, all creators sum to 100
    pub share: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStandard {
    NonFungible,
    FungibleAsset,
    Fungible,
    NonFungibleEdition,
    ProgrammableNonFungible,
    ProgrammableNonFungibleEdition,
}

impl TokenStandard {
    fn from_u8(value: u8) -> Result<Self, String> {
        Ok(match value {
            0 => Self::NonFungible,
            1 => Self::FungibleAsset,
            2 => Self::Fungible,
            3 => Self::NonFungibleEdition,
            4 => Self::ProgrammableNonFungible,
            5 => Self::ProgrammableNonFungibleEdition,
            other => return Err(format!("unknown token standard {}", other)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub verified: bool,
    pub key: Pubkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseMethod {
    Burn,
    Multiple,
    Single,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uses {
    pub use_method: UseMethod,
    pub remaining: u64,
    pub total: u64,
}

/// Decoded `Metadata` account
///
/// Strings keep their on-chain `\0` padding; the `Nft` model strips it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataAccount {
    pub update_authority: Pubkey,
    pub mint: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
    pub edition_nonce: Option<u8>,
    pub token_standard: Option<TokenStandard>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawCreator {
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    address: Pubkey,
    verified: bool,
    share: u8,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawData {
    name: String,
    symbol: String,
    uri: String,
    seller_fee_basis_points: u16,
    creators: Option<Vec<RawCreator>>,
}

/// Fields present since the first Metadata version
#[derive(BorshSerialize, BorshDeserialize)]
struct RawMetadataHead {
    key: u8,
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    update_authority: Pubkey,
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    mint: Pubkey,
    data: RawData,
    primary_sale_happened: bool,
    is_mutable: bool,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawCollection {
    verified: bool,
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    key: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawUses {
    use_method: u8,
    remaining: u64,
    total: u64,
}

/// Read an optional field appended by a later account version
///
/// Older accounts simply end before it; that reads as `None`.
fn read_trailing<T: BorshDeserialize>(cursor: &mut &[u8]) -> Result<Option<T>, String> {
    if cursor.is_empty() {
        return Ok(None);
    }
    Option::<T>::deserialize(cursor).map_err(|e| e.to_string())
}

impl AccountLayout for MetadataAccount {
    const KIND: &'static str = "Metadata";

    fn decode(data: &[u8]) -> Result<Self, String> {
        match data.first() {
            Some(&key::METADATA_V1) => {}
            Some(other) => return Err(format!("expected Metadata key {}, found {}", key::METADATA_V1, other)),
            None => return Err("empty account data".to_string()),
        }

        let mut cursor = data;
        let head = RawMetadataHead::deserialize(&mut cursor).map_err(|e| e.to_string())?;
        let edition_nonce = read_trailing::<u8>(&mut cursor)?;
        let token_standard = read_trailing::<u8>(&mut cursor)?
            .map(TokenStandard::from_u8)
            .transpose()?;
        let collection = read_trailing::<RawCollection>(&mut cursor)?;
        let uses = read_trailing::<RawUses>(&mut cursor)?
            .map(|raw| -> Result<Uses, String> {
                let use_method = match raw.use_method {
                    0 => UseMethod::Burn,
                    1 => UseMethod::Multiple,
                    2 => UseMethod::Single,
                    other => return Err(format!("unknown use method {}", other)),
                };
                Ok(Uses {
                    use_method,
                    remaining: raw.remaining,
                    total: raw.total,
                })
            })
            .transpose()?;

        Ok(Self {
            update_authority: head.update_authority,
            mint: head.mint,
            name: head.data.name,
            symbol: head.data.symbol,
            uri: head.data.uri,
            seller_fee_basis_points: head.data.seller_fee_basis_points,
            creators: head.data.creators.map(|creators| {
                creators
                    .into_iter()
                    .map(|c| Creator {
                        address: c.address,
                        verified: c.verified,
                        share: c.share,
                    })
                    .collect()
            }),
            primary_sale_happened: head.primary_sale_happened,
            is_mutable: head.is_mutable,
            edition_nonce,
            token_standard,
            collection: collection.map(|c| Collection {
                verified: c.verified,
                key: c.key,
            }),
            uses,
        })
    }
}

#[cfg(any(test, feature = "test_utils"))]
impl MetadataAccount {
    /// Account bytes as the program writes them, including the trailing padding
    pub fn to_bytes(&self) -> Vec<u8> {
        use crate::utils::pad_empty_chars;

        let head = RawMetadataHead {
            key: key::METADATA_V1,
            update_authority: self.update_authority,
            mint: self.mint,
            data: RawData {
                name: pad_empty_chars(&self.name, MAX_NAME_LENGTH),
                symbol: pad_empty_chars(&self.symbol, MAX_SYMBOL_LENGTH),
                uri: pad_empty_chars(&self.uri, MAX_URI_LENGTH),
                seller_fee_basis_points: self.seller_fee_basis_points,
                creators: self.creators.as_ref().map(|creators| {
                    creators
                        .iter()
                        .map(|c| RawCreator {
                            address: c.address,
                            verified: c.verified,
                            share: c.share,
                        })
                        .collect()
                }),
            },
            primary_sale_happened: self.primary_sale_happened,
            is_mutable: self.is_mutable,
        };

        let mut bytes = borsh::to_vec(&head).unwrap_or_default();
        bytes.extend(borsh::to_vec(&self.edition_nonce).unwrap_or_default());
        bytes.extend(
            borsh::to_vec(&self.token_standard.map(|t| t as u8)).unwrap_or_default(),
        );
        bytes.extend(
            borsh::to_vec(&self.collection.as_ref().map(|c| RawCollection {
                verified: c.verified,
                key: c.key,
            }))
            .unwrap_or_default(),
        );
        bytes.extend(
            borsh::to_vec(&self.uses.as_ref().map(|u| RawUses {
                use_method: u.use_method as u8,
                remaining: u.remaining,
                total: u.total,
            }))
            .unwrap_or_default(),
        );
        bytes.resize(bytes.len() + 32, 0);
        bytes
    }
}

/// Decoded account at the edition PDA of a mint
///
/// The PDA holds a master edition for originals and a print edition for
/// copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterEditionAccount {
    Master {
        supply: u64,
        max_supply: Option<u64>,
    },
    Print {
        parent: Pubkey,
        edition: u64,
    },
}

impl MasterEditionAccount {
    pub fn is_original(&self) -> bool {
        matches!(self, Self::Master { .. })
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawMasterEdition {
    supply: u64,
    max_supply: Option<u64>,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawPrintEdition {
    #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
    parent: Pubkey,
    edition: u64,
}

impl AccountLayout for MasterEditionAccount {
    const KIND: &'static str = "MasterEdition";

    fn decode(data: &[u8]) -> Result<Self, String> {
        let (&tag, rest) = data
            .split_first()
            .ok_or_else(|| "empty account data".to_string())?;

        match tag {
            key::MASTER_EDITION_V1 | key::MASTER_EDITION_V2 => {
                let raw: RawMasterEdition = decode_borsh(rest)?;
                Ok(Self::Master {
                    supply: raw.supply,
                    max_supply: raw.max_supply,
                })
            }
            key::EDITION_V1 => {
                let raw: RawPrintEdition = decode_borsh(rest)?;
                Ok(Self::Print {
                    parent: raw.parent,
                    edition: raw.edition,
                })
            }
            other => Err(format!("unexpected edition key {}", other)),
        }
    }
}

#[cfg(any(test, feature = "test_utils"))]
impl MasterEditionAccount {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = match self {
            Self::Master { supply, max_supply } => {
                let mut bytes = vec![key::MASTER_EDITION_V2];
                bytes.extend(
                    borsh::to_vec(&RawMasterEdition {
                        supply: *supply,
                        max_supply: *max_supply,
                    })
                    .unwrap_or_default(),
                );
                bytes
            }
            Self::Print { parent, edition } => {
                let mut bytes = vec![key::EDITION_V1];
                bytes.extend(
                    borsh::to_vec(&RawPrintEdition {
                        parent: *parent,
                        edition: *edition,
                    })
                    .unwrap_or_default(),
                );
                bytes
            }
        };
        bytes.resize(bytes.len() + 16, 0);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> MetadataAccount {
        MetadataAccount {
            update_authority: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            name: "Degen Ape #1".to_string(),
            symbol: "DAPE".to_string(),
            uri: "https://arweave.net/abc".to_string(),
            seller_fee_basis_points: 500,
            creators: Some(vec![Creator {
                address: Pubkey::new_unique(),
                verified: true,
                share: 100,
            }]),
            primary_sale_happened: true,
            is_mutable: true,
            edition_nonce: Some(254),
            token_standard: Some(TokenStandard::NonFungible),
            collection: None,
            uses: None,
        }
    }

    #[test]
    fn test_metadata_decode_keeps_padding() {
        let metadata = sample_metadata();
        let decoded = MetadataAccount::decode(&metadata.to_bytes()).unwrap();

        assert_eq!(decoded.name.len(), MAX_NAME_LENGTH);
        assert!(decoded.name.starts_with("Degen Ape #1"));
        assert_eq!(decoded.mint, metadata.mint);
        assert_eq!(decoded.creators, metadata.creators);
        assert_eq!(decoded.token_standard, Some(TokenStandard::NonFungible));
        assert_eq!(decoded.edition_nonce, Some(254));
    }

    #[test]
    fn test_metadata_without_trailing_fields() {
        let head = RawMetadataHead {
            key: key::METADATA_V1,
            update_authority: Pubkey::from([1; 32]),
            mint: Pubkey::from([2; 32]),
            data: RawData {
                name: "Old".to_string(),
                symbol: "OLD".to_string(),
                uri: String::new(),
                seller_fee_basis_points: 0,
                creators: None,
            },
            primary_sale_happened: false,
            is_mutable: false,
        };

        let decoded = MetadataAccount::decode(&borsh::to_vec(&head).unwrap()).unwrap();
        assert_eq!(decoded.name, "Old");
        assert_eq!(decoded.edition_nonce, None);
        assert_eq!(decoded.collection, None);
    }

    #[test]
    fn test_token_standard_values() {
        assert_eq!(
            TokenStandard::from_u8(5).unwrap(),
            TokenStandard::ProgrammableNonFungibleEdition
        );
        assert_eq!(TokenStandard::ProgrammableNonFungibleEdition as u8, 5);
        assert!(TokenStandard::from_u8(6).is_err());
    }

    #[test]
    fn test_metadata_wrong_key() {
        let mut bytes = sample_metadata().to_bytes();
        bytes[0] = key::MASTER_EDITION_V2;
        assert!(MetadataAccount::decode(&bytes).unwrap_err().contains("expected Metadata key"));
    }

    #[test]
    fn test_edition_variants() {
        let master = MasterEditionAccount::Master {
            supply: 0,
            max_supply: Some(10),
        };
        assert_eq!(MasterEditionAccount::decode(&master.to_bytes()).unwrap(), master);
        assert!(master.is_original());

        let print = MasterEditionAccount::Print {
            parent: Pubkey::new_unique(),
            edition: 3,
        };
        let decoded = MasterEditionAccount::decode(&print.to_bytes()).unwrap();
        assert!(!decoded.is_original());
    }

    #[test]
    fn test_pdas_are_deterministic() {
        let mint = Pubkey::new_unique();
        assert_eq!(find_metadata_pda(&mint), find_metadata_pda(&mint));
        assert_ne!(find_metadata_pda(&mint), find_master_edition_pda(&mint));
    }
}

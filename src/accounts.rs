//! Typed account reads
//!
//! Raw accounts come back from the RPC capability as [`UnparsedAccount`];
//! an [`AccountLayout`] turns the bytes into a typed value. Existence is
//! always checked before decoding, so callers see `AccountNotFound` for a
//! missing account and `Parse` only for bytes that are present but malformed.

use crate::errors::{MplxError, MplxResult};
use crate::rpc::{RpcClientLike, UnparsedAccount};
use borsh::BorshDeserialize;
use sha2::{Digest, Sha256};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

/// On-chain byte layout of one account kind
pub trait AccountLayout: Sized + Send {
    /// Human-readable kind, carried by not-found and parse errors
    const KIND: &'static str;

    fn decode(data: &[u8]) -> Result<Self, String>;
}

/// A decoded account together with its chain metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Account<T> {
    pub address: Pubkey,
    pub owner: Pubkey,
    pub lamports: u64,
    pub data: T,
}

/// Decode an existing account
///
/// # Errors
///
/// `AccountNotFound` if the account does not exist, `Parse` if it does not
/// match the layout.
pub fn parse_account<T: AccountLayout>(unparsed: UnparsedAccount) -> MplxResult<Account<T>> {
    if !unparsed.exists {
        return Err(MplxError::account_not_found(unparsed.address, T::KIND));
    }

    let data = T::decode(&unparsed.data)
        .map_err(|reason| MplxError::parse(unparsed.address, T::KIND, reason))?;

    Ok(Account {
        address: unparsed.address,
        owner: unparsed.owner,
        lamports: unparsed.lamports,
        data,
    })
}

/// Decode an account that is allowed to be absent
pub fn parse_optional_account<T: AccountLayout>(
    unparsed: UnparsedAccount,
) -> MplxResult<Option<Account<T>>> {
    if !unparsed.exists {
        return Ok(None);
    }
    parse_account(unparsed).map(Some)
}

pub async fn find_account<T: AccountLayout>(
    rpc: &dyn RpcClientLike,
    address: &Pubkey,
    commitment: CommitmentConfig,
) -> MplxResult<Account<T>> {
    let unparsed = rpc.get_account(address, commitment).await?;
    parse_account(unparsed)
}

pub async fn find_optional_account<T: AccountLayout>(
    rpc: &dyn RpcClientLike,
    address: &Pubkey,
    commitment: CommitmentConfig,
) -> MplxResult<Option<Account<T>>> {
    let unparsed = rpc.get_account(address, commitment).await?;
    parse_optional_account(unparsed)
}

/// Fetch several raw accounts in one batch, in request order
pub async fn find_accounts(
    rpc: &dyn RpcClientLike,
    addresses: &[Pubkey],
    commitment: CommitmentConfig,
) -> MplxResult<Vec<UnparsedAccount>> {
    let accounts = rpc.get_multiple_accounts(addresses, commitment).await?;
    if accounts.len() != addresses.len() {
        return Err(MplxError::Configuration(format!(
            "Requested {} accounts, node returned {}",
            addresses.len(),
            accounts.len()
        )));
    }
    Ok(accounts)
}

/// Anchor 8-byte discriminator: `sha256("<namespace>:<name>")[..8]`
///
/// Accounts use the `account` namespace, instructions `global`.
pub fn anchor_discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("{}:{}", namespace, name).as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest[..8]);
    discriminator
}

/// Borsh-decode a prefix of `data`; trailing bytes (account padding) are ignored
pub fn decode_borsh<T: BorshDeserialize>(data: &[u8]) -> Result<T, String> {
    let mut cursor = data;
    T::deserialize(&mut cursor).map_err(|e| e.to_string())
}

/// Check the Anchor account discriminator for `name`, then Borsh-decode the rest
pub fn decode_anchor_account<T: BorshDeserialize>(name: &str, data: &[u8]) -> Result<T, String> {
    let expected = anchor_discriminator("account", name);
    match data.get(..8) {
        Some(found) if found == expected => decode_borsh(&data[8..]),
        Some(_) => Err(format!("discriminator mismatch for {}", name)),
        None => Err(format!("{} bytes is too short for a discriminator", data.len())),
    }
}

/// Borsh encoding of `Pubkey` as its 32 raw bytes
pub(crate) mod pubkey_borsh {
    use borsh::io::{Read, Result, Write};
    use borsh::{BorshDeserialize, BorshSerialize};
    use solana_sdk::pubkey::Pubkey;

    pub fn serialize<W: Write>(key: &Pubkey, writer: &mut W) -> Result<()> {
        key.to_bytes().serialize(writer)
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Pubkey> {
        <[u8; 32]>::deserialize_reader(reader).map(Pubkey::new_from_array)
    }

    pub fn serialize_option<W: Write>(key: &Option<Pubkey>, writer: &mut W) -> Result<()> {
        key.map(|k| k.to_bytes()).serialize(writer)
    }

    pub fn deserialize_option<R: Read>(reader: &mut R) -> Result<Option<Pubkey>> {
        Option::<[u8; 32]>::deserialize_reader(reader).map(|k| k.map(Pubkey::new_from_array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockRpc;
    use borsh::BorshSerialize;

    #[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
    struct Counter {
        count: u64,
    }

    impl AccountLayout for Counter {
        const KIND: &'static str = "Counter";

        fn decode(data: &[u8]) -> Result<Self, String> {
            decode_anchor_account("Counter", data)
        }
    }

    fn counter_bytes(count: u64) -> Vec<u8> {
        let mut data = anchor_discriminator("account", "Counter").to_vec();
        data.extend(borsh::to_vec(&Counter { count }).unwrap());
        data.extend([0u8; 16]);
        data
    }

    #[tokio::test]
    async fn test_find_account_decodes() {
        let rpc = MockRpc::new();
        let address = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        rpc.set_account(address, owner, counter_bytes(9));

        let account: Account<Counter> =
            find_account(&rpc, &address, CommitmentConfig::confirmed()).await.unwrap();
        assert_eq!(account.data.count, 9);
        assert_eq!(account.owner, owner);
    }

    #[tokio::test]
    async fn test_missing_account_is_not_found() {
        let rpc = MockRpc::new();
        let address = Pubkey::new_unique();

        let err = find_account::<Counter>(&rpc, &address, CommitmentConfig::confirmed())
            .await
            .unwrap_err();
        match err {
            MplxError::AccountNotFound { address: a, kind } => {
                assert_eq!(a, address);
                assert_eq!(kind, "Counter");
            }
            other => panic!("Expected AccountNotFound, got {:?}", other),
        }

        let optional = find_optional_account::<Counter>(&rpc, &address, CommitmentConfig::confirmed())
            .await
            .unwrap();
        assert!(optional.is_none());
    }

    #[tokio::test]
    async fn test_malformed_optional_account_is_parse_error() {
        let rpc = MockRpc::new();
        let address = Pubkey::new_unique();
        rpc.set_account(address, Pubkey::new_unique(), vec![1, 2, 3]);

        let err = find_optional_account::<Counter>(&rpc, &address, CommitmentConfig::confirmed())
            .await
            .unwrap_err();
        assert!(matches!(err, MplxError::Parse { kind: "Counter", .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_degraded() {
        let rpc = MockRpc::new();
        rpc.fail_reads(true);

        let err = find_optional_account::<Counter>(
            &rpc,
            &Pubkey::new_unique(),
            CommitmentConfig::confirmed(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MplxError::Rpc(_)));
    }

    #[test]
    fn test_discriminator_mismatch() {
        let mut data = counter_bytes(1);
        data[0] ^= 0xff;
        let err = Counter::decode(&data).unwrap_err();
        assert!(err.contains("discriminator"));
    }

    #[derive(BorshSerialize, BorshDeserialize)]
    struct Keys {
        #[borsh(serialize_with = "pubkey_borsh::serialize", deserialize_with = "pubkey_borsh::deserialize")]
        key: Pubkey,
        #[borsh(
            serialize_with = "pubkey_borsh::serialize_option",
            deserialize_with = "pubkey_borsh::deserialize_option"
        )]
        maybe: Option<Pubkey>,
    }

    #[test]
    fn test_pubkey_encodes_as_raw_bytes() {
        let key = Pubkey::new_unique();
        let bytes = borsh::to_vec(&Keys { key, maybe: Some(key) }).unwrap();

        let mut expected = key.to_bytes().to_vec();
        expected.push(1);
        expected.extend(key.to_bytes());
        assert_eq!(bytes, expected);

        let decoded: Keys = decode_borsh(&bytes).unwrap();
        assert_eq!(decoded.key, key);
        assert_eq!(decoded.maybe, Some(key));

        let none = borsh::to_vec(&Keys { key, maybe: None }).unwrap();
        assert_eq!(none.len(), 33);
    }
}

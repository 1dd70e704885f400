//! `Nft` read model and its off-chain JSON metadata

use super::accounts::{Creator, MasterEditionAccount, MetadataAccount};
use crate::accounts::Account;
use crate::utils::remove_empty_chars;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

/// Off-chain JSON document referenced by the metadata URI
///
/// Only the common fields are typed; everything else is kept in `extra`.
/// Typed fields are read leniently: a value of the wrong shape becomes `None`
/// instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonMetadata {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::basis_points")]
    pub seller_fee_basis_points: Option<u16>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub animation_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub external_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::attributes")]
    pub attributes: Option<Vec<JsonAttribute>>,
    pub properties: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonAttribute {
    #[serde(default, deserialize_with = "lenient::string")]
    pub trait_type: Option<String>,
    pub value: Option<serde_json::Value>,
}

mod lenient {
    use super::JsonAttribute;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Strings as-is, numbers and booleans rendered, anything else `None`
    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Integer or numeric string within `u16`
    pub fn basis_points<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u16>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_u64().and_then(|v| u16::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// Array entries that are not attribute objects are skipped
    pub fn attributes<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Vec<JsonAttribute>>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect(),
            ),
            _ => None,
        })
    }
}

/// An NFT: its Metadata account, the account at its edition PDA when one
/// exists, and the off-chain JSON when it was loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Nft {
    pub metadata: Account<MetadataAccount>,
    pub master_edition: Option<Account<MasterEditionAccount>>,
    pub json: Option<JsonMetadata>,
}

impl Nft {
    pub fn new(
        metadata: Account<MetadataAccount>,
        master_edition: Option<Account<MasterEditionAccount>>,
        json: Option<JsonMetadata>,
    ) -> Self {
        Self {
            metadata,
            master_edition,
            json,
        }
    }

    pub fn metadata_address(&self) -> Pubkey {
        self.metadata.address
    }

    pub fn mint_address(&self) -> Pubkey {
        self.metadata.data.mint
    }

    pub fn update_authority(&self) -> Pubkey {
        self.metadata.data.update_authority
    }

    pub fn name(&self) -> String {
        remove_empty_chars(&self.metadata.data.name)
    }

    pub fn symbol(&self) -> String {
        remove_empty_chars(&self.metadata.data.symbol)
    }

    pub fn uri(&self) -> String {
        remove_empty_chars(&self.metadata.data.uri)
    }

    pub fn seller_fee_basis_points(&self) -> u16 {
        self.metadata.data.seller_fee_basis_points
    }

    pub fn creators(&self) -> &[Creator] {
        self.metadata.data.creators.as_deref().unwrap_or_default()
    }

    pub fn is_mutable(&self) -> bool {
        self.metadata.data.is_mutable
    }

    /// Whether the edition PDA holds a master edition
    pub fn is_original(&self) -> bool {
        self.master_edition
            .as_ref()
            .is_some_and(|edition| edition.data.is_original())
    }

    pub fn is_print(&self) -> bool {
        self.master_edition
            .as_ref()
            .is_some_and(|edition| !edition.data.is_original())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mistyped_fields_do_not_reject_document() {
        let json: JsonMetadata = serde_json::from_str(
            r#"{
                "name": "Sloth",
                "seller_fee_basis_points": "500",
                "external_url": {"href": "https://sloth.io"},
                "attributes": [
                    {"trait_type": 7, "value": "Blue"},
                    "not-an-attribute",
                    {"trait_type": "Hat", "value": 3}
                ],
                "collection": {"name": "Sloths"}
            }"#,
        )
        .unwrap();

        assert_eq!(json.name.as_deref(), Some("Sloth"));
        assert_eq!(json.seller_fee_basis_points, Some(500));
        assert_eq!(json.external_url, None);

        let attributes = json.attributes.unwrap();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].trait_type.as_deref(), Some("7"));
        assert_eq!(attributes[1].value, Some(serde_json::json!(3)));
        assert!(json.extra.contains_key("collection"));
    }

    #[test]
    fn test_out_of_range_basis_points() {
        let json: JsonMetadata =
            serde_json::from_str(r#"{"seller_fee_basis_points": 70000, "attributes": null}"#)
                .unwrap();
        assert_eq!(json.seller_fee_basis_points, None);
        assert_eq!(json.attributes, None);
    }
}

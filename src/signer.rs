//! Signer capability
//!
//! Signers are opaque: the toolkit only asks for a public key and a signature
//! over message bytes. Key material never leaves the implementation.

use crate::errors::{MplxError, MplxResult};
use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroize;

/// Async signer trait for approving transaction messages
#[async_trait]
pub trait SignerService: Send + Sync {
    /// Public identifier of this signer
    fn pubkey(&self) -> Pubkey;

    /// Sign serialized message bytes
    async fn sign_message(&self, message: &[u8]) -> MplxResult<Signature>;
}

impl fmt::Debug for dyn SignerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signer({})", self.pubkey())
    }
}

/// Local keypair signer
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Fresh random keypair, mostly useful for new accounts and tests
    pub fn generate() -> Self {
        Self::new(Keypair::new())
    }

    pub fn from_bytes(bytes: &[u8]) -> MplxResult<Self> {
        // Validate length
        if bytes.len() != 64 {
            return Err(MplxError::Configuration(format!(
                "Invalid keypair length: expected 64 bytes, got {}",
                bytes.len()
            )));
        }
        // Reject all-zero keys
        if bytes.iter().all(|&b| b == 0) {
            return Err(MplxError::Configuration(
                "Invalid keypair: all-zero key rejected".to_string(),
            ));
        }
        Keypair::try_from(bytes)
            .map(Self::new)
            .map_err(|e| MplxError::Configuration(format!("Invalid keypair bytes: {}", e)))
    }

    /// Load a keypair file in Solana CLI JSON format or as raw 64 bytes
    pub fn from_file(path: &str) -> MplxResult<Self> {
        let mut raw = std::fs::read(path).map_err(|e| {
            MplxError::Configuration(format!("Failed to read keypair file {}: {}", path, e))
        })?;

        let result = if raw.len() == 64 {
            Self::from_bytes(&raw)
        } else {
            match serde_json::from_slice::<Vec<u8>>(&raw) {
                Ok(mut bytes) => {
                    let signer = Self::from_bytes(&bytes);
                    bytes.zeroize();
                    signer
                }
                Err(e) => Err(MplxError::Configuration(format!(
                    "Failed to parse keypair JSON in {}: {}",
                    path, e
                ))),
            }
        };

        raw.zeroize();
        result
    }

    /// Decode a base58-encoded 64-byte secret key
    pub fn from_base58(secret: &str) -> MplxResult<Self> {
        let mut bytes = bs58::decode(secret.trim())
            .into_vec()
            .map_err(|e| MplxError::Configuration(format!("Invalid base58 secret key: {}", e)))?;
        let signer = Self::from_bytes(&bytes);
        bytes.zeroize();
        signer
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Wrap into the shared capability handle used by builders
    pub fn into_shared(self) -> Arc<dyn SignerService> {
        Arc::new(self)
    }
}

#[async_trait]
impl SignerService for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_message(&self, message: &[u8]) -> MplxResult<Signature> {
        self.keypair
            .try_sign_message(message)
            .map_err(|e| MplxError::signing(self.keypair.pubkey(), e.to_string()))
    }
}

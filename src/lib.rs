//! mplx - operation dispatch, conditional transaction building and account
//! read-models for Metaplex programs on Solana.
//!
//! - [`operation`]: typed operations dispatched through a registry of handlers
//! - [`tx_builder`]: keyed, conditional transaction builder and submission pipeline
//! - [`accounts`]: typed account reads with not-found and parse errors
//! - [`plugins`]: NFT, auction house and candy machine modules

pub mod accounts;
pub mod config;
pub mod context;
pub mod errors;
pub mod metrics;
pub mod observability;
pub mod operation;
pub mod plugins;
pub mod rpc;
pub mod signer;
pub mod structured_logging;
pub mod tx_builder;
pub mod utils;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use context::{Mplx, MplxBuilder};
pub use errors::{MplxError, MplxResult, UnconfirmedReason};
pub use operation::{MplxPlugin, Operation, OperationHandler, OperationKind, OperationRegistry};
pub use rpc::{ConfirmationLevel, RpcClientLike, RpcError, SolanaRpc};
pub use signer::{KeypairSigner, SignerService};
pub use tx_builder::{
    ConfirmOptions, InstructionWithSigners, SendAndConfirmResponse, TransactionBuilder,
};

// Re-export commonly used types
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};

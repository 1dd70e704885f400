//! Transaction building and submission
//!
//! ## Architecture
//!
//! - **builder**: keyed, conditional [`TransactionBuilder`] of
//!   [`InstructionWithSigners`] steps
//! - **instructions**: compute budget helpers and ordering validation
//! - **send**: compile, sign, send and confirm with timeout and cancellation
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mplx::tx_builder::{InstructionWithSigners, TransactionBuilder};
//! # use mplx::{Mplx, MplxResult};
//! # use solana_sdk::instruction::Instruction;
//!
//! # async fn example(mx: &Mplx, update: Instruction, changed: bool) -> MplxResult<()> {
//! let response = TransactionBuilder::make()
//!     .when(changed, |b| b.add(InstructionWithSigners::new("update", update)))
//!     .send_and_confirm(mx, None)
//!     .await?;
//! println!("confirmed at slot {}", response.slot);
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod instructions;
mod send;

pub use builder::{
    InstructionWithSigners, TransactionBuilder, COMPUTE_UNIT_LIMIT_KEY, COMPUTE_UNIT_PRICE_KEY,
};
pub use instructions::sanity_check_ix_order;
pub use send::{
    send_and_confirm, send_and_confirm_with_cancel, sign_transaction, ConfirmOptions,
    SendAndConfirmResponse,
};

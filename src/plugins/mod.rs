//! Program plugins
//!
//! Each module registers its operation handlers through [`crate::operation::MplxPlugin`]
//! and exposes a small client bound to an `Mplx` context.

pub mod auction_house_module;
pub mod candy_machine_module;
pub mod nft_module;

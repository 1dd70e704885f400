//! Instruction helpers and ordering validation
//!
//! Compute budget instructions are only honored when they precede the
//! program instructions they pay for, so the builder keeps them at the
//! front and the submission path checks the final list in debug builds.

use crate::errors::{MplxError, MplxResult};
use solana_sdk::{compute_budget::ComputeBudgetInstruction, instruction::Instruction};

/// `SetComputeUnitLimit` instruction
pub fn compute_unit_limit(units: u32) -> Instruction {
    ComputeBudgetInstruction::set_compute_unit_limit(units)
}

/// `SetComputeUnitPrice` instruction, price in micro-lamports per unit
pub fn compute_unit_price(micro_lamports: u64) -> Instruction {
    ComputeBudgetInstruction::set_compute_unit_price(micro_lamports)
}

pub fn is_compute_budget(ix: &Instruction) -> bool {
    ix.program_id == solana_sdk::compute_budget::id()
}

/// Validate final instruction ordering (debug/test only)
///
/// Expected order:
/// 1. Compute budget instructions (optional)
/// 2. Program instructions
///
/// # Errors
///
/// `Configuration` if the list is empty or a compute budget instruction
/// follows a program instruction.
#[cfg(debug_assertions)]
pub fn sanity_check_ix_order(instructions: &[Instruction]) -> MplxResult<()> {
    if instructions.is_empty() {
        return Err(MplxError::Configuration(
            "Instruction list is empty".to_string(),
        ));
    }

    let mut seen_program_ix = false;
    for (idx, ix) in instructions.iter().enumerate() {
        if is_compute_budget(ix) {
            if seen_program_ix {
                return Err(MplxError::Configuration(format!(
                    "Compute budget instruction at position {} follows a program instruction",
                    idx
                )));
            }
        } else {
            seen_program_ix = true;
        }
    }

    Ok(())
}

/// No-op in release builds
#[cfg(not(debug_assertions))]
#[inline]
pub fn sanity_check_ix_order(_instructions: &[Instruction]) -> MplxResult<()> {
    Ok(())
}

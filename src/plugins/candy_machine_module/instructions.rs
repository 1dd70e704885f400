//! Candy Machine v2 instruction encoders
//!
//! Anchor instruction data: `sha256("global:<name>")[..8]` followed by the
//! Borsh-encoded arguments.

use super::accounts::{CandyMachineData, CANDY_MACHINE_PROGRAM_ID};
use crate::accounts::anchor_discriminator;
use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

/// Accounts shared by the update instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateAccounts {
    pub candy_machine: Pubkey,
    pub authority: Pubkey,
    pub wallet: Pubkey,
}

impl UpdateAccounts {
    fn metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.candy_machine, false),
            AccountMeta::new_readonly(self.authority, true),
            AccountMeta::new_readonly(self.wallet, false),
        ]
    }
}

fn anchor_ix_data<T: BorshSerialize>(name: &str, args: &T) -> Vec<u8> {
    let mut data = anchor_discriminator("global", name).to_vec();
    // Writing into a Vec cannot fail
    let _ = args.serialize(&mut data);
    data
}

pub fn update_candy_machine(accounts: &UpdateAccounts, data: &CandyMachineData) -> Instruction {
    Instruction {
        program_id: CANDY_MACHINE_PROGRAM_ID,
        accounts: accounts.metas(),
        data: anchor_ix_data("update_candy_machine", data),
    }
}

pub fn update_authority(accounts: &UpdateAccounts, new_authority: Option<Pubkey>) -> Instruction {
    Instruction {
        program_id: CANDY_MACHINE_PROGRAM_ID,
        accounts: accounts.metas(),
        data: anchor_ix_data("update_authority", &new_authority.map(|k| k.to_bytes())),
    }
}

//! Integration and property tests for the keyed transaction builder

use mplx::tx_builder::{
    instructions::is_compute_budget, sanity_check_ix_order, InstructionWithSigners,
    TransactionBuilder, COMPUTE_UNIT_LIMIT_KEY, COMPUTE_UNIT_PRICE_KEY,
};
use proptest::prelude::*;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};
use std::collections::HashSet;

fn transfer(lamports: u64) -> Instruction {
    system_instruction::transfer(&Pubkey::new_unique(), &Pubkey::new_unique(), lamports)
}

fn step(key: &str, lamports: u64) -> InstructionWithSigners {
    InstructionWithSigners::new(key, transfer(lamports))
}

#[test]
fn test_conditional_composition() {
    let change_price = true;
    let change_authority = false;

    let builder = TransactionBuilder::make()
        .when(change_price, |b| b.add(step("update", 1)))
        .when(change_authority, |b| b.add(step("updateAuthority", 2)))
        .unless(change_authority, |b| b.add(step("noop", 3)));

    assert_eq!(builder.keys(), vec!["update", "noop"]);
}

#[test]
fn test_merge_then_budget_keeps_budget_first() {
    let left = TransactionBuilder::make().add(step("a", 1)).add(step("b", 2));
    let right = TransactionBuilder::make().add(step("c", 3)).add(step("a", 4));

    let builder = left.merge(right).prepend_compute_budget(200_000, 5_000);

    assert_eq!(
        builder.keys(),
        vec![COMPUTE_UNIT_LIMIT_KEY, COMPUTE_UNIT_PRICE_KEY, "a", "b", "c"]
    );
    assert!(sanity_check_ix_order(&builder.instructions()).is_ok());

    // "a" was replaced in place by the merged step
    let a = builder.get("a").unwrap();
    assert_eq!(a.instruction.data, transfer(4).data);
}

#[test]
fn test_budget_after_program_instruction_fails_check() {
    let mut instructions = vec![transfer(1)];
    instructions.push(mplx::tx_builder::instructions::compute_unit_price(1));

    if cfg!(debug_assertions) {
        assert!(sanity_check_ix_order(&instructions).is_err());
    }
}

proptest! {
    #[test]
    fn prop_keys_are_unique_and_first_seen_order(keys in proptest::collection::vec(0u8..6, 0..24)) {
        let builder = keys.iter().enumerate().fold(TransactionBuilder::make(), |b, (i, k)| {
            b.add(step(&format!("k{}", k), i as u64))
        });

        let mut expected = Vec::new();
        let mut seen = HashSet::new();
        for k in &keys {
            let key = format!("k{}", k);
            if seen.insert(key.clone()) {
                expected.push(key);
            }
        }

        prop_assert_eq!(builder.keys(), expected.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(builder.len(), seen.len());
        prop_assert_eq!(builder.is_empty(), keys.is_empty());
    }

    #[test]
    fn prop_last_write_wins(keys in proptest::collection::vec(0u8..4, 1..16)) {
        let builder = keys.iter().enumerate().fold(TransactionBuilder::make(), |b, (i, k)| {
            b.add(step(&format!("k{}", k), i as u64 + 1))
        });

        for k in keys.iter().collect::<HashSet<_>>() {
            let last = keys.iter().rposition(|x| x == k).unwrap() as u64 + 1;
            let stored = builder.get(&format!("k{}", k)).unwrap();
            prop_assert_eq!(&stored.instruction.data, &transfer(last).data);
        }
    }

    #[test]
    fn prop_compute_budget_always_leads(
        count in 1usize..8,
        cu_limit in 0u32..1_400_000,
        price in 0u64..100_000,
    ) {
        let builder = (0..count).fold(TransactionBuilder::make(), |b, i| {
            b.add(step(&format!("ix{}", i), i as u64))
        });
        let builder = builder.prepend_compute_budget(cu_limit, price);

        let instructions = builder.instructions();
        let budget = instructions.iter().take_while(|ix| is_compute_budget(ix)).count();
        let expected = usize::from(cu_limit > 0) + usize::from(price > 0);

        prop_assert_eq!(budget, expected);
        prop_assert_eq!(instructions.len(), count + expected);
        prop_assert!(instructions[budget..].iter().all(|ix| !is_compute_budget(ix)));
    }
}

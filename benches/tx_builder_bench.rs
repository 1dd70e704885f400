//! Benchmarks for keyed transaction building and offline signing
//!
//! Benchmarks:
//! - Adding and replacing keyed steps
//! - Merging builders and prepending compute budget
//! - Compiling and signing a V0 message against the in-memory cluster

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mplx::test_utils::{test_mplx, MockSigner};
use mplx::tx_builder::{sign_transaction, InstructionWithSigners, TransactionBuilder};
use mplx::SignerService;
use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

fn instruction(signer: &Pubkey) -> Instruction {
    Instruction::new_with_bytes(
        Pubkey::new_unique(),
        &[0u8; 64],
        vec![AccountMeta::new(*signer, true), AccountMeta::new(Pubkey::new_unique(), false)],
    )
}

fn build(steps: usize, signer: &MockSigner) -> TransactionBuilder {
    (0..steps).fold(TransactionBuilder::make(), |builder, i| {
        builder.add(
            InstructionWithSigners::new(format!("step{}", i), instruction(&signer.pubkey()))
                .with_signer(signer.clone().into_shared()),
        )
    })
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder_add");
    let signer = MockSigner::new();

    for steps in [4usize, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(steps), &steps, |b, &steps| {
            b.iter(|| black_box(build(steps, &signer)))
        });
    }

    group.bench_function("replace_existing_key", |b| {
        let base = build(16, &signer);
        b.iter(|| {
            black_box(
                base.clone()
                    .add(InstructionWithSigners::new("step8", instruction(&signer.pubkey()))),
            )
        })
    });

    group.finish();
}

fn bench_merge_and_budget(c: &mut Criterion) {
    let signer = MockSigner::new();
    let left = build(8, &signer);
    let right = build(12, &signer);

    c.bench_function("merge_then_compute_budget", |b| {
        b.iter(|| {
            black_box(
                left.clone()
                    .merge(right.clone())
                    .prepend_compute_budget(200_000, 10_000)
                    .instructions(),
            )
        })
    });
}

fn bench_sign(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mx = test_mplx();
    let signer = MockSigner::new();

    let mut group = c.benchmark_group("sign_transaction");
    for steps in [1usize, 4, 8] {
        let builder = build(steps, &signer).set_recent_blockhash(Hash::new_unique());
        group.bench_with_input(BenchmarkId::from_parameter(steps), &builder, |b, builder| {
            b.iter(|| rt.block_on(sign_transaction(black_box(builder), &mx)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_add, bench_merge_and_budget, bench_sign);
criterion_main!(benches);

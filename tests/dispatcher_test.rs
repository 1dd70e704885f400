//! Integration tests for operation dispatch
//!
//! Validates:
//! - Custom plugins register and dispatch through the context
//! - Handler errors flow back unchanged
//! - Unregistered and duplicate kinds are rejected

use async_trait::async_trait;
use mplx::test_utils::{MockRpc, MockSigner};
use mplx::{
    Mplx, MplxError, MplxPlugin, MplxResult, Operation, OperationHandler, OperationKind,
    OperationRegistry,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct SumOperation;

impl OperationKind for SumOperation {
    const KIND: &'static str = "SumOperation";
    type Input = Vec<u64>;
    type Output = u64;
}

struct SumHandler {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl OperationHandler<SumOperation> for SumHandler {
    async fn handle(&self, operation: Operation<SumOperation>, _mx: &Mplx) -> MplxResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let values = operation.into_input();
        if values.is_empty() {
            return Err(MplxError::Configuration("nothing to sum".to_string()));
        }
        Ok(values.iter().sum())
    }
}

struct SumPlugin {
    calls: Arc<AtomicUsize>,
}

impl MplxPlugin for SumPlugin {
    fn install(&self, registry: &OperationRegistry) -> MplxResult<()> {
        registry.register::<SumOperation, _>(SumHandler {
            calls: Arc::clone(&self.calls),
        })
    }
}

struct NeverRegistered;

impl OperationKind for NeverRegistered {
    const KIND: &'static str = "NeverRegisteredOperation";
    type Input = ();
    type Output = ();
}

fn mplx_with_sum(calls: Arc<AtomicUsize>) -> Mplx {
    Mplx::builder(Arc::new(MockRpc::new()), MockSigner::new().into_shared())
        .with_core_plugins()
        .unwrap()
        .plugin(&SumPlugin { calls })
        .unwrap()
        .build()
}

#[tokio::test]
async fn test_custom_plugin_dispatch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mx = mplx_with_sum(Arc::clone(&calls));

    assert!(mx.operations().is_registered("SumOperation"));
    assert!(mx.operations().is_registered("FindNftByMintOperation"));

    let total = mx
        .execute(Operation::<SumOperation>::new(vec![1, 2, 3]))
        .await
        .unwrap();
    assert_eq!(total, 6);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_handler_error_is_returned_unchanged() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mx = mplx_with_sum(Arc::clone(&calls));

    let err = mx
        .execute(Operation::<SumOperation>::new(vec![]))
        .await
        .unwrap_err();
    match err {
        MplxError::Configuration(message) => assert_eq!(message, "nothing to sum"),
        other => panic!("Expected Configuration, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unregistered_kind() {
    let rpc = Arc::new(MockRpc::new());
    let mx = Mplx::builder(rpc.clone(), MockSigner::new().into_shared()).build();
    assert!(mx.operations().is_empty());

    let err = mx
        .execute(Operation::<NeverRegistered>::new(()))
        .await
        .unwrap_err();
    match err {
        MplxError::UnregisteredOperation { kind } => assert_eq!(kind, "NeverRegisteredOperation"),
        other => panic!("Expected UnregisteredOperation, got {:?}", other),
    }
    assert_eq!(rpc.total_calls(), 0);
}

#[test]
fn test_duplicate_registration_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let result = Mplx::builder(Arc::new(MockRpc::new()), MockSigner::new().into_shared())
        .plugin(&SumPlugin {
            calls: Arc::clone(&calls),
        })
        .unwrap()
        .plugin(&SumPlugin { calls });

    match result {
        Err(MplxError::OperationAlreadyRegistered { kind }) => assert_eq!(kind, "SumOperation"),
        Err(other) => panic!("Expected OperationAlreadyRegistered, got {:?}", other),
        Ok(_) => panic!("Second registration should fail"),
    }
}

#[tokio::test]
async fn test_concurrent_dispatch_shares_registry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mx = mplx_with_sum(Arc::clone(&calls));

    let handles: Vec<_> = (0..16u64)
        .map(|i| {
            let mx = mx.clone();
            tokio::spawn(async move {
                mx.execute(Operation::<SumOperation>::new(vec![i, 1])).await
            })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    let total: u64 = results.into_iter().map(|r| r.unwrap().unwrap()).sum();

    assert_eq!(total, (0..16u64).sum::<u64>() + 16);
    assert_eq!(calls.load(Ordering::SeqCst), 16);
}

//! Test Utilities Module
//!
//! In-memory stand-ins for the RPC and signer capabilities, for deterministic
//! tests without a cluster.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use crate::context::Mplx;
use crate::errors::{MplxError, MplxResult};
use crate::rpc::{RpcClientLike, RpcError, SignatureStatus, UnparsedAccount};
use crate::signer::SignerService;
use async_trait::async_trait;
use dashmap::DashMap;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::VersionedTransaction,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const MOCK_ENDPOINT: &str = "mock://rpc";

/// In-memory RPC
///
/// Accounts are served from a map, signature statuses from a script consumed
/// front to back (an exhausted script reports "not seen yet").
#[derive(Default)]
pub struct MockRpc {
    accounts: DashMap<Pubkey, Account>,
    statuses: Mutex<VecDeque<SignatureStatus>>,
    sent: Mutex<Vec<VersionedTransaction>>,
    fail_reads: AtomicBool,
    fail_sends: AtomicBool,
    account_calls: AtomicUsize,
    blockhash_calls: AtomicUsize,
    send_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.accounts.insert(
            address,
            Account {
                lamports: 1_000_000,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    pub fn remove_account(&self, address: &Pubkey) {
        self.accounts.remove(address);
    }

    pub fn push_status(&self, status: SignatureStatus) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push_back(status);
        }
    }

    /// Make account reads fail with a transport error
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make `send_transaction` fail with a transport error
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn sent_transactions(&self) -> Vec<VersionedTransaction> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.account_calls()
            + self.blockhash_calls.load(Ordering::SeqCst)
            + self.send_calls()
            + self.status_calls()
    }

    fn transport_error() -> RpcError {
        RpcError::Transport {
            endpoint: MOCK_ENDPOINT.to_string(),
            message: "connection refused".to_string(),
        }
    }
}

#[async_trait]
impl RpcClientLike for MockRpc {
    fn endpoint(&self) -> &str {
        MOCK_ENDPOINT
    }

    async fn get_account(
        &self,
        address: &Pubkey,
        _commitment: CommitmentConfig,
    ) -> Result<UnparsedAccount, RpcError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::transport_error());
        }
        let account = self.accounts.get(address).map(|entry| entry.value().clone());
        Ok(UnparsedAccount::from_optional(*address, account))
    }

    async fn get_latest_blockhash(&self, _commitment: CommitmentConfig) -> Result<Hash, RpcError> {
        self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Hash::new_from_array([7u8; 32]))
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, RpcError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(Self::transport_error());
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(transaction.clone());
        }
        Ok(transaction.signatures.first().copied().unwrap_or_default())
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<SignatureStatus>, RpcError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .lock()
            .ok()
            .and_then(|mut statuses| statuses.pop_front()))
    }
}

/// Signer backed by a real keypair, with a failure switch and a call counter
///
/// Clones share the keypair, switch and counter.
#[derive(Clone)]
pub struct MockSigner {
    keypair: Arc<Keypair>,
    fail: Arc<AtomicBool>,
    sign_calls: Arc<AtomicUsize>,
}

impl MockSigner {
    pub fn new() -> Self {
        Self {
            keypair: Arc::new(Keypair::new()),
            fail: Arc::new(AtomicBool::new(false)),
            sign_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Signer whose every `sign_message` call fails
    pub fn failing() -> Self {
        let signer = Self::new();
        signer.set_failing(true);
        signer
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn into_shared(self) -> Arc<dyn SignerService> {
        Arc::new(self)
    }
}

impl Default for MockSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignerService for MockSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_message(&self, message: &[u8]) -> MplxResult<Signature> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(MplxError::signing(self.pubkey(), "mock signer configured to fail"));
        }
        Ok(self.keypair.sign_message(message))
    }
}

/// Context over a fresh [`MockRpc`] with all core plugins installed
pub fn test_mplx() -> Mplx {
    test_mplx_with(Arc::new(MockRpc::new()))
}

/// Context over the given mock, so the test can script and inspect it
pub fn test_mplx_with(rpc: Arc<MockRpc>) -> Mplx {
    Mplx::builder(rpc, MockSigner::new().into_shared())
        .with_core_plugins()
        .expect("core plugins should install into an empty registry")
        .build()
}

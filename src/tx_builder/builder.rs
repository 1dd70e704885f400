//! Keyed, conditional transaction builder
//!
//! A [`TransactionBuilder`] is an ordered list of keyed steps. Each step is
//! one instruction plus the signers it needs. Keys are unique: adding a step
//! under an existing key replaces that step where it stands, which lets
//! operation builders compose "only add if changed" steps idempotently.
//!
//! ## Key Features
//! - Consuming, chainable API (`add`, `when`, `unless`)
//! - Stable in-place replacement by key
//! - Signer deduplication by pubkey, in first-required order
//! - Optional fee payer and blockhash overrides for submission

use super::instructions::{compute_unit_limit, compute_unit_price};
use crate::signer::SignerService;
use itertools::Itertools;
use solana_sdk::{hash::Hash, instruction::Instruction, pubkey::Pubkey};
use std::fmt;
use std::sync::Arc;

/// Step key for the compute unit limit instruction
pub const COMPUTE_UNIT_LIMIT_KEY: &str = "computeUnitLimit";
/// Step key for the compute unit price instruction
pub const COMPUTE_UNIT_PRICE_KEY: &str = "computeUnitPrice";

/// One keyed instruction and the signers it requires
#[derive(Clone)]
pub struct InstructionWithSigners {
    /// Unique within a builder; used for lookup and replacement
    pub key: String,
    pub instruction: Instruction,
    pub signers: Vec<Arc<dyn SignerService>>,
}

impl InstructionWithSigners {
    pub fn new(key: impl Into<String>, instruction: Instruction) -> Self {
        Self {
            key: key.into(),
            instruction,
            signers: Vec::new(),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn SignerService>) -> Self {
        self.signers.push(signer);
        self
    }

    pub fn with_signers(mut self, signers: impl IntoIterator<Item = Arc<dyn SignerService>>) -> Self {
        self.signers.extend(signers);
        self
    }

    pub fn signer_pubkeys(&self) -> Vec<Pubkey> {
        self.signers.iter().map(|s| s.pubkey()).collect()
    }
}

impl fmt::Debug for InstructionWithSigners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionWithSigners")
            .field("key", &self.key)
            .field("program_id", &self.instruction.program_id)
            .field("data_len", &self.instruction.data.len())
            .field("signers", &self.signer_pubkeys())
            .finish()
    }
}

impl PartialEq for InstructionWithSigners {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.instruction == other.instruction
            && self.signer_pubkeys() == other.signer_pubkeys()
    }
}

/// Ordered, key-addressable collection of steps forming one transaction
#[derive(Clone, Default)]
pub struct TransactionBuilder {
    steps: Vec<InstructionWithSigners>,
    fee_payer: Option<Arc<dyn SignerService>>,
    recent_blockhash: Option<Hash>,
}

impl TransactionBuilder {
    /// Empty builder
    pub fn make() -> Self {
        Self::default()
    }

    /// Append a step, or replace the step with the same key in place
    pub fn add(mut self, step: InstructionWithSigners) -> Self {
        match self.position(&step.key) {
            Some(index) => self.steps[index] = step,
            None => self.steps.push(step),
        }
        self
    }

    pub fn add_many(self, steps: impl IntoIterator<Item = InstructionWithSigners>) -> Self {
        steps.into_iter().fold(self, Self::add)
    }

    /// Apply `f` when `predicate` holds; otherwise return the builder untouched
    ///
    /// `f` is not called when `predicate` is false.
    pub fn when<F>(self, predicate: bool, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if predicate {
            f(self)
        } else {
            self
        }
    }

    pub fn unless<F>(self, predicate: bool, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.when(!predicate, f)
    }

    /// Append every step of `other`, with the same replace-by-key rule
    ///
    /// Fee payer and blockhash of `self` are kept when set, otherwise taken from `other`.
    pub fn merge(mut self, other: TransactionBuilder) -> Self {
        if self.fee_payer.is_none() {
            self.fee_payer = other.fee_payer;
        }
        if self.recent_blockhash.is_none() {
            self.recent_blockhash = other.recent_blockhash;
        }
        self.add_many(other.steps)
    }

    /// Put compute budget instructions in front of all program instructions
    ///
    /// Zero values leave that budget step unset (or as previously set).
    /// Budget steps, new or existing, end up first in limit-then-price order.
    pub fn prepend_compute_budget(mut self, cu_limit: u32, micro_lamports: u64) -> Self {
        let limit = (cu_limit > 0)
            .then(|| InstructionWithSigners::new(COMPUTE_UNIT_LIMIT_KEY, compute_unit_limit(cu_limit)));
        let price = (micro_lamports > 0).then(|| {
            InstructionWithSigners::new(COMPUTE_UNIT_PRICE_KEY, compute_unit_price(micro_lamports))
        });

        let limit = limit.or_else(|| self.take(COMPUTE_UNIT_LIMIT_KEY));
        let price = price.or_else(|| self.take(COMPUTE_UNIT_PRICE_KEY));
        self.steps
            .retain(|step| step.key != COMPUTE_UNIT_LIMIT_KEY && step.key != COMPUTE_UNIT_PRICE_KEY);

        let budget: Vec<_> = limit.into_iter().chain(price).collect();
        self.steps.splice(0..0, budget);
        self
    }

    /// Remove the step stored under `key`, if any
    pub fn remove(mut self, key: &str) -> Self {
        self.steps.retain(|step| step.key != key);
        self
    }

    pub fn set_fee_payer(mut self, fee_payer: Arc<dyn SignerService>) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    pub fn set_recent_blockhash(mut self, blockhash: Hash) -> Self {
        self.recent_blockhash = Some(blockhash);
        self
    }

    pub fn fee_payer(&self) -> Option<&Arc<dyn SignerService>> {
        self.fee_payer.as_ref()
    }

    pub fn recent_blockhash(&self) -> Option<Hash> {
        self.recent_blockhash
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn get(&self, key: &str) -> Option<&InstructionWithSigners> {
        self.steps.iter().find(|step| step.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.key.as_str()).collect()
    }

    pub fn steps(&self) -> &[InstructionWithSigners] {
        &self.steps
    }

    /// Final instruction sequence, in step order
    pub fn instructions(&self) -> Vec<Instruction> {
        self.steps.iter().map(|step| step.instruction.clone()).collect()
    }

    /// Signers required by the steps, deduplicated by pubkey in first-required order
    ///
    /// The fee payer is not included.
    pub fn signers(&self) -> Vec<Arc<dyn SignerService>> {
        self.steps
            .iter()
            .flat_map(|step| step.signers.iter())
            .unique_by(|signer| signer.pubkey())
            .cloned()
            .collect()
    }

    pub fn signer_pubkeys(&self) -> Vec<Pubkey> {
        self.signers().iter().map(|s| s.pubkey()).collect()
    }

    fn take(&mut self, key: &str) -> Option<InstructionWithSigners> {
        self.position(key).map(|index| self.steps.remove(index))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.key == key)
    }
}

impl fmt::Debug for TransactionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionBuilder")
            .field("steps", &self.steps)
            .field("fee_payer", &self.fee_payer.as_ref().map(|s| s.pubkey()))
            .field("recent_blockhash", &self.recent_blockhash)
            .finish()
    }
}

impl PartialEq for TransactionBuilder {
    fn eq(&self, other: &Self) -> bool {
        self.steps == other.steps
            && self.fee_payer.as_ref().map(|s| s.pubkey())
                == other.fee_payer.as_ref().map(|s| s.pubkey())
            && self.recent_blockhash == other.recent_blockhash
    }
}

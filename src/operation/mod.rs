//! Typed operations and their handlers
//!
//! An operation kind ties a string tag to an input and an output type at the
//! type level. Plugins implement [`OperationHandler`] for their kinds and
//! register them in the [`OperationRegistry`]; callers build an
//! [`Operation`] and hand it to `Mplx::execute`, which returns the output
//! type bound to that kind.
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use mplx::{Mplx, MplxResult, Operation, OperationHandler, OperationKind};
//!
//! struct Echo;
//!
//! impl OperationKind for Echo {
//!     const KIND: &'static str = "Echo";
//!     type Input = u64;
//!     type Output = u64;
//! }
//!
//! struct EchoHandler;
//!
//! #[async_trait]
//! impl OperationHandler<Echo> for EchoHandler {
//!     async fn handle(&self, operation: Operation<Echo>, _mx: &Mplx) -> MplxResult<u64> {
//!         Ok(operation.into_input())
//!     }
//! }
//! ```

use crate::context::Mplx;
use crate::errors::MplxResult;
use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;

mod registry;

pub use registry::OperationRegistry;

/// Type-level binding of an operation tag to its input and output shapes
pub trait OperationKind: Send + Sync + 'static {
    /// Unique tag the handler is registered under
    const KIND: &'static str;
    type Input: Send + 'static;
    type Output: Send + 'static;
}

/// A single request for the handler registered under `K::KIND`
///
/// Immutable once built and consumed by dispatch.
pub struct Operation<K: OperationKind> {
    input: K::Input,
    _kind: PhantomData<fn() -> K>,
}

impl<K: OperationKind> Operation<K> {
    pub fn new(input: K::Input) -> Self {
        Self {
            input,
            _kind: PhantomData,
        }
    }

    pub fn kind(&self) -> &'static str {
        K::KIND
    }

    pub fn input(&self) -> &K::Input {
        &self.input
    }

    pub fn into_input(self) -> K::Input {
        self.input
    }
}

impl<K: OperationKind> fmt::Debug for Operation<K>
where
    K::Input: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("kind", &K::KIND)
            .field("input", &self.input)
            .finish()
    }
}

/// Implementation of one operation kind
#[async_trait]
pub trait OperationHandler<K: OperationKind>: Send + Sync {
    async fn handle(&self, operation: Operation<K>, mx: &Mplx) -> MplxResult<K::Output>;
}

/// A module that contributes operation handlers to a registry
pub trait MplxPlugin {
    fn install(&self, registry: &OperationRegistry) -> MplxResult<()>;
}

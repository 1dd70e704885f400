//! Operation registry and dispatcher
//!
//! Maps an operation tag to exactly one handler. The map is type-erased
//! (handlers for different kinds live side by side) while `execute` stays
//! type-safe: the generic `K` fixes both the handler type looked up and the
//! output returned.
//!
//! ## Registration policy
//! - Handlers are registered while the `Mplx` context is being built
//! - Registering a second handler for a taken tag fails with
//!   `OperationAlreadyRegistered`; nothing is overwritten
//! - Reads are lock-free per shard and never held across an await

use super::{MplxPlugin, Operation, OperationHandler, OperationKind};
use crate::context::Mplx;
use crate::errors::{MplxError, MplxResult};
use crate::metrics::{metrics, Timer};
use crate::observability::CorrelationId;
use dashmap::{mapref::entry::Entry, DashMap};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

/// Type-erased handler slot
struct RegisteredHandler {
    /// `type_name` of the OperationKind the handler was registered for
    operation_type: &'static str,
    /// Holds an `Arc<dyn OperationHandler<K>>`
    handler: Arc<dyn Any + Send + Sync>,
}

/// Process-wide mapping from operation tag to handler
#[derive(Default)]
pub struct OperationRegistry {
    handlers: DashMap<&'static str, RegisteredHandler>,
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("kinds", &self.registered_kinds())
            .finish()
    }
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `K::KIND`
    ///
    /// # Errors
    ///
    /// `OperationAlreadyRegistered` if a handler is already bound to the tag.
    pub fn register<K, H>(&self, handler: H) -> MplxResult<()>
    where
        K: OperationKind,
        H: OperationHandler<K> + 'static,
    {
        let handler: Arc<dyn OperationHandler<K>> = Arc::new(handler);

        match self.handlers.entry(K::KIND) {
            Entry::Occupied(existing) => {
                warn!(
                    kind = K::KIND,
                    existing_type = existing.get().operation_type,
                    "Rejected duplicate operation handler"
                );
                Err(MplxError::OperationAlreadyRegistered {
                    kind: K::KIND.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(RegisteredHandler {
                    operation_type: std::any::type_name::<K>(),
                    handler: Arc::new(handler),
                });
                debug!(kind = K::KIND, "Operation handler registered");
                Ok(())
            }
        }
    }

    /// Let a plugin register all of its handlers
    pub fn install(&self, plugin: &dyn MplxPlugin) -> MplxResult<()> {
        plugin.install(self)
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Registered tags, sorted
    pub fn registered_kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<&'static str> = self.handlers.iter().map(|entry| *entry.key()).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Resolve the handler for `K`, cloning it out of the map
    fn resolve<K: OperationKind>(&self) -> MplxResult<Arc<dyn OperationHandler<K>>> {
        let erased = {
            let entry = self
                .handlers
                .get(K::KIND)
                .ok_or_else(|| MplxError::UnregisteredOperation {
                    kind: K::KIND.to_string(),
                })?;
            Arc::clone(&entry.handler)
        };

        erased
            .downcast_ref::<Arc<dyn OperationHandler<K>>>()
            .cloned()
            .ok_or_else(|| MplxError::OperationTypeMismatch {
                kind: K::KIND.to_string(),
            })
    }

    /// Dispatch `operation` to its handler and return the handler's result unchanged
    pub async fn execute<K: OperationKind>(
        &self,
        operation: Operation<K>,
        mx: &Mplx,
    ) -> MplxResult<K::Output> {
        let handler = match self.resolve::<K>() {
            Ok(handler) => handler,
            Err(err) => {
                metrics().record_operation(K::KIND, err.category());
                return Err(err);
            }
        };

        let correlation_id = CorrelationId::new();
        let span = info_span!("operation", kind = K::KIND, correlation_id = %correlation_id);
        let timer = Timer::new();

        let result = handler.handle(operation, mx).instrument(span).await;

        match &result {
            Ok(_) => {
                debug!(kind = K::KIND, correlation_id = %correlation_id, elapsed_ms = timer.elapsed_ms(), "Operation completed");
                metrics().record_operation(K::KIND, "success");
            }
            Err(err) => {
                debug!(kind = K::KIND, correlation_id = %correlation_id, error = %err, "Operation failed");
                metrics().record_operation(K::KIND, err.category());
            }
        }
        timer.observe_duration(&metrics().operation_latency);

        result
    }
}

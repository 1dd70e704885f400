//! Submission pipeline: compile, sign, send, confirm
//!
//! A builder is compiled into one v0 message, signed once per required
//! signer, sent, and then polled until the requested confirmation level is
//! observed. The wait is bounded by a timeout and an optional caller-supplied
//! cancel future; either ends the wait with `MplxError::Unconfirmed`, in which
//! case the transaction may still land and callers must re-query state.

use super::builder::TransactionBuilder;
use super::instructions::sanity_check_ix_order;
use crate::context::Mplx;
use crate::errors::{MplxError, MplxResult, UnconfirmedReason};
use crate::metrics::{metrics, Timer};
use crate::rpc::{ConfirmationLevel, RpcClientLike};
use crate::signer::SignerService;
use crate::structured_logging::SubmissionLogger;
use serde::{Deserialize, Serialize};
use solana_sdk::{
    message::{v0::Message as MessageV0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// How long and how hard to wait for a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOptions {
    pub level: ConfirmationLevel,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            level: ConfirmationLevel::Confirmed,
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl ConfirmOptions {
    pub fn with_level(mut self, level: ConfirmationLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// `Configuration` error for a zero poll interval
    pub fn validate(&self) -> MplxResult<()> {
        if self.poll_interval.is_zero() {
            return Err(MplxError::Configuration(
                "confirm poll_interval must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a confirmed submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendAndConfirmResponse {
    pub signature: Signature,
    /// Level actually observed; at least the requested one
    pub confirmation_level: ConfirmationLevel,
    pub slot: u64,
}

impl TransactionBuilder {
    /// Submit this builder through `mx` and wait for confirmation
    ///
    /// `None` uses the context's default confirm options.
    pub async fn send_and_confirm(
        self,
        mx: &Mplx,
        options: Option<ConfirmOptions>,
    ) -> MplxResult<SendAndConfirmResponse> {
        send_and_confirm(self, mx, options.unwrap_or(*mx.confirm_options())).await
    }
}

/// Compile and sign `builder` without sending it
///
/// # Errors
///
/// - `NoInstructionsToSend` for an empty builder (no RPC call is made)
/// - `Configuration` if the message does not compile
/// - `MissingSigner` / `Signing` if a required signature cannot be produced
pub async fn sign_transaction(
    builder: &TransactionBuilder,
    mx: &Mplx,
) -> MplxResult<VersionedTransaction> {
    if builder.is_empty() {
        return Err(MplxError::no_instructions("TransactionBuilder"));
    }

    let instructions = builder.instructions();
    sanity_check_ix_order(&instructions)?;

    let fee_payer = builder
        .fee_payer()
        .cloned()
        .unwrap_or_else(|| Arc::clone(mx.identity()));

    let recent_blockhash = match builder.recent_blockhash() {
        Some(hash) => hash,
        None => mx.rpc().get_latest_blockhash(mx.commitment()).await?,
    };

    let payer = fee_payer.pubkey();
    let message_v0 = MessageV0::try_compile(&payer, &instructions, &[], recent_blockhash)
        .map_err(|e| MplxError::Configuration(format!("Failed to compile message: {}", e)))?;

    let num_required = message_v0.header.num_required_signatures as usize;
    let required: Vec<Pubkey> = message_v0
        .account_keys
        .iter()
        .take(num_required)
        .copied()
        .collect();

    let message = VersionedMessage::V0(message_v0);
    let message_bytes = message.serialize();

    let mut candidates = Vec::with_capacity(builder.len() + 1);
    candidates.push(fee_payer);
    candidates.extend(builder.signers());

    let mut signatures = Vec::with_capacity(required.len());
    for key in &required {
        let signer = candidates
            .iter()
            .find(|candidate| candidate.pubkey() == *key)
            .ok_or(MplxError::MissingSigner { signer: *key })?;
        signatures.push(sign_checked(signer.as_ref(), key, &message_bytes).await?);
    }

    Ok(VersionedTransaction {
        signatures,
        message,
    })
}

async fn sign_checked(
    signer: &dyn SignerService,
    key: &Pubkey,
    message_bytes: &[u8],
) -> MplxResult<Signature> {
    let signature = signer.sign_message(message_bytes).await?;
    if !signature.verify(key.as_ref(), message_bytes) {
        return Err(MplxError::signing(*key, "signature does not verify"));
    }
    Ok(signature)
}

/// Submit `builder` and wait for `options.level`, bounded by `options.timeout`
pub async fn send_and_confirm(
    builder: TransactionBuilder,
    mx: &Mplx,
    options: ConfirmOptions,
) -> MplxResult<SendAndConfirmResponse> {
    send_and_confirm_with_cancel(builder, mx, options, futures::future::pending::<()>()).await
}

/// Like [`send_and_confirm`], but the confirmation wait also ends when `cancel` resolves
pub async fn send_and_confirm_with_cancel<C>(
    builder: TransactionBuilder,
    mx: &Mplx,
    options: ConfirmOptions,
    cancel: C,
) -> MplxResult<SendAndConfirmResponse>
where
    C: Future<Output = ()> + Send,
{
    options.validate()?;
    let logger = SubmissionLogger::new();

    let transaction = sign_transaction(&builder, mx).await?;
    logger.log_compiled(builder.len(), transaction.signatures.len());

    let signature = mx.rpc().send_transaction(&transaction).await?;
    metrics().transactions_sent.inc();
    logger.log_sent(&signature);

    let timer = Timer::new();
    let wait = poll_confirmation(mx.rpc().as_ref(), &signature, &options);

    let outcome = tokio::select! {
        result = wait => result,
        _ = tokio::time::sleep(options.timeout) => Err(unconfirmed(signature, options.level, UnconfirmedReason::Timeout)),
        _ = cancel => Err(unconfirmed(signature, options.level, UnconfirmedReason::Cancelled)),
    };

    match outcome {
        Ok((slot, observed)) => {
            metrics().transactions_confirmed.inc();
            timer.observe_duration(&metrics().confirmation_latency);
            logger.log_confirmed(&signature, observed, timer.elapsed_ms());
            Ok(SendAndConfirmResponse {
                signature,
                confirmation_level: observed,
                slot,
            })
        }
        Err(err) => {
            match &err {
                MplxError::Unconfirmed { reason, .. } => {
                    metrics().transactions_unconfirmed.inc();
                    logger.log_unconfirmed(&signature, options.level, &reason.to_string());
                }
                MplxError::TransactionFailed { .. } => {
                    metrics().transactions_failed.inc();
                    logger.log_failed(&signature, &err);
                }
                other => logger.log_failed(&signature, other),
            }
            Err(err)
        }
    }
}

fn unconfirmed(
    signature: Signature,
    level: ConfirmationLevel,
    reason: UnconfirmedReason,
) -> MplxError {
    MplxError::Unconfirmed {
        signature,
        level,
        reason,
    }
}

/// Poll until the requested level is observed or the cluster reports an error
///
/// Retryable RPC errors are logged and polling continues.
async fn poll_confirmation(
    rpc: &dyn RpcClientLike,
    signature: &Signature,
    options: &ConfirmOptions,
) -> MplxResult<(u64, ConfirmationLevel)> {
    let mut interval = tokio::time::interval(options.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match rpc.get_signature_status(signature).await {
            Ok(Some(status)) => {
                if let Some(reason) = status.err {
                    return Err(MplxError::TransactionFailed {
                        signature: *signature,
                        reason,
                    });
                }
                if let Some(observed) = status.level {
                    if options.level.is_satisfied_by(observed) {
                        return Ok((status.slot, observed));
                    }
                    debug!(signature = %signature, observed = %observed, wanted = %options.level, "Waiting for confirmation");
                }
            }
            Ok(None) => {
                debug!(signature = %signature, "Signature not yet seen by node");
            }
            Err(err) if err.is_retryable() => {
                debug!(signature = %signature, error = %err, "Status poll failed, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

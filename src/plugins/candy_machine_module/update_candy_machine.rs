use super::instructions::{update_authority, update_candy_machine, UpdateAccounts};
use super::models::{CandyMachine, CandyMachineUpdate};
use crate::context::Mplx;
use crate::errors::{MplxError, MplxResult};
use crate::operation::{Operation, OperationHandler, OperationKind};
use crate::signer::SignerService;
use crate::tx_builder::{
    ConfirmOptions, InstructionWithSigners, SendAndConfirmResponse, TransactionBuilder,
};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

pub const UPDATE_INSTRUCTION_KEY: &str = "update";
pub const UPDATE_AUTHORITY_INSTRUCTION_KEY: &str = "updateAuthority";

pub struct UpdateCandyMachineOperation;

impl OperationKind for UpdateCandyMachineOperation {
    const KIND: &'static str = "UpdateCandyMachineOperation";
    type Input = UpdateCandyMachineInput;
    type Output = UpdateCandyMachineOutput;
}

#[derive(Debug, Clone)]
pub struct UpdateCandyMachineInput {
    pub candy_machine: CandyMachine,
    pub update: CandyMachineUpdate,
    /// Signs the update; the context identity when `None`
    pub authority: Option<Arc<dyn SignerService>>,
    pub new_authority: Option<Pubkey>,
    pub update_instruction_key: Option<String>,
    pub update_authority_instruction_key: Option<String>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl UpdateCandyMachineInput {
    pub fn new(candy_machine: CandyMachine) -> Self {
        Self {
            candy_machine,
            update: CandyMachineUpdate::default(),
            authority: None,
            new_authority: None,
            update_instruction_key: None,
            update_authority_instruction_key: None,
            confirm_options: None,
        }
    }

    pub fn with_update(mut self, update: CandyMachineUpdate) -> Self {
        self.update = update;
        self
    }

    pub fn with_authority(mut self, authority: Arc<dyn SignerService>) -> Self {
        self.authority = Some(authority);
        self
    }

    pub fn with_new_authority(mut self, new_authority: Pubkey) -> Self {
        self.new_authority = Some(new_authority);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateCandyMachineOutput {
    pub response: SendAndConfirmResponse,
}

pub fn update_candy_machine_operation(
    input: UpdateCandyMachineInput,
) -> Operation<UpdateCandyMachineOperation> {
    Operation::new(input)
}

/// Steps needed to move the machine to the requested state
///
/// - `update` only when the resulting instruction data differs from the
///   current data
/// - `updateAuthority` only when a new authority is given and differs from
///   the signing authority
///
/// An empty builder means there is nothing to change.
pub fn update_candy_machine_builder(
    mx: &Mplx,
    input: &UpdateCandyMachineInput,
) -> TransactionBuilder {
    let authority = input
        .authority
        .clone()
        .unwrap_or_else(|| Arc::clone(mx.identity()));
    let candy_machine = &input.candy_machine;

    let current = candy_machine.to_instruction_data();
    let desired = input.update.apply(candy_machine).to_instruction_data();
    let should_update = desired != current;
    let should_update_authority = input
        .new_authority
        .is_some_and(|new_authority| new_authority != authority.pubkey());

    let accounts = UpdateAccounts {
        candy_machine: candy_machine.address,
        authority: authority.pubkey(),
        wallet: candy_machine.wallet,
    };

    TransactionBuilder::make()
        .when(should_update, |builder| {
            builder.add(
                InstructionWithSigners::new(
                    input
                        .update_instruction_key
                        .as_deref()
                        .unwrap_or(UPDATE_INSTRUCTION_KEY),
                    update_candy_machine(&accounts, &desired),
                )
                .with_signer(Arc::clone(&authority)),
            )
        })
        .when(should_update_authority, |builder| {
            builder.add(
                InstructionWithSigners::new(
                    input
                        .update_authority_instruction_key
                        .as_deref()
                        .unwrap_or(UPDATE_AUTHORITY_INSTRUCTION_KEY),
                    update_authority(&accounts, input.new_authority),
                )
                .with_signer(Arc::clone(&authority)),
            )
        })
}

pub struct UpdateCandyMachineHandler;

#[async_trait]
impl OperationHandler<UpdateCandyMachineOperation> for UpdateCandyMachineHandler {
    async fn handle(
        &self,
        operation: Operation<UpdateCandyMachineOperation>,
        mx: &Mplx,
    ) -> MplxResult<UpdateCandyMachineOutput> {
        let input = operation.into_input();
        let builder = update_candy_machine_builder(mx, &input);

        if builder.is_empty() {
            return Err(MplxError::no_instructions(UpdateCandyMachineOperation::KIND));
        }

        debug!(
            candy_machine = %input.candy_machine.address,
            steps = ?builder.keys(),
            "Submitting candy machine update"
        );

        let response = builder.send_and_confirm(mx, input.confirm_options).await?;
        Ok(UpdateCandyMachineOutput { response })
    }
}

//! Candy Machine v2 module: lookup and diff-based update

pub mod accounts;
pub mod instructions;
mod models;
mod update_candy_machine;

pub use accounts::{
    CandyMachineAccount, CandyMachineCreator, CandyMachineData, EndSettingType, EndSettings,
    GatekeeperConfig, HiddenSettings, WhitelistMintMode, WhitelistMintSettings,
    CANDY_MACHINE_PROGRAM_ID,
};
pub use models::{CandyMachine, CandyMachineUpdate};
pub use update_candy_machine::{
    update_candy_machine_builder, update_candy_machine_operation, UpdateCandyMachineHandler,
    UpdateCandyMachineInput, UpdateCandyMachineOperation, UpdateCandyMachineOutput,
    UPDATE_AUTHORITY_INSTRUCTION_KEY, UPDATE_INSTRUCTION_KEY,
};

use crate::accounts::find_account;
use crate::context::Mplx;
use crate::errors::MplxResult;
use crate::operation::{MplxPlugin, Operation, OperationHandler, OperationKind, OperationRegistry};
use async_trait::async_trait;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

pub struct FindCandyMachineByAddressOperation;

impl OperationKind for FindCandyMachineByAddressOperation {
    const KIND: &'static str = "FindCandyMachineByAddressOperation";
    type Input = FindCandyMachineByAddressInput;
    type Output = CandyMachine;
}

#[derive(Debug, Clone)]
pub struct FindCandyMachineByAddressInput {
    pub address: Pubkey,
    pub commitment: Option<CommitmentConfig>,
}

pub fn find_candy_machine_by_address_operation(
    input: FindCandyMachineByAddressInput,
) -> Operation<FindCandyMachineByAddressOperation> {
    Operation::new(input)
}

pub struct FindCandyMachineByAddressHandler;

#[async_trait]
impl OperationHandler<FindCandyMachineByAddressOperation> for FindCandyMachineByAddressHandler {
    async fn handle(
        &self,
        operation: Operation<FindCandyMachineByAddressOperation>,
        mx: &Mplx,
    ) -> MplxResult<CandyMachine> {
        let input = operation.into_input();
        let commitment = input.commitment.unwrap_or_else(|| mx.commitment());

        let account =
            find_account::<CandyMachineAccount>(mx.rpc().as_ref(), &input.address, commitment)
                .await?;
        CandyMachine::from_account(account)
    }
}

pub struct CandyMachineModule;

impl MplxPlugin for CandyMachineModule {
    fn install(&self, registry: &OperationRegistry) -> MplxResult<()> {
        registry.register::<FindCandyMachineByAddressOperation, _>(FindCandyMachineByAddressHandler)?;
        registry.register::<UpdateCandyMachineOperation, _>(UpdateCandyMachineHandler)
    }
}

pub struct CandyMachineClient<'a> {
    mx: &'a Mplx,
}

impl<'a> CandyMachineClient<'a> {
    pub fn new(mx: &'a Mplx) -> Self {
        Self { mx }
    }

    pub async fn find_by_address(&self, address: Pubkey) -> MplxResult<CandyMachine> {
        self.mx
            .execute(find_candy_machine_by_address_operation(
                FindCandyMachineByAddressInput {
                    address,
                    commitment: None,
                },
            ))
            .await
    }

    pub async fn update(&self, input: UpdateCandyMachineInput) -> MplxResult<UpdateCandyMachineOutput> {
        self.mx.execute(update_candy_machine_operation(input)).await
    }

    /// The builder `update` would submit, without sending it
    pub fn update_builder(&self, input: &UpdateCandyMachineInput) -> crate::tx_builder::TransactionBuilder {
        update_candy_machine_builder(self.mx, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MplxError;
    use crate::rpc::{ConfirmationLevel, SignatureStatus};
    use crate::signer::SignerService;
    use crate::test_utils::{test_mplx_with, MockRpc, MockSigner};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn sample_account(authority: Pubkey) -> CandyMachineAccount {
        CandyMachineAccount {
            authority,
            wallet: Pubkey::new_unique(),
            token_mint: None,
            items_redeemed: 10,
            data: CandyMachineData {
                uuid: "XYZ789".to_string(),
                price: 2_000_000_000,
                symbol: "CNDY".to_string(),
                seller_fee_basis_points: 750,
                max_supply: 0,
                is_mutable: true,
                retain_authority: true,
                go_live_date: Some(1_650_000_000),
                end_settings: None,
                creators: vec![CandyMachineCreator {
                    address: authority,
                    verified: true,
                    share: 100,
                }],
                hidden_settings: None,
                whitelist_mint_settings: None,
                items_available: 50,
                gatekeeper: None,
            },
        }
    }

    async fn load(rpc: &Arc<MockRpc>, mx: &Mplx, authority: Pubkey) -> CandyMachine {
        let address = Pubkey::new_unique();
        rpc.set_account(address, CANDY_MACHINE_PROGRAM_ID, sample_account(authority).to_bytes());
        mx.candy_machines().find_by_address(address).await.unwrap()
    }

    #[tokio::test]
    async fn test_find_candy_machine() {
        let rpc = Arc::new(MockRpc::new());
        let mx = test_mplx_with(Arc::clone(&rpc));
        let authority = mx.identity().pubkey();

        let cm = load(&rpc, &mx, authority).await;
        assert_eq!(cm.authority, authority);
        assert_eq!(cm.price, 2_000_000_000);
        assert_eq!(cm.items_remaining(), 40);
        assert!(!cm.is_sold_out());
        assert_eq!(
            cm.go_live_date,
            Some(Utc.timestamp_opt(1_650_000_000, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_no_change_builds_nothing_and_handler_refuses() {
        let rpc = Arc::new(MockRpc::new());
        let mx = test_mplx_with(Arc::clone(&rpc));
        let cm = load(&rpc, &mx, mx.identity().pubkey()).await;

        // Overrides equal to the current values are not a change
        let input = UpdateCandyMachineInput::new(cm.clone()).with_update(CandyMachineUpdate {
            price: Some(cm.price),
            symbol: Some(cm.symbol.clone()),
            ..Default::default()
        });
        assert!(mx.candy_machines().update_builder(&input).is_empty());

        let err = mx.candy_machines().update(input).await.unwrap_err();
        match err {
            MplxError::NoInstructionsToSend { operation } => {
                assert_eq!(operation, "UpdateCandyMachineOperation")
            }
            other => panic!("Expected NoInstructionsToSend, got {:?}", other),
        }
        assert_eq!(rpc.send_calls(), 0);
    }

    #[tokio::test]
    async fn test_authority_change_only() {
        let rpc = Arc::new(MockRpc::new());
        let mx = test_mplx_with(Arc::clone(&rpc));
        let cm = load(&rpc, &mx, mx.identity().pubkey()).await;

        let input = UpdateCandyMachineInput::new(cm).with_new_authority(Pubkey::new_unique());
        let builder = mx.candy_machines().update_builder(&input);
        assert_eq!(builder.keys(), vec![UPDATE_AUTHORITY_INSTRUCTION_KEY]);

        // Same authority as the signer: nothing to do
        let same = UpdateCandyMachineInput::new(input.candy_machine.clone())
            .with_new_authority(mx.identity().pubkey());
        assert!(mx.candy_machines().update_builder(&same).is_empty());
    }

    #[tokio::test]
    async fn test_data_and_authority_change() {
        let rpc = Arc::new(MockRpc::new());
        let mx = test_mplx_with(Arc::clone(&rpc));
        let cm = load(&rpc, &mx, mx.identity().pubkey()).await;
        let new_authority = Pubkey::new_unique();

        let mut input = UpdateCandyMachineInput::new(cm.clone())
            .with_update(CandyMachineUpdate {
                price: Some(1),
                go_live_date: Some(None),
                ..Default::default()
            })
            .with_new_authority(new_authority);
        input.update_instruction_key = Some("setPrice".to_string());

        let builder = mx.candy_machines().update_builder(&input);
        assert_eq!(builder.keys(), vec!["setPrice", UPDATE_AUTHORITY_INSTRUCTION_KEY]);

        let update_ix = &builder.get("setPrice").unwrap().instruction;
        let mut expected = cm.to_instruction_data();
        expected.price = 1;
        expected.go_live_date = None;
        assert_eq!(
            update_ix.data,
            instructions::update_candy_machine(
                &instructions::UpdateAccounts {
                    candy_machine: cm.address,
                    authority: mx.identity().pubkey(),
                    wallet: cm.wallet,
                },
                &expected
            )
            .data
        );
        assert_eq!(builder.signer_pubkeys(), vec![mx.identity().pubkey()]);
    }

    #[tokio::test]
    async fn test_update_submits_with_explicit_authority() {
        let rpc = Arc::new(MockRpc::new());
        let mx = test_mplx_with(Arc::clone(&rpc));
        let authority = MockSigner::new();
        let cm = load(&rpc, &mx, authority.pubkey()).await;
        rpc.push_status(SignatureStatus {
            slot: 99,
            level: Some(ConfirmationLevel::Confirmed),
            err: None,
        });

        let output = mx
            .candy_machines()
            .update(
                UpdateCandyMachineInput::new(cm)
                    .with_update(CandyMachineUpdate {
                        items_available: Some(60),
                        ..Default::default()
                    })
                    .with_authority(authority.clone().into_shared()),
            )
            .await
            .unwrap();

        assert_eq!(output.response.slot, 99);
        assert_eq!(authority.sign_calls(), 1);
        assert_eq!(rpc.sent_transactions().len(), 1);
    }
}

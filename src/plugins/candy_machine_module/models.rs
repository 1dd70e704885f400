use super::accounts::{
    CandyMachineAccount, CandyMachineCreator, CandyMachineData, EndSettings, GatekeeperConfig,
    HiddenSettings, WhitelistMintSettings,
};
use crate::accounts::Account;
use crate::errors::{MplxError, MplxResult};
use crate::utils::remove_empty_chars;
use chrono::{DateTime, Utc};
use solana_sdk::pubkey::Pubkey;

/// Candy machine read model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandyMachine {
    pub address: Pubkey,
    pub authority: Pubkey,
    /// Receives mint proceeds
    pub wallet: Pubkey,
    /// SPL token used for payment; SOL when `None`
    pub token_mint: Option<Pubkey>,
    pub items_redeemed: u64,
    pub uuid: String,
    pub price: u64,
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    pub max_supply: u64,
    pub is_mutable: bool,
    pub retain_authority: bool,
    pub go_live_date: Option<DateTime<Utc>>,
    pub end_settings: Option<EndSettings>,
    pub creators: Vec<CandyMachineCreator>,
    pub hidden_settings: Option<HiddenSettings>,
    pub whitelist_mint_settings: Option<WhitelistMintSettings>,
    pub items_available: u64,
    pub gatekeeper: Option<GatekeeperConfig>,
}

impl CandyMachine {
    pub fn from_account(account: Account<CandyMachineAccount>) -> MplxResult<Self> {
        let Account { address, data, .. } = account;
        let go_live_date = match data.data.go_live_date {
            Some(ts) => Some(DateTime::<Utc>::from_timestamp(ts, 0).ok_or_else(|| {
                MplxError::parse(address, "CandyMachine", format!("go-live date {} out of range", ts))
            })?),
            None => None,
        };

        Ok(Self {
            address,
            authority: data.authority,
            wallet: data.wallet,
            token_mint: data.token_mint,
            items_redeemed: data.items_redeemed,
            uuid: data.data.uuid,
            price: data.data.price,
            symbol: data.data.symbol,
            seller_fee_basis_points: data.data.seller_fee_basis_points,
            max_supply: data.data.max_supply,
            is_mutable: data.data.is_mutable,
            retain_authority: data.data.retain_authority,
            go_live_date,
            end_settings: data.data.end_settings,
            creators: data.data.creators,
            hidden_settings: data.data.hidden_settings,
            whitelist_mint_settings: data.data.whitelist_mint_settings,
            items_available: data.data.items_available,
            gatekeeper: data.data.gatekeeper,
        })
    }

    /// Symbol without on-chain padding
    pub fn display_symbol(&self) -> String {
        remove_empty_chars(&self.symbol)
    }

    pub fn items_remaining(&self) -> u64 {
        self.items_available.saturating_sub(self.items_redeemed)
    }

    pub fn is_sold_out(&self) -> bool {
        self.items_remaining() == 0
    }

    /// Instruction payload describing this machine's current configuration
    pub fn to_instruction_data(&self) -> CandyMachineData {
        CandyMachineData {
            uuid: self.uuid.clone(),
            price: self.price,
            symbol: self.symbol.clone(),
            seller_fee_basis_points: self.seller_fee_basis_points,
            max_supply: self.max_supply,
            is_mutable: self.is_mutable,
            retain_authority: self.retain_authority,
            go_live_date: self.go_live_date.map(|date| date.timestamp()),
            end_settings: self.end_settings.clone(),
            creators: self.creators.clone(),
            hidden_settings: self.hidden_settings.clone(),
            whitelist_mint_settings: self.whitelist_mint_settings.clone(),
            items_available: self.items_available,
            gatekeeper: self.gatekeeper.clone(),
        }
    }
}

/// Requested changes to the updatable fields of a candy machine
///
/// `None` leaves a field as it is. For optional settings, `Some(None)` clears
/// the setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandyMachineUpdate {
    pub price: Option<u64>,
    pub symbol: Option<String>,
    pub seller_fee_basis_points: Option<u16>,
    pub max_supply: Option<u64>,
    pub is_mutable: Option<bool>,
    pub retain_authority: Option<bool>,
    pub go_live_date: Option<Option<DateTime<Utc>>>,
    pub end_settings: Option<Option<EndSettings>>,
    pub creators: Option<Vec<CandyMachineCreator>>,
    pub hidden_settings: Option<Option<HiddenSettings>>,
    pub whitelist_mint_settings: Option<Option<WhitelistMintSettings>>,
    pub items_available: Option<u64>,
    pub gatekeeper: Option<Option<GatekeeperConfig>>,
}

impl CandyMachineUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `current` with these overrides applied
    pub fn apply(&self, current: &CandyMachine) -> CandyMachine {
        let mut next = current.clone();
        if let Some(price) = self.price {
            next.price = price;
        }
        if let Some(symbol) = &self.symbol {
            next.symbol = symbol.clone();
        }
        if let Some(bps) = self.seller_fee_basis_points {
            next.seller_fee_basis_points = bps;
        }
        if let Some(max_supply) = self.max_supply {
            next.max_supply = max_supply;
        }
        if let Some(is_mutable) = self.is_mutable {
            next.is_mutable = is_mutable;
        }
        if let Some(retain_authority) = self.retain_authority {
            next.retain_authority = retain_authority;
        }
        if let Some(go_live_date) = self.go_live_date {
            next.go_live_date = go_live_date;
        }
        if let Some(end_settings) = &self.end_settings {
            next.end_settings = end_settings.clone();
        }
        if let Some(creators) = &self.creators {
            next.creators = creators.clone();
        }
        if let Some(hidden_settings) = &self.hidden_settings {
            next.hidden_settings = hidden_settings.clone();
        }
        if let Some(whitelist) = &self.whitelist_mint_settings {
            next.whitelist_mint_settings = whitelist.clone();
        }
        if let Some(items_available) = self.items_available {
            next.items_available = items_available;
        }
        if let Some(gatekeeper) = &self.gatekeeper {
            next.gatekeeper = gatekeeper.clone();
        }
        next
    }
}

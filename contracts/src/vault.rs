//! # Vault
//!
//! A vault pools native coin and recognized tokens on behalf of the holders
//! of its shares. Its lifecycle is:
//!
//! 1. **Locked**: created at mint time. Deposits are accepted; nothing can
//!    be redeemed.
//! 2. **Unlocked**: every configured condition holds: the unlock time has
//!    passed (if one was set) and the base-asset balance reached the target
//!    (if one was set). Holders may redeem their pro-rata slice.
//! 3. **Open**: the last share was burned. The vault keeps accepting
//!    deposits, which wait for the Treasury to sweep them.
//!
//! Transitions only move forward. `Locked → Unlocked` is evaluated on every
//! deposit and on an explicit check; `Unlocked → Open` happens as a side
//! effect of the payout that burns the final share.
//!
//! Vault-mutating methods are `pub(crate)`: outside callers must go through
//! the [`Coordinator`](crate::coordinator::Coordinator).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::asset::{Asset, AssetRegistry};
use crate::holdings::{Holdings, HoldingsError};
use crate::payout::{self, PayoutError, PayoutPlan};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during vault operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    /// The vault is not in a state that allows this operation.
    #[error("invalid state transition: vault {vault} is {current}, expected {expected}")]
    InvalidState {
        /// Vault id.
        vault: VaultId,
        /// The vault's current state.
        current: VaultState,
        /// The state(s) required for this operation.
        expected: &'static str,
    },

    /// The unlock time has not been reached.
    #[error("vault {vault} is time-locked until {unlock_time}")]
    TimeLockActive {
        /// Vault id.
        vault: VaultId,
        /// Configured unlock time.
        unlock_time: DateTime<Utc>,
    },

    /// The base-asset balance is below target.
    #[error("vault {vault} holds {balance} of its base asset, target is {target}")]
    TargetNotReached {
        /// Vault id.
        vault: VaultId,
        /// Current base-class balance.
        balance: u64,
        /// Configured target.
        target: u64,
    },

    /// The asset is neither native, recognized, nor the vault's base asset.
    #[error("unsupported asset {0}")]
    UnsupportedAsset(Asset),

    /// A vault's base asset must be native or a recognized token.
    #[error("base asset {0} is not recognized")]
    BaseAssetNotRecognized(Asset),

    /// Vault names cannot be empty.
    #[error("vault name must not be empty")]
    EmptyName,

    /// The payout figures were rejected.
    #[error("payout rejected for vault {vault}: {source}")]
    Payout {
        /// Vault id.
        vault: VaultId,
        /// Underlying reason.
        source: PayoutError,
    },

    /// Balance arithmetic failed.
    #[error(transparent)]
    Holdings(#[from] HoldingsError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Identifier shared by a vault and its share class in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VaultId(pub u64);

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VaultState {
    /// Accepting deposits; not redeemable.
    Locked,
    /// Conditions met; holders may redeem.
    Unlocked,
    /// All shares burned; deposits wait for Treasury collection.
    Open,
}

impl fmt::Display for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultState::Locked => write!(f, "Locked"),
            VaultState::Unlocked => write!(f, "Unlocked"),
            VaultState::Open => write!(f, "Open"),
        }
    }
}

/// Creation parameters for a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultParams {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Earliest unlock time. `None` means no time condition.
    pub unlock_time: Option<DateTime<Utc>>,
    /// Base-asset balance required to unlock. Zero means no balance condition.
    pub target_balance: u64,
    /// Asset whose balance is compared against `target_balance`.
    pub base_asset: Asset,
}

impl VaultParams {
    /// Native-based vault with no conditions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unlock_time: None,
            target_balance: 0,
            base_asset: Asset::Native,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the time condition.
    pub fn with_unlock_time(mut self, unlock_time: DateTime<Utc>) -> Self {
        self.unlock_time = Some(unlock_time);
        self
    }

    /// Sets the balance condition.
    pub fn with_target(mut self, target_balance: u64) -> Self {
        self.target_balance = target_balance;
        self
    }

    /// Sets the base asset.
    pub fn with_base_asset(mut self, base_asset: Asset) -> Self {
        self.base_asset = base_asset;
        self
    }
}

/// Read-only view of a vault's persisted attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultAttributes {
    /// Vault id.
    pub id: VaultId,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Time condition, if any.
    pub unlock_time: Option<DateTime<Utc>>,
    /// Balance condition; zero if none.
    pub target_balance: u64,
    /// Base asset.
    pub base_asset: Asset,
    /// Current state.
    pub state: VaultState,
}

/// A single fractional vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vault {
    id: VaultId,
    name: String,
    description: String,
    unlock_time: Option<DateTime<Utc>>,
    target_balance: u64,
    base_asset: Asset,
    state: VaultState,
    holdings: Holdings,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Vault {
    /// Creates a `Locked` vault.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::EmptyName`] for a blank name and
    /// [`VaultError::BaseAssetNotRecognized`] if the base asset is a token
    /// the registry does not know.
    pub(crate) fn new(
        id: VaultId,
        params: VaultParams,
        registry: &AssetRegistry,
        now: DateTime<Utc>,
    ) -> Result<Self, VaultError> {
        if params.name.trim().is_empty() {
            return Err(VaultError::EmptyName);
        }
        if !registry.is_recognized(&params.base_asset) {
            return Err(VaultError::BaseAssetNotRecognized(params.base_asset));
        }

        Ok(Self {
            id,
            name: params.name,
            description: params.description,
            unlock_time: params.unlock_time,
            target_balance: params.target_balance,
            base_asset: params.base_asset,
            state: VaultState::Locked,
            holdings: Holdings::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Vault id.
    pub fn id(&self) -> VaultId {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VaultState {
        self.state
    }

    /// Base asset.
    pub fn base_asset(&self) -> &Asset {
        &self.base_asset
    }

    /// Structured attributes record.
    pub fn attributes(&self) -> VaultAttributes {
        VaultAttributes {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            unlock_time: self.unlock_time,
            target_balance: self.target_balance,
            base_asset: self.base_asset.clone(),
            state: self.state,
        }
    }

    /// All balances currently held.
    pub fn holdings(&self) -> &Holdings {
        &self.holdings
    }

    /// Raw balance of one asset.
    pub fn balance_of(&self, asset: &Asset) -> u64 {
        self.holdings.balance_of(asset)
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last state or balance change.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Balance compared against the target.
    ///
    /// For a native-based vault: native plus every base-equivalent token in
    /// `registry`. For a token-based vault: that token only.
    pub fn total_balance(&self, registry: &AssetRegistry) -> u64 {
        match &self.base_asset {
            Asset::Native => registry
                .base_equivalent()
                .map(|addr| self.holdings.balance_of(&Asset::Token(addr.clone())))
                .fold(self.holdings.balance_of(&Asset::Native), u64::saturating_add),
            token => self.holdings.balance_of(token),
        }
    }

    /// Checks every configured unlock condition.
    ///
    /// # Errors
    ///
    /// [`VaultError::TimeLockActive`] or [`VaultError::TargetNotReached`],
    /// checked in that order.
    pub fn check_unlock_conditions(
        &self,
        registry: &AssetRegistry,
        now: DateTime<Utc>,
    ) -> Result<(), VaultError> {
        if let Some(unlock_time) = self.unlock_time {
            if now < unlock_time {
                return Err(VaultError::TimeLockActive {
                    vault: self.id,
                    unlock_time,
                });
            }
        }

        if self.target_balance > 0 {
            let balance = self.total_balance(registry);
            if balance < self.target_balance {
                return Err(VaultError::TargetNotReached {
                    vault: self.id,
                    balance,
                    target: self.target_balance,
                });
            }
        }

        Ok(())
    }

    /// Whether `asset` may be deposited into this vault.
    pub fn accepts(&self, asset: &Asset, registry: &AssetRegistry) -> bool {
        registry.is_recognized(asset) || asset == &self.base_asset
    }

    /// Credits a deposit and re-evaluates the unlock conditions.
    ///
    /// Returns the state transition if the deposit unlocked the vault.
    pub(crate) fn deposit(
        &mut self,
        asset: &Asset,
        amount: u64,
        registry: &AssetRegistry,
        now: DateTime<Utc>,
    ) -> Result<Option<(VaultState, VaultState)>, VaultError> {
        if !self.accepts(asset, registry) {
            return Err(VaultError::UnsupportedAsset(asset.clone()));
        }

        self.holdings.credit(asset, amount)?;
        self.updated_at = now;
        debug!(vault = %self.id, %asset, amount, state = %self.state, "deposit credited");

        if self.state == VaultState::Locked && self.check_unlock_conditions(registry, now).is_ok()
        {
            return Ok(Some(self.transition(VaultState::Unlocked, now)));
        }
        Ok(None)
    }

    /// Explicit unlock check.
    ///
    /// # Errors
    ///
    /// [`VaultError::InvalidState`] unless the vault is `Locked`, or the
    /// unmet-condition error from [`check_unlock_conditions`](Self::check_unlock_conditions).
    pub(crate) fn set_state_unlocked(
        &mut self,
        registry: &AssetRegistry,
        now: DateTime<Utc>,
    ) -> Result<(VaultState, VaultState), VaultError> {
        if self.state != VaultState::Locked {
            return Err(self.invalid_state("Locked"));
        }
        self.check_unlock_conditions(registry, now)?;
        Ok(self.transition(VaultState::Unlocked, now))
    }

    /// Computes the holder's payout without changing anything.
    ///
    /// # Errors
    ///
    /// [`VaultError::InvalidState`] while `Locked`, and [`VaultError::Payout`]
    /// for zero or inconsistent share figures.
    pub fn preview_payout(
        &self,
        holder_shares: u64,
        total_supply: u64,
        fee_bps: u16,
    ) -> Result<PayoutPlan, VaultError> {
        if self.state == VaultState::Locked {
            return Err(self.invalid_state("Unlocked"));
        }
        payout::compute_plan(self.id, &self.holdings, holder_shares, total_supply, fee_bps)
            .map_err(|source| VaultError::Payout {
                vault: self.id,
                source,
            })
    }

    /// Removes every line's gross amount from the vault.
    ///
    /// All lines are checked before any is debited.
    pub(crate) fn apply_payout(
        &mut self,
        plan: &PayoutPlan,
        now: DateTime<Utc>,
    ) -> Result<(), VaultError> {
        for line in &plan.lines {
            let available = self.holdings.balance_of(&line.asset);
            if available < line.gross {
                return Err(HoldingsError::InsufficientBalance {
                    asset: line.asset.clone(),
                    available,
                    requested: line.gross,
                }
                .into());
            }
        }
        for line in &plan.lines {
            self.holdings.debit(&line.asset, line.gross)?;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Moves the vault to `Open` after its last share was burned.
    ///
    /// Returns `None` if it already was open.
    pub(crate) fn mark_open(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Option<(VaultState, VaultState)>, VaultError> {
        match self.state {
            VaultState::Open => Ok(None),
            VaultState::Unlocked => Ok(Some(self.transition(VaultState::Open, now))),
            VaultState::Locked => Err(self.invalid_state("Unlocked")),
        }
    }

    /// Empties an open vault and hands everything to the caller.
    pub(crate) fn send_to_treasury(&mut self, now: DateTime<Utc>) -> Result<Holdings, VaultError> {
        if self.state != VaultState::Open {
            return Err(self.invalid_state("Open"));
        }
        let swept = self.holdings.take_all();
        if !swept.is_empty() {
            self.updated_at = now;
        }
        Ok(swept)
    }

    fn transition(&mut self, to: VaultState, now: DateTime<Utc>) -> (VaultState, VaultState) {
        let from = self.state;
        debug_assert!(from < to, "vault state must move forward");
        self.state = to;
        self.updated_at = now;
        info!(vault = %self.id, %from, %to, "vault state changed");
        (from, to)
    }

    fn invalid_state(&self, expected: &'static str) -> VaultError {
        VaultError::InvalidState {
            vault: self.id,
            current: self.state,
            expected,
        }
    }
}

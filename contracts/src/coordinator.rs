//! # Coordinator
//!
//! The single entry point of the vault system. The Coordinator:
//!
//! - creates vaults and mints their initial shares in the share ledger,
//! - owns every [`Vault`] (an arena keyed by [`VaultId`]) and the [`Treasury`],
//! - relays deposits, unlock checks and payouts to the right vault,
//! - owns the withdrawal fee configuration,
//! - keeps the payee accounts that payouts credit and the [`EventLog`].
//!
//! ## Call Discipline
//!
//! Every mutating call takes `&mut self` and runs to completion. Each one
//! follows the same order:
//!
//! 1. **Snapshot**: read configuration, share figures and balances once.
//! 2. **Validate**: compute the full plan and stage every credit, so that
//!    nothing after this point can fail.
//! 3. **Effects**: burn shares, debit balances, update states and the
//!    open-vault registry.
//! 4. **Interactions**: credit payees and commit events.
//!
//! A call that fails returns before step 3 and leaves no trace.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::asset::{Address, Asset, AssetClass, RegistryError};
use crate::config::{ConfigError, FeeConfig, ProtocolConfig};
use crate::events::{EventLog, EventRecord, VaultEvent};
use crate::holdings::{Holdings, HoldingsError};
use crate::ledger::{InMemoryLedger, LedgerError, ShareIssuance, ShareLedger};
use crate::payout::{PayoutPlan, Settlement};
use crate::treasury::{DistributionPlan, Treasury, TreasuryError};
use crate::vault::{Vault, VaultAttributes, VaultError, VaultId, VaultParams, VaultState};

/// Issuer identity registered for every vault's share class. Never handed
/// out: only the Coordinator mints and burns.
const ISSUER_ADDRESS: &str = "strongbox:coordinator";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by Coordinator calls.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    /// The caller lacks the role required for this action.
    #[error("unauthorized: {caller} may not {action}")]
    Unauthorized {
        /// The address that attempted the call.
        caller: Address,
        /// What it tried to do.
        action: &'static str,
    },

    /// No vault with this id exists.
    #[error("unknown vault {0}")]
    UnknownVault(VaultId),

    /// The initial share allocation is malformed.
    #[error("invalid share allocation: {0}")]
    InvalidAllocation(&'static str),

    /// Vault-level rejection.
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Share ledger rejection.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Treasury rejection.
    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    /// Configuration rejection.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Asset registry rejection.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Balance arithmetic failed while staging credits.
    #[error(transparent)]
    Holdings(#[from] HoldingsError),
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of a Treasury collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionReport {
    /// Open vaults visited, ascending.
    pub vaults: Vec<VaultId>,
    /// Everything moved into the Treasury.
    pub swept: Holdings,
}

/// Outcome of a redistribution round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReport {
    /// The executed plan.
    pub plan: DistributionPlan,
    /// Vaults whose reward deposit unlocked them.
    pub unlocked: Vec<VaultId>,
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// The vault factory and call router.
#[derive(Debug)]
pub struct Coordinator<L = InMemoryLedger> {
    address: Address,
    admin: Address,
    fees: FeeConfig,
    max_distribution_vaults: usize,
    ledger: L,
    vaults: BTreeMap<VaultId, Vault>,
    treasury: Treasury,
    accounts: HashMap<Address, Holdings>,
    events: EventLog,
    next_id: u64,
}

impl Coordinator<InMemoryLedger> {
    /// Creates a Coordinator backed by a fresh [`InMemoryLedger`].
    pub fn new(config: ProtocolConfig) -> Result<Self, CoordinatorError> {
        Self::with_ledger(config, InMemoryLedger::new())
    }
}

impl<L: ShareLedger + ShareIssuance> Coordinator<L> {
    /// Creates a Coordinator over an existing share ledger.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Config`] if `config` fails validation.
    pub fn with_ledger(config: ProtocolConfig, ledger: L) -> Result<Self, CoordinatorError> {
        config.validate()?;
        let registry = config.asset_registry()?;

        info!(
            admin = %config.admin,
            fee_bps = config.fees.withdrawal_fee_bps,
            base_assets = config.base_assets.len(),
            supported_assets = config.supported_assets.len(),
            "coordinator initialized"
        );

        Ok(Self {
            address: ISSUER_ADDRESS.to_string(),
            admin: config.admin,
            fees: config.fees,
            max_distribution_vaults: config.max_distribution_vaults,
            ledger,
            vaults: BTreeMap::new(),
            treasury: Treasury::new(registry),
            accounts: HashMap::new(),
            events: EventLog::new(),
            next_id: 1,
        })
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    fn ensure_admin(&self, caller: &str, action: &'static str) -> Result<(), CoordinatorError> {
        if caller != self.admin {
            warn!(%caller, action, "rejected unauthorized call");
            return Err(CoordinatorError::Unauthorized {
                caller: caller.to_string(),
                action,
            });
        }
        Ok(())
    }

    /// Changes the withdrawal fee. Payouts already executed are unaffected.
    ///
    /// # Errors
    ///
    /// [`CoordinatorError::Unauthorized`] for non-admins and
    /// [`ConfigError::FeeAboveCap`] above the configured cap.
    pub fn set_withdrawal_fee_bps(
        &mut self,
        caller: &str,
        fee_bps: u16,
    ) -> Result<(), CoordinatorError> {
        self.ensure_admin(caller, "set the withdrawal fee")?;
        let mut next = self.fees.clone();
        next.withdrawal_fee_bps = fee_bps;
        next.validate()?;

        info!(from = self.fees.withdrawal_fee_bps, to = fee_bps, "withdrawal fee updated");
        self.fees = next;
        Ok(())
    }

    /// Changes the address credited with withdrawal fees.
    pub fn set_fee_recipient(
        &mut self,
        caller: &str,
        recipient: impl Into<Address>,
    ) -> Result<(), CoordinatorError> {
        self.ensure_admin(caller, "set the fee recipient")?;
        let mut next = self.fees.clone();
        next.fee_recipient = recipient.into();
        next.validate()?;

        info!(recipient = %next.fee_recipient, "fee recipient updated");
        self.fees = next;
        Ok(())
    }

    /// Recognizes a token under `class`. Returns the new registry version.
    pub fn add_recognized_asset(
        &mut self,
        caller: &str,
        address: impl Into<Address>,
        class: AssetClass,
    ) -> Result<u64, CoordinatorError> {
        self.ensure_admin(caller, "edit recognized assets")?;
        let address = address.into();
        self.treasury.registry_mut().add(address.clone(), class)?;

        let version = self.treasury.registry().version();
        info!(asset = %address, %class, version, "asset recognized");
        Ok(version)
    }

    /// Stops recognizing a token. Balances already held stay claimable.
    pub fn remove_recognized_asset(
        &mut self,
        caller: &str,
        address: &str,
    ) -> Result<AssetClass, CoordinatorError> {
        self.ensure_admin(caller, "edit recognized assets")?;
        let class = self.treasury.registry_mut().remove(address)?;
        info!(asset = address, %class, "asset no longer recognized");
        Ok(class)
    }

    // -----------------------------------------------------------------------
    // Vault creation
    // -----------------------------------------------------------------------

    /// Creates a `Locked` vault and mints its shares to `allocations`.
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::Unauthorized`] unless `caller` is the admin.
    /// - [`CoordinatorError::InvalidAllocation`] for an empty allocation,
    ///   a zero or overflowing total, or an empty holder address.
    /// - [`CoordinatorError::Vault`] if the parameters are rejected.
    pub fn create_vault(
        &mut self,
        caller: &str,
        params: VaultParams,
        allocations: &[(Address, u64)],
        now: DateTime<Utc>,
    ) -> Result<VaultId, CoordinatorError> {
        self.ensure_admin(caller, "create vaults")?;

        if allocations.is_empty() {
            return Err(CoordinatorError::InvalidAllocation(
                "at least one holder required",
            ));
        }
        if allocations.iter().any(|(holder, _)| holder.is_empty()) {
            return Err(CoordinatorError::InvalidAllocation(
                "holder address must not be empty",
            ));
        }
        let total_shares = allocations
            .iter()
            .try_fold(0u64, |acc, (_, shares)| acc.checked_add(*shares))
            .ok_or(CoordinatorError::InvalidAllocation("total shares overflow"))?;
        if total_shares == 0 {
            return Err(CoordinatorError::InvalidAllocation(
                "total shares must be positive",
            ));
        }

        let id = VaultId(self.next_id);
        let vault = Vault::new(id, params, self.treasury.registry(), now)?;

        self.ledger.register(id, self.address.clone())?;
        for (holder, shares) in allocations.iter().filter(|(_, s)| *s > 0) {
            self.ledger.mint(&self.address, holder, id, *shares)?;
        }

        info!(
            vault = %id,
            shares = total_shares,
            holders = allocations.len(),
            base_asset = %vault.base_asset(),
            "vault created"
        );
        self.vaults.insert(id, vault);
        self.next_id += 1;
        self.events.commit(
            now,
            [VaultEvent::VaultCreated {
                vault: id,
                shares: total_shares,
            }],
        );
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Deposits and unlocking
    // -----------------------------------------------------------------------

    /// Deposits `amount` of `asset` from `from` into a vault and re-checks
    /// its unlock conditions. Returns the vault's state afterwards.
    ///
    /// Zero-amount deposits are accepted and still trigger the check.
    pub fn deposit(
        &mut self,
        vault_id: VaultId,
        from: &str,
        asset: Asset,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<VaultState, CoordinatorError> {
        let vault = self
            .vaults
            .get_mut(&vault_id)
            .ok_or(CoordinatorError::UnknownVault(vault_id))?;
        let transition = vault.deposit(&asset, amount, self.treasury.registry(), now)?;
        let state = vault.state();

        let mut events = vec![VaultEvent::DepositReceived {
            vault: vault_id,
            from: from.to_string(),
            asset,
            amount,
        }];
        if let Some((from_state, to_state)) = transition {
            events.push(VaultEvent::StateChanged {
                vault: vault_id,
                from: from_state,
                to: to_state,
            });
        }
        self.events.commit(now, events);
        Ok(state)
    }

    /// Explicit unlock check for a `Locked` vault.
    ///
    /// # Errors
    ///
    /// [`VaultError::TimeLockActive`] or [`VaultError::TargetNotReached`]
    /// when a condition is unmet; [`VaultError::InvalidState`] if the vault
    /// is not `Locked`.
    pub fn check_unlock(
        &mut self,
        vault_id: VaultId,
        now: DateTime<Utc>,
    ) -> Result<VaultState, CoordinatorError> {
        let vault = self
            .vaults
            .get_mut(&vault_id)
            .ok_or(CoordinatorError::UnknownVault(vault_id))?;
        let (from, to) = vault.set_state_unlocked(self.treasury.registry(), now)?;

        self.events.commit(
            now,
            [VaultEvent::StateChanged {
                vault: vault_id,
                from,
                to,
            }],
        );
        Ok(to)
    }

    // -----------------------------------------------------------------------
    // Shares
    // -----------------------------------------------------------------------

    /// Moves `amount` of the caller's own shares of `vault_id` to `to`.
    ///
    /// # Errors
    ///
    /// [`CoordinatorError::UnknownVault`] for an unknown vault and
    /// [`LedgerError::InsufficientShares`] if `caller` holds too few.
    pub fn transfer_shares(
        &mut self,
        caller: &str,
        to: &str,
        vault_id: VaultId,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<(), CoordinatorError> {
        self.vault_ref(vault_id)?;
        if to.is_empty() {
            return Err(CoordinatorError::InvalidAllocation(
                "holder address must not be empty",
            ));
        }
        self.ledger.transfer(caller, to, vault_id, amount)?;

        debug!(vault = %vault_id, from = caller, to, amount, "shares transferred");
        self.events.commit(
            now,
            [VaultEvent::SharesTransferred {
                vault: vault_id,
                from: caller.to_string(),
                to: to.to_string(),
                amount,
            }],
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Payout
    // -----------------------------------------------------------------------

    /// What `holder` would receive from `vault_id` at the current fee,
    /// without executing anything.
    pub fn preview_payout(
        &self,
        holder: &str,
        vault_id: VaultId,
    ) -> Result<PayoutPlan, CoordinatorError> {
        let vault = self.vault_ref(vault_id)?;
        Ok(vault.preview_payout(
            self.ledger.balance_of(holder, vault_id),
            self.ledger.total_supply(vault_id),
            self.fees.withdrawal_fee_bps,
        )?)
    }

    /// Redeems every share `caller` holds in `vault_id`.
    ///
    /// Pays `caller` its pro-rata slice of every asset net of the withdrawal
    /// fee, pays the fee recipient, burns the shares, and opens the vault if
    /// no shares remain.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidState`] while the vault is `Locked`.
    /// - [`VaultError::Payout`] if `caller` holds no shares.
    pub fn payout(
        &mut self,
        caller: &str,
        vault_id: VaultId,
        now: DateTime<Utc>,
    ) -> Result<Settlement, CoordinatorError> {
        // Snapshot.
        let fees = self.fees.clone();
        let holder_shares = self.ledger.balance_of(caller, vault_id);
        let total_supply = self.ledger.total_supply(vault_id);
        let plan = self.vault_ref(vault_id)?.preview_payout(
            holder_shares,
            total_supply,
            fees.withdrawal_fee_bps,
        )?;

        // Validate: stage every payee credit before touching anything.
        let mut staged: HashMap<Address, Holdings> = HashMap::new();
        for line in &plan.lines {
            self.stage_credit(&mut staged, caller, &line.asset, line.net)?;
            if line.fee > 0 {
                self.stage_credit(&mut staged, &fees.fee_recipient, &line.asset, line.fee)?;
            }
        }

        // Effects.
        self.ledger
            .burn(&self.address, caller, vault_id, holder_shares)?;
        let vault = self
            .vaults
            .get_mut(&vault_id)
            .ok_or(CoordinatorError::UnknownVault(vault_id))?;
        vault.apply_payout(&plan, now)?;

        let mut events = Vec::with_capacity(plan.lines.len() * 2 + 2);
        for line in &plan.lines {
            events.push(VaultEvent::WithdrawalExecuted {
                vault: vault_id,
                holder: caller.to_string(),
                asset: line.asset.clone(),
                amount: line.net,
            });
            if line.fee > 0 {
                events.push(VaultEvent::WithdrawalFeePaid {
                    vault: vault_id,
                    recipient: fees.fee_recipient.clone(),
                    asset: line.asset.clone(),
                    amount: line.fee,
                });
            }
        }

        let mut vault_opened = false;
        if self.ledger.total_supply(vault_id) == 0 {
            if let Some((from, to)) = vault.mark_open(now)? {
                events.push(VaultEvent::StateChanged {
                    vault: vault_id,
                    from,
                    to,
                });
            }
            if self.treasury.register_open(vault_id) {
                events.push(VaultEvent::VaultOpened { vault: vault_id });
                vault_opened = true;
            }
        }

        // Interactions.
        self.accounts.extend(staged);
        self.events.commit(now, events);

        info!(
            vault = %vault_id,
            holder = caller,
            shares = holder_shares,
            supply = total_supply,
            assets = plan.lines.len(),
            fee_bps = fees.withdrawal_fee_bps,
            vault_opened,
            "payout settled"
        );

        Ok(Settlement {
            id: Uuid::new_v4(),
            holder: caller.to_string(),
            fee_recipient: fees.fee_recipient,
            plan,
            vault_opened,
        })
    }

    fn stage_credit(
        &self,
        staged: &mut HashMap<Address, Holdings>,
        account: &str,
        asset: &Asset,
        amount: u64,
    ) -> Result<(), HoldingsError> {
        let entry = staged
            .entry(account.to_string())
            .or_insert_with(|| self.accounts.get(account).cloned().unwrap_or_default());
        entry.credit(asset, amount)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Treasury
    // -----------------------------------------------------------------------

    /// Sweeps every open vault's entire holdings into the Treasury.
    ///
    /// Tokens no longer recognized are swept too. The Treasury keeps them
    /// until the token is recognized again, since only recognized tokens can
    /// be redistributed.
    ///
    /// # Errors
    ///
    /// [`TreasuryError::NothingToCollect`] if no vault is open.
    pub fn collect(&mut self, now: DateTime<Utc>) -> Result<CollectionReport, CoordinatorError> {
        let open: Vec<VaultId> = self.treasury.open_vaults().collect();
        if open.is_empty() {
            return Err(TreasuryError::NothingToCollect.into());
        }

        let mut swept = Holdings::new();
        for id in &open {
            let vault = self.vault_ref(*id)?;
            if vault.state() != VaultState::Open {
                return Err(VaultError::InvalidState {
                    vault: *id,
                    current: vault.state(),
                    expected: "Open",
                }
                .into());
            }
            for (asset, amount) in vault.holdings().iter() {
                swept.credit(asset, amount)?;
            }
        }
        self.treasury.receive(&swept)?;

        let mut events = Vec::new();
        for id in &open {
            let vault = self
                .vaults
                .get_mut(id)
                .ok_or(CoordinatorError::UnknownVault(*id))?;
            let taken = vault.send_to_treasury(now)?;
            for (asset, amount) in taken.iter() {
                if !self.treasury.registry().is_recognized(asset) {
                    warn!(
                        vault = %id,
                        %asset,
                        amount,
                        "swept asset is not recognized; held until re-recognized"
                    );
                }
                debug!(vault = %id, %asset, amount, "asset swept to treasury");
                events.push(VaultEvent::AssetSweptToTreasury {
                    vault: *id,
                    asset: asset.clone(),
                    amount,
                });
            }
        }
        self.events.commit(now, events);

        info!(vaults = open.len(), assets = swept.assets().len(), "treasury collection complete");
        Ok(CollectionReport {
            vaults: open,
            swept,
        })
    }

    /// Redistributes the Treasury's native balance to locked vaults.
    pub fn distribute_native_rewards(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<DistributionReport, CoordinatorError> {
        self.distribute(Asset::Native, now)
    }

    /// Redistributes the Treasury's balance of a recognized token to locked
    /// vaults.
    ///
    /// # Errors
    ///
    /// [`TreasuryError::UnsupportedAsset`] if `token` is not recognized.
    pub fn distribute_supported_rewards(
        &mut self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<DistributionReport, CoordinatorError> {
        let asset = Asset::token(token);
        self.treasury.ensure_distributable_token(&asset)?;
        self.distribute(asset, now)
    }

    fn distribute(
        &mut self,
        asset: Asset,
        now: DateTime<Utc>,
    ) -> Result<DistributionReport, CoordinatorError> {
        let weights: Vec<(VaultId, u64)> = self
            .vaults
            .values()
            .filter(|v| v.state() == VaultState::Locked)
            .map(|v| (v.id(), v.balance_of(&asset)))
            .collect();
        let plan = self
            .treasury
            .plan_distribution(&asset, &weights, self.max_distribution_vaults)?;

        for (id, amount) in &plan.transfers {
            let vault = self.vault_ref(*id)?;
            let current = vault.balance_of(&asset);
            current
                .checked_add(*amount)
                .ok_or_else(|| HoldingsError::Overflow {
                    asset: asset.clone(),
                    current,
                    credit: *amount,
                })?;
            if !vault.accepts(&asset, self.treasury.registry()) {
                return Err(VaultError::UnsupportedAsset(asset.clone()).into());
            }
        }

        self.treasury.debit_distribution(&plan)?;

        let mut events = Vec::with_capacity(plan.transfers.len() + 1);
        let mut unlocked = Vec::new();
        for (id, amount) in &plan.transfers {
            let vault = self
                .vaults
                .get_mut(id)
                .ok_or(CoordinatorError::UnknownVault(*id))?;
            let transition = vault.deposit(&asset, *amount, self.treasury.registry(), now)?;
            events.push(VaultEvent::RewardDistributed {
                vault: *id,
                asset: asset.clone(),
                amount: *amount,
            });
            if let Some((from, to)) = transition {
                events.push(VaultEvent::StateChanged {
                    vault: *id,
                    from,
                    to,
                });
                unlocked.push(*id);
            }
        }
        events.push(VaultEvent::DistributionCompleted {
            asset: asset.clone(),
            recipients: plan.transfers.len(),
            pre_balance: plan.pre_balance,
            distributed: plan.distributed(),
        });
        self.events.commit(now, events);

        info!(
            %asset,
            enumerated = plan.enumerated,
            recipients = plan.transfers.len(),
            pre_balance = plan.pre_balance,
            dust = plan.dust(),
            "rewards distributed"
        );
        Ok(DistributionReport { plan, unlocked })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    fn vault_ref(&self, vault_id: VaultId) -> Result<&Vault, CoordinatorError> {
        self.vaults
            .get(&vault_id)
            .ok_or(CoordinatorError::UnknownVault(vault_id))
    }

    /// Looks up a vault.
    pub fn vault(&self, vault_id: VaultId) -> Option<&Vault> {
        self.vaults.get(&vault_id)
    }

    /// Structured attributes of a vault.
    pub fn attributes(&self, vault_id: VaultId) -> Result<VaultAttributes, CoordinatorError> {
        Ok(self.vault_ref(vault_id)?.attributes())
    }

    /// The balance a vault compares against its target.
    pub fn total_balance(&self, vault_id: VaultId) -> Result<u64, CoordinatorError> {
        Ok(self
            .vault_ref(vault_id)?
            .total_balance(self.treasury.registry()))
    }

    /// All vaults in id order.
    pub fn vaults(&self) -> impl Iterator<Item = &Vault> {
        self.vaults.values()
    }

    /// Ids of vaults currently in `state`.
    pub fn vaults_in_state(&self, state: VaultState) -> Vec<VaultId> {
        self.vaults
            .values()
            .filter(|v| v.state() == state)
            .map(Vault::id)
            .collect()
    }

    /// The Treasury.
    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    /// Current fee configuration.
    pub fn fees(&self) -> &FeeConfig {
        &self.fees
    }

    /// Admin address.
    pub fn admin(&self) -> &str {
        &self.admin
    }

    /// Per-round bound on enumerated locked vaults.
    pub fn max_distribution_vaults(&self) -> usize {
        self.max_distribution_vaults
    }

    /// Balance credited to an external payee.
    pub fn account_balance(&self, account: &str, asset: &Asset) -> u64 {
        self.accounts
            .get(account)
            .map(|h| h.balance_of(asset))
            .unwrap_or(0)
    }

    /// Share ledger, read-only. Shares only change through
    /// [`create_vault`](Self::create_vault), [`payout`](Self::payout) and
    /// [`transfer_shares`](Self::transfer_shares).
    ///
    /// ```compile_fail
    /// use strongbox_contracts::{Coordinator, ProtocolConfig, ShareIssuance, VaultId};
    ///
    /// let mut c = Coordinator::new(ProtocolConfig::new("admin", "fees")).unwrap();
    /// c.ledger().mint("anyone", "mallory", VaultId(1), 900).unwrap();
    /// ```
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Committed events.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Removes and returns every committed event.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }
}

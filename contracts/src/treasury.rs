//! # Treasury
//!
//! The Treasury closes the reward loop. It keeps:
//!
//! - the **recognized-asset registry** every vault consults,
//! - the **open-vault registry**: vaults whose last share has been burned,
//! - its own **holdings**, filled by sweeping open vaults.
//!
//! Collected value flows back to still-locked vaults, weighted by how much
//! of the asset each one already holds. A vault holding twice as much
//! receives twice as much.
//!
//! ## Distribution Math
//!
//! With Treasury balance `T`, weights `w_v` and `W = Σ w_v`, vault `v`
//! receives `floor(T * w_v / W)`. The sum of floors never exceeds `T`;
//! whatever truncation leaves behind stays here for the next round.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::asset::{Asset, AssetRegistry, RegistryError};
use crate::holdings::{Holdings, HoldingsError};
use crate::vault::VaultId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during Treasury operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreasuryError {
    /// No vault is open, so there is nothing to sweep.
    #[error("nothing to collect: no open vaults")]
    NothingToCollect,

    /// No vault is locked, so there is nobody to reward.
    #[error("no locked vaults to distribute to")]
    NoLockedVaults,

    /// The Treasury holds none of the asset.
    #[error("treasury holds no {0}")]
    EmptyBalance(Asset),

    /// Every locked vault holds none of the asset.
    #[error("no locked vault holds {0}; nothing to weight by")]
    ZeroTotalWeight(Asset),

    /// More locked vaults than one round may enumerate.
    #[error("{count} locked vaults exceeds the per-round bound of {max}")]
    TooManyVaults {
        /// Locked vaults found.
        count: usize,
        /// Configured bound.
        max: usize,
    },

    /// Supported-token distribution asked for an unrecognized token or native.
    #[error("asset {0} is not a recognized token")]
    UnsupportedAsset(Asset),

    /// Registry edit failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Balance arithmetic failed.
    #[error(transparent)]
    Holdings(#[from] HoldingsError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A computed, not yet executed redistribution round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionPlan {
    /// Asset being distributed.
    pub asset: Asset,
    /// Treasury balance before the round.
    pub pre_balance: u64,
    /// Sum of all weights.
    pub total_weight: u128,
    /// Locked vaults enumerated, including zero-weight ones.
    pub enumerated: usize,
    /// `(vault, amount)` for every vault receiving a non-zero amount,
    /// in vault id order.
    pub transfers: Vec<(VaultId, u64)>,
}

impl DistributionPlan {
    /// Total leaving the Treasury.
    pub fn distributed(&self) -> u64 {
        self.transfers.iter().map(|(_, amount)| amount).sum()
    }

    /// Truncation dust left in the Treasury.
    pub fn dust(&self) -> u64 {
        self.pre_balance - self.distributed()
    }

    /// Amount planned for `vault`, zero if none.
    pub fn amount_for(&self, vault: VaultId) -> u64 {
        self.transfers
            .iter()
            .find(|(id, _)| *id == vault)
            .map(|(_, amount)| *amount)
            .unwrap_or(0)
    }
}

/// The Treasury.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Treasury {
    registry: AssetRegistry,
    open_vaults: BTreeSet<VaultId>,
    holdings: Holdings,
}

impl Treasury {
    /// Creates a Treasury with the given initial registry.
    pub fn new(registry: AssetRegistry) -> Self {
        Self {
            registry,
            open_vaults: BTreeSet::new(),
            holdings: Holdings::new(),
        }
    }

    /// The recognized-asset registry.
    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut AssetRegistry {
        &mut self.registry
    }

    /// Open vault ids in ascending order.
    pub fn open_vaults(&self) -> impl Iterator<Item = VaultId> + '_ {
        self.open_vaults.iter().copied()
    }

    /// Whether `vault` is in the open registry.
    pub fn is_open(&self, vault: VaultId) -> bool {
        self.open_vaults.contains(&vault)
    }

    /// Everything the Treasury currently holds.
    pub fn holdings(&self) -> &Holdings {
        &self.holdings
    }

    /// Treasury balance of one asset.
    pub fn balance_of(&self, asset: &Asset) -> u64 {
        self.holdings.balance_of(asset)
    }

    /// Adds a vault to the open registry. Returns `false` if it was already
    /// there; membership never changes after the first insert.
    pub(crate) fn register_open(&mut self, vault: VaultId) -> bool {
        let added = self.open_vaults.insert(vault);
        if added {
            debug!(%vault, "vault added to open registry");
        }
        added
    }

    /// Credits a swept batch. Either every asset is credited or none is.
    pub(crate) fn receive(&mut self, swept: &Holdings) -> Result<(), TreasuryError> {
        let mut staged = self.holdings.clone();
        for (asset, amount) in swept.iter() {
            staged.credit(asset, amount)?;
        }
        self.holdings = staged;
        Ok(())
    }

    /// Checks that `asset` may be distributed as a supported-token reward.
    pub fn ensure_distributable_token(&self, asset: &Asset) -> Result<(), TreasuryError> {
        match asset {
            Asset::Token(_) if self.registry.is_recognized(asset) => Ok(()),
            _ => Err(TreasuryError::UnsupportedAsset(asset.clone())),
        }
    }

    /// Computes a redistribution round over `weights`, one entry per locked
    /// vault, each weighted by that vault's balance of `asset`.
    ///
    /// # Errors
    ///
    /// - [`TreasuryError::NoLockedVaults`] if `weights` is empty.
    /// - [`TreasuryError::TooManyVaults`] if it exceeds `max_vaults`.
    /// - [`TreasuryError::EmptyBalance`] if the Treasury holds none of `asset`.
    /// - [`TreasuryError::ZeroTotalWeight`] if every weight is zero.
    pub fn plan_distribution(
        &self,
        asset: &Asset,
        weights: &[(VaultId, u64)],
        max_vaults: usize,
    ) -> Result<DistributionPlan, TreasuryError> {
        if weights.is_empty() {
            return Err(TreasuryError::NoLockedVaults);
        }
        if weights.len() > max_vaults {
            return Err(TreasuryError::TooManyVaults {
                count: weights.len(),
                max: max_vaults,
            });
        }

        let pre_balance = self.holdings.balance_of(asset);
        if pre_balance == 0 {
            return Err(TreasuryError::EmptyBalance(asset.clone()));
        }

        // u128 so that many large weights cannot overflow the sum.
        let total_weight: u128 = weights.iter().map(|(_, w)| u128::from(*w)).sum();
        if total_weight == 0 {
            return Err(TreasuryError::ZeroTotalWeight(asset.clone()));
        }

        let transfers: Vec<(VaultId, u64)> = weights
            .iter()
            .filter(|(_, w)| *w > 0)
            .map(|(vault, w)| {
                let amount = (u128::from(pre_balance) * u128::from(*w) / total_weight) as u64;
                (*vault, amount)
            })
            .filter(|(_, amount)| *amount > 0)
            .collect();

        Ok(DistributionPlan {
            asset: asset.clone(),
            pre_balance,
            total_weight,
            enumerated: weights.len(),
            transfers,
        })
    }

    /// Removes a planned round's total from the Treasury.
    pub(crate) fn debit_distribution(
        &mut self,
        plan: &DistributionPlan,
    ) -> Result<(), TreasuryError> {
        self.holdings.debit(&plan.asset, plan.distributed())?;
        Ok(())
    }
}

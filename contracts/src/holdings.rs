//! # Multi-Asset Holdings
//!
//! A [`Holdings`] is the full set of raw balances held by one party: a
//! vault, the Treasury, or an external payee. It maps [`Asset`] to a `u64`
//! amount and enforces that a balance never goes negative and never wraps.
//!
//! Iteration follows [`Asset`]'s ordering (native first, then tokens by
//! address), which is what makes payout and sweep order deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::Asset;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while crediting or debiting holdings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HoldingsError {
    /// Attempted to debit more than the available balance.
    #[error("insufficient balance: available {available}, requested {requested} ({asset})")]
    InsufficientBalance {
        /// The asset being debited.
        asset: Asset,
        /// Current balance.
        available: u64,
        /// Requested debit.
        requested: u64,
    },

    /// A credit would exceed `u64::MAX`.
    #[error("balance overflow: current {current}, credit {credit} ({asset})")]
    Overflow {
        /// The asset being credited.
        asset: Asset,
        /// Balance before the failed credit.
        current: u64,
        /// The amount that caused the overflow.
        credit: u64,
    },
}

// ---------------------------------------------------------------------------
// Holdings
// ---------------------------------------------------------------------------

/// Raw per-asset balances for one party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holdings {
    balances: BTreeMap<Asset, u64>,
}

impl Holdings {
    /// Creates empty holdings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` of `asset` and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`HoldingsError::Overflow`] if the balance would exceed `u64::MAX`.
    pub fn credit(&mut self, asset: &Asset, amount: u64) -> Result<u64, HoldingsError> {
        let current = self.balance_of(asset);
        let updated = current.checked_add(amount).ok_or(HoldingsError::Overflow {
            asset: asset.clone(),
            current,
            credit: amount,
        })?;
        self.balances.insert(asset.clone(), updated);
        Ok(updated)
    }

    /// Subtracts `amount` of `asset` and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`HoldingsError::InsufficientBalance`] if the debit exceeds
    /// the current balance.
    pub fn debit(&mut self, asset: &Asset, amount: u64) -> Result<u64, HoldingsError> {
        let available = self.balance_of(asset);
        if available < amount {
            return Err(HoldingsError::InsufficientBalance {
                asset: asset.clone(),
                available,
                requested: amount,
            });
        }

        let updated = available - amount;
        if updated == 0 {
            self.balances.remove(asset);
        } else {
            self.balances.insert(asset.clone(), updated);
        }
        Ok(updated)
    }

    /// Balance of `asset`, zero if never credited.
    pub fn balance_of(&self, asset: &Asset) -> u64 {
        self.balances.get(asset).copied().unwrap_or(0)
    }

    /// Non-zero balances in deterministic asset order.
    pub fn iter(&self) -> impl Iterator<Item = (&Asset, u64)> {
        self.balances
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(asset, amount)| (asset, *amount))
    }

    /// Assets with a non-zero balance.
    pub fn assets(&self) -> Vec<Asset> {
        self.iter().map(|(a, _)| a.clone()).collect()
    }

    /// Empties the holdings and returns everything that was in them.
    pub fn take_all(&mut self) -> Holdings {
        std::mem::take(self)
    }

    /// Returns `true` if every balance is zero.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

//! # Share Ledger
//!
//! Fractional ownership of a vault is tracked by a separate share ledger,
//! keyed by vault id. Vaults never touch the ledger's storage: they hold
//! their id and talk to it through the narrow [`ShareLedger`] capability
//! (balance query, supply query, authorized burn, transfer).
//!
//! [`InMemoryLedger`] is the reference implementation used by the
//! [`Coordinator`](crate::coordinator::Coordinator) and the tests.
//!
//! ## Authority Model
//!
//! - **Mint and burn** are restricted to the vault's registered issuer. The
//!   issuer is fixed the first time a vault id is registered.
//! - **Transfer** moves shares between holders of the same vault; the
//!   ledger checks the sender's balance, not a signature. Callers reach it
//!   through the Coordinator, which only moves the caller's own shares.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::Address;
use crate::vault::VaultId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during share ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The vault id was never registered.
    #[error("unknown vault id: {0}")]
    UnknownVault(VaultId),

    /// The vault id is already registered.
    #[error("vault id {0} already registered")]
    AlreadyRegistered(VaultId),

    /// The caller is not the issuer of this vault's shares.
    #[error("unauthorized: {caller} is not the share issuer of vault {vault}")]
    NotIssuer {
        /// Vault whose shares were targeted.
        vault: VaultId,
        /// The address that attempted the operation.
        caller: Address,
    },

    /// A supply overflow would occur.
    #[error("supply overflow: minting {amount} would exceed u64::MAX")]
    SupplyOverflow {
        /// The amount that was attempted.
        amount: u64,
    },

    /// The holder does not have enough shares.
    #[error("insufficient shares: holder has {balance}, needs {amount}")]
    InsufficientShares {
        /// Current share balance.
        balance: u64,
        /// Amount the operation needed.
        amount: u64,
    },
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// The slice of the share ledger the vault engine depends on.
pub trait ShareLedger {
    /// Shares of `vault` held by `holder`.
    fn balance_of(&self, holder: &str, vault: VaultId) -> u64;

    /// Total outstanding shares of `vault`.
    fn total_supply(&self, vault: VaultId) -> u64;

    /// Burns `amount` shares of `vault` from `holder`. Only the vault's
    /// issuer may burn.
    fn burn(
        &mut self,
        issuer: &str,
        holder: &str,
        vault: VaultId,
        amount: u64,
    ) -> Result<(), LedgerError>;

    /// Moves `amount` shares of `vault` from `from` to `to`. The caller is
    /// responsible for having authenticated `from`.
    fn transfer(
        &mut self,
        from: &str,
        to: &str,
        vault: VaultId,
        amount: u64,
    ) -> Result<(), LedgerError>;
}

/// Creation-side capability used by the Coordinator when a vault is minted.
pub trait ShareIssuance {
    /// Registers a share class for `vault` with `issuer` as the only
    /// address allowed to mint and burn.
    fn register(&mut self, vault: VaultId, issuer: Address) -> Result<(), LedgerError>;

    /// Mints `amount` shares of `vault` to `to`.
    fn mint(
        &mut self,
        issuer: &str,
        to: &str,
        vault: VaultId,
        amount: u64,
    ) -> Result<(), LedgerError>;
}

// ---------------------------------------------------------------------------
// Reference implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ShareClass {
    issuer: Address,
    total_supply: u64,
    balances: HashMap<Address, u64>,
}

/// In-memory share ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryLedger {
    classes: HashMap<VaultId, ShareClass>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered share classes.
    pub fn vault_count(&self) -> usize {
        self.classes.len()
    }

    fn class_for_issuer(
        &mut self,
        issuer: &str,
        vault: VaultId,
    ) -> Result<&mut ShareClass, LedgerError> {
        let class = self
            .classes
            .get_mut(&vault)
            .ok_or(LedgerError::UnknownVault(vault))?;
        if class.issuer != issuer {
            return Err(LedgerError::NotIssuer {
                vault,
                caller: issuer.to_string(),
            });
        }
        Ok(class)
    }
}

impl ShareIssuance for InMemoryLedger {
    /// Registers a new share class for `vault` with `issuer` as the only
    /// address allowed to mint and burn.
    fn register(&mut self, vault: VaultId, issuer: Address) -> Result<(), LedgerError> {
        if self.classes.contains_key(&vault) {
            return Err(LedgerError::AlreadyRegistered(vault));
        }
        self.classes.insert(
            vault,
            ShareClass {
                issuer,
                total_supply: 0,
                balances: HashMap::new(),
            },
        );
        Ok(())
    }

    /// Mints `amount` shares of `vault` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownVault`] if `vault` is not registered,
    /// [`LedgerError::NotIssuer`] if `issuer` does not match, and
    /// [`LedgerError::SupplyOverflow`] if the mint would overflow.
    fn mint(
        &mut self,
        issuer: &str,
        to: &str,
        vault: VaultId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let class = self.class_for_issuer(issuer, vault)?;

        let new_supply = class
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { amount })?;
        let current = class.balances.get(to).copied().unwrap_or(0);
        let new_balance = current
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { amount })?;

        class.total_supply = new_supply;
        class.balances.insert(to.to_string(), new_balance);
        Ok(())
    }
}

impl ShareLedger for InMemoryLedger {
    fn balance_of(&self, holder: &str, vault: VaultId) -> u64 {
        self.classes
            .get(&vault)
            .and_then(|c| c.balances.get(holder))
            .copied()
            .unwrap_or(0)
    }

    fn total_supply(&self, vault: VaultId) -> u64 {
        self.classes
            .get(&vault)
            .map(|c| c.total_supply)
            .unwrap_or(0)
    }

    fn burn(
        &mut self,
        issuer: &str,
        holder: &str,
        vault: VaultId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let class = self.class_for_issuer(issuer, vault)?;

        let balance = class.balances.get(holder).copied().unwrap_or(0);
        if balance < amount {
            return Err(LedgerError::InsufficientShares { balance, amount });
        }

        class.balances.insert(holder.to_string(), balance - amount);
        class.total_supply = class.total_supply.saturating_sub(amount);
        Ok(())
    }

    fn transfer(
        &mut self,
        from: &str,
        to: &str,
        vault: VaultId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let class = self
            .classes
            .get_mut(&vault)
            .ok_or(LedgerError::UnknownVault(vault))?;

        let from_balance = class.balances.get(from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(LedgerError::InsufficientShares {
                balance: from_balance,
                amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let to_balance = class.balances.get(to).copied().unwrap_or(0);
        let new_to = to_balance
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { amount })?;

        class.balances.insert(from.to_string(), from_balance - amount);
        class.balances.insert(to.to_string(), new_to);
        Ok(())
    }
}

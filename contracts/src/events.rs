//! # Contract Events
//!
//! Records emitted for off-chain observers. Every state-changing call
//! appends its records to the Coordinator's [`EventLog`] only after the call
//! has fully committed, so a failed call never leaves records behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::{Address, Asset};
use crate::vault::{VaultId, VaultState};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VaultEvent {
    /// A vault was created and its initial shares minted.
    VaultCreated {
        /// New vault.
        vault: VaultId,
        /// Total shares minted at creation.
        shares: u64,
    },
    /// Assets arrived in a vault.
    DepositReceived {
        /// Receiving vault.
        vault: VaultId,
        /// Sender.
        from: Address,
        /// Asset deposited.
        asset: Asset,
        /// Raw amount.
        amount: u64,
    },
    /// A vault moved along `Locked → Unlocked → Open`.
    StateChanged {
        /// Vault that transitioned.
        vault: VaultId,
        /// Previous state.
        from: VaultState,
        /// New state.
        to: VaultState,
    },
    /// A holder moved some of its shares to another address.
    SharesTransferred {
        /// Vault whose shares moved.
        vault: VaultId,
        /// Sending holder.
        from: Address,
        /// Receiving holder.
        to: Address,
        /// Shares moved.
        amount: u64,
    },
    /// Net proceeds of a payout line sent to a holder.
    WithdrawalExecuted {
        /// Source vault.
        vault: VaultId,
        /// Redeeming holder.
        holder: Address,
        /// Asset paid.
        asset: Asset,
        /// Net amount after fee.
        amount: u64,
    },
    /// Fee portion of a payout line sent to the fee recipient.
    WithdrawalFeePaid {
        /// Source vault.
        vault: VaultId,
        /// Fee recipient.
        recipient: Address,
        /// Asset paid.
        asset: Asset,
        /// Fee amount.
        amount: u64,
    },
    /// The Treasury pulled an asset balance out of an open vault.
    AssetSweptToTreasury {
        /// Open vault that was emptied.
        vault: VaultId,
        /// Asset collected.
        asset: Asset,
        /// Amount collected.
        amount: u64,
    },
    /// A vault joined the open-vault registry.
    VaultOpened {
        /// Vault now open.
        vault: VaultId,
    },
    /// A single redistribution transfer into a locked vault.
    RewardDistributed {
        /// Receiving vault.
        vault: VaultId,
        /// Asset distributed.
        asset: Asset,
        /// Amount received.
        amount: u64,
    },
    /// Summary of a completed redistribution round.
    DistributionCompleted {
        /// Asset distributed.
        asset: Asset,
        /// Vaults that received a non-zero amount.
        recipients: usize,
        /// Treasury balance of the asset before the round.
        pre_balance: u64,
        /// Total amount sent out.
        distributed: u64,
    },
}

/// An event plus its identity and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique record id.
    pub id: Uuid,
    /// Time the emitting call executed at.
    pub at: DateTime<Utc>,
    /// Payload.
    #[serde(flatten)]
    pub event: VaultEvent,
}

/// Append-only buffer of committed events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends all events of one committed call, stamped with `at`.
    pub fn commit(&mut self, at: DateTime<Utc>, events: impl IntoIterator<Item = VaultEvent>) {
        self.records.extend(events.into_iter().map(|event| EventRecord {
            id: Uuid::new_v4(),
            at,
            event,
        }));
    }

    /// All records so far, oldest first.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Removes and returns every record.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

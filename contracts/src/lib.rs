//! # Strongbox Vault Contracts
//!
//! Time- and target-locked multi-asset savings vaults with fractional
//! ownership. A vault holds native currency and recognized tokens until it
//! unlocks, after which share holders redeem their pro-rata slice. The
//! system is built from a handful of cooperating parts:
//!
//! - **Coordinator**: creates vaults, mints their shares, routes calls and
//!   owns the withdrawal fee.
//! - **Vault**: a `Locked -> Unlocked -> Open` state machine over a set of
//!   asset balances.
//! - **Treasury**: the recognized-asset registry plus the open-vault
//!   registry. Sweeps abandoned value out of open vaults and redistributes
//!   it to locked ones, weighted by their existing balances.
//! - **Share Ledger**: fractional ownership, kept outside the vaults and
//!   reached through a narrow capability trait.
//!
//! ## Design Principles
//!
//! 1. All balance arithmetic is checked. Proportional math runs in `u128`
//!    and truncates; dust stays where it was.
//! 2. State transitions are explicit enum variants and only move forward.
//! 3. Every mutating call computes and validates its full plan before the
//!    first effect, so a failed call changes nothing.
//! 4. Every public type is serializable (serde) for export and snapshots.

pub mod asset;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod holdings;
pub mod ledger;
pub mod logging;
pub mod payout;
pub mod treasury;
pub mod vault;

pub use asset::{Address, Asset, AssetClass, AssetRegistry};
pub use config::{FeeConfig, ProtocolConfig};
pub use coordinator::{CollectionReport, Coordinator, CoordinatorError, DistributionReport};
pub use ledger::{InMemoryLedger, ShareIssuance, ShareLedger};
pub use vault::{Vault, VaultId, VaultParams, VaultState};

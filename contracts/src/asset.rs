//! # Assets and the Recognized-Asset Registry
//!
//! A vault can hold the chain's native coin plus any number of fungible
//! tokens, but only tokens the Treasury recognizes are accepted, counted,
//! and paid out. Recognized tokens come in two classes:
//!
//! - **Base-equivalent**: treated as interchangeable with the native coin
//!   when a native-based vault checks its target balance.
//! - **Supported**: tracked and distributed, but only counted toward a
//!   target when a vault explicitly picked that token as its base asset.
//!
//! Balances are always raw units. Nothing here converts between assets.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An account address (holder, fee recipient, admin, or token contract).
pub type Address = String;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while editing the recognized-asset registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The token is already registered under the given class.
    #[error("asset {asset} is already recognized as {class}")]
    AlreadyRecognized {
        /// Token address.
        asset: Address,
        /// Class it currently belongs to.
        class: AssetClass,
    },

    /// The token is not registered at all.
    #[error("asset {0} is not recognized")]
    NotRecognized(Address),

    /// Empty addresses cannot name a token.
    #[error("asset address must not be empty")]
    EmptyAddress,
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single asset kind a vault can hold.
///
/// The derived ordering puts `Native` first and tokens after it in
/// ascending address order. Payouts, sweeps and event emission all iterate
/// in this order so fee totals are reproducible.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// The chain's native coin.
    Native,
    /// A fungible token identified by its contract address.
    Token(Address),
}

impl Asset {
    /// Shorthand for `Asset::Token(address.into())`.
    pub fn token(address: impl Into<Address>) -> Self {
        Asset::Token(address.into())
    }

    /// Returns `true` for the native coin.
    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Token(addr) => write!(f, "token:{}", addr),
        }
    }
}

/// The class a recognized token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetClass {
    /// Counts as native for native-based vault targets.
    BaseEquivalent,
    /// Distributed, but only counted when it is the vault's base asset.
    Supported,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetClass::BaseEquivalent => write!(f, "BaseEquivalent"),
            AssetClass::Supported => write!(f, "Supported"),
        }
    }
}

/// The global set of tokens vaults will accept.
///
/// Owned by the Treasury. Every edit bumps `version`, so a caller that
/// snapshots the registry at the start of an operation can tell later
/// whether the set it computed against is still current.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRegistry {
    version: u64,
    base_equivalent: BTreeSet<Address>,
    supported: BTreeSet<Address>,
}

impl AssetRegistry {
    /// Creates an empty registry at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from two address lists. Duplicates across the two
    /// classes are rejected.
    pub fn from_lists<I, J>(base_equivalent: I, supported: J) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Address>,
        J: IntoIterator<Item = Address>,
    {
        let mut registry = Self::new();
        for addr in base_equivalent {
            registry.add(addr, AssetClass::BaseEquivalent)?;
        }
        for addr in supported {
            registry.add(addr, AssetClass::Supported)?;
        }
        Ok(registry)
    }

    /// Monotonic edit counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Registers `address` under `class`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRecognized`] if the token is present in
    /// either class, and [`RegistryError::EmptyAddress`] for `""`.
    pub fn add(&mut self, address: Address, class: AssetClass) -> Result<(), RegistryError> {
        if address.is_empty() {
            return Err(RegistryError::EmptyAddress);
        }
        if let Some(existing) = self.class_of(&address) {
            return Err(RegistryError::AlreadyRecognized {
                asset: address,
                class: existing,
            });
        }

        match class {
            AssetClass::BaseEquivalent => self.base_equivalent.insert(address),
            AssetClass::Supported => self.supported.insert(address),
        };
        self.version += 1;
        Ok(())
    }

    /// Removes `address` from whichever class holds it and returns that class.
    pub fn remove(&mut self, address: &str) -> Result<AssetClass, RegistryError> {
        let class = if self.base_equivalent.remove(address) {
            AssetClass::BaseEquivalent
        } else if self.supported.remove(address) {
            AssetClass::Supported
        } else {
            return Err(RegistryError::NotRecognized(address.to_string()));
        };
        self.version += 1;
        Ok(class)
    }

    /// Returns the class of a token, or `None` if it is not recognized.
    pub fn class_of(&self, address: &str) -> Option<AssetClass> {
        if self.base_equivalent.contains(address) {
            Some(AssetClass::BaseEquivalent)
        } else if self.supported.contains(address) {
            Some(AssetClass::Supported)
        } else {
            None
        }
    }

    /// Native is always recognized; tokens must be registered.
    pub fn is_recognized(&self, asset: &Asset) -> bool {
        match asset {
            Asset::Native => true,
            Asset::Token(addr) => self.class_of(addr).is_some(),
        }
    }

    /// Base-equivalent token addresses in ascending order.
    pub fn base_equivalent(&self) -> impl Iterator<Item = &Address> {
        self.base_equivalent.iter()
    }

    /// Supported token addresses in ascending order.
    pub fn supported(&self) -> impl Iterator<Item = &Address> {
        self.supported.iter()
    }

    /// Every recognized asset, native first, tokens in ascending address
    /// order regardless of class.
    pub fn all_assets(&self) -> Vec<Asset> {
        let mut tokens: Vec<&Address> = self
            .base_equivalent
            .iter()
            .chain(self.supported.iter())
            .collect();
        tokens.sort();

        std::iter::once(Asset::Native)
            .chain(tokens.into_iter().map(|a| Asset::Token(a.clone())))
            .collect()
    }
}

//! # Protocol Configuration & Constants
//!
//! Fee parameters, the distribution bound, and the initial recognized-asset
//! lists. The Coordinator holds one [`ProtocolConfig`]; every operation reads
//! the values it needs once at entry, so a fee change never reaches a payout
//! that already started.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::{Address, AssetRegistry, RegistryError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Basis-point denominator. 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Default withdrawal fee: 4.00%.
pub const DEFAULT_WITHDRAWAL_FEE_BPS: u16 = 400;

/// Hard ceiling for any configured fee cap. No configuration may allow a
/// fee above 10%.
pub const MAX_WITHDRAWAL_FEE_CAP_BPS: u16 = 1_000;

/// Upper bound on the number of locked vaults a single redistribution round
/// enumerates. Rounds over a larger set fail instead of running unbounded.
pub const DEFAULT_MAX_DISTRIBUTION_VAULTS: usize = 1_000;

/// Schema version of the serialized configuration.
pub const CONFIG_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a configuration is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The fee exceeds the configured cap.
    #[error("withdrawal fee {fee_bps} bps exceeds cap {cap_bps} bps")]
    FeeAboveCap {
        /// Requested fee.
        fee_bps: u16,
        /// Configured cap.
        cap_bps: u16,
    },

    /// The cap itself exceeds the hard ceiling.
    #[error("fee cap {0} bps exceeds hard ceiling {ceiling} bps", ceiling = MAX_WITHDRAWAL_FEE_CAP_BPS)]
    CapAboveCeiling(u16),

    /// A required address is empty.
    #[error("{0} must not be empty")]
    EmptyAddress(&'static str),

    /// Distribution bound of zero would make every round fail.
    #[error("max_distribution_vaults must be at least 1")]
    ZeroDistributionBound,

    /// Serialized config from an incompatible schema.
    #[error("unsupported config version {found}, expected {expected}", expected = CONFIG_VERSION)]
    UnsupportedVersion {
        /// Version found in the input.
        found: u32,
    },

    /// The initial asset lists are inconsistent.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Withdrawal fee settings owned by the Coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Fee charged on every payout line, in basis points.
    pub withdrawal_fee_bps: u16,
    /// Highest fee the admin may set.
    pub max_withdrawal_fee_bps: u16,
    /// Address credited with collected fees.
    pub fee_recipient: Address,
}

impl FeeConfig {
    /// Default fee and cap paid to `fee_recipient`.
    pub fn new(fee_recipient: impl Into<Address>) -> Self {
        Self {
            withdrawal_fee_bps: DEFAULT_WITHDRAWAL_FEE_BPS,
            max_withdrawal_fee_bps: MAX_WITHDRAWAL_FEE_CAP_BPS,
            fee_recipient: fee_recipient.into(),
        }
    }

    /// Checks the fee against its cap and the cap against the ceiling.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_withdrawal_fee_bps > MAX_WITHDRAWAL_FEE_CAP_BPS {
            return Err(ConfigError::CapAboveCeiling(self.max_withdrawal_fee_bps));
        }
        if self.withdrawal_fee_bps > self.max_withdrawal_fee_bps {
            return Err(ConfigError::FeeAboveCap {
                fee_bps: self.withdrawal_fee_bps,
                cap_bps: self.max_withdrawal_fee_bps,
            });
        }
        if self.fee_recipient.is_empty() {
            return Err(ConfigError::EmptyAddress("fee_recipient"));
        }
        Ok(())
    }
}

/// Everything the Coordinator and Treasury need to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Schema version; must equal [`CONFIG_VERSION`].
    pub version: u32,
    /// The only address allowed to create vaults and change configuration.
    pub admin: Address,
    /// Withdrawal fee settings.
    pub fees: FeeConfig,
    /// Cap on locked vaults enumerated per redistribution round.
    #[serde(default = "default_max_distribution_vaults")]
    pub max_distribution_vaults: usize,
    /// Tokens treated as native-equivalent for native-based targets.
    #[serde(default)]
    pub base_assets: Vec<Address>,
    /// Tokens tracked and distributed but not counted toward native targets.
    #[serde(default)]
    pub supported_assets: Vec<Address>,
}

fn default_max_distribution_vaults() -> usize {
    DEFAULT_MAX_DISTRIBUTION_VAULTS
}

impl ProtocolConfig {
    /// A config with default fees and no recognized tokens.
    pub fn new(admin: impl Into<Address>, fee_recipient: impl Into<Address>) -> Self {
        Self {
            version: CONFIG_VERSION,
            admin: admin.into(),
            fees: FeeConfig::new(fee_recipient),
            max_distribution_vaults: DEFAULT_MAX_DISTRIBUTION_VAULTS,
            base_assets: Vec::new(),
            supported_assets: Vec::new(),
        }
    }

    /// Validates every field and that the asset lists do not overlap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
            });
        }
        if self.admin.is_empty() {
            return Err(ConfigError::EmptyAddress("admin"));
        }
        if self.max_distribution_vaults == 0 {
            return Err(ConfigError::ZeroDistributionBound);
        }
        self.fees.validate()?;
        self.asset_registry()?;
        Ok(())
    }

    /// Builds the initial registry from the configured lists.
    pub fn asset_registry(&self) -> Result<AssetRegistry, ConfigError> {
        Ok(AssetRegistry::from_lists(
            self.base_assets.iter().cloned(),
            self.supported_assets.iter().cloned(),
        )?)
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("malformed protocol config")?;
        config.validate().context("invalid protocol config")?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json(&raw)
    }
}

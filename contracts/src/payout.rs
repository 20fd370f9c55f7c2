//! # Proportional Payout Arithmetic
//!
//! A holder with `s` of `S` outstanding shares is entitled to
//! `floor(balance * s / S)` of every asset the vault holds. A withdrawal fee
//! of `floor(gross * bps / 10_000)` is carved out of each line.
//!
//! Everything here is pure: the plan is computed from a snapshot of the
//! vault's holdings and the ledger's share figures before anything moves.
//! Products are taken in 128 bits, so no intermediate can overflow, and all
//! divisions truncate. Truncation dust stays in the vault.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::{Address, Asset};
use crate::config::BPS_DENOMINATOR;
use crate::holdings::Holdings;
use crate::vault::VaultId;

/// Errors in the share figures handed to the payout calculation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayoutError {
    /// The holder has no shares to redeem.
    #[error("holder has no shares of this vault")]
    NoShares,

    /// The ledger reports fewer outstanding shares than the holder owns.
    #[error("inconsistent share figures: holder {holder_shares} > supply {total_supply}")]
    SupplyMismatch {
        /// Holder's shares.
        holder_shares: u64,
        /// Total outstanding shares.
        total_supply: u64,
    },

    /// Fee above 100%.
    #[error("fee of {0} bps exceeds 10000")]
    FeeOutOfRange(u16),
}

/// One asset's slice of a payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutLine {
    /// Asset being paid.
    pub asset: Asset,
    /// Pro-rata entitlement, taken out of the vault.
    pub gross: u64,
    /// Portion sent to the fee recipient.
    pub fee: u64,
    /// Portion sent to the holder. Always `gross - fee`.
    pub net: u64,
}

/// A fully computed, not yet executed payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutPlan {
    /// Vault being redeemed.
    pub vault: VaultId,
    /// Holder's shares, all of which are burned.
    pub holder_shares: u64,
    /// Outstanding shares before the burn.
    pub total_supply: u64,
    /// Fee rate in effect for this call.
    pub fee_bps: u16,
    /// Lines with `gross > 0`, native first then tokens by address.
    pub lines: Vec<PayoutLine>,
}

impl PayoutPlan {
    /// The line paid for `asset`, if any.
    pub fn line(&self, asset: &Asset) -> Option<&PayoutLine> {
        self.lines.iter().find(|l| &l.asset == asset)
    }

    /// Returns `true` if the holder redeems every outstanding share.
    pub fn redeems_all(&self) -> bool {
        self.holder_shares == self.total_supply
    }
}

/// Result of an executed payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique settlement id.
    pub id: uuid::Uuid,
    /// Redeeming holder.
    pub holder: Address,
    /// Fee recipient in effect for this call.
    pub fee_recipient: Address,
    /// The executed plan.
    pub plan: PayoutPlan,
    /// Whether this payout emptied the share supply and opened the vault.
    pub vault_opened: bool,
}

/// `floor(amount * numerator / denominator)` without intermediate overflow.
///
/// Callers guarantee `numerator <= denominator`, so the result fits in `u64`.
pub fn mul_div_floor(amount: u64, numerator: u64, denominator: u64) -> u64 {
    debug_assert!(denominator > 0);
    debug_assert!(numerator <= denominator);
    ((amount as u128 * numerator as u128) / denominator as u128) as u64
}

/// Splits `gross` into `(net, fee)` at `fee_bps`.
pub fn split_fee(gross: u64, fee_bps: u16) -> (u64, u64) {
    let fee = mul_div_floor(gross, u64::from(fee_bps), BPS_DENOMINATOR);
    (gross - fee, fee)
}

/// Computes the payout for a holder from a snapshot of the vault's holdings.
pub fn compute_plan(
    vault: VaultId,
    holdings: &Holdings,
    holder_shares: u64,
    total_supply: u64,
    fee_bps: u16,
) -> Result<PayoutPlan, PayoutError> {
    if holder_shares == 0 {
        return Err(PayoutError::NoShares);
    }
    if holder_shares > total_supply {
        return Err(PayoutError::SupplyMismatch {
            holder_shares,
            total_supply,
        });
    }
    if u64::from(fee_bps) > BPS_DENOMINATOR {
        return Err(PayoutError::FeeOutOfRange(fee_bps));
    }

    let lines = holdings
        .iter()
        .filter_map(|(asset, balance)| {
            let gross = mul_div_floor(balance, holder_shares, total_supply);
            if gross == 0 {
                return None;
            }
            let (net, fee) = split_fee(gross, fee_bps);
            Some(PayoutLine {
                asset: asset.clone(),
                gross,
                fee,
                net,
            })
        })
        .collect();

    Ok(PayoutPlan {
        vault,
        holder_shares,
        total_supply,
        fee_bps,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holdings(entries: &[(Asset, u64)]) -> Holdings {
        let mut h = Holdings::new();
        for (asset, amount) in entries {
            h.credit(asset, *amount).unwrap();
        }
        h
    }

    #[test]
    fn split_fee_truncates_and_conserves() {
        assert_eq!(split_fee(34, 400), (33, 1));
        assert_eq!(split_fee(33, 400), (32, 1));
        assert_eq!(split_fee(24, 400), (24, 0));
        for gross in [0u64, 1, 99, 10_001, u64::MAX] {
            let (net, fee) = split_fee(gross, 400);
            assert_eq!(net + fee, gross);
            assert_eq!(fee, mul_div_floor(gross, 400, 10_000));
        }
    }

    #[test]
    fn mul_div_survives_large_products() {
        assert_eq!(mul_div_floor(u64::MAX, 1, 2), u64::MAX / 2);
        assert_eq!(mul_div_floor(u64::MAX, 7, 7), u64::MAX);
    }

    #[test]
    fn zero_shares_rejected() {
        let h = holdings(&[(Asset::Native, 100)]);
        assert_eq!(
            compute_plan(VaultId(1), &h, 0, 100, 400),
            Err(PayoutError::NoShares)
        );
    }

    #[test]
    fn holder_above_supply_rejected() {
        let h = holdings(&[(Asset::Native, 100)]);
        assert!(matches!(
            compute_plan(VaultId(1), &h, 101, 100, 400),
            Err(PayoutError::SupplyMismatch { .. })
        ));
    }

    #[test]
    fn zero_gross_lines_are_skipped() {
        let h = holdings(&[(Asset::Native, 1_000), (Asset::token("dust"), 3)]);
        let plan = compute_plan(VaultId(1), &h, 1, 10, 400).unwrap();
        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].asset, Asset::Native);
        assert_eq!(plan.lines[0].gross, 100);
    }

    #[test]
    fn lines_follow_asset_order() {
        let h = holdings(&[
            (Asset::token("zeta"), 10),
            (Asset::token("alpha"), 10),
            (Asset::Native, 10),
        ]);
        let plan = compute_plan(VaultId(1), &h, 1, 1, 0).unwrap();
        let order: Vec<Asset> = plan.lines.iter().map(|l| l.asset.clone()).collect();
        assert_eq!(
            order,
            vec![Asset::Native, Asset::token("alpha"), Asset::token("zeta")]
        );
        assert!(plan.redeems_all());
    }
}

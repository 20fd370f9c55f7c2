//! Integration tests for proportional payouts.
//!
//! Covers the arithmetic end to end: pro-rata slices across several assets,
//! fee carve-outs, truncation, sequential redemptions draining a vault, and
//! the guarantee that a rejected payout changes nothing.

use chrono::{DateTime, TimeZone, Utc};
use strongbox_contracts::coordinator::{Coordinator, CoordinatorError};
use strongbox_contracts::events::VaultEvent;
use strongbox_contracts::ledger::LedgerError;
use strongbox_contracts::payout::PayoutError;
use strongbox_contracts::vault::{VaultError, VaultId, VaultParams, VaultState};
use strongbox_contracts::{Asset, InMemoryLedger, ProtocolConfig, ShareLedger};

const ADMIN: &str = "admin";
const FEES: &str = "fee_sink";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn coordinator() -> Coordinator {
    let mut config = ProtocolConfig::new(ADMIN, FEES);
    config.supported_assets = vec!["usdc".into()];
    Coordinator::new(config).unwrap()
}

/// Creates an unconditioned vault, funds it and unlocks it.
fn unlocked_vault(
    c: &mut Coordinator<InMemoryLedger>,
    holders: &[(&str, u64)],
    funding: &[(Asset, u64)],
) -> VaultId {
    let allocations: Vec<(String, u64)> =
        holders.iter().map(|(h, s)| (h.to_string(), *s)).collect();
    let id = c
        .create_vault(ADMIN, VaultParams::new("shared"), &allocations, now())
        .unwrap();
    c.check_unlock(id, now()).unwrap();
    for (asset, amount) in funding {
        c.deposit(id, "funder", asset.clone(), *amount, now()).unwrap();
    }
    id
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

#[test]
fn three_holders_drain_vault_with_fee() {
    let mut c = coordinator();
    let id = unlocked_vault(
        &mut c,
        &[("alice", 34), ("bob", 33), ("carol", 33)],
        &[(Asset::Native, 100)],
    );

    let a = c.payout("alice", id, now()).unwrap();
    let line = a.plan.line(&Asset::Native).unwrap();
    assert_eq!((line.gross, line.net, line.fee), (34, 33, 1));
    assert!(!a.vault_opened);

    let b = c.payout("bob", id, now()).unwrap();
    let line = b.plan.line(&Asset::Native).unwrap();
    assert_eq!((line.gross, line.net, line.fee), (33, 32, 1));

    let last = c.payout("carol", id, now()).unwrap();
    let line = last.plan.line(&Asset::Native).unwrap();
    assert_eq!((line.gross, line.net, line.fee), (33, 32, 1));
    assert!(last.vault_opened);

    assert_eq!(c.account_balance("alice", &Asset::Native), 33);
    assert_eq!(c.account_balance("bob", &Asset::Native), 32);
    assert_eq!(c.account_balance("carol", &Asset::Native), 32);
    assert_eq!(c.account_balance(FEES, &Asset::Native), 3);
    assert_eq!(c.vault(id).unwrap().balance_of(&Asset::Native), 0);
    assert_eq!(c.attributes(id).unwrap().state, VaultState::Open);
    assert!(c.treasury().is_open(id));
    assert_eq!(c.ledger().total_supply(id), 0);
}

#[test]
fn sole_holder_redeems_every_asset_at_400_bps() {
    let mut config = ProtocolConfig::new(ADMIN, FEES);
    config.supported_assets = vec!["token_a".into(), "token_b".into()];
    let mut c = Coordinator::new(config).unwrap();
    let id = unlocked_vault(
        &mut c,
        &[("alice", 1_000)],
        &[
            (Asset::Native, 34),
            (Asset::token("token_a"), 33),
            (Asset::token("token_b"), 33),
        ],
    );

    let s = c.payout("alice", id, now()).unwrap();
    let paid: Vec<(u64, u64)> = s.plan.lines.iter().map(|l| (l.net, l.fee)).collect();
    assert_eq!(paid, vec![(33, 1), (32, 1), (32, 1)]);

    assert_eq!(c.account_balance("alice", &Asset::token("token_a")), 32);
    assert_eq!(c.account_balance(FEES, &Asset::token("token_b")), 1);
    assert!(c.vault(id).unwrap().holdings().is_empty());
    assert!(s.vault_opened);
    assert_eq!(c.treasury().open_vaults().collect::<Vec<_>>(), vec![id]);
}

#[test]
fn twenty_percent_holder_receives_slice_of_every_asset() {
    let mut c = coordinator();
    let id = unlocked_vault(
        &mut c,
        &[("alice", 80), ("bob", 20)],
        &[(Asset::Native, 1_000), (Asset::token("usdc"), 500)],
    );

    let s = c.payout("bob", id, now()).unwrap();
    assert_eq!(s.plan.lines.len(), 2);
    assert_eq!(s.plan.lines[0].asset, Asset::Native);

    let native = s.plan.line(&Asset::Native).unwrap();
    assert_eq!((native.gross, native.fee, native.net), (200, 8, 192));
    let usdc = s.plan.line(&Asset::token("usdc")).unwrap();
    assert_eq!((usdc.gross, usdc.fee, usdc.net), (100, 4, 96));

    let vault = c.vault(id).unwrap();
    assert_eq!(vault.balance_of(&Asset::Native), 800);
    assert_eq!(vault.balance_of(&Asset::token("usdc")), 400);
    assert_eq!(c.ledger().balance_of("bob", id), 0);
    assert_eq!(c.ledger().total_supply(id), 80);
    assert_eq!(vault.state(), VaultState::Unlocked);
}

#[test]
fn truncation_dust_stays_in_vault() {
    let mut c = coordinator();
    let id = unlocked_vault(&mut c, &[("alice", 1), ("bob", 2)], &[(Asset::Native, 10)]);

    let s = c.payout("alice", id, now()).unwrap();
    assert_eq!(s.plan.line(&Asset::Native).unwrap().gross, 3);
    assert_eq!(c.vault(id).unwrap().balance_of(&Asset::Native), 7);

    // The last holder always takes whatever is left.
    let s = c.payout("bob", id, now()).unwrap();
    assert_eq!(s.plan.line(&Asset::Native).unwrap().gross, 7);
}

#[test]
fn fee_change_applies_to_later_payouts() {
    let mut c = coordinator();
    let id = unlocked_vault(&mut c, &[("alice", 1), ("bob", 1)], &[(Asset::Native, 2_000)]);

    c.payout("alice", id, now()).unwrap();
    c.set_withdrawal_fee_bps(ADMIN, 0).unwrap();
    let s = c.payout("bob", id, now()).unwrap();

    assert_eq!(c.account_balance("alice", &Asset::Native), 960);
    assert_eq!(s.plan.fee_bps, 0);
    assert_eq!(c.account_balance("bob", &Asset::Native), 1_000);
    assert_eq!(c.account_balance(FEES, &Asset::Native), 40);
}

#[test]
fn holder_that_is_fee_recipient_gets_both_parts() {
    let mut c = coordinator();
    let id = unlocked_vault(&mut c, &[(FEES, 1)], &[(Asset::Native, 1_000)]);
    c.payout(FEES, id, now()).unwrap();
    assert_eq!(c.account_balance(FEES, &Asset::Native), 1_000);
}

#[test]
fn transferred_shares_are_redeemable() {
    let mut c = coordinator();
    let id = unlocked_vault(&mut c, &[("alice", 10)], &[(Asset::Native, 100)]);
    c.transfer_shares("alice", "dave", id, 5, now()).unwrap();
    assert_eq!(c.ledger().balance_of("alice", id), 5);

    let s = c.payout("dave", id, now()).unwrap();
    assert_eq!(s.plan.line(&Asset::Native).unwrap().gross, 50);
    assert_eq!(s.plan.holder_shares, 5);
}

#[test]
fn shares_only_move_from_their_holder() {
    let mut c = coordinator();
    let id = unlocked_vault(&mut c, &[("alice", 10), ("bob", 90)], &[(Asset::Native, 1_000)]);

    let err = c.transfer_shares("mallory", "mallory", id, 90, now()).unwrap_err();
    assert!(matches!(
        err,
        CoordinatorError::Ledger(LedgerError::InsufficientShares { balance: 0, amount: 90 })
    ));
    assert!(c.payout("mallory", id, now()).is_err());

    // A detached copy of the ledger cannot reach the Coordinator's shares.
    let mut copy = c.ledger().clone();
    copy.burn("strongbox:coordinator", "bob", id, 90).unwrap();
    assert_eq!(c.ledger().balance_of("bob", id), 90);
    assert_eq!(c.ledger().total_supply(id), 100);

    c.payout("alice", id, now()).unwrap();
    let last = c.payout("bob", id, now()).unwrap();
    assert!(last.vault_opened);
    assert_eq!(c.account_balance("mallory", &Asset::Native), 0);
    assert_eq!(c.vault(id).unwrap().balance_of(&Asset::Native), 0);
}

#[test]
fn payout_of_empty_vault_still_opens_it() {
    let mut c = coordinator();
    let id = unlocked_vault(&mut c, &[("alice", 1)], &[]);
    let s = c.payout("alice", id, now()).unwrap();
    assert!(s.plan.lines.is_empty());
    assert!(s.vault_opened);
}

#[test]
fn preview_matches_execution() {
    let mut c = coordinator();
    let id = unlocked_vault(
        &mut c,
        &[("alice", 3), ("bob", 7)],
        &[(Asset::Native, 12_345), (Asset::token("usdc"), 678)],
    );
    let preview = c.preview_payout("bob", id).unwrap();
    let executed = c.payout("bob", id, now()).unwrap();
    assert_eq!(preview, executed.plan);
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[test]
fn locked_vault_rejects_payout() {
    let mut c = coordinator();
    let id = c
        .create_vault(ADMIN, VaultParams::new("v").with_target(1), &[("alice".into(), 1)], now())
        .unwrap();
    assert!(matches!(
        c.payout("alice", id, now()),
        Err(CoordinatorError::Vault(VaultError::InvalidState {
            current: VaultState::Locked,
            ..
        }))
    ));
}

#[test]
fn non_holder_payout_changes_nothing() {
    let mut c = coordinator();
    let id = unlocked_vault(&mut c, &[("alice", 1)], &[(Asset::Native, 100)]);
    let events_before = c.events().len();

    let err = c.payout("mallory", id, now()).unwrap_err();
    assert!(matches!(
        err,
        CoordinatorError::Vault(VaultError::Payout {
            source: PayoutError::NoShares,
            ..
        })
    ));
    assert_eq!(c.vault(id).unwrap().balance_of(&Asset::Native), 100);
    assert_eq!(c.ledger().total_supply(id), 1);
    assert_eq!(c.events().len(), events_before);
    assert_eq!(c.account_balance("mallory", &Asset::Native), 0);
}

#[test]
fn second_payout_by_same_holder_rejected() {
    let mut c = coordinator();
    let id = unlocked_vault(&mut c, &[("alice", 1), ("bob", 1)], &[(Asset::Native, 10)]);
    c.payout("alice", id, now()).unwrap();
    assert!(c.payout("alice", id, now()).is_err());
}

#[test]
fn drained_vault_opens_exactly_once() {
    let mut c = coordinator();
    let id = unlocked_vault(&mut c, &[("alice", 1), ("bob", 1)], &[(Asset::Native, 10)]);
    c.payout("alice", id, now()).unwrap();
    c.payout("bob", id, now()).unwrap();
    assert_eq!(c.ledger().total_supply(id), 0);
    let events_before = c.events().len();

    for caller in ["bob", "stranger"] {
        assert!(matches!(
            c.payout(caller, id, now()),
            Err(CoordinatorError::Vault(VaultError::Payout {
                source: PayoutError::NoShares,
                ..
            }))
        ));
    }

    assert_eq!(c.treasury().open_vaults().count(), 1);
    assert_eq!(c.attributes(id).unwrap().state, VaultState::Open);
    assert_eq!(c.events().len(), events_before);
    let opened = c
        .events()
        .records()
        .iter()
        .filter(|r| matches!(r.event, VaultEvent::VaultOpened { vault } if vault == id))
        .count();
    assert_eq!(opened, 1);
}

#[test]
fn settlement_events_cover_every_line() {
    let mut c = coordinator();
    let id = unlocked_vault(
        &mut c,
        &[("alice", 1), ("bob", 1)],
        &[(Asset::Native, 1_000), (Asset::token("usdc"), 1_000)],
    );
    c.drain_events();
    c.payout("alice", id, now()).unwrap();

    let records = c.drain_events();
    let withdrawals = records
        .iter()
        .filter(|r| matches!(r.event, VaultEvent::WithdrawalExecuted { .. }))
        .count();
    let fees = records
        .iter()
        .filter(|r| matches!(r.event, VaultEvent::WithdrawalFeePaid { .. }))
        .count();
    assert_eq!((withdrawals, fees), (2, 2));
    assert!(c.events().is_empty());
}

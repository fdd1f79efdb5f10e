// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::txn;
use tallysync::models::TxnKind;
use tallysync::sync::fingerprint::{amount_minor_units, fingerprint, normalize_description};

#[test]
fn equal_amounts_with_different_scales_fingerprint_identically() {
    let a = txn("a", "2025-03-01", TxnKind::Expense, "12.5", "Coffee");
    let b = txn("b", "2025-03-01", TxnKind::Expense, "12.50", "Coffee");
    assert_eq!(fingerprint(&a), fingerprint(&b));
}

#[test]
fn description_case_and_whitespace_do_not_matter() {
    let a = txn("a", "2025-03-01", TxnKind::Expense, "8.00", "  CORNER   Shop ");
    let b = txn("b", "2025-03-01", TxnKind::Expense, "8.00", "corner shop");
    assert_eq!(fingerprint(&a), fingerprint(&b));
}

#[test]
fn kind_distinguishes_otherwise_equal_records() {
    let refund = txn("a", "2025-03-01", TxnKind::Income, "30.00", "Store refund");
    let purchase = txn("b", "2025-03-01", TxnKind::Expense, "30.00", "Store refund");
    assert_ne!(fingerprint(&refund), fingerprint(&purchase));
}

#[test]
fn date_distinguishes_otherwise_equal_records() {
    let a = txn("a", "2025-03-01", TxnKind::Expense, "8.00", "Lunch");
    let b = txn("b", "2025-03-02", TxnKind::Expense, "8.00", "Lunch");
    assert_ne!(fingerprint(&a), fingerprint(&b));
}

#[test]
fn minor_units_round_half_away_from_zero() {
    assert_eq!(amount_minor_units(common::dec("12.345")), 1235);
    assert_eq!(amount_minor_units(common::dec("12.344")), 1234);
    assert_eq!(amount_minor_units(common::dec("0.005")), 1);
    assert_eq!(amount_minor_units(common::dec("100")), 10000);
}

#[test]
fn normalization_collapses_interior_whitespace() {
    assert_eq!(normalize_description("A  B\tC"), "a b c");
    assert_eq!(normalize_description(""), "");
}

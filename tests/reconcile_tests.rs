// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{record, txn};
use tallysync::models::{Category, DatasetData, TxnKind};
use tallysync::sync::reconcile::reconcile;

fn category(name: &str) -> Category {
    Category {
        id: format!("cat_{}", name),
        name: name.to_string(),
        color: "#4caf50".to_string(),
        monthly_budget: None,
        kind: TxnKind::Expense,
    }
}

#[test]
fn new_records_are_accepted_with_fresh_ids() {
    let existing = DatasetData::default();
    let plan = reconcile(
        &existing,
        vec![record("2025-03-01", TxnKind::Expense, "8.00", "Lunch")],
    );
    assert_eq!(plan.new_records.len(), 1);
    assert!(plan.new_records[0].id.starts_with("txn_"));
    assert_eq!(plan.summary().accepted, 1);
}

#[test]
fn records_matching_existing_fingerprints_are_duplicates() {
    let mut existing = DatasetData::default();
    existing
        .transactions
        .push(txn("t1", "2025-03-01", TxnKind::Expense, "8.00", "Lunch"));

    let plan = reconcile(
        &existing,
        vec![record("2025-03-01", TxnKind::Expense, "8.00", "  LUNCH ")],
    );
    assert!(plan.new_records.is_empty());
    assert_eq!(plan.duplicates, 1);
}

#[test]
fn reimporting_an_accepted_batch_is_a_no_op() {
    let incoming = vec![
        record("2025-03-01", TxnKind::Expense, "8.00", "Lunch"),
        record("2025-03-02", TxnKind::Income, "100.00", "Transfer in"),
    ];
    let first = reconcile(&DatasetData::default(), incoming.clone());
    assert_eq!(first.new_records.len(), 2);

    let mut existing = DatasetData::default();
    existing.transactions = first.new_records;
    let second = reconcile(&existing, incoming);
    assert_eq!(second.summary().accepted, 0);
    assert_eq!(second.duplicates, 2);
}

#[test]
fn duplicates_within_a_single_batch_collapse() {
    let plan = reconcile(
        &DatasetData::default(),
        vec![
            record("2025-03-01", TxnKind::Expense, "8.00", "Lunch"),
            record("2025-03-01", TxnKind::Expense, "8.00", "Lunch"),
        ],
    );
    assert_eq!(plan.new_records.len(), 1);
    assert_eq!(plan.duplicates, 1);
}

#[test]
fn feed_records_refresh_by_external_id() {
    let mut existing = DatasetData::default();
    let mut current = txn("t1", "2025-03-01", TxnKind::Expense, "8.00", "PENDING LUNCH");
    current.external_id = Some("plaid-1".to_string());
    existing.transactions.push(current);

    let mut incoming = record("2025-03-01", TxnKind::Expense, "8.25", "LUNCH SPOT #42");
    incoming.external_id = Some("plaid-1".to_string());

    let plan = reconcile(&existing, vec![incoming]);
    assert!(plan.new_records.is_empty());
    assert_eq!(plan.updates.len(), 1);
    assert_eq!(plan.updates[0].id, "t1");
    assert_eq!(plan.updates[0].amount, common::dec("8.25"));
    assert_eq!(plan.updates[0].description, "LUNCH SPOT #42");
}

#[test]
fn manual_recategorization_survives_a_refresh() {
    let mut existing = DatasetData::default();
    existing.categories.push(category("Dining"));
    let mut current = txn("t1", "2025-03-01", TxnKind::Expense, "8.00", "Lunch");
    current.external_id = Some("plaid-1".to_string());
    current.category = Some("Dining".to_string());
    existing.transactions.push(current);

    let mut incoming = record("2025-03-01", TxnKind::Expense, "8.00", "Lunch");
    incoming.external_id = Some("plaid-1".to_string());
    incoming.category = Some("Restaurants".to_string());

    let plan = reconcile(&existing, vec![incoming]);
    assert_eq!(plan.updates[0].category.as_deref(), Some("Dining"));
}

#[test]
fn stale_category_is_replaced_on_refresh() {
    let mut existing = DatasetData::default();
    let mut current = txn("t1", "2025-03-01", TxnKind::Expense, "8.00", "Lunch");
    current.external_id = Some("plaid-1".to_string());
    current.category = Some("Deleted category".to_string());
    existing.transactions.push(current);

    let mut incoming = record("2025-03-01", TxnKind::Expense, "8.00", "Lunch");
    incoming.external_id = Some("plaid-1".to_string());
    incoming.category = Some("Dining".to_string());

    let plan = reconcile(&existing, vec![incoming]);
    assert_eq!(plan.updates[0].category.as_deref(), Some("Dining"));
}

#[test]
fn oversized_amounts_reject_the_record_not_the_batch() {
    let plan = reconcile(
        &DatasetData::default(),
        vec![
            record("2025-03-01", TxnKind::Expense, "100000000", "Fat finger"),
            record("2025-03-01", TxnKind::Expense, "8.00", "Lunch"),
        ],
    );
    assert_eq!(plan.new_records.len(), 1);
    assert_eq!(plan.rejected.len(), 1);
    assert!(plan.rejected[0].1.contains("exceeds maximum"));
    let summary = plan.summary();
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.invalid, 1);
}

// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use tallysync::error::SyncError;
use tallysync::models::TxnKind;
use tallysync::sync::csv_import::parse_csv;
use tallysync::sync::fingerprint::fingerprint;
use tallysync::sync::reconcile::reconcile;

#[test]
fn parses_five_column_layout_with_explicit_type() {
    let batch = parse_csv("2025-03-01,Paycheck,2500.00,income,Salary\n").unwrap();
    assert_eq!(batch.records.len(), 1);
    let r = &batch.records[0];
    assert_eq!(r.kind, TxnKind::Income);
    assert_eq!(r.amount, common::dec("2500.00"));
    assert_eq!(r.description, "Paycheck");
    assert_eq!(r.category.as_deref(), Some("Salary"));
}

#[test]
fn parses_date_amount_description_layout() {
    let batch = parse_csv("2025-03-02,-19.99,Streaming sub\n").unwrap();
    let r = &batch.records[0];
    assert_eq!(r.kind, TxnKind::Expense);
    assert_eq!(r.amount, common::dec("19.99"));
    assert_eq!(r.description, "Streaming sub");
}

#[test]
fn trailing_column_can_be_type_or_category() {
    let batch = parse_csv("2025-03-02,-10.00,Refund reversal,income\n").unwrap();
    assert_eq!(batch.records[0].kind, TxnKind::Income);
    assert!(batch.records[0].category.is_none());

    let batch = parse_csv("2025-03-02,-10.00,Groceries run,Food\n").unwrap();
    assert_eq!(batch.records[0].kind, TxnKind::Expense);
    assert_eq!(batch.records[0].category.as_deref(), Some("Food"));
}

#[test]
fn currency_symbols_and_thousands_separators_are_stripped() {
    let batch = parse_csv("2025-03-03,\"$1,234.56\",Rent\n").unwrap();
    assert_eq!(batch.records[0].amount, common::dec("1234.56"));
}

#[test]
fn slash_dates_are_accepted() {
    let batch = parse_csv("03/04/2025,-5.00,Snack\n").unwrap();
    assert_eq!(batch.records[0].date, common::date("2025-03-04"));
}

#[test]
fn header_row_is_skipped_not_fatal() {
    let input = "date,amount,description\n2025-03-01,-5.00,Snack\n";
    let batch = parse_csv(input).unwrap();
    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.skipped_rows, 1);
}

#[test]
fn input_with_no_valid_rows_is_an_error() {
    let err = parse_csv("not,a,date\nneither,is,this\n").unwrap_err();
    assert!(matches!(err, SyncError::ImportFormat(_)));
}

#[test]
fn blank_rows_are_ignored_silently() {
    let batch = parse_csv("2025-03-01,-5.00,Snack\n,,\n").unwrap();
    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.skipped_rows, 0);
}

/// The same purchase exported once per sign convention and date format
/// must land as a single expense after reconciliation.
#[test]
fn sign_and_date_conventions_collapse_to_one_record() {
    let input = "2024-01-05,-42.10,\"Coffee Shop\",\"other\"\n01/05/2024,42.10,\"Coffee Shop\",other\n";
    let batch = parse_csv(input).unwrap();
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.records[0].kind, TxnKind::Expense);
    assert_eq!(batch.records[1].kind, TxnKind::Expense);

    let plan = reconcile(&Default::default(), batch.records);
    assert_eq!(plan.new_records.len(), 1);
    assert_eq!(plan.duplicates, 1);
    let accepted = &plan.new_records[0];
    assert_eq!(accepted.date, common::date("2024-01-05"));
    assert_eq!(accepted.amount, common::dec("42.10"));
    assert_eq!(accepted.category.as_deref(), Some("other"));
    assert_eq!(
        fingerprint(accepted),
        "2024-01-05|expense|4210|coffee shop"
    );
}

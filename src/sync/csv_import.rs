// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;

use crate::error::{SyncError, SyncResult};
use crate::models::TxnKind;
use crate::sync::IncomingRecord;
use crate::utils::parse_flex_date;

/// Parsed CSV batch plus how many rows matched no layout hypothesis.
#[derive(Debug, Clone)]
pub struct CsvBatch {
    pub records: Vec<IncomingRecord>,
    pub skipped_rows: usize,
}

/// Parse CSV content with no assumed header row. Exports from different
/// sources vary in column order, so each row is tried against a fixed,
/// ordered sequence of layout hypotheses; the first one that yields a
/// parseable date and amount wins. Rows matching none are skipped, never
/// fatal. An input with zero valid rows is an explicit error.
pub fn parse_csv(content: &str) -> SyncResult<CsvBatch> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;
    for row in reader.records() {
        let Ok(row) = row else {
            skipped_rows += 1;
            continue;
        };
        if row.iter().all(|f| f.is_empty()) {
            continue;
        }
        match sniff_row(&row) {
            Some(record) => records.push(record),
            None => skipped_rows += 1,
        }
    }

    if records.is_empty() {
        return Err(SyncError::ImportFormat(
            "no valid records found in CSV input".to_string(),
        ));
    }
    Ok(CsvBatch {
        records,
        skipped_rows,
    })
}

/// Column-layout hypotheses, in the order they are tried.
fn sniff_row(row: &StringRecord) -> Option<IncomingRecord> {
    date_desc_amount_type_category(row)
        .or_else(|| date_amount_desc_cat_or_type(row))
        .or_else(|| date_desc_amount_cat_or_type(row))
        .or_else(|| date_amount_desc(row))
}

/// (date, description, amount, type, category)
fn date_desc_amount_type_category(row: &StringRecord) -> Option<IncomingRecord> {
    let date = parse_flex_date(row.get(0)?)?;
    let description = non_empty(row.get(1)?)?;
    let amount = parse_signed_amount(row.get(2)?)?;
    let kind = TxnKind::parse(row.get(3)?)?;
    let category = row.get(4).and_then(non_empty);
    Some(build(date, kind, amount, description, category))
}

/// (date, amount, description, category-or-type)
fn date_amount_desc_cat_or_type(row: &StringRecord) -> Option<IncomingRecord> {
    let date = parse_flex_date(row.get(0)?)?;
    let amount = parse_signed_amount(row.get(1)?)?;
    let description = non_empty(row.get(2)?)?;
    let (kind, category) = cat_or_type(row.get(3));
    Some(build(date, kind, amount, description, category))
}

/// (date, description, amount, category-or-type)
fn date_desc_amount_cat_or_type(row: &StringRecord) -> Option<IncomingRecord> {
    let date = parse_flex_date(row.get(0)?)?;
    let description = non_empty(row.get(1)?)?;
    let amount = parse_signed_amount(row.get(2)?)?;
    let (kind, category) = cat_or_type(row.get(3));
    Some(build(date, kind, amount, description, category))
}

/// (date, amount, description)
fn date_amount_desc(row: &StringRecord) -> Option<IncomingRecord> {
    let date = parse_flex_date(row.get(0)?)?;
    let amount = parse_signed_amount(row.get(1)?)?;
    let description = non_empty(row.get(2)?)?;
    Some(build(date, TxnKind::Expense, amount, description, None))
}

/// A trailing column that is either a type keyword or a category name.
/// Without an explicit type keyword a row is an expense, so the same
/// purchase exported with either sign convention fingerprints identically.
fn cat_or_type(field: Option<&str>) -> (TxnKind, Option<String>) {
    match field.and_then(non_empty) {
        Some(token) => match TxnKind::parse(&token) {
            Some(kind) => (kind, None),
            None => (TxnKind::Expense, Some(token)),
        },
        None => (TxnKind::Expense, None),
    }
}

/// Parse an amount as a magnitude; the sign is dropped because the
/// semantic sign is carried by the transaction kind.
fn parse_signed_amount(s: &str) -> Option<Decimal> {
    let raw = s.trim().replace(['$', ','], "");
    let value = raw.parse::<Decimal>().ok()?;
    Some(value.abs())
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn build(
    date: NaiveDate,
    kind: TxnKind,
    amount: Decimal,
    description: String,
    category: Option<String>,
) -> IncomingRecord {
    IncomingRecord {
        date,
        kind,
        amount,
        description,
        category,
        merchant: None,
        notes: None,
        external_id: None,
        account: None,
    }
}

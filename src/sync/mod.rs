// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod csv_import;
pub mod feed;
pub mod fingerprint;
pub mod reconcile;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::TxnKind;

/// A transaction-shaped record from any import source (bank feed or CSV),
/// already normalized: magnitude amount, sign folded into `kind`, no id
/// assigned yet.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingRecord {
    pub date: NaiveDate,
    pub kind: TxnKind,
    pub amount: Decimal,
    pub description: String,
    pub category: Option<String>,
    pub merchant: Option<String>,
    pub notes: Option<String>,
    /// Bank-feed transaction id; `None` for CSV rows.
    pub external_id: Option<String>,
    pub account: Option<String>,
}

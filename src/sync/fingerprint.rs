// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Transaction;

/// Largest accepted transaction magnitude. Records at or beyond this are
/// rejected per-record with a reason, never silently clamped.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Amount in integer minor units (cents), rounded half away from zero so
/// `12.5` and `12.50` compare equal and float-style representations can
/// never produce spurious mismatches.
pub fn amount_minor_units(amount: Decimal) -> i64 {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// Lowercase, whitespace-collapsed form of a description.
pub fn normalize_description(desc: &str) -> String {
    desc.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Duplicate-detection key: (date, kind, cents, normalized description).
/// Derived on demand from both incoming and existing records; never stored.
pub fn fingerprint(txn: &Transaction) -> String {
    format!(
        "{}|{}|{}|{}",
        txn.date,
        txn.kind.as_str(),
        amount_minor_units(txn.amount),
        normalize_description(&txn.description)
    )
}

// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::{DatasetData, Transaction};
use crate::sync::fingerprint::{fingerprint, MAX_AMOUNT};
use crate::sync::IncomingRecord;
use crate::utils::new_id;

/// Import results always report three counts, never a bare success flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub accepted: usize,
    pub duplicates: usize,
    pub invalid: usize,
}

/// What to do with the incoming batch. Pure data: the mutation controller
/// performs the actual writes.
#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    /// Records with no existing counterpart, ids freshly assigned.
    pub new_records: Vec<Transaction>,
    /// Refreshed versions of existing records matched by bank-feed id.
    pub updates: Vec<Transaction>,
    pub duplicates: usize,
    /// Per-record rejections with a reason; never fatal to the batch.
    pub rejected: Vec<(IncomingRecord, String)>,
}

impl ReconcilePlan {
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            accepted: self.new_records.len() + self.updates.len(),
            duplicates: self.duplicates,
            invalid: self.rejected.len(),
        }
    }
}

/// Decide, for each incoming record, whether it is new, an update to an
/// existing record, or a duplicate to discard.
///
/// An existing record sharing the incoming record's bank-feed id is
/// refreshed in place — except its category, which is only overwritten
/// when missing or no longer valid in the dataset. A user's manual
/// recategorization survives re-imports; that is policy, not accident.
pub fn reconcile(existing: &DatasetData, incoming: Vec<IncomingRecord>) -> ReconcilePlan {
    let mut seen: HashSet<String> = existing.transactions.iter().map(fingerprint).collect();
    let by_external: HashMap<&str, &Transaction> = existing
        .transactions
        .iter()
        .filter_map(|t| t.external_id.as_deref().map(|ext| (ext, t)))
        .collect();
    let valid_categories: HashSet<&str> =
        existing.categories.iter().map(|c| c.name.as_str()).collect();

    let mut plan = ReconcilePlan::default();
    for record in incoming {
        if record.amount >= MAX_AMOUNT {
            plan.rejected.push((
                record,
                format!("amount exceeds maximum of {}", MAX_AMOUNT),
            ));
            continue;
        }

        if let Some(current) = record
            .external_id
            .as_deref()
            .and_then(|ext| by_external.get(ext))
        {
            let refreshed = refresh(current, &record, &valid_categories);
            seen.insert(fingerprint(&refreshed));
            plan.updates.push(refreshed);
            continue;
        }

        let candidate = materialize(&record);
        let key = fingerprint(&candidate);
        if seen.contains(&key) {
            plan.duplicates += 1;
            continue;
        }
        seen.insert(key);
        plan.new_records.push(candidate);
    }
    plan
}

fn refresh(
    current: &Transaction,
    record: &IncomingRecord,
    valid_categories: &HashSet<&str>,
) -> Transaction {
    let keep_category = current
        .category
        .as_deref()
        .is_some_and(|name| valid_categories.contains(name));
    Transaction {
        id: current.id.clone(),
        date: record.date,
        kind: record.kind,
        amount: record.amount,
        description: record.description.clone(),
        category: if keep_category {
            current.category.clone()
        } else {
            record.category.clone()
        },
        merchant: record.merchant.clone().or_else(|| current.merchant.clone()),
        notes: current.notes.clone(),
        external_id: current.external_id.clone(),
        account: record.account.clone().or_else(|| current.account.clone()),
    }
}

fn materialize(record: &IncomingRecord) -> Transaction {
    Transaction {
        id: new_id("txn"),
        date: record.date,
        kind: record.kind,
        amount: record.amount,
        description: record.description.clone(),
        category: record.category.clone(),
        merchant: record.merchant.clone(),
        notes: record.notes.clone(),
        external_id: record.external_id.clone(),
        account: record.account.clone(),
    }
}

// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::adapter::PersistenceAdapter;
use crate::error::{SyncError, SyncResult};
use crate::models::{Category, Transaction, TxnKind, FALLBACK_CATEGORY};
use crate::store::LocalStore;
use crate::sync::reconcile::{reconcile, ImportSummary};
use crate::sync::IncomingRecord;
use crate::utils::new_id;

/// Result of an import after the optimistic write was confirmed or rolled
/// back. `batch_ids` is empty when nothing new was inserted.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub summary: ImportSummary,
    pub batch_ids: Vec<String>,
    /// Per-record rejection reasons (invalid rows), for display.
    pub rejected: Vec<String>,
}

/// Applies a user write to the local store immediately, issues the remote
/// call, and guarantees the local view converges to the remote's truth:
/// kept on success, reverted exactly on failure or denial.
///
/// Every write targets the dataset that was active when it was submitted
/// (the origin), never "whatever is active when the call returns" — a
/// dataset switch while a call is in flight must not corrupt the
/// now-active dataset.
pub struct MutationController<'a> {
    store: &'a mut LocalStore,
    adapter: &'a PersistenceAdapter,
    /// Edits queued per record id, drained in submission order. Edits are
    /// never coalesced; at most one remote write per record is in flight.
    pending_edits: HashMap<String, VecDeque<Transaction>>,
    in_flight: HashSet<String>,
}

impl<'a> MutationController<'a> {
    pub fn new(store: &'a mut LocalStore, adapter: &'a PersistenceAdapter) -> Self {
        MutationController {
            store,
            adapter,
            pending_edits: HashMap::new(),
            in_flight: HashSet::new(),
        }
    }

    pub fn store(&self) -> &LocalStore {
        self.store
    }

    // ---- transactions ----

    pub fn add_transaction(&mut self, txn: Transaction) -> SyncResult<Transaction> {
        let origin = self.store.active_id().to_string();
        self.store.update_dataset(&origin, |d| {
            d.transactions.push(txn.clone());
        })?;

        match self.adapter.create_transaction(&origin, &txn) {
            Ok(confirmed) => {
                if confirmed.id != txn.id {
                    // Remote assigned the durable id; swap it in.
                    self.apply_confirmed_transaction(&origin, &txn.id, confirmed.clone());
                }
                Ok(confirmed)
            }
            Err(e) => {
                let id = txn.id.clone();
                self.apply_to_origin(&origin, |d| {
                    d.transactions.retain(|t| t.id != id);
                });
                Err(e)
            }
        }
    }

    /// Land a remote confirmation for a record created while `origin` was
    /// active. The result goes to the origin dataset's collections even if
    /// the user has since switched datasets; when the origin is gone
    /// (evicted mid-flight) the result is discarded and `false` returned.
    pub fn apply_confirmed_transaction(
        &mut self,
        origin: &str,
        local_id: &str,
        confirmed: Transaction,
    ) -> bool {
        !self.apply_to_origin(origin, |d| {
            if let Some(t) = d.transactions.iter_mut().find(|t| t.id == local_id) {
                *t = confirmed.clone();
            }
        })
    }

    /// Submit an edit. Edits to the same record are applied and confirmed
    /// strictly in submission order.
    pub fn update_transaction(&mut self, updated: Transaction) -> SyncResult<()> {
        let record_id = updated.id.clone();
        self.pending_edits
            .entry(record_id.clone())
            .or_default()
            .push_back(updated);

        if self.in_flight.contains(&record_id) {
            // A write for this record is already in flight; the queued
            // edit will be submitted when it completes.
            return Ok(());
        }
        self.drain_edits(&record_id)
    }

    fn drain_edits(&mut self, record_id: &str) -> SyncResult<()> {
        self.in_flight.insert(record_id.to_string());
        let result = loop {
            let Some(next) = self
                .pending_edits
                .get_mut(record_id)
                .and_then(VecDeque::pop_front)
            else {
                break Ok(());
            };
            if let Err(e) = self.submit_edit(next) {
                break Err(e);
            }
        };
        self.in_flight.remove(record_id);
        self.pending_edits.remove(record_id);
        result
    }

    fn submit_edit(&mut self, updated: Transaction) -> SyncResult<()> {
        let origin = self.store.active_id().to_string();
        let pre_image = self
            .store
            .snapshot_of(&origin)
            .and_then(|d| d.transaction(&updated.id).cloned())
            .ok_or_else(|| SyncError::not_found("transaction"))?;

        self.store.update_dataset(&origin, |d| {
            if let Some(t) = d.transactions.iter_mut().find(|t| t.id == updated.id) {
                *t = updated.clone();
            }
        })?;

        match self.adapter.update_transaction(&origin, &updated) {
            Ok(_) => Ok(()),
            Err(e) => {
                // Revert to the pre-image exactly.
                self.apply_to_origin(&origin, |d| {
                    if let Some(t) = d.transactions.iter_mut().find(|t| t.id == pre_image.id) {
                        *t = pre_image.clone();
                    }
                });
                Err(e)
            }
        }
    }

    pub fn delete_transaction(&mut self, id: &str) -> SyncResult<()> {
        let origin = self.store.active_id().to_string();
        let data = self
            .store
            .snapshot_of(&origin)
            .ok_or_else(|| SyncError::not_found("dataset"))?;
        let position = data
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| SyncError::not_found("transaction"))?;
        let pre_image = data.transactions[position].clone();

        self.store.update_dataset(&origin, |d| {
            d.transactions.retain(|t| t.id != id);
        })?;

        match self.adapter.delete_transaction(&origin, id) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.apply_to_origin(&origin, |d| {
                    let at = position.min(d.transactions.len());
                    d.transactions.insert(at, pre_image.clone());
                });
                Err(e)
            }
        }
    }

    // ---- import ----

    /// Reconcile and apply an import batch: accepted records are inserted
    /// optimistically, tagged as the current batch; a remote failure
    /// removes every record of the batch, restoring the pre-import view.
    pub fn import_records(&mut self, incoming: Vec<IncomingRecord>) -> SyncResult<ImportOutcome> {
        let origin = self.store.active_id().to_string();
        let before = self
            .store
            .snapshot_of(&origin)
            .ok_or_else(|| SyncError::not_found("dataset"))?;

        let plan = reconcile(&before, incoming);
        let summary = plan.summary();
        let rejected = plan
            .rejected
            .iter()
            .map(|(r, reason)| format!("{} {}: {}", r.date, r.description, reason))
            .collect::<Vec<_>>();

        if plan.new_records.is_empty() && plan.updates.is_empty() {
            return Ok(ImportOutcome {
                summary,
                batch_ids: Vec::new(),
                rejected,
            });
        }

        let batch_ids: Vec<String> = plan.new_records.iter().map(|t| t.id.clone()).collect();
        let updates = plan.updates.clone();
        let new_records = plan.new_records.clone();
        let pre_transactions = before.transactions.clone();
        let pre_batch = before.last_import_batch_ids.clone();

        self.store.update_dataset(&origin, |d| {
            for u in &updates {
                if let Some(t) = d.transactions.iter_mut().find(|t| t.id == u.id) {
                    *t = u.clone();
                }
            }
            d.transactions.extend(new_records.iter().cloned());
            d.last_import_batch_ids = batch_ids.clone();
        })?;

        let remote_result = self.confirm_import(&origin, &plan.new_records, &plan.updates);
        match remote_result {
            Ok(confirmed) => {
                if !confirmed.is_empty() {
                    let local_ids = batch_ids.clone();
                    self.apply_to_origin(&origin, |d| {
                        for (local_id, remote_txn) in local_ids.iter().zip(&confirmed) {
                            if let Some(t) = d.transactions.iter_mut().find(|t| &t.id == local_id) {
                                *t = remote_txn.clone();
                            }
                        }
                        d.last_import_batch_ids =
                            confirmed.iter().map(|t| t.id.clone()).collect();
                    });
                }
                Ok(ImportOutcome {
                    summary,
                    batch_ids,
                    rejected,
                })
            }
            Err(e) => {
                // Remove everything carrying this batch id and restore the
                // refreshed records, i.e. the exact pre-import view.
                self.apply_to_origin(&origin, |d| {
                    d.transactions = pre_transactions.clone();
                    d.last_import_batch_ids = pre_batch.clone();
                });
                Err(e)
            }
        }
    }

    fn confirm_import(
        &mut self,
        origin: &str,
        new_records: &[Transaction],
        updates: &[Transaction],
    ) -> SyncResult<Vec<Transaction>> {
        let confirmed = if new_records.is_empty() {
            Vec::new()
        } else {
            self.adapter.bulk_create_transactions(origin, new_records)?
        };
        for u in updates {
            self.adapter.update_transaction(origin, u)?;
        }
        Ok(confirmed)
    }

    /// One-shot rollback of the most recent import. Each record leaves the
    /// local store as its remote delete confirms, so an undo interrupted by
    /// a failure resumes where it stopped: the remaining batch ids stay
    /// recorded, and rows the remote no longer has count as already undone.
    pub fn undo_last_import(&mut self) -> SyncResult<usize> {
        let origin = self.store.active_id().to_string();
        let batch = self
            .store
            .snapshot_of(&origin)
            .map(|d| d.last_import_batch_ids)
            .unwrap_or_default();
        if batch.is_empty() {
            return Ok(0);
        }
        let mut removed = 0usize;
        for id in &batch {
            match self.adapter.delete_transaction(&origin, id) {
                Ok(()) | Err(SyncError::NotFound { .. }) => {
                    removed += 1;
                    self.apply_to_origin(&origin, |d| {
                        d.transactions.retain(|t| &t.id != id);
                        d.last_import_batch_ids.retain(|b| b != id);
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }

    // ---- categories ----

    pub fn add_category(&mut self, cat: Category) -> SyncResult<Category> {
        let origin = self.store.active_id().to_string();
        if self
            .store
            .snapshot_of(&origin)
            .is_some_and(|d| d.category_named(&cat.name).is_some())
        {
            return Err(SyncError::validation(
                "category",
                format!("'{}' already exists", cat.name),
            ));
        }
        self.store.update_dataset(&origin, |d| {
            d.categories.push(cat.clone());
        })?;
        match self.adapter.create_category(&origin, &cat) {
            Ok(confirmed) => Ok(confirmed),
            Err(e) => {
                let id = cat.id.clone();
                self.apply_to_origin(&origin, |d| {
                    d.categories.retain(|c| c.id != id);
                });
                Err(e)
            }
        }
    }

    /// Delete a category. Referencing transactions and recurring rules are
    /// re-pointed to the fallback category first; a reference may never be
    /// left dangling.
    pub fn delete_category(&mut self, name: &str) -> SyncResult<()> {
        if name == FALLBACK_CATEGORY {
            return Err(SyncError::validation(
                "category",
                "the fallback category cannot be deleted",
            ));
        }
        let origin = self.store.active_id().to_string();
        let before = self
            .store
            .snapshot_of(&origin)
            .ok_or_else(|| SyncError::not_found("dataset"))?;
        let target = before
            .category_named(name)
            .cloned()
            .ok_or_else(|| SyncError::not_found("category"))?;

        // The fallback may not exist yet; creating it is part of the same
        // optimistic write so a failure anywhere reverts it too.
        let existing_fallback = before.category_named(FALLBACK_CATEGORY).cloned();
        let fallback = existing_fallback.clone().unwrap_or_else(|| Category {
            id: new_id("cat"),
            name: FALLBACK_CATEGORY.to_string(),
            color: "#9e9e9e".to_string(),
            monthly_budget: None,
            kind: TxnKind::Expense,
        });
        let repointed: Vec<Transaction> = before
            .transactions
            .iter()
            .filter(|t| t.category.as_deref() == Some(name))
            .map(|t| {
                let mut t = t.clone();
                t.category = Some(fallback.name.clone());
                t
            })
            .collect();

        let pre_transactions = before.transactions.clone();
        let pre_rules = before.recurring_rules.clone();
        let pre_categories = before.categories.clone();

        self.store.update_dataset(&origin, |d| {
            if existing_fallback.is_none() {
                d.categories.push(fallback.clone());
            }
            for t in &mut d.transactions {
                if t.category.as_deref() == Some(name) {
                    t.category = Some(fallback.name.clone());
                }
            }
            for r in &mut d.recurring_rules {
                if r.category.as_deref() == Some(name) {
                    r.category = Some(fallback.name.clone());
                }
            }
            d.categories.retain(|c| c.name != name);
        })?;

        let remote_result = (|| -> SyncResult<()> {
            if existing_fallback.is_none() {
                self.adapter.create_category(&origin, &fallback)?;
            }
            for t in &repointed {
                self.adapter.update_transaction(&origin, t)?;
            }
            self.adapter.delete_category(&origin, &target.id)
        })();

        match remote_result {
            Ok(()) => Ok(()),
            Err(e) => {
                self.apply_to_origin(&origin, |d| {
                    d.transactions = pre_transactions.clone();
                    d.recurring_rules = pre_rules.clone();
                    d.categories = pre_categories.clone();
                });
                Err(e)
            }
        }
    }

    /// Apply a mutation to the origin dataset. Returns `true` when the
    /// origin is gone (evicted mid-flight) and the result was discarded.
    fn apply_to_origin<F>(&mut self, origin: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut crate::models::DatasetData),
    {
        self.store.update_dataset(origin, mutate).is_err()
    }
}

/// Pull a dataset's collections from the remote and replace the local
/// cache. Returns `false` in local-only mode, where there is no remote to
/// reload from.
pub fn reload_dataset(
    store: &mut LocalStore,
    adapter: &PersistenceAdapter,
    dataset_id: &str,
) -> SyncResult<bool> {
    match adapter.load_dataset(dataset_id)? {
        Some(data) => {
            store.replace_dataset(dataset_id, data)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

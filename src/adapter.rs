// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{SyncError, SyncResult};
use crate::models::{Category, DatasetData, DatasetSummary, Transaction};
use crate::remote::{Collection, ListFilter, RemoteApi, RemoteError};

#[derive(Clone)]
pub enum Mode {
    /// The local document is the durable copy; confirms are no-ops.
    LocalOnly,
    /// The remote store is the durable copy; the local store is a cache.
    Remote {
        api: Rc<dyn RemoteApi>,
        actor_id: String,
    },
}

/// One uniform create/update/delete/list surface regardless of backing
/// store. In remote mode every call is wrapped so callers see a typed
/// result distinguishing explicit errors from permission denials.
///
/// The load-bearing contract: the remote enforces visibility rules by
/// silently filtering rows, so a write that comes back with no data is a
/// denial, not a success and not a "not found" — unless a follow-up probe
/// shows the row is actually gone.
pub struct PersistenceAdapter {
    mode: Mode,
}

impl PersistenceAdapter {
    pub fn local_only() -> PersistenceAdapter {
        PersistenceAdapter {
            mode: Mode::LocalOnly,
        }
    }

    pub fn remote(api: Rc<dyn RemoteApi>, actor_id: &str) -> PersistenceAdapter {
        PersistenceAdapter {
            mode: Mode::Remote {
                api,
                actor_id: actor_id.to_string(),
            },
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.mode, Mode::Remote { .. })
    }

    pub fn actor_id(&self) -> Option<&str> {
        match &self.mode {
            Mode::LocalOnly => None,
            Mode::Remote { actor_id, .. } => Some(actor_id),
        }
    }

    // ---- transactions ----

    pub fn create_transaction(
        &self,
        dataset_id: &str,
        txn: &Transaction,
    ) -> SyncResult<Transaction> {
        self.create_row(dataset_id, Collection::Transactions, txn, "create transaction")
    }

    pub fn update_transaction(
        &self,
        dataset_id: &str,
        txn: &Transaction,
    ) -> SyncResult<Transaction> {
        self.update_row(
            dataset_id,
            Collection::Transactions,
            &txn.id,
            txn,
            "update transaction",
        )
    }

    pub fn delete_transaction(&self, dataset_id: &str, id: &str) -> SyncResult<()> {
        self.delete_row(dataset_id, Collection::Transactions, id, "delete transaction")
    }

    pub fn bulk_create_transactions(
        &self,
        dataset_id: &str,
        txns: &[Transaction],
    ) -> SyncResult<Vec<Transaction>> {
        match &self.mode {
            Mode::LocalOnly => Ok(txns.to_vec()),
            Mode::Remote { api, actor_id } => {
                let rows = txns
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| SyncError::Storage(e.to_string()))?;
                let created = api
                    .bulk_create(dataset_id, actor_id, Collection::Transactions, rows)
                    .map_err(|e| map_remote("bulk import", e))?
                    .ok_or_else(|| SyncError::denied("bulk import"))?;
                created
                    .into_iter()
                    .map(|v| from_row(v))
                    .collect::<SyncResult<Vec<Transaction>>>()
            }
        }
    }

    // ---- categories ----

    pub fn create_category(&self, dataset_id: &str, cat: &Category) -> SyncResult<Category> {
        self.create_row(dataset_id, Collection::Categories, cat, "create category")
    }

    pub fn update_category(&self, dataset_id: &str, cat: &Category) -> SyncResult<Category> {
        self.update_row(
            dataset_id,
            Collection::Categories,
            &cat.id,
            cat,
            "update category",
        )
    }

    pub fn delete_category(&self, dataset_id: &str, id: &str) -> SyncResult<()> {
        self.delete_row(dataset_id, Collection::Categories, id, "delete category")
    }

    // ---- dataset-level operations ----

    /// Pull every collection of a dataset from the remote. `Ok(None)` in
    /// local-only mode, where there is nothing to reload from.
    pub fn load_dataset(&self, dataset_id: &str) -> SyncResult<Option<DatasetData>> {
        let Mode::Remote { api, .. } = &self.mode else {
            return Ok(None);
        };
        let filter = ListFilter::default();
        let data = DatasetData {
            transactions: list_typed(api.as_ref(), dataset_id, Collection::Transactions, &filter)?,
            categories: list_typed(api.as_ref(), dataset_id, Collection::Categories, &filter)?,
            savings_goals: list_typed(api.as_ref(), dataset_id, Collection::SavingsGoals, &filter)?,
            financial_goals: list_typed(
                api.as_ref(),
                dataset_id,
                Collection::FinancialGoals,
                &filter,
            )?,
            debts: list_typed(api.as_ref(), dataset_id, Collection::Debts, &filter)?,
            recurring_rules: list_typed(
                api.as_ref(),
                dataset_id,
                Collection::RecurringRules,
                &filter,
            )?,
            last_import_batch_ids: Vec::new(),
        };
        Ok(Some(data))
    }

    /// Enumerate the datasets the current user can still see. `Ok(None)`
    /// when there is no remote session.
    pub fn accessible_datasets(&self) -> SyncResult<Option<Vec<DatasetSummary>>> {
        match &self.mode {
            Mode::LocalOnly => Ok(None),
            Mode::Remote { api, actor_id } => api
                .accessible_datasets(actor_id)
                .map(Some)
                .map_err(|e| map_remote("list datasets", e)),
        }
    }

    pub fn create_dataset(&self, name: &str) -> SyncResult<DatasetSummary> {
        match &self.mode {
            Mode::LocalOnly => Ok(DatasetSummary {
                id: crate::utils::new_id("ds"),
                name: name.to_string(),
                remote: false,
            }),
            Mode::Remote { api, actor_id } => api
                .create_dataset(actor_id, name)
                .map_err(|e| map_remote("create dataset", e)),
        }
    }

    // ---- generic row plumbing ----

    fn create_row<T>(
        &self,
        dataset_id: &str,
        collection: Collection,
        record: &T,
        action: &str,
    ) -> SyncResult<T>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        match &self.mode {
            Mode::LocalOnly => Ok(record.clone()),
            Mode::Remote { api, actor_id } => {
                let row = to_row(record)?;
                let created = api
                    .create(dataset_id, actor_id, collection, row)
                    .map_err(|e| map_remote(action, e))?;
                // No data back from a create is always a denial.
                match created {
                    Some(v) => from_row(v),
                    None => Err(SyncError::denied(action)),
                }
            }
        }
    }

    fn update_row<T>(
        &self,
        dataset_id: &str,
        collection: Collection,
        id: &str,
        record: &T,
        action: &str,
    ) -> SyncResult<T>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        match &self.mode {
            Mode::LocalOnly => Ok(record.clone()),
            Mode::Remote { api, .. } => {
                let patch = to_row(record)?;
                let updated = api
                    .update(collection, id, patch)
                    .map_err(|e| map_remote(action, e))?;
                match updated {
                    Some(v) => from_row(v),
                    None => Err(self.probe_denial(dataset_id, collection, id, action)),
                }
            }
        }
    }

    fn delete_row(
        &self,
        dataset_id: &str,
        collection: Collection,
        id: &str,
        action: &str,
    ) -> SyncResult<()> {
        match &self.mode {
            Mode::LocalOnly => Ok(()),
            Mode::Remote { api, .. } => {
                let affected = api
                    .delete(collection, id)
                    .map_err(|e| map_remote(action, e))?;
                match affected {
                    Some(()) => Ok(()),
                    None => Err(self.probe_denial(dataset_id, collection, id, action)),
                }
            }
        }
    }

    /// Zero rows after a write is ambiguous: a visibility rule may have
    /// blocked it, or someone else deleted the row concurrently. Probe for
    /// the row to tell the two apart rather than conflating them.
    fn probe_denial(
        &self,
        dataset_id: &str,
        collection: Collection,
        id: &str,
        action: &str,
    ) -> SyncError {
        let Mode::Remote { api, .. } = &self.mode else {
            return SyncError::denied(action);
        };
        match api.list(dataset_id, collection, &ListFilter::by_id(id)) {
            Ok(rows) if rows.is_empty() => SyncError::not_found(collection.as_str()),
            // Row still visible, or the probe itself failed: report the
            // conservative answer.
            _ => SyncError::denied(action),
        }
    }
}

fn list_typed<T: DeserializeOwned>(
    api: &dyn RemoteApi,
    dataset_id: &str,
    collection: Collection,
    filter: &ListFilter,
) -> SyncResult<Vec<T>> {
    let rows = api
        .list(dataset_id, collection, filter)
        .map_err(|e| map_remote("load dataset", e))?;
    rows.into_iter().map(|v| from_row(v)).collect()
}

fn to_row<T: Serialize>(record: &T) -> SyncResult<Value> {
    serde_json::to_value(record).map_err(|e| SyncError::Storage(e.to_string()))
}

fn from_row<T: DeserializeOwned>(row: Value) -> SyncResult<T> {
    serde_json::from_value(row).map_err(|e| SyncError::Storage(e.to_string()))
}

fn map_remote(action: &str, e: RemoteError) -> SyncError {
    SyncError::network(action, e.to_string())
}

// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use tallysync::models::{DatasetSummary, Membership, Transaction, TxnKind};
use tallysync::remote::{Collection, ListFilter, RemoteApi, RemoteError};
use tallysync::sync::IncomingRecord;

/// Scripted in-memory remote. Rows live per (dataset id, collection); the
/// deny/fail switches model silent visibility filtering and outages.
#[derive(Default)]
pub struct FakeRemote {
    pub rows: RefCell<HashMap<(String, &'static str), Vec<Value>>>,
    pub datasets: RefCell<Vec<DatasetSummary>>,
    /// When non-empty, writes require the actor to hold a membership on
    /// the target dataset; everyone is trusted otherwise.
    pub memberships: RefCell<Vec<Membership>>,
    /// Creates (and bulk creates) come back with no row: a denial.
    pub deny_writes: Cell<bool>,
    /// Updates/deletes affect zero rows without removing anything.
    pub swallow_writes: Cell<bool>,
    /// Every call fails with a transport error.
    pub offline: Cell<bool>,
    /// Only dataset creation fails; everything else stays reachable.
    pub fail_create_dataset: Cell<bool>,
    /// Rewrite ids on create, the way a real backend assigns them.
    pub assign_ids: Cell<bool>,
    pub calls: RefCell<Vec<String>>,
    next_id: Cell<u64>,
}

impl FakeRemote {
    pub fn new() -> FakeRemote {
        FakeRemote::default()
    }

    pub fn with_datasets(datasets: Vec<DatasetSummary>) -> FakeRemote {
        let remote = FakeRemote::new();
        *remote.datasets.borrow_mut() = datasets;
        remote
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn seed_row(&self, dataset_id: &str, collection: Collection, row: Value) {
        self.rows
            .borrow_mut()
            .entry((dataset_id.to_string(), collection.as_str()))
            .or_default()
            .push(row);
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.offline.get() {
            Err(RemoteError::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn write_allowed(&self, dataset_id: &str, actor_id: &str) -> bool {
        let memberships = self.memberships.borrow();
        memberships.is_empty()
            || memberships
                .iter()
                .any(|m| m.dataset_id == dataset_id && m.user_id == actor_id)
    }

    fn fresh_id(&self) -> String {
        let n = self.next_id.get();
        self.next_id.set(n + 1);
        format!("remote_{}", n)
    }
}

impl RemoteApi for FakeRemote {
    fn create(
        &self,
        dataset_id: &str,
        actor_id: &str,
        collection: Collection,
        mut row: Value,
    ) -> Result<Option<Value>, RemoteError> {
        self.log(format!("create {} {}", collection.as_str(), dataset_id));
        self.check_online()?;
        if self.deny_writes.get() || !self.write_allowed(dataset_id, actor_id) {
            return Ok(None);
        }
        if self.assign_ids.get() {
            row["id"] = Value::String(self.fresh_id());
        }
        self.seed_row(dataset_id, collection, row.clone());
        Ok(Some(row))
    }

    fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Option<Value>, RemoteError> {
        self.log(format!("update {} {}", collection.as_str(), id));
        self.check_online()?;
        if self.swallow_writes.get() {
            return Ok(None);
        }
        let mut rows = self.rows.borrow_mut();
        for ((_, coll), list) in rows.iter_mut() {
            if *coll != collection.as_str() {
                continue;
            }
            if let Some(slot) = list
                .iter_mut()
                .find(|v| v.get("id").and_then(Value::as_str) == Some(id))
            {
                *slot = patch.clone();
                return Ok(Some(patch));
            }
        }
        Ok(None)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<Option<()>, RemoteError> {
        self.log(format!("delete {} {}", collection.as_str(), id));
        self.check_online()?;
        if self.swallow_writes.get() {
            return Ok(None);
        }
        let mut rows = self.rows.borrow_mut();
        for ((_, coll), list) in rows.iter_mut() {
            if *coll != collection.as_str() {
                continue;
            }
            let before = list.len();
            list.retain(|v| v.get("id").and_then(Value::as_str) != Some(id));
            if list.len() < before {
                return Ok(Some(()));
            }
        }
        Ok(None)
    }

    fn list(
        &self,
        dataset_id: &str,
        collection: Collection,
        filter: &ListFilter,
    ) -> Result<Vec<Value>, RemoteError> {
        self.log(format!("list {} {}", collection.as_str(), dataset_id));
        self.check_online()?;
        let rows = self.rows.borrow();
        let all = rows
            .get(&(dataset_id.to_string(), collection.as_str()))
            .cloned()
            .unwrap_or_default();
        Ok(match &filter.id {
            Some(id) => all
                .into_iter()
                .filter(|v| v.get("id").and_then(Value::as_str) == Some(id.as_str()))
                .collect(),
            None => all,
        })
    }

    fn bulk_create(
        &self,
        dataset_id: &str,
        actor_id: &str,
        collection: Collection,
        rows: Vec<Value>,
    ) -> Result<Option<Vec<Value>>, RemoteError> {
        self.log(format!(
            "bulk_create {} {} x{}",
            collection.as_str(),
            dataset_id,
            rows.len()
        ));
        self.check_online()?;
        if self.deny_writes.get() || !self.write_allowed(dataset_id, actor_id) {
            return Ok(None);
        }
        let mut created = Vec::with_capacity(rows.len());
        for mut row in rows {
            if self.assign_ids.get() {
                row["id"] = Value::String(self.fresh_id());
            }
            self.seed_row(dataset_id, collection, row.clone());
            created.push(row);
        }
        Ok(Some(created))
    }

    fn accessible_datasets(&self, _user_id: &str) -> Result<Vec<DatasetSummary>, RemoteError> {
        self.log("accessible_datasets");
        self.check_online()?;
        Ok(self.datasets.borrow().clone())
    }

    fn create_dataset(&self, _user_id: &str, name: &str) -> Result<DatasetSummary, RemoteError> {
        self.log(format!("create_dataset {}", name));
        self.check_online()?;
        if self.fail_create_dataset.get() {
            return Err(RemoteError::Api {
                status: 500,
                message: "dataset quota backend unavailable".to_string(),
            });
        }
        let summary = DatasetSummary {
            id: self.fresh_id(),
            name: name.to_string(),
            remote: true,
        };
        self.datasets.borrow_mut().push(summary.clone());
        Ok(summary)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn txn(id: &str, day: &str, kind: TxnKind, amount: &str, description: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        date: date(day),
        kind,
        amount: dec(amount),
        description: description.to_string(),
        category: None,
        merchant: None,
        notes: None,
        external_id: None,
        account: None,
    }
}

pub fn record(day: &str, kind: TxnKind, amount: &str, description: &str) -> IncomingRecord {
    IncomingRecord {
        date: date(day),
        kind,
        amount: dec(amount),
        description: description.to_string(),
        category: None,
        merchant: None,
        notes: None,
        external_id: None,
        account: None,
    }
}

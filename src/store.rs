// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::PathBuf;

use crate::error::{SyncError, SyncResult};
use crate::models::{DatasetData, DatasetSummary, Document, DEFAULT_DATASET_ID};
use crate::paths::quarantine_path;

/// How the store persists. In local-only mode every mutation rewrites the
/// whole document; in remote mode the remote call is the durable write and
/// local persistence is a no-op.
#[derive(Debug, Clone)]
pub enum PersistMode {
    LocalFile(PathBuf),
    RemoteBacked,
}

/// Change notifications. Dataset-selector subscribers only need
/// `ActiveSwitched`; data renderers need `DataChanged`.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    DataChanged { dataset_id: String },
    ActiveSwitched { from: String, to: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn Fn(&StoreEvent)>;

/// The single shared mutable resource: the active dataset's collections,
/// held in memory and persisted on write. All mutation goes through the
/// accessor methods, which are synchronous and never perform remote I/O
/// mid-mutation, so no event can observe a half-updated state.
pub struct LocalStore {
    doc: Document,
    mode: PersistMode,
    subscribers: Vec<(u64, Subscriber)>,
    next_sub: u64,
}

impl LocalStore {
    /// Open the persisted document at `path`, healing a corrupt blob by
    /// quarantining it and starting from a fresh default.
    pub fn open(path: PathBuf) -> SyncResult<LocalStore> {
        let doc = load_or_reset(&path)?;
        Ok(LocalStore {
            doc,
            mode: PersistMode::LocalFile(path),
            subscribers: Vec::new(),
            next_sub: 0,
        })
    }

    /// A store whose durable copy lives remotely; local state is a read
    /// cache populated from remote calls.
    pub fn remote_backed() -> LocalStore {
        LocalStore {
            doc: Document::default(),
            mode: PersistMode::RemoteBacked,
            subscribers: Vec::new(),
            next_sub: 0,
        }
    }

    /// In-memory local store, mostly for tests.
    pub fn ephemeral() -> LocalStore {
        LocalStore {
            doc: Document::default(),
            mode: PersistMode::RemoteBacked,
            subscribers: Vec::new(),
            next_sub: 0,
        }
    }

    pub fn mode(&self) -> &PersistMode {
        &self.mode
    }

    pub fn active_id(&self) -> &str {
        &self.doc.active_dataset_id
    }

    pub fn datasets(&self) -> &[DatasetSummary] {
        &self.doc.datasets
    }

    /// Deep, defensively-copied snapshot of the active dataset. Mutating
    /// the returned value never affects store state.
    pub fn snapshot(&self) -> DatasetData {
        self.doc
            .data_by_dataset
            .get(&self.doc.active_dataset_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn snapshot_of(&self, dataset_id: &str) -> Option<DatasetData> {
        self.doc.data_by_dataset.get(dataset_id).cloned()
    }

    /// Mutate the active dataset in place, then persist and notify.
    pub fn update_active<F>(&mut self, mutate: F) -> SyncResult<()>
    where
        F: FnOnce(&mut DatasetData),
    {
        let id = self.doc.active_dataset_id.clone();
        self.update_dataset(&id, mutate)
    }

    /// Mutate a dataset by id. The mutation controller uses this with the
    /// dataset id captured *before* a remote call, so a result arriving
    /// after a dataset switch can never touch the now-active dataset.
    pub fn update_dataset<F>(&mut self, dataset_id: &str, mutate: F) -> SyncResult<()>
    where
        F: FnOnce(&mut DatasetData),
    {
        let Some(data) = self.doc.data_by_dataset.get_mut(dataset_id) else {
            return Err(SyncError::not_found("dataset"));
        };
        mutate(data);
        self.persist()?;
        self.emit(&StoreEvent::DataChanged {
            dataset_id: dataset_id.to_string(),
        });
        Ok(())
    }

    /// Replace a dataset's collections wholesale (full reload from remote).
    pub fn replace_dataset(&mut self, dataset_id: &str, data: DatasetData) -> SyncResult<()> {
        self.doc
            .data_by_dataset
            .insert(dataset_id.to_string(), data);
        self.persist()?;
        self.emit(&StoreEvent::DataChanged {
            dataset_id: dataset_id.to_string(),
        });
        Ok(())
    }

    /// Change which dataset is active, initializing an empty default
    /// dataset if none exists for that id. Emits `ActiveSwitched`, not
    /// `DataChanged`.
    pub fn switch_active(&mut self, dataset_id: &str) -> SyncResult<()> {
        if self.doc.active_dataset_id == dataset_id {
            return Ok(());
        }
        if !self.doc.data_by_dataset.contains_key(dataset_id) {
            self.doc
                .data_by_dataset
                .insert(dataset_id.to_string(), DatasetData::default());
        }
        if !self.doc.datasets.iter().any(|d| d.id == dataset_id) {
            self.doc.datasets.push(DatasetSummary {
                id: dataset_id.to_string(),
                name: dataset_id.to_string(),
                remote: false,
            });
        }
        let from = std::mem::replace(&mut self.doc.active_dataset_id, dataset_id.to_string());
        self.persist()?;
        self.emit(&StoreEvent::ActiveSwitched {
            from,
            to: dataset_id.to_string(),
        });
        Ok(())
    }

    /// Register a dataset summary without switching to it.
    pub fn ensure_dataset(&mut self, summary: DatasetSummary) -> SyncResult<()> {
        if !self.doc.data_by_dataset.contains_key(&summary.id) {
            self.doc
                .data_by_dataset
                .insert(summary.id.clone(), DatasetData::default());
        }
        if let Some(existing) = self.doc.datasets.iter_mut().find(|d| d.id == summary.id) {
            *existing = summary;
        } else {
            self.doc.datasets.push(summary);
        }
        self.persist()
    }

    /// Drop a dataset the user can no longer see. The watchdog calls this
    /// for the evicted dataset after switching away from it.
    pub fn forget_dataset(&mut self, dataset_id: &str) -> SyncResult<()> {
        if self.doc.active_dataset_id == dataset_id {
            return Err(SyncError::validation(
                "dataset",
                "cannot forget the active dataset",
            ));
        }
        self.doc.datasets.retain(|d| d.id != dataset_id);
        self.doc.data_by_dataset.remove(dataset_id);
        self.persist()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + 'static,
    {
        let id = self.next_sub;
        self.next_sub += 1;
        self.subscribers.push((id, Box::new(callback)));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sid, _)| *sid != id.0);
    }

    fn emit(&self, event: &StoreEvent) {
        for (_, callback) in &self.subscribers {
            callback(event);
        }
    }

    fn persist(&self) -> SyncResult<()> {
        match &self.mode {
            PersistMode::RemoteBacked => Ok(()),
            PersistMode::LocalFile(path) => {
                let body = serde_json::to_string_pretty(&self.doc)
                    .map_err(|e| SyncError::Storage(e.to_string()))?;
                fs::write(path, body).map_err(|e| SyncError::Storage(e.to_string()))
            }
        }
    }
}

fn load_or_reset(path: &PathBuf) -> SyncResult<Document> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Document::default());
        }
        Err(e) => return Err(SyncError::Storage(e.to_string())),
    };

    match serde_json::from_str::<Document>(&raw) {
        Ok(mut doc) => {
            // The active pointer must always reference a known dataset.
            if !doc.data_by_dataset.contains_key(&doc.active_dataset_id) {
                doc.active_dataset_id = doc
                    .datasets
                    .first()
                    .map(|d| d.id.clone())
                    .unwrap_or_else(|| DEFAULT_DATASET_ID.to_string());
                doc.data_by_dataset
                    .entry(doc.active_dataset_id.clone())
                    .or_default();
            }
            Ok(doc)
        }
        Err(_) => {
            // Heal by reset, but keep the corrupt blob for debugging.
            let _ = fs::rename(path, quarantine_path(path));
            Ok(Document::default())
        }
    }
}

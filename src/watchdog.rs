// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::{Duration, Instant};

use crate::adapter::PersistenceAdapter;
use crate::controller::reload_dataset;
use crate::models::{DatasetSummary, DEFAULT_DATASET_ID};
use crate::store::LocalStore;

/// Fixed poll period while watching: near-real-time eviction without
/// per-keystroke request volume.
pub const POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Minimum gap between activity-triggered checks, regardless of how much
/// mouse/keyboard/touch activity arrives.
pub const ACTIVITY_COOLDOWN: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// No active remote session.
    Idle,
    /// Remote session active; periodic check armed.
    Watching,
    /// A validation call is in flight.
    Checking,
    /// The active dataset vanished from the accessible list.
    Evicting,
}

/// What the user gets told, exactly once, after losing access.
#[derive(Debug, Clone, PartialEq)]
pub struct Eviction {
    pub lost_dataset: String,
    pub switched_to: String,
    pub notice: String,
    /// True when the user had zero accessible datasets left and a default
    /// was created on their behalf.
    pub created_default: bool,
}

/// Detects, within a bounded window, that the current user can no longer
/// see the active dataset — removed by an owner, or the dataset deleted —
/// and evicts them before they issue further writes against it.
///
/// Push/realtime signals are only an early trigger for the same check:
/// push delivery to a just-removed user is not guaranteed, so polling is
/// the authority. The host event loop drives this with explicit instants;
/// there are no internal timers or threads.
pub struct AccessWatchdog {
    state: WatchState,
    last_check: Option<Instant>,
    last_activity_check: Option<Instant>,
}

impl AccessWatchdog {
    pub fn new() -> AccessWatchdog {
        AccessWatchdog {
            state: WatchState::Idle,
            last_check: None,
            last_activity_check: None,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Arm the watchdog for an active remote session.
    pub fn start(&mut self, now: Instant) {
        self.state = WatchState::Watching;
        self.last_check = Some(now);
    }

    pub fn stop(&mut self) {
        self.state = WatchState::Idle;
        self.last_check = None;
        self.last_activity_check = None;
    }

    /// Periodic driver. Runs a check when the poll interval has elapsed.
    pub fn on_tick(
        &mut self,
        now: Instant,
        store: &mut LocalStore,
        adapter: &PersistenceAdapter,
    ) -> Option<Eviction> {
        if self.state != WatchState::Watching {
            return None;
        }
        let due = self
            .last_check
            .is_none_or(|t| now.duration_since(t) >= POLL_INTERVAL);
        if !due {
            return None;
        }
        self.run_check(now, store, adapter)
    }

    /// Opportunistic driver: user activity revalidates access early, but
    /// no more than once per cooldown window.
    pub fn on_activity(
        &mut self,
        now: Instant,
        store: &mut LocalStore,
        adapter: &PersistenceAdapter,
    ) -> Option<Eviction> {
        if self.state != WatchState::Watching {
            return None;
        }
        let throttled = self
            .last_activity_check
            .is_some_and(|t| now.duration_since(t) < ACTIVITY_COOLDOWN);
        if throttled {
            return None;
        }
        self.last_activity_check = Some(now);
        self.run_check(now, store, adapter)
    }

    /// A push/realtime membership signal. Never trusted on its own; it
    /// just brings the next validation forward.
    pub fn on_push(
        &mut self,
        now: Instant,
        store: &mut LocalStore,
        adapter: &PersistenceAdapter,
    ) -> Option<Eviction> {
        if self.state != WatchState::Watching {
            return None;
        }
        self.run_check(now, store, adapter)
    }

    fn run_check(
        &mut self,
        now: Instant,
        store: &mut LocalStore,
        adapter: &PersistenceAdapter,
    ) -> Option<Eviction> {
        self.state = WatchState::Checking;
        self.last_check = Some(now);

        let accessible = match adapter.accessible_datasets() {
            // A failed check is inconclusive: retried next interval, never
            // an eviction, never user-visible.
            Err(_) | Ok(None) => {
                self.state = WatchState::Watching;
                return None;
            }
            Ok(Some(list)) => list,
        };

        if accessible.iter().any(|d| d.id == store.active_id()) {
            self.state = WatchState::Watching;
            return None;
        }

        self.state = WatchState::Evicting;
        match evict(store, adapter, accessible) {
            Some(eviction) => {
                self.state = WatchState::Idle;
                Some(eviction)
            }
            // Eviction could not complete (no fallback could be created or
            // adopted); stay armed and retry on the next check.
            None => {
                self.state = WatchState::Watching;
                None
            }
        }
    }
}

impl Default for AccessWatchdog {
    fn default() -> Self {
        AccessWatchdog::new()
    }
}

fn evict(
    store: &mut LocalStore,
    adapter: &PersistenceAdapter,
    accessible: Vec<DatasetSummary>,
) -> Option<Eviction> {
    let lost = store.active_id().to_string();
    let lost_name = store
        .datasets()
        .iter()
        .find(|d| d.id == lost)
        .map(|d| d.name.clone())
        .unwrap_or_else(|| lost.clone());

    let (fallback, created_default) = match pick_fallback(&accessible) {
        Some(summary) => (summary, false),
        None => match adapter.create_dataset("Personal") {
            Ok(summary) => (summary, true),
            // Could not even create a fallback; stay put and let the next
            // cycle retry.
            Err(_) => return None,
        },
    };

    store.ensure_dataset(fallback.clone()).ok()?;
    // Switching re-persists the active pointer, clearing the reference to
    // the lost dataset.
    store.switch_active(&fallback.id).ok()?;
    let _ = store.forget_dataset(&lost);
    let _ = reload_dataset(store, adapter, &fallback.id);

    let notice = format!(
        "You no longer have access to '{}'. Switched to '{}'.",
        lost_name, fallback.name
    );
    Some(Eviction {
        lost_dataset: lost,
        switched_to: fallback.id.clone(),
        notice,
        created_default,
    })
}

/// Deterministic fallback: the user's personal/default dataset when it is
/// still accessible, else the first accessible one.
fn pick_fallback(accessible: &[DatasetSummary]) -> Option<DatasetSummary> {
    accessible
        .iter()
        .find(|d| d.id == DEFAULT_DATASET_ID || d.name == "Personal")
        .or_else(|| accessible.first())
        .cloned()
}

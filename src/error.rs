// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failure taxonomy for the sync core. Each variant maps to a distinct
/// propagation policy: row-level failures reject the record and continue,
/// denials roll back the optimistic write, network errors are retryable.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// Malformed user input: date, amount, or a required field.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The remote store returned no data under a visibility rule. Inferred,
    /// not read off an error field; see `PersistenceAdapter`.
    #[error("not allowed: {action}")]
    PermissionDenied { action: String },

    /// The referenced entity no longer exists.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// Transport or server failure; safe to retry manually.
    #[error("network error during {action}: {detail}")]
    Network { action: String, detail: String },

    /// A record or row could not be parsed. Skipped, never fatal to a batch;
    /// surfaced only when an entire input yields nothing.
    #[error("import format error: {0}")]
    ImportFormat(String),

    /// The bank-feed source is still processing. Retried with backoff up to
    /// the ceiling, then handed to the user.
    #[error("source not ready after {attempts} attempts; retry later")]
    SourceNotReady { attempts: u32 },

    #[error("storage error: {0}")]
    Storage(String),
}

impl SyncError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        SyncError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn denied(action: &str) -> Self {
        SyncError::PermissionDenied {
            action: action.to_string(),
        }
    }

    pub fn not_found(what: &str) -> Self {
        SyncError::NotFound {
            what: what.to_string(),
        }
    }

    pub fn network(action: &str, detail: impl Into<String>) -> Self {
        SyncError::Network {
            action: action.to_string(),
            detail: detail.into(),
        }
    }

    /// Whether a manual retry of the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Network { .. } | SyncError::SourceNotReady { .. }
        )
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("io.tallysync", "Tallysync", "tallysync"));

pub fn document_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("tallysync.json"))
}

/// Sibling path a corrupt document is moved to before the store resets to
/// a fresh default, so the blob stays around for debugging.
pub fn quarantine_path(doc_path: &std::path::Path) -> PathBuf {
    let mut name = doc_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tallysync.json".to_string());
    name.push_str(".corrupt");
    doc_path.with_file_name(name)
}

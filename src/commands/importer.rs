// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;

use anyhow::{Context, Result};

use crate::adapter::PersistenceAdapter;
use crate::controller::MutationController;
use crate::store::LocalStore;
use crate::sync::csv_import::parse_csv;

pub fn handle(
    store: &mut LocalStore,
    adapter: &PersistenceAdapter,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("csv", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Could not read '{}'", path))?;
            let batch = parse_csv(&raw)?;
            if batch.skipped_rows > 0 {
                println!("Skipped {} unreadable row(s)", batch.skipped_rows);
            }

            let mut controller = MutationController::new(store, adapter);
            let outcome = controller.import_records(batch.records)?;
            println!(
                "Imported {} new, {} duplicate(s) skipped, {} invalid",
                outcome.summary.accepted, outcome.summary.duplicates, outcome.summary.invalid
            );
            for reason in &outcome.rejected {
                println!("  rejected: {}", reason);
            }
        }
        Some(("undo", _)) => {
            let mut controller = MutationController::new(store, adapter);
            let removed = controller.undo_last_import()?;
            if removed == 0 {
                println!("Nothing to undo");
            } else {
                println!("Removed {} imported transaction(s)", removed);
            }
        }
        _ => {}
    }
    Ok(())
}

// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use tallysync::adapter::PersistenceAdapter;
use tallysync::store::LocalStore;
use tallysync::{cli, commands, paths};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut store = LocalStore::open(paths::document_path()?)?;
    // The CLI always runs against the local document; the remote adapter
    // is wired up by embedding hosts.
    let adapter = PersistenceAdapter::local_only();

    match matches.subcommand() {
        Some(("dataset", sub)) => commands::datasets::handle(&mut store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut store, &adapter, sub)?,
        Some(("category", sub)) => commands::categories::handle(&mut store, &adapter, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut store, &adapter, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&mut store, sub)?,
        Some(("debt", sub)) => commands::debts::handle(&mut store, sub)?,
        Some(("recurring", sub)) => commands::recurring::handle(&mut store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

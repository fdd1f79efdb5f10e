// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::models::DatasetSummary;
use crate::store::LocalStore;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(store: &mut LocalStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let datasets = store.datasets().to_vec();
            if !maybe_print_json(sub.get_flag("json"), &datasets)? {
                let active = store.active_id().to_string();
                let rows = datasets
                    .iter()
                    .map(|d| {
                        vec![
                            d.id.clone(),
                            d.name.clone(),
                            if d.id == active { "*".into() } else { String::new() },
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Id", "Name", "Active"], rows));
            }
        }
        Some(("switch", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            store.switch_active(id)?;
            println!("Active dataset is now '{}'", id);
        }
        Some(("add", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            store.ensure_dataset(DatasetSummary {
                id: id.clone(),
                name: name.clone(),
                remote: false,
            })?;
            println!("Added dataset '{}' ({})", name, id);
        }
        _ => {}
    }
    Ok(())
}

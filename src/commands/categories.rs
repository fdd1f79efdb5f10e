// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Result};

use crate::adapter::PersistenceAdapter;
use crate::controller::MutationController;
use crate::models::{Category, TxnKind};
use crate::store::LocalStore;
use crate::utils::{maybe_print_json, new_id, parse_decimal, pretty_table};

pub fn handle(
    store: &mut LocalStore,
    adapter: &PersistenceAdapter,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let kind_str = sub.get_one::<String>("kind").unwrap();
            let Some(kind) = TxnKind::parse(kind_str) else {
                bail!("Invalid kind '{}', expected income or expense", kind_str);
            };
            let budget = sub
                .get_one::<String>("budget")
                .map(|b| parse_decimal(b))
                .transpose()?;
            let cat = Category {
                id: new_id("cat"),
                name: sub.get_one::<String>("name").unwrap().clone(),
                color: sub.get_one::<String>("color").unwrap().clone(),
                monthly_budget: budget,
                kind,
            };
            let mut controller = MutationController::new(store, adapter);
            let confirmed = controller.add_category(cat)?;
            println!("Added category '{}' ({})", confirmed.name, confirmed.id);
        }
        Some(("list", sub)) => {
            let data = store.snapshot();
            if !maybe_print_json(sub.get_flag("json"), &data.categories)? {
                let rows = data
                    .categories
                    .iter()
                    .map(|c| {
                        vec![
                            c.name.clone(),
                            c.kind.as_str().to_string(),
                            c.color.clone(),
                            c.monthly_budget
                                .map(|b| b.to_string())
                                .unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Name", "Kind", "Color", "Budget"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let mut controller = MutationController::new(store, adapter);
            controller.delete_category(name)?;
            println!("Deleted category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Result};

use crate::adapter::PersistenceAdapter;
use crate::controller::MutationController;
use crate::models::{Transaction, TxnKind};
use crate::store::LocalStore;
use crate::utils::{maybe_print_json, new_id, parse_date, parse_decimal, pretty_table};

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
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            if amount.is_sign_negative() {
                bail!("Amount must be non-negative; the sign comes from --kind");
            }
            let txn = Transaction {
                id: new_id("txn"),
                date: parse_date(sub.get_one::<String>("date").unwrap())?,
                kind,
                amount,
                description: sub.get_one::<String>("description").unwrap().clone(),
                category: sub.get_one::<String>("category").cloned(),
                merchant: sub.get_one::<String>("merchant").cloned(),
                notes: sub.get_one::<String>("notes").cloned(),
                external_id: None,
                account: sub.get_one::<String>("account").cloned(),
            };
            let mut controller = MutationController::new(store, adapter);
            let confirmed = controller.add_transaction(txn)?;
            println!(
                "Recorded {} {} '{}' ({})",
                confirmed.kind.as_str(),
                confirmed.amount,
                confirmed.description,
                confirmed.id
            );
        }
        Some(("list", sub)) => {
            let data = store.snapshot();
            let month = sub.get_one::<String>("month");
            let category = sub.get_one::<String>("category");
            let mut txns: Vec<&Transaction> = data
                .transactions
                .iter()
                .filter(|t| match month {
                    Some(m) => t.date.format("%Y-%m").to_string() == *m,
                    None => true,
                })
                .filter(|t| match category {
                    Some(c) => t.category.as_deref() == Some(c.as_str()),
                    None => true,
                })
                .collect();
            txns.sort_by_key(|t| t.date);

            if !maybe_print_json(sub.get_flag("json"), &txns)? {
                let rows = txns
                    .iter()
                    .map(|t| {
                        vec![
                            t.date.to_string(),
                            t.kind.as_str().to_string(),
                            t.amount.to_string(),
                            t.description.clone(),
                            t.category.clone().unwrap_or_default(),
                            t.id.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Date", "Kind", "Amount", "Description", "Category", "Id"],
                        rows
                    )
                );
            }
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let mut controller = MutationController::new(store, adapter);
            controller.delete_transaction(id)?;
            println!("Deleted transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::models::Debt;
use crate::store::LocalStore;
use crate::utils::{maybe_print_json, new_id, parse_decimal, pretty_table};

pub fn handle(store: &mut LocalStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let debt = Debt {
                id: new_id("debt"),
                name: sub.get_one::<String>("name").unwrap().clone(),
                balance: parse_decimal(sub.get_one::<String>("balance").unwrap())?,
                rate_pct: parse_decimal(sub.get_one::<String>("rate").unwrap())?,
                min_payment: parse_decimal(sub.get_one::<String>("min-payment").unwrap())?,
            };
            let name = debt.name.clone();
            store.update_active(|d| d.debts.push(debt))?;
            println!("Added debt '{}'", name);
        }
        Some(("list", sub)) => {
            let data = store.snapshot();
            if !maybe_print_json(sub.get_flag("json"), &data.debts)? {
                let rows = data
                    .debts
                    .iter()
                    .map(|d| {
                        vec![
                            d.name.clone(),
                            d.balance.to_string(),
                            format!("{}%", d.rate_pct),
                            d.min_payment.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Name", "Balance", "Rate", "Min payment"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

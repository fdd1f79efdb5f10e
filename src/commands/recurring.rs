// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Result};

use crate::models::{RecurringRule, TxnKind};
use crate::store::LocalStore;
use crate::utils::{maybe_print_json, new_id, parse_decimal, pretty_table};

pub fn handle(store: &mut LocalStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let kind_str = sub.get_one::<String>("kind").unwrap();
            let Some(kind) = TxnKind::parse(kind_str) else {
                bail!("Invalid kind '{}', expected income or expense", kind_str);
            };
            let day: u32 = sub
                .get_one::<String>("day")
                .unwrap()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid day of month"))?;
            if !(1..=31).contains(&day) {
                bail!("Day of month must be between 1 and 31");
            }
            let rule = RecurringRule {
                id: new_id("rule"),
                description: sub.get_one::<String>("description").unwrap().clone(),
                kind,
                amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
                category: sub.get_one::<String>("category").cloned(),
                day_of_month: day,
                active: true,
            };
            let desc = rule.description.clone();
            store.update_active(|d| d.recurring_rules.push(rule))?;
            println!("Added recurring rule '{}'", desc);
        }
        Some(("list", sub)) => {
            let data = store.snapshot();
            if !maybe_print_json(sub.get_flag("json"), &data.recurring_rules)? {
                let rows = data
                    .recurring_rules
                    .iter()
                    .map(|r| {
                        vec![
                            r.description.clone(),
                            r.kind.as_str().to_string(),
                            r.amount.to_string(),
                            r.day_of_month.to_string(),
                            r.category.clone().unwrap_or_default(),
                            if r.active { "yes".into() } else { "no".into() },
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Description", "Kind", "Amount", "Day", "Category", "Active"],
                        rows
                    )
                );
            }
        }
        _ => {}
    }
    Ok(())
}

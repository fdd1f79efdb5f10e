// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;

use crate::models::{FinancialGoal, SavingsGoal};
use crate::store::LocalStore;
use crate::utils::{maybe_print_json, new_id, parse_date, parse_decimal, pretty_table};

pub fn handle(store: &mut LocalStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().clone();
            let target = parse_decimal(sub.get_one::<String>("target").unwrap())?;
            let date = sub
                .get_one::<String>("date")
                .map(|d| parse_date(d))
                .transpose()?;
            if sub.get_flag("financial") {
                let goal = FinancialGoal {
                    id: new_id("fgoal"),
                    name: name.clone(),
                    target,
                    deadline: date,
                    achieved: false,
                };
                store.update_active(|d| d.financial_goals.push(goal))?;
            } else {
                let goal = SavingsGoal {
                    id: new_id("sgoal"),
                    name: name.clone(),
                    target,
                    saved: Decimal::ZERO,
                    target_date: date,
                };
                store.update_active(|d| d.savings_goals.push(goal))?;
            }
            println!("Added goal '{}'", name);
        }
        Some(("list", sub)) => {
            let data = store.snapshot();
            if sub.get_flag("json") {
                let both = serde_json::json!({
                    "savings": data.savings_goals,
                    "financial": data.financial_goals,
                });
                maybe_print_json(true, &both)?;
                return Ok(());
            }
            let mut rows: Vec<Vec<String>> = data
                .savings_goals
                .iter()
                .map(|g| {
                    vec![
                        "savings".into(),
                        g.name.clone(),
                        g.target.to_string(),
                        g.saved.to_string(),
                        g.target_date.map(|d| d.to_string()).unwrap_or_default(),
                    ]
                })
                .collect();
            rows.extend(data.financial_goals.iter().map(|g| {
                vec![
                    "financial".into(),
                    g.name.clone(),
                    g.target.to_string(),
                    if g.achieved { "achieved".into() } else { String::new() },
                    g.deadline.map(|d| d.to_string()).unwrap_or_default(),
                ]
            }));
            println!(
                "{}",
                pretty_table(&["Type", "Name", "Target", "Progress", "Date"], rows)
            );
        }
        _ => {}
    }
    Ok(())
}

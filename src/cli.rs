// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("tallysync")
        .about("Dual-mode budgeting core: local profiles, shared datasets, reconciled imports")
        .subcommand_required(false)
        .subcommand(
            Command::new("dataset")
                .about("Manage datasets (profiles)")
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(
                    Command::new("switch").arg(Arg::new("id").required(true).help("Dataset id")),
                )
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Transactions in the active dataset")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("kind").long("kind").required(true).help("income|expense"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("merchant").long("merchant"))
                        .arg(Arg::new("notes").long("notes"))
                        .arg(Arg::new("account").long("account")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(Arg::new("category").long("category"))
                        .arg(json_flag()),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true))),
        )
        .subcommand(
            Command::new("category")
                .about("Categories in the active dataset")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("kind").long("kind").default_value("expense"))
                        .arg(Arg::new("color").long("color").default_value("#4caf50"))
                        .arg(Arg::new("budget").long("budget").help("Monthly ceiling")),
                )
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(Command::new("rm").arg(Arg::new("name").required(true))),
        )
        .subcommand(
            Command::new("import")
                .about("Import transactions and reconcile against existing records")
                .subcommand(
                    Command::new("csv")
                        .arg(Arg::new("path").long("path").required(true)),
                )
                .subcommand(Command::new("undo").about("Roll back the most recent import")),
        )
        .subcommand(
            Command::new("goal")
                .about("Savings and financial goals")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("target").long("target").required(true))
                        .arg(Arg::new("date").long("date"))
                        .arg(
                            Arg::new("financial")
                                .long("financial")
                                .action(ArgAction::SetTrue)
                                .help("A milestone goal rather than a savings goal"),
                        ),
                )
                .subcommand(Command::new("list").arg(json_flag())),
        )
        .subcommand(
            Command::new("debt")
                .about("Debts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("balance").long("balance").required(true))
                        .arg(Arg::new("rate").long("rate").default_value("0"))
                        .arg(Arg::new("min-payment").long("min-payment").default_value("0")),
                )
                .subcommand(Command::new("list").arg(json_flag())),
        )
        .subcommand(
            Command::new("recurring")
                .about("Recurring transaction rules")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("description").required(true))
                        .arg(Arg::new("kind").long("kind").default_value("expense"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("day").long("day").required(true).help("Day of month"))
                        .arg(Arg::new("category").long("category")),
                )
                .subcommand(Command::new("list").arg(json_flag())),
        )
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Emit JSON instead of a table")
}

// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Semantic sign of a transaction. Amounts are always stored as a
/// non-negative magnitude; the sign lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    Income,
    Expense,
}

impl TxnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnKind::Income => "income",
            TxnKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<TxnKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Some(TxnKind::Income),
            "expense" => Some(TxnKind::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub kind: TxnKind,
    pub amount: Decimal,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Bank-feed transaction id, when this record came from a feed import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<Decimal>,
    pub kind: TxnKind,
}

/// Name of the category that absorbs transactions whose own category was
/// deleted. Created on demand; never deletable through the controller.
pub const FALLBACK_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: String,
    pub name: String,
    pub target: Decimal,
    pub saved: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialGoal {
    pub id: String,
    pub name: String,
    pub target: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub achieved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub balance: Decimal,
    pub rate_pct: Decimal,
    pub min_payment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: String,
    pub description: String,
    pub kind: TxnKind,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub day_of_month: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

/// (dataset, user, role) triple for shared datasets. Permission checks are
/// enforced by the remote store; this type exists so callers and test
/// doubles can model the membership list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub dataset_id: String,
    pub user_id: String,
    pub role: Role,
}

impl Membership {
    pub fn can_mutate_others(&self) -> bool {
        matches!(self.role, Role::Owner | Role::Admin)
    }
}

/// Dataset summary: the isolation unit. A "profile" in local-only mode,
/// a shared "budget" in remote mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub remote: bool,
}

/// The collections owned by one dataset. This is what `snapshot()` hands
/// out and what the persisted document stores per dataset id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetData {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub savings_goals: Vec<SavingsGoal>,
    #[serde(default)]
    pub financial_goals: Vec<FinancialGoal>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub recurring_rules: Vec<RecurringRule>,
    /// Transaction ids written by the most recent import, kept until the
    /// next import or an explicit undo.
    #[serde(default)]
    pub last_import_batch_ids: Vec<String>,
}

impl DatasetData {
    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn category_named(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// The whole persisted local document: every known dataset plus which one
/// is active. Serialized as one JSON blob, rewritten on every mutation in
/// local-only mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub datasets: Vec<DatasetSummary>,
    pub active_dataset_id: String,
    pub data_by_dataset: BTreeMap<String, DatasetData>,
}

pub const DEFAULT_DATASET_ID: &str = "default";

impl Default for Document {
    fn default() -> Self {
        let mut data_by_dataset = BTreeMap::new();
        data_by_dataset.insert(DEFAULT_DATASET_ID.to_string(), DatasetData::default());
        Document {
            datasets: vec![DatasetSummary {
                id: DEFAULT_DATASET_ID.to_string(),
                name: "Personal".to_string(),
                remote: false,
            }],
            active_dataset_id: DEFAULT_DATASET_ID.to_string(),
            data_by_dataset,
        }
    }
}

// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde_json::Value;
use thiserror::Error;

use crate::models::DatasetSummary;

const UA: &str = concat!(
    "tallysync/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/tallysync/tallysync)"
);

/// Collections the remote store serves rows for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Transactions,
    Categories,
    SavingsGoals,
    FinancialGoals,
    Debts,
    RecurringRules,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Transactions => "transactions",
            Collection::Categories => "categories",
            Collection::SavingsGoals => "savings_goals",
            Collection::FinancialGoals => "financial_goals",
            Collection::Debts => "debts",
            Collection::RecurringRules => "recurring_rules",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("remote error {status}: {message}")]
    Api { status: u16, message: String },
}

impl RemoteError {
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Network(_) => true,
            RemoteError::Api { status, .. } => *status >= 500,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Restrict to a single row id (the adapter's existence probe).
    pub id: Option<String>,
}

impl ListFilter {
    pub fn by_id(id: &str) -> ListFilter {
        ListFilter {
            id: Some(id.to_string()),
        }
    }
}

/// The consumed remote surface. Rows travel as opaque JSON values; the
/// remote enforces row-level visibility by silently filtering rows rather
/// than raising, so `Ok(None)` from a write means "no row came back" — the
/// adapter decides what that implies.
pub trait RemoteApi {
    fn create(
        &self,
        dataset_id: &str,
        actor_id: &str,
        collection: Collection,
        row: Value,
    ) -> Result<Option<Value>, RemoteError>;

    fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Option<Value>, RemoteError>;

    /// `Ok(None)` when zero rows were affected.
    fn delete(&self, collection: Collection, id: &str) -> Result<Option<()>, RemoteError>;

    fn list(
        &self,
        dataset_id: &str,
        collection: Collection,
        filter: &ListFilter,
    ) -> Result<Vec<Value>, RemoteError>;

    fn bulk_create(
        &self,
        dataset_id: &str,
        actor_id: &str,
        collection: Collection,
        rows: Vec<Value>,
    ) -> Result<Option<Vec<Value>>, RemoteError>;

    fn accessible_datasets(&self, user_id: &str) -> Result<Vec<DatasetSummary>, RemoteError>;

    /// Create a fresh dataset owned by `user_id`. Used when a just-evicted
    /// user has zero accessible datasets left.
    fn create_dataset(&self, user_id: &str, name: &str) -> Result<DatasetSummary, RemoteError>;
}

/// Thin HTTP client for the remote dataset service. Fetch-and-forward: all
/// interesting decisions live in the adapter and controller.
pub struct HttpRemote {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl HttpRemote {
    pub fn new(base_url: &str, api_key: &str) -> Result<HttpRemote, RemoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent(UA)
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        Ok(HttpRemote {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn send(&self, req: reqwest::blocking::RequestBuilder) -> Result<Value, RemoteError> {
        let resp = req
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            });
        }
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        resp.json::<Value>()
            .map_err(|e| RemoteError::Network(e.to_string()))
    }
}

impl RemoteApi for HttpRemote {
    fn create(
        &self,
        dataset_id: &str,
        actor_id: &str,
        collection: Collection,
        row: Value,
    ) -> Result<Option<Value>, RemoteError> {
        let url = format!(
            "{}/datasets/{}/{}?actor={}",
            self.base_url,
            dataset_id,
            collection.as_str(),
            actor_id
        );
        let body = self.send(self.client.post(url).json(&row))?;
        Ok(non_null(body))
    }

    fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Option<Value>, RemoteError> {
        let url = format!("{}/{}/{}", self.base_url, collection.as_str(), id);
        let body = self.send(self.client.patch(url).json(&patch))?;
        Ok(non_null(body))
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<Option<()>, RemoteError> {
        let url = format!("{}/{}/{}", self.base_url, collection.as_str(), id);
        let body = self.send(self.client.delete(url))?;
        let affected = body.get("count").and_then(Value::as_u64).unwrap_or(0);
        Ok(if affected > 0 { Some(()) } else { None })
    }

    fn list(
        &self,
        dataset_id: &str,
        collection: Collection,
        filter: &ListFilter,
    ) -> Result<Vec<Value>, RemoteError> {
        let mut url = format!(
            "{}/datasets/{}/{}",
            self.base_url,
            dataset_id,
            collection.as_str()
        );
        if let Some(id) = &filter.id {
            url.push_str(&format!("?id={}", id));
        }
        let body = self.send(self.client.get(url))?;
        match body {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    fn bulk_create(
        &self,
        dataset_id: &str,
        actor_id: &str,
        collection: Collection,
        rows: Vec<Value>,
    ) -> Result<Option<Vec<Value>>, RemoteError> {
        let url = format!(
            "{}/datasets/{}/{}/bulk?actor={}",
            self.base_url,
            dataset_id,
            collection.as_str(),
            actor_id
        );
        let body = self.send(self.client.post(url).json(&rows))?;
        match body {
            Value::Array(created) => Ok(Some(created)),
            _ => Ok(None),
        }
    }

    fn accessible_datasets(&self, user_id: &str) -> Result<Vec<DatasetSummary>, RemoteError> {
        let url = format!("{}/users/{}/datasets", self.base_url, user_id);
        let body = self.send(self.client.get(url))?;
        serde_json::from_value(body).map_err(|e| RemoteError::Network(e.to_string()))
    }

    fn create_dataset(&self, user_id: &str, name: &str) -> Result<DatasetSummary, RemoteError> {
        let url = format!("{}/users/{}/datasets", self.base_url, user_id);
        let body = self.send(
            self.client
                .post(url)
                .json(&serde_json::json!({ "name": name })),
        )?;
        serde_json::from_value(body).map_err(|e| RemoteError::Network(e.to_string()))
    }
}

fn non_null(v: Value) -> Option<Value> {
    if v.is_null() { None } else { Some(v) }
}

// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use std::collections::VecDeque;
use std::time::Duration;

use common::record;
use tallysync::error::SyncError;
use tallysync::models::TxnKind;
use tallysync::remote::RemoteError;
use tallysync::sync::feed::{fetch_feed_records, BankFeed, FeedPoll, FEED_RETRY_LIMIT};
use tallysync::sync::reconcile::reconcile;

struct ScriptedFeed {
    polls: VecDeque<Result<FeedPoll, RemoteError>>,
}

impl ScriptedFeed {
    fn new(polls: Vec<Result<FeedPoll, RemoteError>>) -> ScriptedFeed {
        ScriptedFeed {
            polls: polls.into(),
        }
    }
}

impl BankFeed for ScriptedFeed {
    fn fetch(&mut self, _account: &str) -> Result<FeedPoll, RemoteError> {
        self.polls.pop_front().unwrap_or(Ok(FeedPoll::Pending))
    }
}

fn ready() -> Result<FeedPoll, RemoteError> {
    Ok(FeedPoll::Ready(vec![record(
        "2025-03-01",
        TxnKind::Expense,
        "8.00",
        "Lunch",
    )]))
}

#[test]
fn backs_off_exponentially_until_the_source_is_ready() {
    let mut feed = ScriptedFeed::new(vec![Ok(FeedPoll::Pending), Ok(FeedPoll::Pending), ready()]);
    let mut sleeps = Vec::new();
    let records =
        fetch_feed_records(&mut feed, "checking", &mut |d| sleeps.push(d)).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        sleeps,
        vec![Duration::from_millis(500), Duration::from_millis(1000)]
    );
}

#[test]
fn transient_failures_count_as_pending_rounds() {
    let mut feed = ScriptedFeed::new(vec![
        Err(RemoteError::Network("reset".to_string())),
        Err(RemoteError::Api {
            status: 503,
            message: "busy".to_string(),
        }),
        ready(),
    ]);
    let mut sleeps = Vec::new();
    let records =
        fetch_feed_records(&mut feed, "checking", &mut |d| sleeps.push(d)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(sleeps.len(), 2);
}

#[test]
fn a_non_transient_failure_aborts_immediately() {
    let mut feed = ScriptedFeed::new(vec![Err(RemoteError::Api {
        status: 403,
        message: "forbidden".to_string(),
    })]);
    let mut sleeps = Vec::new();
    let err = fetch_feed_records(&mut feed, "checking", &mut |d| sleeps.push(d)).unwrap_err();

    assert!(matches!(err, SyncError::Network { .. }));
    assert!(sleeps.is_empty());
}

#[test]
fn the_retry_ceiling_yields_source_not_ready() {
    let mut feed = ScriptedFeed::new(Vec::new());
    let mut sleeps = Vec::new();
    let err = fetch_feed_records(&mut feed, "checking", &mut |d| sleeps.push(d)).unwrap_err();

    assert!(matches!(
        err,
        SyncError::SourceNotReady {
            attempts: FEED_RETRY_LIMIT
        }
    ));
    assert!(err.is_retryable());
    // One sleep between each attempt, none after the last.
    assert_eq!(
        sleeps,
        vec![
            Duration::from_millis(500),
            Duration::from_millis(1000),
            Duration::from_millis(2000),
            Duration::from_millis(4000),
        ]
    );
}

/// Feed records carry bank-side ids, so a poll overlapping the previous
/// window refreshes rather than duplicates.
#[test]
fn overlapping_feed_windows_refresh_by_external_id() {
    let mut first = record("2025-03-01", TxnKind::Expense, "8.00", "LUNCH PENDING");
    first.external_id = Some("bank-1".to_string());
    let plan = reconcile(&Default::default(), vec![first]);
    assert_eq!(plan.new_records.len(), 1);

    let mut existing = tallysync::models::DatasetData::default();
    existing.transactions = plan.new_records;

    let mut second = record("2025-03-01", TxnKind::Expense, "8.00", "LUNCH SPOT #42");
    second.external_id = Some("bank-1".to_string());
    let plan = reconcile(&existing, vec![second]);

    assert!(plan.new_records.is_empty());
    assert_eq!(plan.updates.len(), 1);
    assert_eq!(plan.updates[0].description, "LUNCH SPOT #42");
}

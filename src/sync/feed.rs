// Copyright (c) 2025 Tallysync contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteError;
use crate::sync::IncomingRecord;

/// One poll of the bank-aggregation source.
#[derive(Debug, Clone)]
pub enum FeedPoll {
    Ready(Vec<IncomingRecord>),
    /// The source system is still processing; poll again later.
    Pending,
}

/// The bank-feed source, behind a trait so tests can script readiness.
/// The HTTP proxy in front of the real aggregator satisfies this.
pub trait BankFeed {
    fn fetch(&mut self, account: &str) -> Result<FeedPoll, RemoteError>;
}

pub const FEED_RETRY_LIMIT: u32 = 5;
pub const FEED_BASE_DELAY: Duration = Duration::from_millis(500);

/// Poll the feed until it is ready, backing off exponentially up to a
/// fixed ceiling. Transient failures count as a pending round; a
/// non-transient failure aborts immediately. After the ceiling the caller
/// gets `SourceNotReady` and the user is told to retry later.
pub fn fetch_feed_records(
    feed: &mut dyn BankFeed,
    account: &str,
    sleep: &mut dyn FnMut(Duration),
) -> SyncResult<Vec<IncomingRecord>> {
    let mut delay = FEED_BASE_DELAY;
    for attempt in 1..=FEED_RETRY_LIMIT {
        match feed.fetch(account) {
            Ok(FeedPoll::Ready(records)) => return Ok(records),
            Ok(FeedPoll::Pending) => {}
            Err(e) if e.is_transient() => {}
            Err(e) => return Err(SyncError::network("bank feed import", e.to_string())),
        }
        if attempt < FEED_RETRY_LIMIT {
            sleep(delay);
            delay *= 2;
        }
    }
    Err(SyncError::SourceNotReady {
        attempts: FEED_RETRY_LIMIT,
    })
}

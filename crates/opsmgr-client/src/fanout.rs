//! The query fan-out engine.
//!
//! Runs a batch of keyed, independent units of work concurrently under
//! a configured bound and aggregates the outcomes. The failure policy
//! is an explicit parameter of every call; there is no implicit
//! per-call-site behavior.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;

use futures_util::stream::{self, StreamExt};
use tracing::warn;

use opsmgr_core::Result;

/// How a batch reacts to individual item failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The first observed failure aborts the batch; no partial result
    /// set is exposed. Used when every item is mandatory.
    FailFast,
    /// Item failures are logged and excluded; the batch returns
    /// whatever succeeded. Used when partial telemetry is acceptable.
    BestEffort,
}

/// Run every item concurrently and aggregate results by key.
///
/// Concurrency is bounded by `limit`; the call joins all units before
/// returning and guarantees no ordering across them. Dropping the
/// returned future cancels in-flight units.
pub(crate) async fn fan_out<K, T, F>(
    items: Vec<(K, F)>,
    policy: FailurePolicy,
    limit: usize,
) -> Result<HashMap<K, T>>
where
    K: Eq + Hash + fmt::Display,
    F: Future<Output = Result<T>>,
{
    let mut results = HashMap::with_capacity(items.len());

    let mut outcomes = stream::iter(items.into_iter().map(|(key, task)| async move {
        let outcome = task.await;
        (key, outcome)
    }))
    .buffer_unordered(limit.max(1));

    while let Some((key, outcome)) = outcomes.next().await {
        match outcome {
            Ok(value) => {
                results.insert(key, value);
            }
            Err(err) => match policy {
                FailurePolicy::FailFast => return Err(err),
                FailurePolicy::BestEffort => {
                    warn!(item = %key, error = %err, "dropping failed batch item");
                }
            },
        }
    }

    Ok(results)
}

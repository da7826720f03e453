//! Merge stage: the single reader of the outcome channel and sole writer of the aggregate.

use crossbeam_channel::{Receiver, select};
use log::{debug, warn};
use std::collections::HashMap;
use std::hash::Hash;

use super::context::PipelineContext;
use super::error_handler::RunError;
use crate::{ErrorPolicy, Outcome, RunStats, TagCount, WorkItem};

/// Accumulates per-item values. Implementations must be order-independent: outcomes arrive in
/// no particular order.
pub trait Aggregate<K, T> {
    fn merge(&mut self, key: K, value: T);
}

impl<K: Eq + Hash, T> Aggregate<K, T> for HashMap<K, T> {
    fn merge(&mut self, key: K, value: T) {
        self.insert(key, value);
    }
}

/// Running total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Total(pub u64);

impl<K> Aggregate<K, u64> for Total {
    fn merge(&mut self, _key: K, value: u64) {
        self.0 += value;
    }
}

/// Tag → occurrence count across all items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagTally(pub HashMap<String, usize>);

impl TagTally {
    /// Tags ascending by count; ties broken by tag so output is stable.
    pub fn sorted(&self) -> Vec<TagCount> {
        let mut v: Vec<TagCount> = self
            .0
            .iter()
            .map(|(tag, &count)| TagCount {
                tag: tag.clone(),
                count,
            })
            .collect();
        v.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| a.tag.cmp(&b.tag)));
        v
    }

    pub fn get(&self, tag: &str) -> usize {
        self.0.get(tag).copied().unwrap_or(0)
    }
}

impl<K> Aggregate<K, HashMap<String, usize>> for TagTally {
    fn merge(&mut self, _key: K, value: HashMap<String, usize>) {
        for (tag, n) in value {
            *self.0.entry(tag).or_insert(0) += n;
        }
    }
}

/// How the drain loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeEnd {
    /// Every worker finished and the channel disconnected.
    Drained,
    /// The token closed first.
    Cancelled,
    /// An item failed under [`ErrorPolicy::FailFast`]; already recorded in the context.
    Failed,
}

/// Drain outcomes into `aggregate` until the stream closes, the token closes, or (fail-fast)
/// the first item error. Stragglers after a failure are abandoned, not awaited.
pub fn drain_outcomes<W, T, A>(
    outcome_rx: &Receiver<Outcome<W, T>>,
    aggregate: &mut A,
    policy: ErrorPolicy,
    ctx: &PipelineContext,
    stats: &mut RunStats,
) -> MergeEnd
where
    W: WorkItem,
    A: Aggregate<W::Key, T>,
{
    let done = ctx.cancel.done();
    loop {
        let outcome = select! {
            recv(outcome_rx) -> msg => match msg {
                Ok(o) => o,
                Err(_) => break,
            },
            recv(done) -> _ => return MergeEnd::Cancelled,
        };
        let Outcome { item, value } = outcome;
        match value {
            Ok(v) => {
                aggregate.merge(item.into_key(), v);
                stats.merged += 1;
            }
            Err(msg) => match policy {
                ErrorPolicy::FailFast => {
                    ctx.fail(RunError::Item {
                        label: item.label(),
                        msg,
                    });
                    return MergeEnd::Failed;
                }
                ErrorPolicy::Tolerant => {
                    warn!("{}: {}", item.label(), msg);
                    stats.failed.push((item.label(), msg));
                }
            },
        }
    }
    debug!("merge: stream closed after {} merged", stats.merged);
    MergeEnd::Drained
}

use crossbeam_channel::{Receiver, Sender, select};
use std::sync::atomic::Ordering;
use std::thread::{Scope, ScopedJoinHandle};

use super::context::PipelineContext;
use crate::{Outcome, WorkItem};

/// Single worker: take items from `item_rx`, run `process`, offer the outcome on `outcome_tx`.
/// Every blocking point also watches the cancel token, so a torn-down run never strands a worker.
/// `process` is never retried; its error travels inside the outcome.
pub fn worker_loop<W, T, F>(
    item_rx: Receiver<W>,
    outcome_tx: Sender<Outcome<W, T>>,
    ctx: &PipelineContext,
    process: &F,
) where
    W: WorkItem,
    F: Fn(&W) -> anyhow::Result<T>,
{
    let done = ctx.cancel.done();
    loop {
        let item = select! {
            recv(item_rx) -> msg => match msg {
                Ok(item) => item,
                Err(_) => break,
            },
            recv(done) -> _ => break,
        };
        let value = process(&item).map_err(|e| format!("{e:#}"));
        let outcome = Outcome { item, value };
        select! {
            send(outcome_tx, outcome) -> res => {
                if res.is_err() {
                    break;
                }
                ctx.counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            recv(done) -> _ => break,
        }
    }
    // Last worker out disconnects the outcome channel: the merge stage's end-of-stream.
    drop(outcome_tx);
}

/// Spawn `num_workers` scoped workers sharing `item_rx`. Caller must drop its own `outcome_tx`
/// after this so the stream can close.
pub fn spawn_workers<'scope, 'env, W, T, F>(
    scope: &'scope Scope<'scope, 'env>,
    num_workers: usize,
    item_rx: &Receiver<W>,
    outcome_tx: &Sender<Outcome<W, T>>,
    ctx: &'env PipelineContext,
    process: &'env F,
) -> Vec<ScopedJoinHandle<'scope, ()>>
where
    W: WorkItem + 'env,
    T: Send + 'env,
    F: Fn(&W) -> anyhow::Result<T> + Sync,
{
    (0..num_workers)
        .map(|_| {
            let item_rx = item_rx.clone();
            let outcome_tx = outcome_tx.clone();
            scope.spawn(move || worker_loop(item_rx, outcome_tx, ctx, process))
        })
        .collect()
}

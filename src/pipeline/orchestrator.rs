use crossbeam_channel::select;
use log::debug;
use std::sync::atomic::Ordering;
use std::thread;

use super::cancel::CancelToken;
use super::context::{
    Dispatcher, PipelineChannels, PipelineContext, PipelineTuning, create_pipeline_channels,
};
use super::error_handler::{RunError, check_for_first_error_or_failed_items};
use super::merge::{Aggregate, MergeEnd, drain_outcomes};
use super::worker::spawn_workers;
use crate::{Run, RunStats, WorkItem};

/// Main orchestrator: producer → item queue → worker pool → outcome channel → merge.
///
/// - `produce` runs on its own thread and hands items to the [`Dispatcher`]. An error it returns
///   becomes the run's error (unless one is already recorded) and cancels the run.
/// - `process` runs on the workers, concurrently; it must not rely on shared mutable state.
/// - `aggregate` is only touched by the merge loop on the calling thread.
/// - `caller_cancel`, when given, aborts the run once closed; the run returns [`RunError::Canceled`].
///
/// Every thread is scoped, so none outlives this call. On failure no partial aggregate escapes.
pub fn run_pipeline<W, T, A, P, F>(
    tuning: &PipelineTuning,
    caller_cancel: Option<&CancelToken>,
    produce: P,
    process: F,
    mut aggregate: A,
) -> Result<Run<A>, RunError>
where
    W: WorkItem,
    T: Send,
    A: Aggregate<W::Key, T>,
    P: FnOnce(&Dispatcher<'_, W>) -> Result<usize, RunError> + Send,
    F: Fn(&W) -> anyhow::Result<T> + Sync,
{
    if caller_cancel.is_some_and(CancelToken::is_cancelled) {
        return Err(RunError::Canceled);
    }
    let ctx = PipelineContext::new();
    let mut stats = RunStats::default();
    let PipelineChannels {
        item_tx,
        item_rx,
        outcome_tx,
        outcome_rx,
    } = create_pipeline_channels::<W, T>(tuning);
    debug!(
        "pipeline: {} workers, channel cap {}, policy {:?}",
        tuning.num_workers, tuning.channel_cap, tuning.error_policy
    );

    let end = thread::scope(|s| {
        let release = ctx.cancel.guard();
        let ctx = &ctx;

        if let Some(caller) = caller_cancel {
            let caller = caller.clone();
            s.spawn(move || {
                select! {
                    recv(caller.done()) -> _ => {
                        if ctx.cancel.cancel() {
                            debug!("pipeline: cancelled by caller");
                        }
                    }
                    recv(ctx.cancel.done()) -> _ => {}
                }
            });
        }

        let producer = s.spawn(move || {
            let dispatcher = Dispatcher::new(item_tx, ctx);
            match produce(&dispatcher) {
                Ok(n) => debug!("producer: finished, {} items", n),
                Err(e) => ctx.fail(e),
            }
        });

        let workers = spawn_workers(s, tuning.num_workers, &item_rx, &outcome_tx, ctx, &process);
        // Only the producer and the workers hold these now.
        drop(item_rx);
        drop(outcome_tx);

        let end = drain_outcomes(
            &outcome_rx,
            &mut aggregate,
            tuning.error_policy,
            ctx,
            &mut stats,
        );
        if end != MergeEnd::Failed && ctx.cancel.is_cancelled() {
            // Closed before the stream finished: whatever was merged is incomplete.
            ctx.first_error.record(RunError::Canceled);
        }
        drop(outcome_rx);
        drop(release);

        if producer.join().is_err() {
            ctx.first_error.record(RunError::Panicked("producer"));
        }
        for h in workers {
            if h.join().is_err() {
                ctx.first_error.record(RunError::Panicked("worker"));
            }
        }
        end
    });

    stats.dispatched = ctx.counters.dispatched.load(Ordering::Relaxed);
    stats.delivered = ctx.counters.delivered.load(Ordering::Relaxed);
    debug!(
        "pipeline: {:?}; dispatched {}, delivered {}, merged {}",
        end, stats.dispatched, stats.delivered, stats.merged
    );

    check_for_first_error_or_failed_items(ctx.first_error, &stats)?;
    Ok(Run { aggregate, stats })
}

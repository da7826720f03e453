//! Pipeline context and tuning: shared state handed to the producer, workers and merge stage.

use crossbeam_channel::{Receiver, Sender, bounded, select};
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::cancel::CancelToken;
use super::error_handler::{FirstError, RunError};
use crate::PipeOpts;
use crate::Outcome;
use crate::utils::config::{PipelineConsts, WorkerThreadLimits};
use crate::utils::fd_limit::max_workers_by_fd_limit;

/// Tuning derived from options and the host: worker count and channel cap.
#[derive(Clone, Debug)]
pub struct PipelineTuning {
    pub num_workers: usize,
    /// Capacity of the item queue. The outcome channel is a rendezvous.
    pub channel_cap: usize,
    pub error_policy: crate::ErrorPolicy,
}

impl PipelineTuning {
    /// Resolve tuning from lib options. Worker count defaults to rayon's thread count and is
    /// always capped by the FD limit, since every worker may hold a file open.
    pub fn from_opts(opts: &PipeOpts) -> Self {
        let wanted = opts
            .num_workers
            .unwrap_or_else(|| WorkerThreadLimits::current().all_threads)
            .max(1);
        let num_workers = match max_workers_by_fd_limit() {
            Some(fd_cap) if fd_cap < wanted => {
                debug!("Capping workers {} -> {} (FD limit ~80%)", wanted, fd_cap);
                fd_cap
            }
            _ => wanted,
        };
        Self {
            num_workers,
            channel_cap: opts
                .channel_cap
                .unwrap_or(PipelineConsts::CHANNEL_CAP)
                .max(1),
            error_policy: opts.error_policy,
        }
    }
}

/// Counters shared by every stage. Atomics only; safe for any number of workers.
#[derive(Debug, Default)]
pub struct RunCounters {
    pub dispatched: AtomicUsize,
    pub delivered: AtomicUsize,
}

/// State shared by reference across the scoped pipeline threads.
pub struct PipelineContext {
    pub cancel: CancelToken,
    pub first_error: FirstError,
    pub counters: RunCounters,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self {
            cancel: CancelToken::new(),
            first_error: FirstError::new(),
            counters: RunCounters::default(),
        }
    }

    /// Record `err` (first one wins) and then close the token. Order matters: anything woken
    /// by the close must already see the real cause in the slot.
    pub fn fail(&self, err: RunError) {
        self.first_error.record(err);
        self.cancel.cancel();
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer-side handle: hands items to the worker pool. Dropping it closes the item queue,
/// and since the producer holds the only sender, that happens exactly once.
pub struct Dispatcher<'a, W> {
    item_tx: Sender<W>,
    ctx: &'a PipelineContext,
}

impl<'a, W> Dispatcher<'a, W> {
    pub fn new(item_tx: Sender<W>, ctx: &'a PipelineContext) -> Self {
        Self { item_tx, ctx }
    }

    /// Hand one item to the pool. Blocks while the queue is full, but never past cancellation.
    pub fn dispatch(&self, item: W) -> Result<(), RunError> {
        // select! picks at random when both arms are ready.
        self.check_cancelled()?;
        select! {
            send(self.item_tx, item) -> res => {
                // Disconnected without a cancel means every worker is gone.
                res.map_err(|_| match self.ctx.cancel.is_cancelled() {
                    true => RunError::Canceled,
                    false => RunError::Panicked("worker"),
                })?;
                self.ctx.counters.dispatched.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            recv(self.ctx.cancel.done()) -> _ => Err(RunError::Canceled),
        }
    }

    /// Cheap check for producers to call before doing more discovery work.
    pub fn check_cancelled(&self) -> Result<(), RunError> {
        if self.ctx.cancel.is_cancelled() {
            Err(RunError::Canceled)
        } else {
            Ok(())
        }
    }
}

/// Channels for one run. Producer gets `item_tx`; workers get `item_rx` and `outcome_tx`; merge gets `outcome_rx`.
pub struct PipelineChannels<W, T> {
    pub item_tx: Sender<W>,
    pub item_rx: Receiver<W>,
    pub outcome_tx: Sender<Outcome<W, T>>,
    pub outcome_rx: Receiver<Outcome<W, T>>,
}

pub fn create_pipeline_channels<W, T>(tuning: &PipelineTuning) -> PipelineChannels<W, T> {
    let (item_tx, item_rx) = bounded::<W>(tuning.channel_cap);
    // Rendezvous: a delivered outcome is one the merge stage actually took.
    let (outcome_tx, outcome_rx) = bounded::<Outcome<W, T>>(0);
    PipelineChannels {
        item_tx,
        item_rx,
        outcome_tx,
        outcome_rx,
    }
}

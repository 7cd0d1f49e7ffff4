//! Memory Scheduling Policies.
//!
//! Implements the algorithms that pick which pending request a bank serves next.
//!
//! # Policies
//!
//! - `Fcfs`: First-come, first-served.
//! - `FrFcfs`: Row-buffer hits first, then first-come, first-served.
//! - `Bliss`: Row-hit-first with periodic blacklisting of row-buffer monopolizers.

/// Row-hit-first scheduling with process blacklisting.
pub mod bliss;

/// First-come, first-served scheduling.
pub mod fcfs;

/// First-ready, first-come, first-served scheduling.
pub mod frfcfs;

pub use bliss::BlissScheduler;
pub use fcfs::FcfsScheduler;
pub use frfcfs::FrFcfsScheduler;

use std::fmt;

use crate::config::{Config, SchedAlgo};
use crate::dram::meta::MetaView;
use crate::dram::request::Request;

/// Which of two compared candidates a scheduler prefers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pick {
    /// The first argument.
    First,
    /// The second argument.
    Second,
}

/// Trait for memory scheduling policies.
///
/// Only [`Scheduler::better`] is required. Every hook receives a [`MetaView`] of the
/// owning meta-controller, resolved afresh on each call.
pub trait Scheduler: fmt::Debug {
    /// Short policy name for logs and statistics.
    fn name(&self) -> &'static str;

    /// Sizes per-bank state once the meta-controller's topology is fixed.
    fn initialize(&mut self, _meta: &MetaView<'_>) {}

    /// Called when a request is issued to its bank.
    fn issue_notify(&mut self, _meta: &MetaView<'_>, _req: &Request) {}

    /// Called when a request joins a pending queue.
    fn enqueue_notify(&mut self, _meta: &MetaView<'_>, _req: &Request) {}

    /// Called when a request leaves a pending queue without being issued.
    fn dequeue_notify(&mut self, _meta: &MetaView<'_>, _req: &Request) {}

    /// Advances periodic timers by one cycle.
    fn tick(&mut self) {}

    /// Compares two candidates.
    ///
    /// Must be transitive and must prefer `req1` on a full tie.
    fn better(&self, meta: &MetaView<'_>, req1: &Request, req2: &Request) -> Pick;

    /// Returns whichever of the two candidates [`Scheduler::better`] prefers.
    fn better_req<'r>(&self, meta: &MetaView<'_>, req1: &'r Request, req2: &'r Request) -> &'r Request {
        match self.better(meta, req1, req2) {
            Pick::First => req1,
            Pick::Second => req2,
        }
    }

    /// Index of the best candidate in an arrival-ordered queue.
    ///
    /// Folds [`Scheduler::better`] left to right; `None` for an empty queue.
    fn find_best(&self, meta: &MetaView<'_>, q: &[Request]) -> Option<usize> {
        let (first, rest) = q.split_first()?;
        let mut best = (0, first);
        for (i, req) in rest.iter().enumerate() {
            if self.better(meta, best.1, req) == Pick::Second {
                best = (i + 1, req);
            }
        }
        Some(best.0)
    }

    /// Returns whether the policy currently deprioritizes `pid`.
    fn is_blacklisted(&self, _pid: usize) -> bool {
        false
    }
}

/// Earlier arrival wins; equal arrivals keep the first argument.
#[inline]
pub(crate) const fn older(req1: &Request, req2: &Request) -> Pick {
    if req1.ts_arrival <= req2.ts_arrival {
        Pick::First
    } else {
        Pick::Second
    }
}

/// Creates a scheduler for `algo` using the fairness parameters in `config`.
pub fn build(algo: SchedAlgo, config: &Config) -> Box<dyn Scheduler> {
    match algo {
        SchedAlgo::Fcfs => Box::new(FcfsScheduler),
        SchedAlgo::FrFcfs => Box::new(FrFcfsScheduler),
        SchedAlgo::Bliss => Box::new(BlissScheduler::new(&config.sched, config.num_procs)),
    }
}

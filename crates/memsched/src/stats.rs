//! Scheduling and controller statistics.
//!
//! This module tracks the counters reported by the memory system. It provides:
//! 1. **Streaks:** Per-process histograms of consecutive same-process issues.
//! 2. **Requests:** Issued requests per process.
//! 3. **Controllers:** Issued reads/writes, row-buffer hits/misses/conflicts, bus
//!    transactions, retirements, read latency, and rejected enqueues.
//!
//! Nothing here formats or persists results; [`SystemStats`] is a `Serialize`
//! snapshot for the reporting layer.

use serde::Serialize;

use crate::common::ReqType;
use crate::common::constants::{STREAK_BUCKETS, STREAK_OVERFLOW_BUCKET};
use crate::dram::bus::BusTransaction;
use crate::dram::request::Request;
use crate::dram::topology::RowOutcome;

/// Per-meta-controller scheduling statistics.
#[derive(Clone, Debug, Serialize)]
pub struct SchedStats {
    /// `streak_length[pid][len]`: number of completed streaks of `len` issues by `pid`.
    pub streak_length: Vec<[u64; STREAK_BUCKETS]>,
    /// Issued requests per process.
    pub request_count: Vec<u64>,
    /// Processes whose later streaks are no longer recorded.
    pub proc_done: Vec<bool>,
    #[serde(skip)]
    pid_last_req: Option<usize>,
    #[serde(skip)]
    last_streak_length: usize,
}

impl SchedStats {
    /// Creates zeroed statistics for `num_procs` processes.
    pub fn new(num_procs: usize) -> Self {
        Self {
            streak_length: vec![[0; STREAK_BUCKETS]; num_procs],
            request_count: vec![0; num_procs],
            proc_done: vec![false; num_procs],
            pid_last_req: None,
            last_streak_length: 0,
        }
    }

    /// Marks a process as finished.
    pub fn set_proc_done(&mut self, pid: usize) {
        self.proc_done[pid] = true;
    }

    fn close_streak(&mut self) {
        let Some(pid) = self.pid_last_req else {
            return;
        };
        if !self.proc_done[pid] && self.last_streak_length > 0 {
            let bucket = self.last_streak_length.min(STREAK_OVERFLOW_BUCKET);
            self.streak_length[pid][bucket] += 1;
        }
    }

    /// Records an issued request, extending or closing the current streak.
    pub fn count_streaks(&mut self, req: &Request) {
        self.request_count[req.pid] += 1;
        if self.pid_last_req == Some(req.pid) {
            self.last_streak_length += 1;
        } else {
            self.close_streak();
            self.pid_last_req = Some(req.pid);
            self.last_streak_length = 1;
        }
    }

    /// Records the open streak and starts afresh.
    pub fn flush(&mut self) {
        self.close_streak();
        self.pid_last_req = None;
        self.last_streak_length = 0;
    }

    /// Length of the streak currently in progress.
    pub const fn current_streak(&self) -> usize {
        self.last_streak_length
    }

    /// Streak histogram of one process.
    pub fn streaks(&self, pid: usize) -> &[u64; STREAK_BUCKETS] {
        &self.streak_length[pid]
    }
}

/// Per-controller statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CtrlStats {
    /// Reads issued to banks.
    pub reads_issued: u64,
    /// Writes issued to banks.
    pub writes_issued: u64,
    /// Issues that hit the open row.
    pub row_hits: u64,
    /// Issues to a bank with no open row.
    pub row_closed: u64,
    /// Issues that had to close a different open row.
    pub row_conflicts: u64,
    /// Bus transactions dispatched.
    pub bus_transactions: u64,
    /// Cycle of the most recent bus transaction.
    pub last_bus_ts: u64,
    /// Reads delivered back to their processes.
    pub reads_retired: u64,
    /// Writes delivered back to their processes.
    pub writes_retired: u64,
    /// Sum of arrival-to-retirement latency over retired reads.
    pub total_read_latency: u64,
    /// Enqueue attempts rejected with a full queue.
    pub rejected: u64,
}

impl CtrlStats {
    /// Row-buffer misses (closed bank or conflict).
    pub const fn row_misses(&self) -> u64 {
        self.row_closed + self.row_conflicts
    }

    /// Mean read latency over retired reads, or 0.0 if none retired.
    pub fn avg_read_latency(&self) -> f64 {
        if self.reads_retired == 0 {
            0.0
        } else {
            self.total_read_latency as f64 / self.reads_retired as f64
        }
    }

    pub(crate) const fn record_issue(&mut self, kind: ReqType, outcome: RowOutcome) {
        match kind {
            ReqType::Read => self.reads_issued += 1,
            ReqType::Write => self.writes_issued += 1,
        }
        match outcome {
            RowOutcome::Hit => self.row_hits += 1,
            RowOutcome::Closed => self.row_closed += 1,
            RowOutcome::Conflict => self.row_conflicts += 1,
        }
    }

    pub(crate) const fn record_bus(&mut self, txn: &BusTransaction) {
        self.bus_transactions += 1;
        self.last_bus_ts = txn.ts;
    }

    pub(crate) const fn record_retire(&mut self, req: &Request) {
        match req.kind {
            ReqType::Read => {
                self.reads_retired += 1;
                self.total_read_latency += req.latency();
            }
            ReqType::Write => self.writes_retired += 1,
        }
    }
}

/// Snapshot of every counter in a memory system.
#[derive(Clone, Debug, Serialize)]
pub struct SystemStats {
    /// Cycles simulated.
    pub cycles: u64,
    /// Per-controller counters, indexed by channel id.
    pub controllers: Vec<CtrlStats>,
    /// Per-meta-controller scheduling counters (one entry in omniscient mode).
    pub schedulers: Vec<SchedStats>,
}

impl SystemStats {
    /// Row hits summed over all controllers.
    pub fn row_hits(&self) -> u64 {
        self.controllers.iter().map(|c| c.row_hits).sum()
    }

    /// Issued requests of one process summed over all meta-controllers.
    pub fn requests_of(&self, pid: usize) -> u64 {
        self.schedulers.iter().map(|s| s.request_count[pid]).sum()
    }
}

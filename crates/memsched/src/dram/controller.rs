//! Per-channel memory controller.
//!
//! A [`MemCtrl`] is the physical home of one channel's request queues. It provides:
//! 1. **Queues:** Per-bank read, write, and in-flight queues indexed by (rank, bank).
//! 2. **Load Accounting:** Global, per-process, and per-process-per-bank load counters.
//! 3. **Backpressure:** Side-effect-free capacity probes and a non-blocking enqueue.
//! 4. **Issue/Retire:** Row activation on issue and retirement after the service latency.
//!
//! Scheduling decisions are not made here; the owning
//! [`MemorySystem`](crate::sim::MemorySystem) asks the responsible meta-controller for
//! the best candidate and then calls back into the controller to move it.

use std::fmt;

use tracing::trace;

use super::bus::BusTransaction;
use super::request::Request;
use super::topology::{Bank, Channel, DramTiming};
use crate::common::{MemAddr, ReqType};
use crate::config::Config;
use crate::stats::CtrlStats;

/// Rejected enqueue: the target queue is at capacity.
///
/// Carries the request back so the caller can retry on a later cycle.
#[derive(Debug)]
pub struct QueueFull(pub Request);

impl QueueFull {
    /// Recovers the rejected request.
    pub fn into_inner(self) -> Request {
        self.0
    }
}

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} queue full for {}", self.0.kind, self.0)
    }
}

/// Memory controller owning one channel.
#[derive(Debug)]
pub struct MemCtrl {
    /// Channel id served by this controller.
    pub cid: usize,
    /// Bank hierarchy of the channel.
    pub chan: Channel,
    /// Cycles elapsed on this controller.
    pub cycles: u64,

    readqs: Vec<Vec<Request>>,
    writeqs: Vec<Vec<Request>>,
    inflightqs: Vec<Vec<Request>>,

    readq_max: usize,
    writeq_max: usize,
    num_procs: usize,

    rload: usize,
    wload: usize,
    rload_per_proc: Vec<usize>,
    wload_per_proc: Vec<usize>,
    rload_per_procrankbank: Vec<usize>,
    wload_per_procrankbank: Vec<usize>,

    timing: DramTiming,
    wb_high: usize,
    wb_low: usize,
    wb_mode: bool,

    stats: CtrlStats,
}

impl MemCtrl {
    /// Creates the controller for channel `cid`.
    ///
    /// # Arguments
    ///
    /// * `cid` - Channel id.
    /// * `rmax` - Ranks in the channel.
    /// * `bmax` - Banks per rank.
    /// * `config` - Simulator configuration (capacities, timing, process count).
    pub fn new(cid: usize, rmax: usize, bmax: usize, config: &Config) -> Self {
        let nbanks = rmax * bmax;
        let mem = &config.memory;
        Self {
            cid,
            chan: Channel::new(cid, rmax, bmax),
            cycles: 0,
            readqs: (0..nbanks).map(|_| Vec::new()).collect(),
            writeqs: (0..nbanks).map(|_| Vec::new()).collect(),
            inflightqs: (0..nbanks).map(|_| Vec::new()).collect(),
            readq_max: mem.readq_max_per_bank,
            writeq_max: mem.writeq_max,
            num_procs: config.num_procs,
            rload: 0,
            wload: 0,
            rload_per_proc: vec![0; config.num_procs],
            wload_per_proc: vec![0; config.num_procs],
            rload_per_procrankbank: vec![0; config.num_procs * nbanks],
            wload_per_procrankbank: vec![0; config.num_procs * nbanks],
            timing: DramTiming {
                t_cas: mem.t_cas,
                t_ras: mem.t_ras,
                t_pre: mem.t_pre,
                bus: mem.bus_latency,
            },
            wb_high: mem.wb_high_threshold(),
            wb_low: mem.wb_low_threshold(),
            wb_mode: false,
            stats: CtrlStats::default(),
        }
    }

    /// Ranks in the channel.
    #[inline]
    pub fn rmax(&self) -> usize {
        self.chan.rmax()
    }

    /// Banks per rank.
    #[inline]
    pub fn bmax(&self) -> usize {
        self.chan.bmax()
    }

    #[inline]
    fn slot(&self, rid: usize, bid: usize) -> usize {
        assert!(
            rid < self.rmax() && bid < self.bmax(),
            "controller {} has no bank (rank {rid}, bank {bid})",
            self.cid
        );
        rid * self.bmax() + bid
    }

    #[inline]
    fn proc_slot(&self, pid: usize, rid: usize, bid: usize) -> usize {
        self.check_pid(pid);
        pid * self.rmax() * self.bmax() + self.slot(rid, bid)
    }

    #[inline]
    fn check_pid(&self, pid: usize) {
        assert!(
            pid < self.num_procs,
            "process {pid} out of range on controller {} ({} processes configured)",
            self.cid,
            self.num_procs
        );
    }

    fn check_owner(&self, addr: &MemAddr) {
        assert!(
            addr.cid == self.cid,
            "request for {addr} routed to controller {}",
            self.cid
        );
    }

    /// Returns the bank at (`rid`, `bid`).
    #[inline]
    pub fn bank(&self, rid: usize, bid: usize) -> &Bank {
        self.chan.bank(rid, bid)
    }

    /// Pending reads of a bank, oldest first.
    pub fn readq(&self, rid: usize, bid: usize) -> &[Request] {
        &self.readqs[self.slot(rid, bid)]
    }

    /// Pending writes of a bank, oldest first.
    pub fn writeq(&self, rid: usize, bid: usize) -> &[Request] {
        &self.writeqs[self.slot(rid, bid)]
    }

    /// Requests issued to a bank and not yet retired, in issue order.
    pub fn inflightq(&self, rid: usize, bid: usize) -> &[Request] {
        &self.inflightqs[self.slot(rid, bid)]
    }

    /// Pending queue of the given kind for a bank.
    pub fn queue(&self, kind: ReqType, rid: usize, bid: usize) -> &[Request] {
        match kind {
            ReqType::Read => self.readq(rid, bid),
            ReqType::Write => self.writeq(rid, bid),
        }
    }

    /// Most recently issued in-flight request on a bank.
    pub fn current_request(&self, rid: usize, bid: usize) -> Option<&Request> {
        self.inflightq(rid, bid).last()
    }

    /// Capacity probe used before committing a request. Has no side effects.
    ///
    /// # Arguments
    ///
    /// * `pid` - Requesting process.
    /// * `kind` - Read or write.
    /// * `rid` - Target rank.
    /// * `bid` - Target bank.
    ///
    /// # Returns
    ///
    /// `true` if an enqueue of this shape would be rejected.
    pub fn is_q_full(&self, pid: usize, kind: ReqType, rid: usize, bid: usize) -> bool {
        self.check_pid(pid);
        match kind {
            ReqType::Read => self.readqs[self.slot(rid, bid)].len() >= self.readq_max,
            ReqType::Write => self.wload >= self.writeq_max,
        }
    }

    /// Admits a request into its bank's read or write queue.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFull`] carrying the untouched request if the queue is at capacity.
    ///
    /// # Panics
    ///
    /// Panics if the request addresses another channel or an unknown process.
    pub fn enqueue(&mut self, req: Request) -> Result<(), QueueFull> {
        self.check_owner(&req.addr);
        let MemAddr { rid, bid, .. } = req.addr;
        if self.is_q_full(req.pid, req.kind, rid, bid) {
            self.stats.rejected += 1;
            return Err(QueueFull(req));
        }
        let slot = self.slot(rid, bid);
        let pslot = self.proc_slot(req.pid, rid, bid);
        match req.kind {
            ReqType::Read => {
                self.rload += 1;
                self.rload_per_proc[req.pid] += 1;
                self.rload_per_procrankbank[pslot] += 1;
                self.readqs[slot].push(req);
            }
            ReqType::Write => {
                self.wload += 1;
                self.wload_per_proc[req.pid] += 1;
                self.wload_per_procrankbank[pslot] += 1;
                self.writeqs[slot].push(req);
            }
        }
        Ok(())
    }

    /// Removes the request at `idx` from a bank's pending queue and releases its load.
    pub(crate) fn take(&mut self, kind: ReqType, rid: usize, bid: usize, idx: usize) -> Request {
        let slot = self.slot(rid, bid);
        let req = match kind {
            ReqType::Read => self.readqs[slot].remove(idx),
            ReqType::Write => self.writeqs[slot].remove(idx),
        };
        let pslot = self.proc_slot(req.pid, rid, bid);
        match kind {
            ReqType::Read => {
                self.rload -= 1;
                self.rload_per_proc[req.pid] -= 1;
                self.rload_per_procrankbank[pslot] -= 1;
            }
            ReqType::Write => {
                self.wload -= 1;
                self.wload_per_proc[req.pid] -= 1;
                self.wload_per_procrankbank[pslot] -= 1;
            }
        }
        req
    }

    /// Removes a still-queued request by id.
    ///
    /// # Returns
    ///
    /// The request, or `None` if no queued request of that kind and id exists on the bank.
    pub fn dequeue(&mut self, kind: ReqType, rid: usize, bid: usize, id: u64) -> Option<Request> {
        let idx = self.queue(kind, rid, bid).iter().position(|r| r.id == id)?;
        Some(self.take(kind, rid, bid, idx))
    }

    /// Returns whether the request targets the row open in its bank.
    pub fn is_row_hit(&self, req: &Request) -> bool {
        self.check_owner(&req.addr);
        self.bank(req.addr.rid, req.addr.bid).is_row_hit(req.addr.rowid)
    }

    /// Activates the request's row and moves it to the bank's in-flight queue.
    ///
    /// # Arguments
    ///
    /// * `req` - Request previously removed from a pending queue.
    /// * `cycle` - Issue cycle.
    ///
    /// # Returns
    ///
    /// The bus transaction for the transfer.
    pub(crate) fn issue(&mut self, mut req: Request, cycle: u64) -> BusTransaction {
        let MemAddr { rid, bid, rowid, .. } = req.addr;
        let bank = self.chan.bank(rid, bid);
        let latency = self.timing.latency(bank.outcome(rowid));
        let done_at = cycle + latency;
        let outcome = self.chan.bank_mut(rid, bid).activate(rowid, req.pid, done_at);

        req.ts_issue = cycle;
        req.ts_departure = done_at;
        trace!(
            cid = self.cid,
            rid,
            bid,
            row = rowid,
            pid = req.pid,
            kind = %req.kind,
            ?outcome,
            latency,
            "issue"
        );

        self.stats.record_issue(req.kind, outcome);
        let txn = BusTransaction::new(req.addr, cycle);
        self.stats.record_bus(&txn);
        let slot = self.slot(rid, bid);
        self.inflightqs[slot].push(req);
        txn
    }

    /// Removes every in-flight request whose service completes by `cycle`.
    ///
    /// The caller delivers them to their completion callbacks.
    pub(crate) fn retire(&mut self, cycle: u64) -> Vec<Request> {
        let mut done = Vec::new();
        for q in &mut self.inflightqs {
            let mut i = 0;
            while i < q.len() {
                if q[i].ts_departure <= cycle {
                    done.push(q.remove(i));
                } else {
                    i += 1;
                }
            }
        }
        for req in &done {
            trace!(cid = self.cid, id = req.id, pid = req.pid, latency = req.latency(), "retire");
            self.stats.record_retire(req);
        }
        done
    }

    /// Advances the controller clock and updates write-drain mode.
    pub(crate) fn tick(&mut self) {
        self.cycles += 1;
        if !self.wb_mode && self.wload >= self.wb_high {
            self.wb_mode = true;
        } else if self.wb_mode && self.wload <= self.wb_low {
            self.wb_mode = false;
        }
    }

    /// Queue a ready bank should serve this cycle, if any.
    ///
    /// In write-drain mode writes take precedence; otherwise reads do, and a bank
    /// with no pending reads serves its pending writes.
    pub fn service_kind(&self, rid: usize, bid: usize) -> Option<ReqType> {
        if !self.bank(rid, bid).is_ready(self.cycles) {
            return None;
        }
        let has_reads = !self.readq(rid, bid).is_empty();
        let has_writes = !self.writeq(rid, bid).is_empty();
        let (first, second) = if self.wb_mode {
            ((has_writes, ReqType::Write), (has_reads, ReqType::Read))
        } else {
            ((has_reads, ReqType::Read), (has_writes, ReqType::Write))
        };
        if first.0 {
            Some(first.1)
        } else if second.0 {
            Some(second.1)
        } else {
            None
        }
    }

    /// Returns whether the controller is draining writes.
    pub const fn is_wb_mode(&self) -> bool {
        self.wb_mode
    }

    /// Returns whether no request is queued or in flight.
    pub fn is_idle(&self) -> bool {
        self.rload == 0 && self.wload == 0 && self.inflightqs.iter().all(Vec::is_empty)
    }

    /// Total queued reads.
    pub const fn rload(&self) -> usize {
        self.rload
    }

    /// Total queued writes.
    pub const fn wload(&self) -> usize {
        self.wload
    }

    /// Queued reads of one process.
    pub fn rload_per_proc(&self, pid: usize) -> usize {
        self.check_pid(pid);
        self.rload_per_proc[pid]
    }

    /// Queued writes of one process.
    pub fn wload_per_proc(&self, pid: usize) -> usize {
        self.check_pid(pid);
        self.wload_per_proc[pid]
    }

    /// Queued reads of one process to one bank.
    pub fn rload_per_procrankbank(&self, pid: usize, rid: usize, bid: usize) -> usize {
        self.rload_per_procrankbank[self.proc_slot(pid, rid, bid)]
    }

    /// Queued writes of one process to one bank.
    pub fn wload_per_procrankbank(&self, pid: usize, rid: usize, bid: usize) -> usize {
        self.wload_per_procrankbank[self.proc_slot(pid, rid, bid)]
    }

    /// Write queue capacity.
    pub const fn writeq_max(&self) -> usize {
        self.writeq_max
    }

    /// Read queue capacity of each bank.
    pub const fn readq_max(&self) -> usize {
        self.readq_max
    }

    /// Controller statistics.
    pub const fn stats(&self) -> &CtrlStats {
        &self.stats
    }
}

//! Meta-controller: one scheduling surface over one or all controllers.
//!
//! In private mode a [`MetaMemCtrl`] fronts a single channel's controller; in
//! omniscient mode one instance arbitrates across every channel with a single
//! shared scheduler state. The meta-controller holds controller *ids*, never the
//! controllers themselves: every call that needs queue or bank state takes the
//! system's controller slice and resolves ids through it.
//!
//! Schedulers observe the memory system through [`MetaView`], a read-only borrow of
//! the meta-controller's routing data plus the controller slice.

use tracing::debug;

use super::controller::MemCtrl;
use super::request::Request;
use super::topology::Bank;
use crate::common::MemAddr;
use crate::sched::Scheduler;
use crate::stats::SchedStats;

/// Flat identity of a bank across the controllers a meta-controller covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BankRef {
    /// Channel id.
    pub cid: usize,
    /// Rank id.
    pub rid: usize,
    /// Bank id.
    pub bid: usize,
}

/// Controllers and banks covered by a meta-controller.
#[derive(Clone, Debug)]
pub struct MetaTopology {
    omniscient: bool,
    ctrl_ids: Vec<usize>,
    banks: Vec<BankRef>,
    rmax: usize,
    bmax: usize,
}

impl MetaTopology {
    fn new(ctrls: &[&MemCtrl], omniscient: bool) -> Self {
        assert!(!ctrls.is_empty(), "meta-controller needs at least one controller");
        let rmax = ctrls[0].rmax();
        let bmax = ctrls[0].bmax();
        let mut banks = Vec::with_capacity(ctrls.len() * rmax * bmax);
        for mc in ctrls {
            assert!(
                mc.rmax() == rmax && mc.bmax() == bmax,
                "controller {} geometry {}x{} differs from {rmax}x{bmax}",
                mc.cid,
                mc.rmax(),
                mc.bmax()
            );
            banks.extend(mc.chan.banks().map(|b| BankRef {
                cid: b.cid,
                rid: b.rid,
                bid: b.bid,
            }));
        }
        Self {
            omniscient,
            ctrl_ids: ctrls.iter().map(|mc| mc.cid).collect(),
            banks,
            rmax,
            bmax,
        }
    }

    /// Returns whether this topology spans all channels.
    pub const fn is_omniscient(&self) -> bool {
        self.omniscient
    }

    /// Ids of the covered controllers.
    pub fn ctrl_ids(&self) -> &[usize] {
        &self.ctrl_ids
    }

    /// Returns whether channel `cid` is covered.
    pub fn owns(&self, cid: usize) -> bool {
        self.ctrl_ids.contains(&cid)
    }
}

/// Read-only scheduling context handed to [`Scheduler`] hooks.
#[derive(Clone, Copy, Debug)]
pub struct MetaView<'a> {
    topo: &'a MetaTopology,
    ctrls: &'a [MemCtrl],
}

impl<'a> MetaView<'a> {
    /// Builds a view over `topo` resolving controller ids through `ctrls`.
    pub const fn new(topo: &'a MetaTopology, ctrls: &'a [MemCtrl]) -> Self {
        Self { topo, ctrls }
    }

    /// Returns whether the meta-controller spans all channels.
    pub const fn is_omniscient(&self) -> bool {
        self.topo.omniscient
    }

    fn covered(&self) -> impl Iterator<Item = &'a MemCtrl> + '_ {
        self.topo.ctrl_ids.iter().map(|&cid| &self.ctrls[cid])
    }

    /// Resolves the controller serving channel `cid`.
    ///
    /// # Panics
    ///
    /// Panics if `cid` is not covered by this meta-controller.
    pub fn mctrl(&self, cid: usize) -> &'a MemCtrl {
        self.check_owner(cid);
        &self.ctrls[cid]
    }

    fn check_owner(&self, cid: usize) {
        assert!(
            self.topo.owns(cid),
            "channel {cid} is not served by meta-controller over {:?}",
            self.topo.ctrl_ids
        );
    }

    /// Resolves the bank a request targets.
    pub fn bank(&self, addr: &MemAddr) -> &'a Bank {
        self.mctrl(addr.cid).bank(addr.rid, addr.bid)
    }

    /// Cycles elapsed on the canonical controller.
    pub fn cycles(&self) -> u64 {
        self.mctrl(self.topo.ctrl_ids[0]).cycles
    }

    /// Returns whether the request targets its bank's open row.
    pub fn is_row_hit(&self, req: &Request) -> bool {
        self.bank(&req.addr).is_row_hit(req.addr.rowid)
    }

    /// Most recently issued in-flight request on a bank.
    pub fn current_request(&self, bank: BankRef) -> Option<&'a Request> {
        self.mctrl(bank.cid).current_request(bank.rid, bank.bid)
    }

    /// Returns whether the bank a request targets is currently serving the same process.
    ///
    /// The most recently issued in-flight request decides. With nothing in flight the
    /// bank's last served process decides instead, so the query keeps returning `true`
    /// for that process after its request retires, until the bank serves another one.
    pub fn is_req_to_cur_proc(&self, req: &Request) -> bool {
        let MemAddr { cid, rid, bid, .. } = req.addr;
        let current = self
            .current_request(BankRef { cid, rid, bid })
            .map(|r| r.pid)
            .or_else(|| self.bank(&req.addr).last_pid());
        current == Some(req.pid)
    }

    /// Number of banks covered.
    pub fn bank_count(&self) -> usize {
        self.topo.banks.len()
    }

    /// Covered banks in global-index order.
    pub fn banks(&self) -> &'a [BankRef] {
        &self.topo.banks
    }

    /// Maps a coordinate tuple to its contiguous index among the covered banks.
    ///
    /// Omniscient: `cid * rmax * bmax + rid * bmax + bid`. Private: `rid * bmax + bid`.
    pub fn global_bank_index(&self, addr: &MemAddr) -> usize {
        self.check_owner(addr.cid);
        let local = addr.rid * self.topo.bmax + addr.bid;
        if self.topo.omniscient {
            addr.cid * self.topo.rmax * self.topo.bmax + local
        } else {
            local
        }
    }

    /// Inverse of [`MetaView::global_bank_index`].
    pub fn bank_at(&self, global_bid: usize) -> BankRef {
        self.topo.banks[global_bid]
    }

    /// Queued reads across the covered controllers.
    pub fn rload(&self) -> usize {
        self.covered().map(MemCtrl::rload).sum()
    }

    /// Queued writes across the covered controllers.
    pub fn wload(&self) -> usize {
        self.covered().map(MemCtrl::wload).sum()
    }

    /// Queued reads of one process across the covered controllers.
    pub fn load_per_proc(&self, pid: usize) -> usize {
        self.covered().map(|mc| mc.rload_per_proc(pid)).sum()
    }

    /// Queued reads of one process to one bank, by global bank index.
    pub fn load_per_procbank(&self, pid: usize, global_bid: usize) -> usize {
        let bank = self.bank_at(global_bid);
        self.mctrl(bank.cid)
            .rload_per_procrankbank(pid, bank.rid, bank.bid)
    }

    /// Write queue capacity across the covered controllers.
    pub fn writeq_max(&self) -> usize {
        self.covered().map(MemCtrl::writeq_max).sum()
    }

    /// Returns whether the covered write queues are exhausted.
    pub fn is_writeq_full(&self) -> bool {
        self.wload() >= self.writeq_max()
    }

    /// Pending reads of a bank.
    pub fn readq(&self, bank: BankRef) -> &'a [Request] {
        self.mctrl(bank.cid).readq(bank.rid, bank.bid)
    }

    /// Pending writes of a bank.
    pub fn writeq(&self, bank: BankRef) -> &'a [Request] {
        self.mctrl(bank.cid).writeq(bank.rid, bank.bid)
    }
}

/// Scheduling front end for one controller (private) or all controllers (omniscient).
#[derive(Debug)]
pub struct MetaMemCtrl {
    topo: MetaTopology,
    sched: Box<dyn Scheduler>,
    wbsched: Option<Box<dyn Scheduler>>,
    stats: SchedStats,
}

impl MetaMemCtrl {
    /// Creates a private meta-controller over `ctrls[cid]`.
    ///
    /// # Arguments
    ///
    /// * `ctrls` - Every controller of the system, indexed by channel id.
    /// * `cid` - The channel this meta-controller serves.
    /// * `sched` - Read scheduler.
    /// * `wbsched` - Write scheduler, or `None` to use `sched` for writes as well.
    /// * `num_procs` - Process count, sizes the statistics arrays.
    pub fn new_private(
        ctrls: &[MemCtrl],
        cid: usize,
        sched: Box<dyn Scheduler>,
        wbsched: Option<Box<dyn Scheduler>>,
        num_procs: usize,
    ) -> Self {
        let topo = MetaTopology::new(&[&ctrls[cid]], false);
        Self::with_topology(topo, ctrls, sched, wbsched, num_procs)
    }

    /// Creates an omniscient meta-controller over every controller in `ctrls`.
    pub fn new_omniscient(
        ctrls: &[MemCtrl],
        sched: Box<dyn Scheduler>,
        wbsched: Option<Box<dyn Scheduler>>,
        num_procs: usize,
    ) -> Self {
        let all: Vec<&MemCtrl> = ctrls.iter().collect();
        let topo = MetaTopology::new(&all, true);
        Self::with_topology(topo, ctrls, sched, wbsched, num_procs)
    }

    fn with_topology(
        topo: MetaTopology,
        ctrls: &[MemCtrl],
        mut sched: Box<dyn Scheduler>,
        mut wbsched: Option<Box<dyn Scheduler>>,
        num_procs: usize,
    ) -> Self {
        let view = MetaView::new(&topo, ctrls);
        sched.initialize(&view);
        if let Some(wb) = wbsched.as_mut() {
            wb.initialize(&view);
        }
        debug!(
            ctrls = ?topo.ctrl_ids,
            banks = topo.banks.len(),
            sched = sched.name(),
            wbsched = wbsched.as_ref().map_or(sched.name(), |s| s.name()),
            "meta-controller ready"
        );
        Self {
            topo,
            sched,
            wbsched,
            stats: SchedStats::new(num_procs),
        }
    }

    /// Routing data of this meta-controller.
    pub const fn topology(&self) -> &MetaTopology {
        &self.topo
    }

    /// Returns a scheduling view resolving through `ctrls`.
    pub const fn view<'a>(&'a self, ctrls: &'a [MemCtrl]) -> MetaView<'a> {
        MetaView::new(&self.topo, ctrls)
    }

    /// Read scheduler.
    pub fn sched(&self) -> &dyn Scheduler {
        self.sched.as_ref()
    }

    /// Write scheduler (the read scheduler when both are shared).
    pub fn wbsched(&self) -> &dyn Scheduler {
        self.wbsched.as_deref().unwrap_or(self.sched.as_ref())
    }

    /// Scheduling statistics.
    pub const fn stats(&self) -> &SchedStats {
        &self.stats
    }

    /// Marks a process as finished; its later streaks are not recorded.
    pub fn set_proc_done(&mut self, pid: usize) {
        self.stats.set_proc_done(pid);
    }

    /// Notifies the schedulers that `req` was issued to its bank.
    ///
    /// Called before the request enters the in-flight queue, so the view still shows
    /// the bank as it was when the scheduler chose the request.
    pub fn issue_notify(&mut self, ctrls: &[MemCtrl], req: &Request) {
        self.stats.count_streaks(req);
        let view = MetaView::new(&self.topo, ctrls);
        self.sched.issue_notify(&view, req);
        if let Some(wb) = self.wbsched.as_mut() {
            wb.issue_notify(&view, req);
        }
    }

    /// Notifies the schedulers that `req` joined a pending queue.
    pub fn enqueue_notify(&mut self, ctrls: &[MemCtrl], req: &Request) {
        let view = MetaView::new(&self.topo, ctrls);
        self.sched.enqueue_notify(&view, req);
        if let Some(wb) = self.wbsched.as_mut() {
            wb.enqueue_notify(&view, req);
        }
    }

    /// Notifies the schedulers that `req` left a pending queue without being issued.
    pub fn dequeue_notify(&mut self, ctrls: &[MemCtrl], req: &Request) {
        let view = MetaView::new(&self.topo, ctrls);
        self.sched.dequeue_notify(&view, req);
        if let Some(wb) = self.wbsched.as_mut() {
            wb.dequeue_notify(&view, req);
        }
    }

    /// Returns whether the request targets its bank's open row.
    pub fn is_row_hit(&self, ctrls: &[MemCtrl], req: &Request) -> bool {
        self.view(ctrls).is_row_hit(req)
    }

    /// Index of the best read in `q` according to the read scheduler.
    pub fn find_best_rd_req(&self, ctrls: &[MemCtrl], q: &[Request]) -> Option<usize> {
        self.sched.find_best(&self.view(ctrls), q)
    }

    /// Index of the best write in `q` according to the write scheduler.
    pub fn find_best_wb_req(&self, ctrls: &[MemCtrl], q: &[Request]) -> Option<usize> {
        self.wbsched().find_best(&self.view(ctrls), q)
    }

    /// The preferred of two reads.
    pub fn better_req<'r>(
        &self,
        ctrls: &[MemCtrl],
        req1: &'r Request,
        req2: &'r Request,
    ) -> &'r Request {
        self.sched.better_req(&self.view(ctrls), req1, req2)
    }

    /// The preferred of two writes.
    pub fn better_wb_req<'r>(
        &self,
        ctrls: &[MemCtrl],
        req1: &'r Request,
        req2: &'r Request,
    ) -> &'r Request {
        self.wbsched().better_req(&self.view(ctrls), req1, req2)
    }

    /// Advances scheduler timers on behalf of controller `cid`.
    ///
    /// Private mode ticks on every call. Omniscient mode ticks only for channel 0, so
    /// shared scheduler state advances once per cycle however many channels exist.
    pub fn tick(&mut self, cid: usize) {
        if self.topo.omniscient && cid != 0 {
            return;
        }
        self.sched.tick();
        if let Some(wb) = self.wbsched.as_mut() {
            wb.tick();
        }
    }
}

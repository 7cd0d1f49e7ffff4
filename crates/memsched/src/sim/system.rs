//! Memory system: owns every controller and meta-controller side-by-side.
//!
//! Controllers and meta-controllers live in sibling vectors so a meta-controller can
//! be borrowed mutably while the controller slice is borrowed immutably for its
//! scheduling view. The processor model talks to the system through
//! [`MemorySystem::new_request`], [`MemorySystem::is_q_full`],
//! [`MemorySystem::enqueue`], and the completion callbacks attached to requests.

use tracing::{info, trace};

use crate::common::{AddressMap, ConfigError, MemAddr, ReqType};
use crate::config::Config;
use crate::dram::controller::{MemCtrl, QueueFull};
use crate::dram::meta::MetaMemCtrl;
use crate::dram::request::Request;
use crate::sched;
use crate::stats::SystemStats;

/// Top-level memory system: controllers, meta-controllers, and the cycle counter.
#[derive(Debug)]
pub struct MemorySystem {
    map: AddressMap,
    ctrls: Vec<MemCtrl>,
    metas: Vec<MetaMemCtrl>,
    cycle: u64,
    next_id: u64,
    num_procs: usize,
}

impl MemorySystem {
    /// Builds the memory system described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration fails validation.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let map = AddressMap::from_config(&config.memory)?;
        let (channels, rmax, bmax) = (map.channels(), map.ranks(), map.banks());

        let ctrls: Vec<MemCtrl> = (0..channels)
            .map(|cid| MemCtrl::new(cid, rmax, bmax, config))
            .collect();

        let make_scheds = || {
            let sched = sched::build(config.sched.algo, config);
            let wbsched =
                (!config.sched.same_sched_algo).then(|| sched::build(config.sched.wb_algo, config));
            (sched, wbsched)
        };
        let metas = if config.sched.omniscient {
            let (sched, wbsched) = make_scheds();
            vec![MetaMemCtrl::new_omniscient(&ctrls, sched, wbsched, config.num_procs)]
        } else {
            (0..channels)
                .map(|cid| {
                    let (sched, wbsched) = make_scheds();
                    MetaMemCtrl::new_private(&ctrls, cid, sched, wbsched, config.num_procs)
                })
                .collect()
        };

        info!(
            channels,
            ranks = rmax,
            banks = bmax,
            procs = config.num_procs,
            omniscient = config.sched.omniscient,
            sched = metas[0].sched().name(),
            wbsched = metas[0].wbsched().name(),
            "memory system ready"
        );

        Ok(Self {
            map,
            ctrls,
            metas,
            cycle: 0,
            next_id: 0,
            num_procs: config.num_procs,
        })
    }

    /// Address decoding in use.
    pub const fn address_map(&self) -> &AddressMap {
        &self.map
    }

    /// Cycles simulated so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Number of processes the system was sized for.
    pub const fn num_procs(&self) -> usize {
        self.num_procs
    }

    /// Every controller, indexed by channel id.
    pub fn controllers(&self) -> &[MemCtrl] {
        &self.ctrls
    }

    /// Controller of channel `cid`.
    pub fn controller(&self, cid: usize) -> &MemCtrl {
        &self.ctrls[cid]
    }

    /// Every meta-controller (one per channel, or a single omniscient one).
    pub fn metas(&self) -> &[MetaMemCtrl] {
        &self.metas
    }

    #[inline]
    fn meta_index(&self, cid: usize) -> usize {
        if self.metas.len() == 1 { 0 } else { cid }
    }

    /// Meta-controller responsible for channel `cid`.
    pub fn meta_for(&self, cid: usize) -> &MetaMemCtrl {
        &self.metas[self.meta_index(cid)]
    }

    /// Creates a request stamped with a fresh id and the current cycle.
    ///
    /// # Arguments
    ///
    /// * `pid` - Issuing process.
    /// * `kind` - Read or write.
    /// * `block_addr` - Physical block address; decoded with the system's address map.
    pub fn new_request(&mut self, pid: usize, kind: ReqType, block_addr: u64) -> Request {
        let id = self.next_id;
        self.next_id += 1;
        Request::new(id, pid, kind, block_addr, self.map.decode(block_addr), self.cycle)
    }

    /// Capacity probe for a request of this shape. Has no side effects.
    pub fn is_q_full(&self, pid: usize, kind: ReqType, addr: &MemAddr) -> bool {
        self.ctrls[addr.cid].is_q_full(pid, kind, addr.rid, addr.bid)
    }

    /// Admits a request to its controller and notifies the schedulers.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFull`] with the request if its queue is at capacity; the caller
    /// retries on a later cycle.
    pub fn enqueue(&mut self, req: Request) -> Result<(), QueueFull> {
        let MemAddr { cid, rid, bid, .. } = req.addr;
        let kind = req.kind;
        self.ctrls[cid].enqueue(req)?;
        let m = self.meta_index(cid);
        if let Some(queued) = self.ctrls[cid].queue(kind, rid, bid).last() {
            self.metas[m].enqueue_notify(&self.ctrls, queued);
        }
        Ok(())
    }

    /// Withdraws a still-queued request on behalf of its processor.
    ///
    /// # Returns
    ///
    /// The request, or `None` if it is not pending (already issued or unknown).
    pub fn dequeue(&mut self, addr: &MemAddr, kind: ReqType, id: u64) -> Option<Request> {
        let req = self.ctrls[addr.cid].dequeue(kind, addr.rid, addr.bid, id)?;
        let m = self.meta_index(addr.cid);
        self.metas[m].dequeue_notify(&self.ctrls, &req);
        Some(req)
    }

    /// Marks a process as finished for streak statistics.
    pub fn set_proc_done(&mut self, pid: usize) {
        for meta in &mut self.metas {
            meta.set_proc_done(pid);
        }
    }

    /// Advances the whole memory system by one cycle.
    ///
    /// Controllers are visited in channel order. For each: scheduler timers advance,
    /// finished requests retire through their callbacks, then every ready bank issues
    /// the best pending candidate.
    pub fn tick(&mut self) {
        self.cycle += 1;
        for cid in 0..self.ctrls.len() {
            let m = self.meta_index(cid);
            self.metas[m].tick(cid);
            self.ctrls[cid].tick();
            for req in self.ctrls[cid].retire(self.cycle) {
                req.complete();
            }
            self.schedule(cid, m);
        }
    }

    /// Runs `cycles` ticks.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.tick();
        }
    }

    /// Ticks until no request is queued or in flight, up to `max_cycles`.
    ///
    /// # Returns
    ///
    /// `true` if the system drained within the limit.
    pub fn drain(&mut self, max_cycles: u64) -> bool {
        for _ in 0..max_cycles {
            if self.is_idle() {
                return true;
            }
            self.tick();
        }
        self.is_idle()
    }

    /// Returns whether no request is queued or in flight anywhere.
    pub fn is_idle(&self) -> bool {
        self.ctrls.iter().all(MemCtrl::is_idle)
    }

    fn schedule(&mut self, cid: usize, m: usize) {
        let (rmax, bmax) = (self.ctrls[cid].rmax(), self.ctrls[cid].bmax());
        for rid in 0..rmax {
            for bid in 0..bmax {
                let Some(kind) = self.ctrls[cid].service_kind(rid, bid) else {
                    continue;
                };
                let q = self.ctrls[cid].queue(kind, rid, bid);
                let best = match kind {
                    ReqType::Read => self.metas[m].find_best_rd_req(&self.ctrls, q),
                    ReqType::Write => self.metas[m].find_best_wb_req(&self.ctrls, q),
                };
                let Some(idx) = best else {
                    panic!(
                        "scheduler chose nothing from non-empty {kind} queue of channel {cid} rank {rid} bank {bid}"
                    );
                };
                let req = self.ctrls[cid].take(kind, rid, bid, idx);
                self.metas[m].issue_notify(&self.ctrls, &req);
                let txn = self.ctrls[cid].issue(req, self.cycle);
                trace!(cid, ts = txn.ts, "bus transaction");
            }
        }
    }

    /// Snapshot of all statistics.
    pub fn stats(&self) -> SystemStats {
        SystemStats {
            cycles: self.cycle,
            controllers: self.ctrls.iter().map(|c| c.stats().clone()).collect(),
            schedulers: self.metas.iter().map(|m| m.stats().clone()).collect(),
        }
    }
}

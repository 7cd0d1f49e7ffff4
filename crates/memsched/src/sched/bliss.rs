//! Blacklisting Memory Scheduler.
//!
//! Row-hit-first scheduling that detects processes monopolizing a row buffer and
//! deprioritizes them until the next periodic reset.
//!
//! # Algorithm
//!
//! Candidates are ranked by, in order:
//! 1. Blacklist status: a request from a non-blacklisted process beats one from a
//!    blacklisted process.
//! 2. Row-buffer status: a hit beats a miss.
//! 3. Age: the earlier arrival wins; ties keep the first argument.
//!
//! Each issued request extends or restarts a *streak* of consecutive issues by the same
//! process, tracked per bank (default) or per meta-controller in channel-level mode.
//! Issuing again after the streak has reached `row_hit_cap` blacklists the process and
//! restarts the streak at 1. Every `shuffle_cycles` ticks all blacklist marks are cleared.

use tracing::debug;

use super::{Pick, Scheduler, older};
use crate::config::SchedConfig;
use crate::dram::meta::MetaView;
use crate::dram::request::Request;

/// Blacklisting scheduler state.
#[derive(Clone, Debug)]
pub struct BlissScheduler {
    shuffle_cycles: u64,
    shuffle_cycles_left: u64,
    row_hit_cap: u32,
    channel_level: bool,

    mark: Vec<bool>,
    oldest_streak: Vec<u32>,
    oldest_streak_global: u32,
    last_req_pid: Option<usize>,
}

impl BlissScheduler {
    /// Creates the scheduler.
    ///
    /// # Arguments
    ///
    /// * `config` - Shuffle interval, streak cap, and tracking granularity.
    /// * `num_procs` - Number of processes; sizes the blacklist.
    pub fn new(config: &SchedConfig, num_procs: usize) -> Self {
        Self {
            shuffle_cycles: config.shuffle_cycles,
            shuffle_cycles_left: config.shuffle_cycles,
            row_hit_cap: config.row_hit_cap,
            channel_level: config.channel_level,
            mark: vec![false; num_procs],
            oldest_streak: Vec::new(),
            oldest_streak_global: 0,
            last_req_pid: None,
        }
    }

    /// Clears every blacklist mark.
    pub fn clear_marking(&mut self) {
        self.mark.fill(false);
    }

    /// Current streak of the bank at `global_bid` (per-bank mode).
    pub fn streak(&self, global_bid: usize) -> u32 {
        self.oldest_streak.get(global_bid).copied().unwrap_or(0)
    }

    /// Current streak in channel-level mode.
    pub const fn global_streak(&self) -> u32 {
        self.oldest_streak_global
    }

    /// Ticks remaining until the next blacklist reset.
    pub const fn shuffle_cycles_left(&self) -> u64 {
        self.shuffle_cycles_left
    }

    fn check_pid(&self, pid: usize) {
        assert!(
            pid < self.mark.len(),
            "process {pid} out of range for blacklist of {} processes",
            self.mark.len()
        );
    }

    fn marked(&self, pid: usize) -> bool {
        self.check_pid(pid);
        self.mark[pid]
    }

    /// Advances a streak counter for a same-process (`same`) or new-process issue.
    ///
    /// # Returns
    ///
    /// `true` if the streak had reached the cap and the process must be blacklisted.
    fn advance(streak: &mut u32, same: bool, cap: u32) -> bool {
        if same && *streak < cap {
            *streak += 1;
            false
        } else if same {
            *streak = 1;
            true
        } else {
            *streak = 1;
            false
        }
    }

    fn blacklist(&mut self, pid: usize) {
        self.check_pid(pid);
        if !self.mark[pid] {
            debug!(pid, "blacklisting process");
        }
        self.mark[pid] = true;
    }
}

impl Scheduler for BlissScheduler {
    fn name(&self) -> &'static str {
        "BLISS"
    }

    fn initialize(&mut self, meta: &MetaView<'_>) {
        self.oldest_streak = vec![0; meta.bank_count()];
    }

    fn better(&self, meta: &MetaView<'_>, req1: &Request, req2: &Request) -> Pick {
        match (self.marked(req1.pid), self.marked(req2.pid)) {
            (false, true) => return Pick::First,
            (true, false) => return Pick::Second,
            _ => {}
        }

        match (meta.is_row_hit(req1), meta.is_row_hit(req2)) {
            (true, false) => Pick::First,
            (false, true) => Pick::Second,
            _ => older(req1, req2),
        }
    }

    fn tick(&mut self) {
        self.shuffle_cycles_left = self.shuffle_cycles_left.saturating_sub(1);
        if self.shuffle_cycles_left == 0 {
            self.shuffle_cycles_left = self.shuffle_cycles;
            if self.mark.iter().any(|&m| m) {
                debug!("clearing blacklist");
            }
            self.clear_marking();
        }
    }

    fn issue_notify(&mut self, meta: &MetaView<'_>, req: &Request) {
        let cap = self.row_hit_cap;
        let exceeded = if self.channel_level {
            let same = self.last_req_pid == Some(req.pid);
            self.last_req_pid = Some(req.pid);
            Self::advance(&mut self.oldest_streak_global, same, cap)
        } else {
            let bid = meta.global_bank_index(&req.addr);
            let same = meta.is_req_to_cur_proc(req);
            Self::advance(&mut self.oldest_streak[bid], same, cap)
        };
        if exceeded {
            self.blacklist(req.pid);
        }
    }

    fn is_blacklisted(&self, pid: usize) -> bool {
        self.marked(pid)
    }
}

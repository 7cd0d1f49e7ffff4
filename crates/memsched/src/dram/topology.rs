//! Physical DRAM hierarchy: channel → ranks → banks.
//!
//! The hierarchy is a fixed arena built once when a controller is created and
//! never resized. Banks are addressed everywhere else by small integer ids.
//! A bank's only mutable state is its row buffer and the identity of the last
//! process it served, both updated solely by the owning controller on issue.

use serde::Serialize;

/// Outcome of presenting a row to a bank's row buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RowOutcome {
    /// The requested row was already open.
    Hit,
    /// No row was open; the row must be activated.
    Closed,
    /// A different row was open; it must be precharged before activation.
    Conflict,
}

impl RowOutcome {
    /// Returns `true` for [`RowOutcome::Hit`].
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Hit)
    }
}

/// Row-buffer timing used to compute service latency on issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DramTiming {
    /// Column access strobe latency.
    pub t_cas: u64,
    /// Row access strobe latency.
    pub t_ras: u64,
    /// Precharge latency.
    pub t_pre: u64,
    /// Data bus transfer latency.
    pub bus: u64,
}

impl DramTiming {
    /// Cycles to service a request with the given row-buffer outcome.
    pub const fn latency(&self, outcome: RowOutcome) -> u64 {
        let core = match outcome {
            RowOutcome::Hit => self.t_cas,
            RowOutcome::Closed => self.t_ras + self.t_cas,
            RowOutcome::Conflict => self.t_pre + self.t_ras + self.t_cas,
        };
        core + self.bus
    }
}

/// One DRAM bank and its row buffer.
#[derive(Clone, Debug)]
pub struct Bank {
    /// Id of the owning controller (equals the channel id).
    pub mc: usize,
    /// Channel id.
    pub cid: usize,
    /// Rank id within the channel.
    pub rid: usize,
    /// Bank id within the rank.
    pub bid: usize,
    curr_rowid: Option<u64>,
    last_pid: Option<usize>,
    busy_until: u64,
}

impl Bank {
    fn new(cid: usize, rid: usize, bid: usize) -> Self {
        Self {
            mc: cid,
            cid,
            rid,
            bid,
            curr_rowid: None,
            last_pid: None,
            busy_until: 0,
        }
    }

    /// Currently open row, if any.
    #[inline]
    pub const fn curr_rowid(&self) -> Option<u64> {
        self.curr_rowid
    }

    /// Process id of the most recently issued request on this bank.
    #[inline]
    pub const fn last_pid(&self) -> Option<usize> {
        self.last_pid
    }

    /// Returns whether `rowid` is the open row.
    #[inline]
    pub fn is_row_hit(&self, rowid: u64) -> bool {
        self.curr_rowid == Some(rowid)
    }

    /// Row-buffer outcome of accessing `rowid`, without changing state.
    pub fn outcome(&self, rowid: u64) -> RowOutcome {
        match self.curr_rowid {
            Some(open_row) if open_row == rowid => RowOutcome::Hit,
            Some(_) => RowOutcome::Conflict,
            None => RowOutcome::Closed,
        }
    }

    /// Returns whether the bank can accept a new command at `cycle`.
    #[inline]
    pub const fn is_ready(&self, cycle: u64) -> bool {
        self.busy_until <= cycle
    }

    /// Opens `rowid` for `pid` and keeps the bank busy until `done_at`.
    ///
    /// # Returns
    ///
    /// The row-buffer outcome observed before activation.
    pub(crate) fn activate(&mut self, rowid: u64, pid: usize, done_at: u64) -> RowOutcome {
        let outcome = self.outcome(rowid);
        self.curr_rowid = Some(rowid);
        self.last_pid = Some(pid);
        self.busy_until = done_at;
        outcome
    }
}

/// A rank: a fixed array of banks.
#[derive(Clone, Debug)]
pub struct Rank {
    /// Banks of this rank, indexed by bank id.
    pub banks: Vec<Bank>,
}

impl Rank {
    /// Number of banks in the rank.
    #[inline]
    pub fn bmax(&self) -> usize {
        self.banks.len()
    }
}

/// A channel: a fixed array of ranks, owned by exactly one controller.
#[derive(Clone, Debug)]
pub struct Channel {
    /// Channel id.
    pub cid: usize,
    /// Ranks of this channel, indexed by rank id.
    pub ranks: Vec<Rank>,
}

impl Channel {
    /// Builds a channel with `rmax` ranks of `bmax` banks each, all rows closed.
    pub fn new(cid: usize, rmax: usize, bmax: usize) -> Self {
        let ranks = (0..rmax)
            .map(|rid| Rank {
                banks: (0..bmax).map(|bid| Bank::new(cid, rid, bid)).collect(),
            })
            .collect();
        Self { cid, ranks }
    }

    /// Number of ranks in the channel.
    #[inline]
    pub fn rmax(&self) -> usize {
        self.ranks.len()
    }

    /// Banks per rank.
    #[inline]
    pub fn bmax(&self) -> usize {
        self.ranks.first().map_or(0, Rank::bmax)
    }

    /// Returns the bank at (`rid`, `bid`).
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the channel.
    #[inline]
    pub fn bank(&self, rid: usize, bid: usize) -> &Bank {
        &self.ranks[rid].banks[bid]
    }

    #[inline]
    pub(crate) fn bank_mut(&mut self, rid: usize, bid: usize) -> &mut Bank {
        &mut self.ranks[rid].banks[bid]
    }

    /// Iterates over every bank in rank-major order.
    pub fn banks(&self) -> impl Iterator<Item = &Bank> + '_ {
        self.ranks.iter().flat_map(|rank| rank.banks.iter())
    }
}

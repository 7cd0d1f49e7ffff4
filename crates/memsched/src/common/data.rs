//! Memory Request Types.
//!
//! This module defines the classification of requests handled by the controllers.
//! The kind selects the queue a request lands in:
//! 1. **Queue Routing:** Reads go to the per-bank read queue, writes to the write queue.
//! 2. **Capacity Checks:** Reads are bounded per bank, writes per controller.
//! 3. **Statistics Tracking:** Separate read and write load counters.

use serde::Serialize;
use std::fmt;

/// Kind of memory request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ReqType {
    /// Demand read (cache-line fill) request.
    Read,

    /// Writeback request of a dirty cache line.
    Write,
}

impl ReqType {
    /// Returns `true` for [`ReqType::Read`].
    #[inline]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Read)
    }
}

impl fmt::Display for ReqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "RD"),
            Self::Write => write!(f, "WR"),
        }
    }
}

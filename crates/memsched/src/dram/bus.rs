//! Data-bus transaction record.

use serde::Serialize;

use crate::common::MemAddr;

/// An address crossing the data bus at a given cycle.
///
/// Created when a request is issued and consumed immediately by statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BusTransaction {
    /// Coordinates of the transferred line.
    pub addr: MemAddr,
    /// Cycle at which the transfer was dispatched.
    pub ts: u64,
}

impl BusTransaction {
    /// Creates a transaction for `addr` at cycle `ts`.
    pub const fn new(addr: MemAddr, ts: u64) -> Self {
        Self { addr, ts }
    }
}

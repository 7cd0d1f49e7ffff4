//! Memory requests and their completion callbacks.
//!
//! A [`Request`] is created by the processor model, moved into a controller queue on
//! enqueue, moved to the bank's in-flight queue on issue, and handed back to the
//! processor through its completion callback when its service latency elapses.
//! The core never duplicates a request; every transition is a move.

use std::fmt;

use crate::common::{MemAddr, ReqType};

/// Completion callback invoked exactly once with the retired request.
pub type Callback = Box<dyn FnOnce(Request)>;

/// A memory request from one process.
pub struct Request {
    /// System-unique request id.
    pub id: u64,
    /// Issuing process id.
    pub pid: usize,
    /// Read or write.
    pub kind: ReqType,
    /// Physical address of the cache block.
    pub block_addr: u64,
    /// Decoded DRAM coordinates of `block_addr`.
    pub addr: MemAddr,
    /// Cycle the request entered the controller.
    pub ts_arrival: u64,
    /// Cycle the request was issued to its bank (zero while queued).
    pub ts_issue: u64,
    /// Cycle the request retires (zero until issued).
    pub ts_departure: u64,
    callback: Option<Callback>,
}

impl Request {
    /// Creates a request without a completion callback.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique id.
    /// * `pid` - Issuing process.
    /// * `kind` - Read or write.
    /// * `block_addr` - Physical block address.
    /// * `addr` - Decoded coordinates of `block_addr`.
    /// * `ts_arrival` - Arrival cycle.
    pub const fn new(
        id: u64,
        pid: usize,
        kind: ReqType,
        block_addr: u64,
        addr: MemAddr,
        ts_arrival: u64,
    ) -> Self {
        Self {
            id,
            pid,
            kind,
            block_addr,
            addr,
            ts_arrival,
            ts_issue: 0,
            ts_departure: 0,
            callback: None,
        }
    }

    /// Attaches the completion callback, replacing any previous one.
    #[must_use]
    pub fn with_callback(mut self, callback: impl FnOnce(Self) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Attaches the completion callback in place.
    pub fn set_callback(&mut self, callback: impl FnOnce(Self) + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Returns whether a completion callback is attached.
    pub const fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Cycles from arrival to retirement.
    pub const fn latency(&self) -> u64 {
        self.ts_departure.saturating_sub(self.ts_arrival)
    }

    /// Retires the request, handing it to its callback if one is attached.
    pub(crate) fn complete(mut self) {
        if let Some(callback) = self.callback.take() {
            callback(self);
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("pid", &self.pid)
            .field("kind", &self.kind)
            .field("block_addr", &format_args!("{:#x}", self.block_addr))
            .field("addr", &self.addr)
            .field("ts_arrival", &self.ts_arrival)
            .field("ts_issue", &self.ts_issue)
            .field("ts_departure", &self.ts_departure)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{} pid {} {:#x} {}",
            self.kind, self.id, self.pid, self.block_addr, self.addr
        )
    }
}

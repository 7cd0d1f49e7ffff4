//! DRAM Controllers and Topology.
//!
//! This module implements the queueing side of the memory system. It provides:
//! 1. **Topology:** The fixed channel → rank → bank arena with per-bank row buffers.
//! 2. **Requests:** The request record moved between queues and its completion callback.
//! 3. **Bus:** Timestamped data-bus transaction records.
//! 4. **Controller:** Per-channel queues, load counters, and capacity checks.
//! 5. **Meta-Controller:** Scheduling surface over one or all controllers.

/// Data-bus transaction record.
pub mod bus;

/// Per-channel memory controller.
pub mod controller;

/// Meta-controller and scheduling view.
pub mod meta;

/// Memory requests and completion callbacks.
pub mod request;

/// Channel, rank, and bank arena.
pub mod topology;

pub use bus::BusTransaction;
pub use controller::{MemCtrl, QueueFull};
pub use meta::{BankRef, MetaMemCtrl, MetaView};
pub use request::Request;
pub use topology::{Bank, Channel, Rank, RowOutcome};

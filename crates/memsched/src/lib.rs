//! Multi-channel DRAM memory-controller and scheduling simulator library.
//!
//! This crate implements the queueing and arbitration core of a cycle-driven DRAM subsystem:
//! 1. **Topology:** Address decoding into channel/rank/bank/row/column and the bank arena.
//! 2. **Controllers:** Per-channel read, write, and in-flight queues with load accounting.
//! 3. **Meta-controller:** One scheduling surface over one channel or all channels (omniscient).
//! 4. **Schedulers:** FCFS, FR-FCFS, and the blacklisting fairness policy.
//! 5. **Simulation:** The per-cycle driver, configuration, and statistics collection.

/// Common types and constants (addresses, request kinds, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// DRAM controllers, bank topology, requests, and the meta-controller.
pub mod dram;
/// Memory scheduling policies and the scheduler contract.
pub mod sched;
/// Cycle driver owning all controllers and meta-controllers.
pub mod sim;
/// Scheduling and controller statistics.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// A memory request travelling through the controller queues.
pub use crate::dram::request::Request;
/// Top-level memory system; construct with `MemorySystem::new`.
pub use crate::sim::MemorySystem;

//! Common utilities and types used throughout the memory-system simulator.
//!
//! This module provides fundamental building blocks shared by the controllers and schedulers:
//! 1. **Address Types:** DRAM coordinates and the physical-address bit-slicing map.
//! 2. **Constants:** Sentinels and statistics bounds.
//! 3. **Request Kinds:** Read/write classification of memory requests.
//! 4. **Error Handling:** Configuration and construction errors.

/// DRAM address decoding (channel, rank, bank, row, column).
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory request kind definitions.
pub mod data;

/// Error types for configuration and construction.
pub mod error;

pub use addr::{AddressMap, MemAddr};
pub use data::ReqType;
pub use error::ConfigError;

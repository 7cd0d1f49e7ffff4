//! # Unit Components
//!
//! Test suites organized like the library: address and configuration plumbing,
//! the DRAM controller side, the scheduling policies, and the cycle driver.


/// Unit tests for configuration defaults, parsing, and validation.
pub mod config;




/// Unit tests for streak and controller statistics.
pub mod stats;

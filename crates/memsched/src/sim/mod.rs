//! Simulation driver.
//!
//! Provides the [`MemorySystem`] that owns every controller and meta-controller and
//! advances them in lock-step, one simulated cycle per [`MemorySystem::tick`].

/// The cycle-driven memory system.
pub mod system;

pub use system::MemorySystem;

//! Configuration system for the memory-system simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline DRAM geometry, queue capacities, and timings.
//! 2. **Structures:** Hierarchical config for the memory subsystem and the schedulers.
//! 3. **Enums:** Scheduling algorithm selection.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built from `Config::default()`.
//! It is read once when the [`MemorySystem`](crate::sim::MemorySystem) is constructed.

use serde::Deserialize;

use crate::common::addr::AddressMap;
use crate::common::constants::MAX_TOPOLOGY_BITS;
use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Number of processors sharing the memory system.
    pub const NUM_PROCS: usize = 16;

    /// Channel field width (2 channels).
    pub const CHANNEL_BITS: u32 = 1;

    /// Rank field width (1 rank per channel).
    pub const RANK_BITS: u32 = 0;

    /// Bank field width (8 banks per rank).
    pub const BANK_BITS: u32 = 3;

    /// Column field width (8 KiB row slice per channel).
    pub const COL_BITS: u32 = 13;

    /// Read queue entries per bank.
    pub const READQ_MAX_PER_BANK: usize = 64;

    /// Write queue entries per controller.
    pub const WRITEQ_MAX: usize = 64;

    /// Write-drain entry threshold as a fraction of the write queue.
    pub const WB_HIGH_WATERMARK: f64 = 0.8;

    /// Write-drain exit threshold as a fraction of the write queue.
    pub const WB_LOW_WATERMARK: f64 = 0.5;

    /// CAS (Column Access Strobe) latency in DRAM cycles.
    pub const T_CAS: u64 = 14;

    /// RAS (Row Access Strobe) latency in DRAM cycles.
    pub const T_RAS: u64 = 14;

    /// Precharge latency in DRAM cycles.
    pub const T_PRE: u64 = 14;

    /// Data bus transfer latency in DRAM cycles.
    pub const BUS_LATENCY: u64 = 4;

    /// Cycles between blacklist resets.
    pub const SHUFFLE_CYCLES: u64 = 10_000;

    /// Consecutive same-process issues tolerated before blacklisting.
    pub const ROW_HIT_CAP: u32 = 4;
}

/// Memory scheduling algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SchedAlgo {
    /// First-come, first-served: the oldest request wins.
    #[serde(alias = "FCFS")]
    Fcfs,
    /// First-ready FCFS: row-buffer hits win, then the oldest request.
    #[serde(alias = "FRFCFS", alias = "FR-FCFS")]
    FrFcfs,
    /// Row-hit-first scheduling with periodic blacklisting of processes
    /// that monopolize a row buffer.
    #[default]
    #[serde(alias = "BLISS")]
    Bliss,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use memsched_core::config::{Config, SchedAlgo};
///
/// let json = r#"{
///     "num_procs": 4,
///     "memory": { "channel_bits": 2, "bank_bits": 2, "writeq_max": 8 },
///     "sched": { "algo": "Bliss", "omniscient": true, "row_hit_cap": 2 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.num_procs, 4);
/// assert_eq!(config.memory.writeq_max, 8);
/// assert_eq!(config.sched.algo, SchedAlgo::Bliss);
/// assert!(config.sched.omniscient);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Number of processors issuing requests; sizes per-process arrays.
    #[serde(default = "Config::default_num_procs")]
    pub num_procs: usize,
    /// DRAM geometry, queue capacities, and timing.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Scheduler selection and fairness parameters.
    #[serde(default)]
    pub sched: SchedConfig,
}

impl Config {
    fn default_num_procs() -> usize {
        defaults::NUM_PROCS
    }

    /// Parses and validates a JSON configuration.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_procs == 0 {
            return Err(ConfigError::invalid("num_procs", "must be at least 1"));
        }
        let _ = AddressMap::from_config(&self.memory)?;
        self.memory.validate()?;
        self.sched.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_procs: defaults::NUM_PROCS,
            memory: MemoryConfig::default(),
            sched: SchedConfig::default(),
        }
    }
}

/// DRAM geometry, queue capacity, and timing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Width of the channel address field (channels = 2^bits).
    ///
    /// Channel, rank, and bank widths together may not exceed
    /// [`MAX_TOPOLOGY_BITS`].
    #[serde(default = "MemoryConfig::default_channel_bits")]
    pub channel_bits: u32,

    /// Width of the rank address field (ranks per channel = 2^bits).
    #[serde(default = "MemoryConfig::default_rank_bits")]
    pub rank_bits: u32,

    /// Width of the bank address field (banks per rank = 2^bits).
    #[serde(default = "MemoryConfig::default_bank_bits")]
    pub bank_bits: u32,

    /// Width of the column (byte offset in row) field.
    #[serde(default = "MemoryConfig::default_col_bits")]
    pub col_bits: u32,

    /// Read queue capacity of each bank.
    #[serde(default = "MemoryConfig::default_readq_max_per_bank")]
    pub readq_max_per_bank: usize,

    /// Write queue capacity of each controller (shared by all its banks).
    #[serde(default = "MemoryConfig::default_writeq_max")]
    pub writeq_max: usize,

    /// Enter write-drain mode when write load reaches this fraction of `writeq_max`.
    #[serde(default = "MemoryConfig::default_wb_high_watermark")]
    pub wb_high_watermark: f64,

    /// Leave write-drain mode when write load falls to this fraction of `writeq_max`.
    #[serde(default = "MemoryConfig::default_wb_low_watermark")]
    pub wb_low_watermark: f64,

    /// Column access latency (row-buffer hit).
    #[serde(default = "MemoryConfig::default_t_cas")]
    pub t_cas: u64,

    /// Row activation latency.
    #[serde(default = "MemoryConfig::default_t_ras")]
    pub t_ras: u64,

    /// Precharge latency (closing the previously open row).
    #[serde(default = "MemoryConfig::default_t_pre")]
    pub t_pre: u64,

    /// Data bus transfer latency added to every access.
    #[serde(default = "MemoryConfig::default_bus_latency")]
    pub bus_latency: u64,
}

impl MemoryConfig {
    fn default_channel_bits() -> u32 {
        defaults::CHANNEL_BITS
    }

    fn default_rank_bits() -> u32 {
        defaults::RANK_BITS
    }

    fn default_bank_bits() -> u32 {
        defaults::BANK_BITS
    }

    fn default_col_bits() -> u32 {
        defaults::COL_BITS
    }

    fn default_readq_max_per_bank() -> usize {
        defaults::READQ_MAX_PER_BANK
    }

    fn default_writeq_max() -> usize {
        defaults::WRITEQ_MAX
    }

    fn default_wb_high_watermark() -> f64 {
        defaults::WB_HIGH_WATERMARK
    }

    fn default_wb_low_watermark() -> f64 {
        defaults::WB_LOW_WATERMARK
    }

    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    fn default_t_ras() -> u64 {
        defaults::T_RAS
    }

    fn default_t_pre() -> u64 {
        defaults::T_PRE
    }

    fn default_bus_latency() -> u64 {
        defaults::BUS_LATENCY
    }

    /// Write load at which a controller starts draining writes.
    pub fn wb_high_threshold(&self) -> usize {
        ((self.writeq_max as f64 * self.wb_high_watermark).ceil() as usize).clamp(1, self.writeq_max)
    }

    /// Write load at which a controller stops draining writes.
    pub fn wb_low_threshold(&self) -> usize {
        ((self.writeq_max as f64 * self.wb_low_watermark).floor() as usize)
            .min(self.wb_high_threshold().saturating_sub(1))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let topology = [self.channel_bits, self.rank_bits, self.bank_bits]
            .into_iter()
            .try_fold(0u32, u32::checked_add);
        if topology.is_none_or(|bits| bits > MAX_TOPOLOGY_BITS) {
            return Err(ConfigError::invalid(
                "memory",
                format!(
                    "channel/rank/bank fields ({}+{}+{} bits) exceed {MAX_TOPOLOGY_BITS} bits",
                    self.channel_bits, self.rank_bits, self.bank_bits
                ),
            ));
        }
        if self.writeq_max == 0 {
            return Err(ConfigError::invalid("memory.writeq_max", "must be at least 1"));
        }
        if self.readq_max_per_bank == 0 {
            return Err(ConfigError::invalid(
                "memory.readq_max_per_bank",
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.wb_high_watermark) {
            return Err(ConfigError::invalid(
                "memory.wb_high_watermark",
                format!("{} is not a fraction in [0, 1]", self.wb_high_watermark),
            ));
        }
        if !(0.0..=self.wb_high_watermark).contains(&self.wb_low_watermark) {
            return Err(ConfigError::invalid(
                "memory.wb_low_watermark",
                format!(
                    "{} must lie in [0, wb_high_watermark = {}]",
                    self.wb_low_watermark, self.wb_high_watermark
                ),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            channel_bits: defaults::CHANNEL_BITS,
            rank_bits: defaults::RANK_BITS,
            bank_bits: defaults::BANK_BITS,
            col_bits: defaults::COL_BITS,
            readq_max_per_bank: defaults::READQ_MAX_PER_BANK,
            writeq_max: defaults::WRITEQ_MAX,
            wb_high_watermark: defaults::WB_HIGH_WATERMARK,
            wb_low_watermark: defaults::WB_LOW_WATERMARK,
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
            bus_latency: defaults::BUS_LATENCY,
        }
    }
}

/// Scheduler selection and fairness parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedConfig {
    /// Algorithm used to pick among pending reads.
    #[serde(default)]
    pub algo: SchedAlgo,

    /// Algorithm used to pick among pending writes (ignored when `same_sched_algo`).
    #[serde(default = "SchedConfig::default_wb_algo")]
    pub wb_algo: SchedAlgo,

    /// Use one scheduler instance for both reads and writes, ticked once per cycle.
    #[serde(default)]
    pub same_sched_algo: bool,

    /// One meta-controller arbitrating across all channels instead of one per channel.
    #[serde(default)]
    pub omniscient: bool,

    /// Cycles between blacklist resets.
    #[serde(default = "SchedConfig::default_shuffle_cycles")]
    pub shuffle_cycles: u64,

    /// Consecutive same-process issues tolerated before the process is blacklisted.
    #[serde(default = "SchedConfig::default_row_hit_cap")]
    pub row_hit_cap: u32,

    /// Track one streak per channel instead of one per bank.
    #[serde(default)]
    pub channel_level: bool,
}

impl SchedConfig {
    fn default_wb_algo() -> SchedAlgo {
        SchedAlgo::FrFcfs
    }

    fn default_shuffle_cycles() -> u64 {
        defaults::SHUFFLE_CYCLES
    }

    fn default_row_hit_cap() -> u32 {
        defaults::ROW_HIT_CAP
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.shuffle_cycles == 0 {
            return Err(ConfigError::invalid("sched.shuffle_cycles", "must be at least 1"));
        }
        if self.row_hit_cap == 0 {
            return Err(ConfigError::invalid("sched.row_hit_cap", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            algo: SchedAlgo::default(),
            wb_algo: SchedConfig::default_wb_algo(),
            same_sched_algo: false,
            omniscient: false,
            shuffle_cycles: defaults::SHUFFLE_CYCLES,
            row_hit_cap: defaults::ROW_HIT_CAP,
            channel_level: false,
        }
    }
}

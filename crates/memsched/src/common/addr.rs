//! DRAM address types and physical-address decoding.
//!
//! This module maps flat physical byte addresses onto the DRAM hierarchy. It provides:
//! 1. **Coordinates:** `MemAddr`, the {channel, rank, bank, row, column} tuple of a request.
//! 2. **Bit Slicing:** `AddressMap`, a pure field extraction configured once at startup.
//! 3. **Reconstruction:** The inverse mapping, so every address round-trips exactly.
//!
//! Field layout, from most to least significant bit:
//!
//! ```text
//! | row (remaining bits) | rank | bank | channel | column |
//! ```
//!
//! The column field is the byte offset within the row slice held by one channel,
//! so consecutive rows' worth of data interleave across channels.

use serde::Serialize;
use std::fmt;

use super::constants::MAX_FIELD_BITS;
use super::error::ConfigError;
use crate::config::MemoryConfig;

/// Decoded DRAM coordinates of a physical address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MemAddr {
    /// Channel (memory controller) index.
    pub cid: usize,
    /// Rank index within the channel.
    pub rid: usize,
    /// Bank index within the rank.
    pub bid: usize,
    /// Row index within the bank.
    pub rowid: u64,
    /// Byte offset within the row.
    pub colid: u64,
}

impl MemAddr {
    /// Creates a coordinate tuple from its parts.
    pub const fn new(cid: usize, rid: usize, bid: usize, rowid: u64, colid: u64) -> Self {
        Self {
            cid,
            rid,
            bid,
            rowid,
            colid,
        }
    }
}

impl fmt::Display for MemAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(ch {}, rank {}, bank {}, row {:#x}, col {:#x})",
            self.cid, self.rid, self.bid, self.rowid, self.colid
        )
    }
}

/// Bit-slicing map from physical addresses to [`MemAddr`].
///
/// Immutable once built; decoding is a pure function of the address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressMap {
    col_bits: u32,
    chan_bits: u32,
    bank_bits: u32,
    rank_bits: u32,
}

impl AddressMap {
    /// Creates a map from explicit field widths.
    ///
    /// # Arguments
    ///
    /// * `chan_bits` - Width of the channel field.
    /// * `rank_bits` - Width of the rank field.
    /// * `bank_bits` - Width of the bank field.
    /// * `col_bits` - Width of the column (byte offset) field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the fields leave no room for the row.
    pub fn new(
        chan_bits: u32,
        rank_bits: u32,
        bank_bits: u32,
        col_bits: u32,
    ) -> Result<Self, ConfigError> {
        let total = [chan_bits, rank_bits, bank_bits, col_bits]
            .into_iter()
            .try_fold(0u32, u32::checked_add)
            .filter(|&total| total <= MAX_FIELD_BITS);
        if total.is_none() {
            return Err(ConfigError::invalid(
                "memory",
                format!(
                    "channel/rank/bank/column fields ({chan_bits}+{rank_bits}+{bank_bits}+{col_bits} bits) exceed {MAX_FIELD_BITS} bits"
                ),
            ));
        }
        Ok(Self {
            col_bits,
            chan_bits,
            bank_bits,
            rank_bits,
        })
    }

    /// Builds the map described by a memory configuration.
    ///
    /// # Errors
    ///
    /// Same as [`AddressMap::new`].
    pub fn from_config(config: &MemoryConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.channel_bits,
            config.rank_bits,
            config.bank_bits,
            config.col_bits,
        )
    }

    /// Number of channels addressable by this map.
    pub const fn channels(&self) -> usize {
        1 << self.chan_bits
    }

    /// Number of ranks per channel.
    pub const fn ranks(&self) -> usize {
        1 << self.rank_bits
    }

    /// Number of banks per rank.
    pub const fn banks(&self) -> usize {
        1 << self.bank_bits
    }

    #[inline(always)]
    const fn chan_shift(&self) -> u32 {
        self.col_bits
    }

    #[inline(always)]
    const fn bank_shift(&self) -> u32 {
        self.col_bits + self.chan_bits
    }

    #[inline(always)]
    const fn rank_shift(&self) -> u32 {
        self.col_bits + self.chan_bits + self.bank_bits
    }

    #[inline(always)]
    const fn row_shift(&self) -> u32 {
        self.col_bits + self.chan_bits + self.bank_bits + self.rank_bits
    }

    #[inline(always)]
    const fn field(addr: u64, shift: u32, bits: u32) -> u64 {
        (addr >> shift) & ((1u64 << bits) - 1)
    }

    /// Decodes a physical byte address.
    ///
    /// # Arguments
    ///
    /// * `addr` - Physical address.
    ///
    /// # Returns
    ///
    /// The DRAM coordinates of `addr`.
    #[inline]
    pub const fn decode(&self, addr: u64) -> MemAddr {
        MemAddr {
            colid: Self::field(addr, 0, self.col_bits),
            cid: Self::field(addr, self.chan_shift(), self.chan_bits) as usize,
            bid: Self::field(addr, self.bank_shift(), self.bank_bits) as usize,
            rid: Self::field(addr, self.rank_shift(), self.rank_bits) as usize,
            rowid: addr >> self.row_shift(),
        }
    }

    /// Reconstructs the physical address of a coordinate tuple.
    ///
    /// Inverse of [`AddressMap::decode`] for every tuple whose fields fit their widths.
    ///
    /// # Panics
    ///
    /// Panics if a field is out of range for this map.
    pub fn encode(&self, addr: &MemAddr) -> u64 {
        assert!(
            addr.cid < self.channels()
                && addr.rid < self.ranks()
                && addr.bid < self.banks()
                && addr.colid >> self.col_bits == 0
                && addr.rowid.checked_shl(self.row_shift()).map(|v| v >> self.row_shift())
                    == Some(addr.rowid),
            "address {addr} does not fit the configured DRAM layout"
        );
        (addr.rowid << self.row_shift())
            | ((addr.rid as u64) << self.rank_shift())
            | ((addr.bid as u64) << self.bank_shift())
            | ((addr.cid as u64) << self.chan_shift())
            | addr.colid
    }
}

//! Address Decoding Unit Tests.
//!
//! Verifies field extraction for the `row | rank | bank | channel | column` layout
//! and that decoding and reconstruction are exact inverses.

use memsched_core::common::{AddressMap, ConfigError, MemAddr};
use memsched_core::config::MemoryConfig;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn default_map() -> AddressMap {
    match AddressMap::from_config(&MemoryConfig::default()) {
        Ok(map) => map,
        Err(e) => panic!("default layout rejected: {e}"),
    }
}

// ══════════════════════════════════════════════════════════
// 1. Geometry
// ══════════════════════════════════════════════════════════

#[test]
fn default_geometry() {
    let map = default_map();
    assert_eq!(map.channels(), 2);
    assert_eq!(map.ranks(), 1);
    assert_eq!(map.banks(), 8);
}

#[test]
fn zero_width_fields_give_one_unit() {
    let map = AddressMap::new(0, 0, 0, 6).expect("valid layout");
    assert_eq!(map.channels(), 1);
    assert_eq!(map.ranks(), 1);
    assert_eq!(map.banks(), 1);
}

#[test]
fn oversized_layout_is_rejected() {
    let err = AddressMap::new(20, 20, 20, 10).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "memory", .. }));
}

#[test]
fn overflowing_widths_are_rejected() {
    let max = u32::MAX;
    for widths in [(max, 1, 0, 0), (0, 0, max, 13), (max, max, max, max)] {
        let (chan, rank, bank, col) = widths;
        let err = AddressMap::new(chan, rank, bank, col).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "memory", .. }), "{widths:?}");
    }
}

// ══════════════════════════════════════════════════════════
// 2. Field extraction
// ══════════════════════════════════════════════════════════

#[test]
fn decode_zero() {
    assert_eq!(default_map().decode(0), MemAddr::default());
}

#[test]
fn decode_each_field() {
    // col 13 bits, chan 1 bit at 13, bank 3 bits at 14, row from bit 17.
    let addr = (5u64 << 17) | (3 << 14) | (1 << 13) | 0x10;
    assert_eq!(default_map().decode(addr), MemAddr::new(1, 0, 3, 5, 0x10));
}

#[test]
fn consecutive_row_slices_interleave_channels() {
    let map = default_map();
    let slice = 1u64 << 13;
    assert_eq!(map.decode(0).cid, 0);
    assert_eq!(map.decode(slice).cid, 1);
    assert_eq!(map.decode(2 * slice).cid, 0);
    assert_eq!(map.decode(2 * slice).bid, 1);
}

#[test]
fn rank_field_sits_above_bank() {
    let map = AddressMap::new(1, 1, 2, 6).expect("valid layout");
    // rank bit at 6 + 1 + 2 = 9, row from bit 10.
    let addr = (7u64 << 10) | (1 << 9) | (2 << 7) | (1 << 6) | 0x3f;
    assert_eq!(map.decode(addr), MemAddr::new(1, 1, 2, 7, 0x3f));
}

#[test]
fn top_address_decodes_to_max_row() {
    let map = default_map();
    let decoded = map.decode(u64::MAX);
    assert_eq!(decoded.rowid, u64::MAX >> 17);
    assert_eq!(decoded.cid, 1);
    assert_eq!(decoded.bid, 7);
    assert_eq!(decoded.colid, (1 << 13) - 1);
}

#[test]
#[should_panic(expected = "does not fit")]
fn encode_rejects_out_of_range_bank() {
    let _ = default_map().encode(&MemAddr::new(0, 0, 8, 0, 0));
}

// ══════════════════════════════════════════════════════════
// 3. Round trips
// ══════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn every_address_round_trips(addr in any::<u64>()) {
        let map = default_map();
        prop_assert_eq!(map.encode(&map.decode(addr)), addr);
    }

    #[test]
    fn every_tuple_round_trips(
        cid in 0usize..4,
        rid in 0usize..2,
        bid in 0usize..16,
        rowid in 0u64..(1 << 40),
        colid in 0u64..(1 << 10),
    ) {
        let map = AddressMap::new(2, 1, 4, 10).expect("valid layout");
        let tuple = MemAddr::new(cid, rid, bid, rowid, colid);
        prop_assert_eq!(map.decode(map.encode(&tuple)), tuple);
    }
}

//! Bank Arena Unit Tests.
//!
//! Verifies the channel/rank/bank arena layout and the row-buffer latency model
//! (CAS on hit, RAS+CAS on a closed bank, PRE+RAS+CAS on conflict, plus bus).

use memsched_core::common::ReqType;
use memsched_core::config::SchedAlgo;
use memsched_core::dram::topology::DramTiming;
use memsched_core::dram::{Channel, RowOutcome};

use crate::common::{block, one_channel, open_row, recorder, send};

// ══════════════════════════════════════════════════════════
// 1. Arena layout
// ══════════════════════════════════════════════════════════

#[test]
fn channel_shape() {
    let chan = Channel::new(3, 2, 4);
    assert_eq!(chan.cid, 3);
    assert_eq!(chan.rmax(), 2);
    assert_eq!(chan.bmax(), 4);
    assert_eq!(chan.banks().count(), 8);
}

#[test]
fn banks_know_their_coordinates() {
    let chan = Channel::new(1, 2, 4);
    let bank = chan.bank(1, 3);
    assert_eq!((bank.mc, bank.cid, bank.rid, bank.bid), (1, 1, 1, 3));
}

#[test]
fn banks_iterate_rank_major() {
    let chan = Channel::new(0, 2, 2);
    let order: Vec<(usize, usize)> = chan.banks().map(|b| (b.rid, b.bid)).collect();
    assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
}

#[test]
fn fresh_banks_are_closed_and_ready() {
    let chan = Channel::new(0, 1, 4);
    for bank in chan.banks() {
        assert_eq!(bank.curr_rowid(), None);
        assert_eq!(bank.last_pid(), None);
        assert_eq!(bank.outcome(0), RowOutcome::Closed);
        assert!(!bank.is_row_hit(0));
        assert!(bank.is_ready(0));
    }
}

// ══════════════════════════════════════════════════════════
// 2. Latency model
// ══════════════════════════════════════════════════════════

#[test]
fn latency_per_outcome() {
    let timing = DramTiming {
        t_cas: 5,
        t_ras: 10,
        t_pre: 8,
        bus: 2,
    };
    assert_eq!(timing.latency(RowOutcome::Hit), 7);
    assert_eq!(timing.latency(RowOutcome::Closed), 17);
    assert_eq!(timing.latency(RowOutcome::Conflict), 25);
    assert!(RowOutcome::Hit.is_hit());
    assert!(!RowOutcome::Conflict.is_hit());
}

// ══════════════════════════════════════════════════════════
// 3. Row buffer state after service
// ══════════════════════════════════════════════════════════

#[test]
fn service_opens_the_row() {
    let mut sys = one_channel(SchedAlgo::FrFcfs);
    open_row(&mut sys, 0, 2, 9, 1);
    let bank = sys.controller(0).bank(0, 2);
    assert_eq!(bank.curr_rowid(), Some(9));
    assert_eq!(bank.last_pid(), Some(1));
    assert_eq!(bank.outcome(9), RowOutcome::Hit);
    assert_eq!(bank.outcome(10), RowOutcome::Conflict);
    // Other banks are untouched.
    assert_eq!(sys.controller(0).bank(0, 1).curr_rowid(), None);
}

#[test]
fn hit_holds_until_another_row_is_served() {
    let mut sys = one_channel(SchedAlgo::FrFcfs);
    open_row(&mut sys, 0, 0, 9, 0);
    // Traffic on a neighbouring bank leaves the row open.
    open_row(&mut sys, 0, 1, 10, 0);
    for _ in 0..3 {
        assert!(sys.controller(0).bank(0, 0).is_row_hit(9));
    }
    open_row(&mut sys, 0, 0, 10, 0);
    assert!(!sys.controller(0).bank(0, 0).is_row_hit(9));
    assert!(sys.controller(0).bank(0, 0).is_row_hit(10));
}

#[test]
fn bank_is_busy_while_serving() {
    let mut sys = one_channel(SchedAlgo::FrFcfs);
    let log = recorder();
    let addr = block(&sys, 0, 0, 0, 1);
    let _ = send(&mut sys, 0, ReqType::Read, addr, &log);
    sys.tick();
    // Issued at cycle 1 to a closed bank: busy until 1 + 14 + 14 + 4.
    let bank = sys.controller(0).bank(0, 0);
    assert!(!bank.is_ready(sys.cycle()));
    assert!(!bank.is_ready(32));
    assert!(bank.is_ready(33));
}

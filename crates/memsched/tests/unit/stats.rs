//! Statistics Unit Tests.
//!
//! Verifies the per-process streak histogram (exact buckets up to 15, one
//! overflow bucket), finished-process exclusion, and controller ratios.

use memsched_core::Request;
use memsched_core::common::{MemAddr, ReqType};
use memsched_core::stats::{CtrlStats, SchedStats};
use pretty_assertions::assert_eq;

fn issue(stats: &mut SchedStats, pids: &[usize]) {
    for (i, &pid) in pids.iter().enumerate() {
        let req = Request::new(i as u64, pid, ReqType::Read, 0, MemAddr::default(), 0);
        stats.count_streaks(&req);
    }
}

// ══════════════════════════════════════════════════════════
// 1. Streak histogram
// ══════════════════════════════════════════════════════════

#[test]
fn streaks_close_when_process_changes() {
    let mut stats = SchedStats::new(3);
    issue(&mut stats, &[0, 0, 0, 1, 0, 2, 2]);
    assert_eq!(stats.current_streak(), 2);

    assert_eq!(stats.streaks(0)[3], 1);
    assert_eq!(stats.streaks(0)[1], 1);
    assert_eq!(stats.streaks(1)[1], 1);
    assert_eq!(stats.streaks(2)[2], 0, "open streak not yet recorded");

    stats.flush();
    assert_eq!(stats.streaks(2)[2], 1);
    assert_eq!(stats.current_streak(), 0);
    assert_eq!(stats.request_count, vec![4, 1, 2]);
}

#[test]
fn long_streaks_share_the_overflow_bucket() {
    let mut stats = SchedStats::new(1);
    issue(&mut stats, &[0; 15]);
    stats.flush();
    issue(&mut stats, &[0; 16]);
    stats.flush();
    issue(&mut stats, &[0; 40]);
    stats.flush();

    let hist = stats.streaks(0);
    assert_eq!(hist.len(), 17);
    assert_eq!(hist[15], 1);
    assert_eq!(hist[16], 2);
    assert_eq!(hist.iter().sum::<u64>(), 3);
}

#[test]
fn finished_processes_are_not_recorded() {
    let mut stats = SchedStats::new(2);
    stats.set_proc_done(1);
    issue(&mut stats, &[1, 1, 0, 1]);
    stats.flush();
    assert!(stats.streaks(1).iter().all(|&n| n == 0));
    assert_eq!(stats.streaks(0)[1], 1);
    assert_eq!(stats.request_count, vec![1, 3], "issues are still counted");
}

#[test]
fn flush_without_issues_is_a_no_op() {
    let mut stats = SchedStats::new(2);
    stats.flush();
    assert!(stats.streak_length.iter().flatten().all(|&n| n == 0));
}

// ══════════════════════════════════════════════════════════
// 2. Controller counters
// ══════════════════════════════════════════════════════════

#[test]
fn average_latency_without_reads_is_zero() {
    let stats = CtrlStats::default();
    assert!(stats.avg_read_latency().abs() < f64::EPSILON);
    assert_eq!(stats.row_misses(), 0);
}

#[test]
fn misses_combine_closed_and_conflict() {
    let stats = CtrlStats {
        row_closed: 3,
        row_conflicts: 4,
        reads_retired: 2,
        total_read_latency: 50,
        ..CtrlStats::default()
    };
    assert_eq!(stats.row_misses(), 7);
    assert!((stats.avg_read_latency() - 25.0).abs() < f64::EPSILON);
}

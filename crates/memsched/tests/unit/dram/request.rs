//! Request Record Unit Tests.

use std::cell::Cell;
use std::rc::Rc;

use memsched_core::Request;
use memsched_core::common::{MemAddr, ReqType};

fn request() -> Request {
    Request::new(7, 2, ReqType::Write, 0x4000, MemAddr::new(1, 0, 3, 5, 0), 10)
}

#[test]
fn new_request_is_unissued() {
    let req = request();
    assert_eq!(req.id, 7);
    assert_eq!(req.pid, 2);
    assert_eq!(req.kind, ReqType::Write);
    assert_eq!(req.ts_arrival, 10);
    assert_eq!(req.ts_issue, 0);
    assert_eq!(req.ts_departure, 0);
    assert!(!req.has_callback());
    // Departure unset: latency saturates instead of wrapping.
    assert_eq!(req.latency(), 0);
}

#[test]
fn latency_spans_arrival_to_departure() {
    let mut req = request();
    req.ts_issue = 12;
    req.ts_departure = 42;
    assert_eq!(req.latency(), 32);
}

#[test]
fn callbacks_attach() {
    let hits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&hits);
    let mut req = request().with_callback(move |_| seen.set(seen.get() + 1));
    assert!(req.has_callback());
    req.set_callback(|_| {});
    assert!(req.has_callback());
    // Replaced callbacks are dropped without running.
    drop(req);
    assert_eq!(hits.get(), 0);
}

#[test]
fn display_and_debug() {
    let req = request();
    let shown = req.to_string();
    assert!(shown.starts_with("WR #7 pid 2 0x4000"), "{shown}");
    assert!(shown.contains("bank 3"), "{shown}");
    let debug = format!("{req:?}");
    assert!(debug.contains("callback: false"), "{debug}");
    assert_eq!(ReqType::Read.to_string(), "RD");
    assert!(ReqType::Read.is_read());
    assert!(!ReqType::Write.is_read());
}

//! First-Ready, First-Come, First-Served (FR-FCFS) Scheduling.
//!
//! Requests that hit the open row of their bank are served before misses; among
//! requests with equal hit status the oldest wins. Maximizes row-buffer locality
//! at the cost of fairness between processes.

use super::{Pick, Scheduler, older};
use crate::dram::meta::MetaView;
use crate::dram::request::Request;

/// FR-FCFS policy; stateless.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrFcfsScheduler;

impl Scheduler for FrFcfsScheduler {
    fn name(&self) -> &'static str {
        "FR-FCFS"
    }

    fn better(&self, meta: &MetaView<'_>, req1: &Request, req2: &Request) -> Pick {
        let hit1 = meta.is_row_hit(req1);
        let hit2 = meta.is_row_hit(req2);
        match (hit1, hit2) {
            (true, false) => Pick::First,
            (false, true) => Pick::Second,
            _ => older(req1, req2),
        }
    }
}

//! First-Come, First-Served (FCFS) Scheduling.
//!
//! The oldest pending request always wins, ignoring row-buffer state.

use super::{Pick, Scheduler, older};
use crate::dram::meta::MetaView;
use crate::dram::request::Request;

/// FCFS policy; stateless.
#[derive(Clone, Copy, Debug, Default)]
pub struct FcfsScheduler;

impl Scheduler for FcfsScheduler {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn better(&self, _meta: &MetaView<'_>, req1: &Request, req2: &Request) -> Pick {
        older(req1, req2)
    }
}

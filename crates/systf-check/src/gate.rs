//! One-way finish request.
//!
//! Arming is monotonic: once a run has been asked to finish it stays that way,
//! and arming again is harmless. Nothing here blocks or unwinds; the kernel acts
//! on the request after the callback returns.

use tracing::debug;

use crate::host::{CallSite, Host};

/// Run state a host keeps for the finish request. The first code wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinishLatch {
    code: Option<i32>,
    requests: u32,
}

impl FinishLatch {
    pub fn arm(&mut self, code: i32) {
        self.requests = self.requests.saturating_add(1);
        if self.code.is_none() {
            self.code = Some(code);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.code.is_some()
    }

    pub fn finish_code(&self) -> Option<i32> {
        self.code
    }

    /// How many times the latch was armed, including repeats.
    pub fn requests(&self) -> u32 {
        self.requests
    }
}

pub fn arm<H: Host + ?Sized>(host: &mut H, call: &CallSite, code: i32) {
    debug!(
        routine = %call.name,
        file = %call.file,
        line = call.line,
        code,
        "requesting finish after callback"
    );
    host.request_finish(code);
}

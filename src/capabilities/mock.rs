//! Deterministic collaborators for tests and demos.

use std::sync::atomic::{AtomicU64, Ordering};

use super::traits::{Clock, ReceiptIssuer};
use crate::types::{ProposalId, Receipt, Timestamp};

/// Clock under test control.
///
/// With a non-zero `step`, every reading advances the clock by `step`
/// milliseconds, so consecutive events get distinct timestamps.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
    step: u64,
}

impl ManualClock {
    /// Frozen clock.
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(start_millis),
            step: 0,
        }
    }

    /// Clock that ticks `step_millis` after every reading.
    pub fn ticking(start_millis: u64, step_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(start_millis),
            step: step_millis,
        }
    }

    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now.fetch_add(self.step, Ordering::SeqCst))
    }
}

/// Receipts `receipt-000001`, `receipt-000002`, ... in issue order.
#[derive(Debug, Default)]
pub struct SequentialReceipts {
    issued: AtomicU64,
}

impl SequentialReceipts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of receipts handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl ReceiptIssuer for SequentialReceipts {
    fn issue(&self, _proposal: ProposalId, _executed_at: Timestamp) -> Receipt {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Receipt::new(format!("receipt-{:06}", n))
    }
}

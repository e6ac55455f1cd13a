// scoop-core/src/state.rs
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};

use serde::Serialize;
use tokio::sync::Notify;

/// Lifecycle of the transfer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Running,
    Draining,
    Completed,
    Failed,
}

impl Phase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::Draining,
            3 => Self::Completed,
            4 => Self::Failed,
            _ => Self::Idle,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Draining | Self::Completed | Self::Failed)
    }
}

/// Summary handed back when the engine stops without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    pub outcome: Phase,
    pub target: u64,
    pub transferred: u64,
    pub rejected: u64,
}

/// Progress shared between the engine (the only reader of the cancel flag)
/// and the signal bridge (its only writer). The target count lives in
/// `TransferConfig` only.
#[derive(Debug, Default)]
pub struct TransferState {
    transferred: AtomicU64,
    rejected: AtomicU64,
    phase: AtomicU8,
    cancelled: AtomicBool,
    cancel_notify: Notify,
}

impl TransferState {
    pub fn new() -> Self {
        Self {
            transferred: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            phase: AtomicU8::new(Phase::Idle as u8),
            cancelled: AtomicBool::new(false),
            cancel_notify: Notify::new(),
        }
    }

    pub fn transferred(&self) -> u64 {
        self.transferred.load(Ordering::Acquire)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Acquire)
    }

    pub fn target_reached(&self, target: u64) -> bool {
        self.transferred() >= target
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    /// Returns the new transferred count.
    pub(crate) fn record_transferred(&self) -> u64 {
        self.transferred.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Sets the cancellation flag. Returns `true` only for the call that set it.
    pub fn request_cancel(&self) -> bool {
        let first = !self.cancelled.swap(true, Ordering::AcqRel);
        self.cancel_notify.notify_waiters();
        first
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let notified = self.cancel_notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    pub fn report(&self, outcome: Phase, target: u64) -> TransferReport {
        TransferReport {
            outcome,
            target,
            transferred: self.transferred(),
            rejected: self.rejected(),
        }
    }
}

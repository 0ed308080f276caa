//! One fetch attempt's lifecycle.
//!
//! A session moves `Created -> Active -> Completed | Cancelled`; the
//! terminal states are absorbing. Transitions go through compare-and-swap
//! on an atomic status cell, which is what makes outcome delivery
//! at-most-once: the delivering task and a concurrent `cancel` race on the
//! same CAS and exactly one of them wins.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionStatus {
    Created = 0,
    Active = 1,
    Completed = 2,
    Cancelled = 3,
}

impl SessionStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionStatus::Created,
            1 => SessionStatus::Active,
            2 => SessionStatus::Completed,
            _ => SessionStatus::Cancelled,
        }
    }
}

/// State shared between the owning slot binding and the spawned fetch task.
#[derive(Debug)]
pub struct FetchSession {
    id: Uuid,
    url: String,
    generation: u64,
    status: AtomicU8,
    cancel: CancellationToken,
}

impl FetchSession {
    pub(crate) fn new(url: String, generation: u64) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            url,
            generation,
            status: AtomicU8::new(SessionStatus::Created as u8),
            cancel: CancellationToken::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Generation of the `set_url` call that issued this session's request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.status() == SessionStatus::Active
    }

    pub fn is_cancelled(&self) -> bool {
        self.status() == SessionStatus::Cancelled
    }

    /// Created -> Active. Returns false if the session was cancelled before
    /// it ever started.
    pub(crate) fn activate(&self) -> bool {
        self.status
            .compare_exchange(
                SessionStatus::Created as u8,
                SessionStatus::Active as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Active -> Completed. Returns false when the session was cancelled
    /// first, in which case the outcome must be discarded undelivered.
    pub(crate) fn complete(&self) -> bool {
        self.status
            .compare_exchange(
                SessionStatus::Active as u8,
                SessionStatus::Completed as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Hard cancel: no outcome will be delivered for this session. Fires the
    /// transport cancel token. Idempotent, and a no-op once completed.
    /// Returns whether this call performed the transition.
    pub fn cancel(&self) -> bool {
        let mut current = self.status.load(Ordering::Acquire);
        loop {
            let status = SessionStatus::from_u8(current);
            if status == SessionStatus::Completed || status == SessionStatus::Cancelled {
                return false;
            }
            match self.status.compare_exchange(
                current,
                SessionStatus::Cancelled as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.cancel.cancel();
                    debug!(session = %self.id, url = %self.url, "Session cancelled");
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Requests cancellation of the in-flight transport call without
    /// suppressing delivery. A superseded session that completes anyway
    /// still reports its outcome; only the slot application is gated on
    /// generation at delivery time.
    pub(crate) fn supersede(&self) {
        debug!(session = %self.id, url = %self.url, "Session superseded");
        self.cancel.cancel();
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

//! Slot binding: at most one in-flight fetch per display slot.
//!
//! A [`SlotBinding`] ties a [`DisplaySlot`] to the fetch pipeline. Each
//! `set_url` call bumps a generation counter, supersedes the previous
//! session, and starts a new one; results are applied to the slot only when
//! their generation still matches, so a stale fetch can never clobber a
//! newer one no matter in which order the transport completes them.
//!
//! Binding bookkeeping (generation, current session, the slot handle) lives
//! behind one mutex; the hooks live behind a second one that is held only
//! while a hook runs. Deliveries serialize on the hook lock, so no two
//! callbacks for the same binding ever run concurrently, and a hook is free
//! to call [`SlotBinding::set_url`] or [`SlotBinding::cancel`] on its own
//! binding, e.g. to retry a failed load. The one thing a hook must not do
//! is replace the hooks via [`SlotBinding::set_callbacks`].

use crate::classify;
use crate::error::FetchError;
use crate::hooks::Callbacks;
use crate::http::{Fetch, FetchReply};
use crate::observability::{Metrics, MetricsSnapshot};
use crate::session::FetchSession;
use image::DynamicImage;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// A single logical display target holding at most one image at a time.
pub trait DisplaySlot: Send + Sync {
    fn current_image(&self) -> Option<DynamicImage>;
    /// `None` clears the slot.
    fn set_current_image(&self, image: Option<DynamicImage>);
}

/// In-memory slot, usable as a stand-in for a view in tests and demos.
#[derive(Default)]
pub struct ImageCell {
    image: Mutex<Option<DynamicImage>>,
}

impl ImageCell {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySlot for ImageCell {
    fn current_image(&self) -> Option<DynamicImage> {
        self.image.lock().expect("image cell poisoned").clone()
    }

    fn set_current_image(&self, image: Option<DynamicImage>) {
        *self.image.lock().expect("image cell poisoned") = image;
    }
}

struct BindingState {
    slot: Arc<dyn DisplaySlot>,
    fetcher: Arc<dyn Fetch>,
    generation: u64,
    current: Option<Arc<FetchSession>>,
}

struct Shared {
    state: Mutex<BindingState>,
    callbacks: Mutex<Callbacks>,
    metrics: Metrics,
}

/// Associates a display slot with at most one active fetch session.
///
/// Dropping the binding hard-cancels any in-flight session; no callback
/// runs after teardown.
pub struct SlotBinding {
    shared: Arc<Shared>,
}

impl SlotBinding {
    pub fn new(slot: Arc<dyn DisplaySlot>, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(BindingState {
                    slot,
                    fetcher,
                    generation: 0,
                    current: None,
                }),
                callbacks: Mutex::new(Callbacks::new()),
                metrics: Metrics::new(),
            }),
        }
    }

    pub fn with_callbacks(self, callbacks: Callbacks) -> Self {
        self.set_callbacks(callbacks);
        self
    }

    /// Replaces both hooks. Takes effect for deliveries that have not yet
    /// entered the delivery path. Must not be called from inside a hook.
    pub fn set_callbacks(&self, callbacks: Callbacks) {
        *self.lock_callbacks() = callbacks;
    }

    /// Starts loading `url` into the slot.
    ///
    /// Setting the URL that an active session is already fetching is a
    /// no-op; call [`SlotBinding::cancel`] first to force a reload. Any
    /// other value supersedes the in-flight session: its transport call is
    /// asked to cancel, and whatever it still delivers can no longer touch
    /// the slot. The currently displayed image stays in place until the new
    /// result arrives.
    ///
    /// Safe to call from inside a success or error hook; a failed load can
    /// be retried this way. Must be called from within a tokio runtime.
    pub fn set_url(&self, url: impl Into<String>) {
        let url = url.into();
        let mut state = self.lock_state();

        if let Some(current) = &state.current {
            if current.is_active() && current.url() == url {
                debug!(%url, "Redundant set_url ignored; session already active");
                return;
            }
        }

        state.generation += 1;
        let generation = state.generation;

        if let Some(previous) = state.current.take() {
            if previous.is_active() {
                previous.supersede();
                self.shared.metrics.fetch_superseded();
            }
        }

        let session = FetchSession::new(url, generation);
        if !session.activate() {
            return;
        }
        state.current = Some(Arc::clone(&session));
        self.shared.metrics.fetch_started();
        debug!(
            session = %session.id(),
            generation,
            url = session.url(),
            "Starting fetch session"
        );

        let fetcher = Arc::clone(&state.fetcher);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let reply = fetcher.fetch(session.url(), session.cancel_token()).await;
            deliver(&shared, &session, reply);
        });
    }

    /// Hard-cancels the current session. Neither hook will run for it, and
    /// the transport call is asked to stop. Idempotent; a no-op when
    /// nothing is in flight.
    pub fn cancel(&self) {
        let mut state = self.lock_state();
        if let Some(session) = state.current.take() {
            if session.cancel() {
                self.shared.metrics.fetch_cancelled();
            }
        }
    }

    /// Explicitly clears the displayed image. Never done implicitly: a
    /// failed or superseded fetch leaves the last good image in place.
    pub fn clear_image(&self) {
        self.lock_state().slot.set_current_image(None);
    }

    /// Generation of the most recent `set_url` call.
    pub fn generation(&self) -> u64 {
        self.lock_state().generation
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    fn lock_state(&self) -> MutexGuard<'_, BindingState> {
        self.shared.state.lock().expect("slot binding state poisoned")
    }

    fn lock_callbacks(&self) -> MutexGuard<'_, Callbacks> {
        self.shared.callbacks.lock().expect("slot callbacks poisoned")
    }
}

impl Drop for SlotBinding {
    fn drop(&mut self) {
        {
            let mut state = self.lock_state();
            if let Some(session) = state.current.take() {
                session.cancel();
            }
        }
        // Release the hooks even though spawned tasks may still hold the
        // shared allocation.
        *self.lock_callbacks() = Callbacks::new();
    }
}

fn deliver(shared: &Arc<Shared>, session: &Arc<FetchSession>, reply: FetchReply) {
    {
        let mut state = shared.state.lock().expect("slot binding state poisoned");

        if matches!(reply, FetchReply::Cancelled) {
            // The transport observed the cancel token; nothing to report.
            session.cancel();
            clear_if_current(&mut state, session);
            return;
        }

        if !session.complete() {
            debug!(session = %session.id(), "Outcome discarded; session cancelled");
            return;
        }

        clear_if_current(&mut state, session);
    }

    // Classification is pure; no lock needed for it. Hooks run under the
    // callbacks lock only, so they may re-enter the binding.
    let outcome = match reply {
        FetchReply::Response { meta, body } => classify::classify(meta, &body),
        FetchReply::Transport(e) => Err(FetchError::Transport(e)),
        FetchReply::Cancelled => return,
    };

    match outcome {
        Ok((image, _meta)) => {
            let applied = {
                let mut callbacks = shared.callbacks.lock().expect("slot callbacks poisoned");
                callbacks.run_success(image)
            };

            match applied {
                Some(image) => {
                    let state = shared.state.lock().expect("slot binding state poisoned");
                    if session.generation() == state.generation {
                        state.slot.set_current_image(Some(image));
                        shared.metrics.image_applied();
                        debug!(session = %session.id(), "Image applied to slot");
                    } else {
                        debug!(session = %session.id(), "Stale result not applied");
                    }
                }
                None => {
                    debug!(session = %session.id(), "Success hook vetoed application");
                }
            }
        }
        Err(error) => {
            // Errors are reported regardless of staleness; only slot
            // mutation is generation-gated.
            shared.metrics.fetch_failed();
            debug!(
                session = %session.id(),
                domain = error.domain(),
                code = error.code(),
                "Fetch failed"
            );
            let mut callbacks = shared.callbacks.lock().expect("slot callbacks poisoned");
            callbacks.run_error(&error);
        }
    }
}

fn clear_if_current(state: &mut BindingState, session: &Arc<FetchSession>) {
    if state
        .current
        .as_ref()
        .is_some_and(|c| Arc::ptr_eq(c, session))
    {
        state.current = None;
    }
}

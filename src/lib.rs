//! Single-slot remote image loading.
//!
//! Loads one remote image per display slot, decodes it, and delivers it
//! through user hooks, while guaranteeing that a slot never shows the
//! result of a superseded request. The transport lives behind the
//! [`http::Fetch`] trait; [`http::client::HttpClient`] is the
//! reqwest-backed implementation.
//!
//! ```no_run
//! use imgslot::{Callbacks, Config, HttpClient, ImageCell, SlotBinding};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let client = Arc::new(HttpClient::new(&config.http)?);
//! let slot = Arc::new(ImageCell::new());
//!
//! let binding = SlotBinding::new(slot.clone(), client).with_callbacks(
//!     Callbacks::new().on_error(|error, _meta| {
//!         eprintln!("image load failed: {error}");
//!     }),
//! );
//!
//! binding.set_url("https://example.com/96px.png");
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod hooks;
pub mod http;
pub mod observability;
pub mod session;
pub mod slot;
pub mod timer;

pub use config::{Config, HttpConfig};
pub use error::{FetchError, HTTP_IMAGE_ERROR_DOMAIN, codes};
pub use hooks::Callbacks;
pub use http::client::HttpClient;
pub use http::{Fetch, FetchReply, ResponseMeta, TransportError};
pub use observability::{Metrics, MetricsSnapshot};
pub use session::{FetchSession, SessionStatus};
pub use slot::{DisplaySlot, ImageCell, SlotBinding};
pub use timer::Deferred;

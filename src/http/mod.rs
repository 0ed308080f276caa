//! Transport seam between the loader core and the HTTP stack.
//!
//! The core never talks to the network directly. It depends on the [`Fetch`]
//! capability, which performs one request and resolves to exactly one
//! [`FetchReply`]. Cancellation is cooperative: the caller passes a token
//! into `fetch` and the implementation is expected (but not required) to
//! resolve with [`FetchReply::Cancelled`] once the token fires.

pub mod client;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Snapshot of the parts of an HTTP response the pipeline cares about.
///
/// Handed to the error hook alongside any error that was produced after a
/// response arrived, so callers can branch on status or headers.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub url: String,
    pub status: u16,
    /// Raw `Content-Type` header value, if the response carried one.
    pub content_type: Option<String>,
}

/// Transport-level failure, carried through to callers unchanged.
///
/// The domain and code come from the transport collaborator and are never
/// reinterpreted by the core, so callers can match on the exact native cause.
#[derive(Debug, Clone, Error)]
#[error("{domain}({code}): {message}")]
pub struct TransportError {
    pub domain: String,
    pub code: i64,
    pub message: String,
}

/// Result of a single transport call. Exactly one reply per `fetch`.
#[derive(Debug)]
pub enum FetchReply {
    /// A response arrived, valid or not. Classification happens later.
    Response { meta: ResponseMeta, body: Bytes },
    /// The transport failed before a full response arrived.
    Transport(TransportError),
    /// The call observed its cancel token. Never reaches any callback.
    Cancelled,
}

/// Capability of fetching a URL.
///
/// Implementations may run arbitrarily many calls concurrently; the core
/// imposes no global limit. Cancellation via the token is best-effort: an
/// implementation that has already produced a reply may ignore it.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, cancel: CancellationToken) -> FetchReply;
}

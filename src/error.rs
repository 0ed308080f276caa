//! Error taxonomy for completed fetch attempts.
//!
//! Four mutually exclusive kinds cover every way a completed session can
//! fail: a transport failure, a non-200 status, a response that is not
//! declared as an image, and bytes that do not decode. Cancellation is not
//! an error and never appears here.

use crate::http::{ResponseMeta, TransportError};
use thiserror::Error;

/// Domain for errors produced by the image pipeline itself.
///
/// Transport errors keep the domain supplied by the transport collaborator
/// instead, so the two namespaces never collide.
pub const HTTP_IMAGE_ERROR_DOMAIN: &str = "imgslot.http-image";

/// Stable codes within [`HTTP_IMAGE_ERROR_DOMAIN`].
pub mod codes {
    pub const HTTP_STATUS_NOT_200: i64 = 1;
    pub const MISSING_CONTENT_TYPE: i64 = 2;
    pub const NOT_AN_IMAGE_CONTENT_TYPE: i64 = 3;
    pub const FAILED_TO_DECODE_IMAGE_DATA: i64 = 4;
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Network/DNS/TLS failure, passed through from the transport layer.
    #[error("{0}")]
    Transport(TransportError),

    /// The server answered with a status other than 200.
    #[error("HTTP status {status} is not 200")]
    HttpStatus { status: u16, meta: ResponseMeta },

    /// The response carried no `Content-Type` header at all.
    #[error("response has no Content-Type header")]
    MissingContentType { meta: ResponseMeta },

    /// The response is declared as something other than an image.
    #[error("Content-Type {content_type:?} is not an image media type")]
    NotAnImage {
        content_type: String,
        meta: ResponseMeta,
    },

    /// The body bytes do not parse as a supported image format.
    #[error("response body is not a decodable image")]
    Decode { meta: ResponseMeta },
}

impl FetchError {
    pub fn domain(&self) -> &str {
        match self {
            FetchError::Transport(e) => &e.domain,
            _ => HTTP_IMAGE_ERROR_DOMAIN,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            FetchError::Transport(e) => e.code,
            FetchError::HttpStatus { .. } => codes::HTTP_STATUS_NOT_200,
            FetchError::MissingContentType { .. } => codes::MISSING_CONTENT_TYPE,
            FetchError::NotAnImage { .. } => codes::NOT_AN_IMAGE_CONTENT_TYPE,
            FetchError::Decode { .. } => codes::FAILED_TO_DECODE_IMAGE_DATA,
        }
    }

    /// Response metadata, present exactly when an HTTP response was received.
    pub fn response(&self) -> Option<&ResponseMeta> {
        match self {
            FetchError::Transport(_) => None,
            FetchError::HttpStatus { meta, .. }
            | FetchError::MissingContentType { meta }
            | FetchError::NotAnImage { meta, .. }
            | FetchError::Decode { meta } => Some(meta),
        }
    }
}

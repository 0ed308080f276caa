//! HTTP client for downloading image bytes

use super::{Fetch, FetchReply, ResponseMeta, TransportError};
use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Proxy};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Domain attached to transport errors produced by this client.
pub const TRANSPORT_ERROR_DOMAIN: &str = "imgslot.transport";

/// Transport error codes produced by this client.
pub const CODE_TIMEOUT: i64 = -1;
pub const CODE_CONNECT: i64 = -2;
pub const CODE_REDIRECT: i64 = -3;
pub const CODE_BODY: i64 = -4;
pub const CODE_REQUEST: i64 = -5;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid proxy URL: {0}")]
    InvalidProxy(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// Image downloader backed by reqwest.
///
/// Performs exactly one attempt per call. Retry policy belongs to callers;
/// the loader core never retries.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(url) = &config.proxy {
            let proxy = Proxy::all(url.as_str())
                .map_err(|e| ClientError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self { client })
    }
}

fn transport_error(e: &reqwest::Error, code: i64) -> TransportError {
    TransportError {
        domain: TRANSPORT_ERROR_DOMAIN.to_string(),
        code,
        message: e.to_string(),
    }
}

fn classify_reqwest_error(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        transport_error(e, CODE_TIMEOUT)
    } else if e.is_connect() {
        transport_error(e, CODE_CONNECT)
    } else if e.is_redirect() {
        transport_error(e, CODE_REDIRECT)
    } else {
        transport_error(e, CODE_REQUEST)
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch(&self, url: &str, cancel: CancellationToken) -> FetchReply {
        debug!(url, "Starting image fetch");

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(url, "Fetch cancelled before response");
                return FetchReply::Cancelled;
            }
            result = self.client.get(url).send() => match result {
                Ok(response) => response,
                Err(e) => {
                    warn!(url, error = %e, "Transport failure");
                    return FetchReply::Transport(classify_reqwest_error(&e));
                }
            }
        };

        let meta = ResponseMeta {
            url: url.to_string(),
            status: response.status().as_u16(),
            content_type: response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        };

        let body = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(url, "Fetch cancelled while reading body");
                return FetchReply::Cancelled;
            }
            result = response.bytes() => match result {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(url, error = %e, "Failed to read response body");
                    return FetchReply::Transport(transport_error(&e, CODE_BODY));
                }
            }
        };

        debug!(url, status = meta.status, size = body.len(), "Fetch completed");

        FetchReply::Response { meta, body }
    }
}

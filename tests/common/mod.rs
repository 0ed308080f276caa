//! Shared test helpers: a scripted transport, generated image fixtures,
//! and an eventually-style polling assertion.
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, GenericImageView};
use imgslot::{Fetch, FetchReply, ResponseMeta, TransportError};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Installs a fmt subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([40, 80, 120, 255]),
    ));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([200, 100, 50]),
    ));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

pub fn width_of(image: &DynamicImage) -> u32 {
    image.dimensions().0
}

/// Polls `check` until it returns true or the deadline passes.
pub async fn eventually<F: Fn() -> bool>(deadline: Duration, check: F) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

pub enum StubOutcome {
    Response {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    },
    Transport {
        domain: String,
        code: i64,
        message: String,
    },
}

struct StubCall {
    outcome: StubOutcome,
    gate: Option<oneshot::Receiver<()>>,
    honor_cancel: bool,
}

/// Scripted [`Fetch`] implementation. Each URL is stubbed with one reply,
/// optionally held back behind a gate the test releases. A gated call can
/// either honor its cancel token (resolving with `Cancelled`) or ignore it,
/// which models a transport that only cancels best-effort.
#[derive(Default)]
pub struct StubFetch {
    calls: Mutex<HashMap<String, StubCall>>,
    fetch_count: AtomicU32,
    cancel_observed: Mutex<Vec<String>>,
}

impl StubFetch {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, url: &str, call: StubCall) {
        self.calls.lock().unwrap().insert(url.to_string(), call);
    }

    pub fn respond(&self, url: &str, status: u16, content_type: Option<&str>, body: Vec<u8>) {
        self.insert(
            url,
            StubCall {
                outcome: StubOutcome::Response {
                    status,
                    content_type: content_type.map(str::to_owned),
                    body,
                },
                gate: None,
                honor_cancel: true,
            },
        );
    }

    /// Stubs a reply held back until the returned sender fires. The call
    /// ignores its cancel token, so it completes even when superseded.
    pub fn respond_gated(
        &self,
        url: &str,
        status: u16,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.insert(
            url,
            StubCall {
                outcome: StubOutcome::Response {
                    status,
                    content_type: content_type.map(str::to_owned),
                    body,
                },
                gate: Some(rx),
                honor_cancel: false,
            },
        );
        tx
    }

    /// Stubs a gated reply that honors its cancel token.
    pub fn respond_gated_cancellable(
        &self,
        url: &str,
        status: u16,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.insert(
            url,
            StubCall {
                outcome: StubOutcome::Response {
                    status,
                    content_type: content_type.map(str::to_owned),
                    body,
                },
                gate: Some(rx),
                honor_cancel: true,
            },
        );
        tx
    }

    pub fn fail_transport(&self, url: &str, domain: &str, code: i64, message: &str) {
        self.insert(
            url,
            StubCall {
                outcome: StubOutcome::Transport {
                    domain: domain.to_string(),
                    code,
                    message: message.to_string(),
                },
                gate: None,
                honor_cancel: true,
            },
        );
    }

    /// Stubs a gated transport failure that ignores its cancel token.
    pub fn fail_transport_gated(
        &self,
        url: &str,
        domain: &str,
        code: i64,
        message: &str,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.insert(
            url,
            StubCall {
                outcome: StubOutcome::Transport {
                    domain: domain.to_string(),
                    code,
                    message: message.to_string(),
                },
                gate: Some(rx),
                honor_cancel: false,
            },
        );
        tx
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// URLs whose fetch observed a fired cancel token.
    pub fn cancelled_urls(&self) -> Vec<String> {
        self.cancel_observed.lock().unwrap().clone()
    }

    fn record_cancel(&self, url: &str) {
        self.cancel_observed.lock().unwrap().push(url.to_string());
    }
}

#[async_trait]
impl Fetch for StubFetch {
    async fn fetch(&self, url: &str, cancel: CancellationToken) -> FetchReply {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let call = self.calls.lock().unwrap().remove(url);
        let Some(call) = call else {
            panic!("no stubbed reply for {url}");
        };

        if let Some(gate) = call.gate {
            if call.honor_cancel {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        self.record_cancel(url);
                        return FetchReply::Cancelled;
                    }
                    result = gate => {
                        let _ = result;
                    }
                }
            } else {
                let _ = gate.await;
            }
        }

        if cancel.is_cancelled() {
            self.record_cancel(url);
        }

        match call.outcome {
            StubOutcome::Response {
                status,
                content_type,
                body,
            } => FetchReply::Response {
                meta: ResponseMeta {
                    url: url.to_string(),
                    status,
                    content_type,
                },
                body: Bytes::from(body),
            },
            StubOutcome::Transport {
                domain,
                code,
                message,
            } => FetchReply::Transport(TransportError {
                domain,
                code,
                message,
            }),
        }
    }
}

//! Test doubles for the transport seam.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::error::ApiError;
use super::transport::{ApiRequest, ApiResponse, Transport};

type Handler = Box<dyn Fn(&ApiRequest, usize) -> Result<ApiResponse, ApiError> + Send + Sync>;

/// Transport double that counts calls, records requests and answers from a
/// programmable handler, optionally after a delay (for dedup/supersession
/// scenarios).
pub(crate) struct MockTransport {
    calls: AtomicUsize,
    requests: Mutex<Vec<ApiRequest>>,
    delay: Mutex<Option<Duration>>,
    handler: Handler,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&ApiRequest) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Self::with_handler(Box::new(move |request, _| handler(request)))
    }

    /// Always answers 200 with `value`.
    pub fn json(value: Value) -> Arc<Self> {
        Self::with_handler(Box::new(move |_, _| ok(value.clone())))
    }

    /// Answers `{"call": n}` where n is the 1-based call number, so tests
    /// can tell responses apart.
    pub fn counting() -> Arc<Self> {
        Self::with_handler(Box::new(|_, call| ok(serde_json::json!({"call": call}))))
    }

    fn with_handler(handler: Handler) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
            handler,
        })
    }

    pub fn delayed(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        (self.handler)(&request, call)
    }
}

pub(crate) fn ok(value: Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse {
        status: 200,
        body: serde_json::to_vec(&value).expect("serializable test value"),
    })
}

pub(crate) fn status(code: u16, value: Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse {
        status: code,
        body: serde_json::to_vec(&value).expect("serializable test value"),
    })
}

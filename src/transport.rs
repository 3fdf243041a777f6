use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Inbound half of the transport: response bodies are delivered here,
/// uncorrelated with the request that triggered them. The driver's
/// reconcile loop consumes the other end.
#[derive(Clone)]
pub struct ResponseSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ResponseSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    pub fn deliver(&self, body: impl Into<String>) {
        // receiver gone means the client was dropped; nothing to repair
        let _ = self.tx.send(body.into());
    }
}

/// Fire-and-forget GET. Implementations deliver any response body to the
/// sink; failures are swallowed, the periodic poll repairs stale state.
pub trait Transport: Send + Sync {
    fn send(&self, url: String, sink: ResponseSink);
}

pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        // the timeout only bounds how long an abandoned request can hold
        // a task alive; a timed-out response is simply never delivered
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");
        Self { http }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(&self, url: String, sink: ResponseSink) {
        let http = self.http.clone();
        tokio::spawn(async move {
            let result = http.get(&url).send().await.and_then(|r| r.error_for_status());
            match result {
                Ok(resp) => match resp.text().await {
                    Ok(body) => {
                        trace!(url = %url, bytes = body.len(), "device response");
                        sink.deliver(body);
                    }
                    Err(e) => debug!(url = %url, error = %e, "failed to read device response"),
                },
                Err(e) => debug!(url = %url, error = %e, "device request failed"),
            }
        });
    }
}

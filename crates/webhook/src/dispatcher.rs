use std::sync::RwLock;
use std::time::Duration;

use interceptor::{DispatchError, EventDispatcher, EventPayload};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Url};
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, info, warn};

use crate::{DeliveryOutcome, DispatchHandle, WebhookConfig};

const WORKER_THREAD_NAME: &str = "webhook-dispatch";

/// Posts events to a webhook endpoint without blocking the caller.
///
/// One instance is created at start-up and shared by every packet-processing
/// thread; the underlying `reqwest::Client` pools connections internally and
/// needs no external locking.
///
/// Call [`Self::shutdown`] when the plugin is stopped. If that never happens,
/// dropping the dispatcher releases the worker pool in the background.
pub struct WebhookDispatcher {
    url: Url,
    diagnostics: bool,
    // `None` once shut down. Readers only hold the lock long enough to spawn.
    transport: RwLock<Option<Transport>>,
}

struct Transport {
    runtime: Runtime,
    client: Client,
}

impl WebhookDispatcher {
    /// Validates the endpoint and acquires the worker pool and HTTP client.
    pub fn new(config: WebhookConfig) -> Result<Self, DispatchError> {
        let url = parse_endpoint(&config.url)?;

        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads.max(1))
            .thread_name(WORKER_THREAD_NAME)
            .enable_all()
            .build()
            .map_err(|e| DispatchError::Transport {
                message: e.to_string(),
            })?;

        let client = {
            let _guard = runtime.enter();
            Client::builder()
                .timeout(config.timeout)
                .build()
                .map_err(|e| DispatchError::Transport {
                    message: e.to_string(),
                })?
        };

        info!(
            url = %url,
            timeout_ms = config.timeout.as_millis() as u64,
            workers = config.worker_threads.max(1),
            diagnostics = config.diagnostics,
            "Webhook dispatcher started"
        );

        Ok(Self {
            url,
            diagnostics: config.diagnostics,
            transport: RwLock::new(Some(Transport { runtime, client })),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn diagnostics_enabled(&self) -> bool {
        self.diagnostics
    }

    pub fn is_running(&self) -> bool {
        self.transport
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Serialises the payload and starts the POST on the worker pool.
    ///
    /// Returns as soon as the request has been handed to the pool. The
    /// returned handle may be observed, awaited, aborted, or simply dropped.
    pub fn dispatch_async(&self, payload: &EventPayload) -> Result<DispatchHandle, DispatchError> {
        // Serialised here rather than with `RequestBuilder::json` so an encoding
        // failure comes back to the caller instead of surfacing as a delivery outcome.
        let body = serde_json::to_vec(payload)?;

        let guard = self.transport.read().unwrap_or_else(|e| e.into_inner());
        let transport = guard.as_ref().ok_or(DispatchError::ShutDown)?;
        let request = transport
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let task = transport.runtime.spawn(deliver(request));
        Ok(DispatchHandle::new(task, transport.runtime.handle().clone()))
    }

    /// Logs the outcome of a delivery once it ends.
    ///
    /// The wait happens on the dispatcher's own workers, so the caller is
    /// never suspended.
    pub fn observe(&self, handle: DispatchHandle) {
        let url = self.url.clone();
        let observer = async move {
            match handle.outcome().await {
                DeliveryOutcome::Delivered { status } => {
                    info!(url = %url, status, "Webhook delivered")
                }
                DeliveryOutcome::Rejected { status } => {
                    warn!(url = %url, status, "Webhook endpoint returned an error status")
                }
                DeliveryOutcome::Failed { reason, timed_out } => {
                    warn!(url = %url, error = %reason, timed_out, "Webhook delivery failed")
                }
                DeliveryOutcome::Cancelled => {
                    debug!(url = %url, "Webhook delivery cancelled")
                }
            }
        };

        let guard = self.transport.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(transport) => {
                transport.runtime.spawn(observer);
            }
            None => {
                debug!(url = %self.url, "Dispatcher shut down before the outcome could be observed")
            }
        }
    }

    /// Stops accepting events and releases the worker pool and client.
    ///
    /// In-flight deliveries get up to `grace` to finish; after that they are
    /// dropped. Returns `false` if the dispatcher was already shut down.
    ///
    /// When called from inside an async context there is no grace period;
    /// in-flight deliveries are abandoned immediately.
    pub fn shutdown(&self, grace: Duration) -> bool {
        let transport = self
            .transport
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        match transport {
            Some(Transport { runtime, client }) => {
                drop(client);
                // A blocking shutdown would panic inside an async context.
                if Handle::try_current().is_ok() {
                    runtime.shutdown_background();
                } else {
                    runtime.shutdown_timeout(grace);
                }
                info!(url = %self.url, "Webhook dispatcher stopped");
                true
            }
            None => false,
        }
    }
}

impl EventDispatcher for WebhookDispatcher {
    fn dispatch(&self, payload: EventPayload) -> Result<(), DispatchError> {
        let handle = self.dispatch_async(&payload)?;
        if self.diagnostics {
            self.observe(handle);
        }
        Ok(())
    }
}

impl Drop for WebhookDispatcher {
    fn drop(&mut self) {
        let transport = self
            .transport
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(Transport { runtime, client }) = transport {
            drop(client);
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for WebhookDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookDispatcher")
            .field("url", &self.url.as_str())
            .field("diagnostics", &self.diagnostics)
            .field("running", &self.is_running())
            .finish()
    }
}

async fn deliver(request: RequestBuilder) -> DeliveryOutcome {
    match request.send().await {
        Ok(response) => {
            let status = response.status();
            if status.is_success() {
                DeliveryOutcome::Delivered {
                    status: status.as_u16(),
                }
            } else {
                DeliveryOutcome::Rejected {
                    status: status.as_u16(),
                }
            }
        }
        Err(e) => DeliveryOutcome::Failed {
            reason: e.to_string(),
            timed_out: e.is_timeout(),
        },
    }
}

/// Parses `raw` as an absolute `http` or `https` endpoint.
pub fn parse_endpoint(raw: &str) -> Result<Url, DispatchError> {
    let url = Url::parse(raw).map_err(|e| DispatchError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DispatchError::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme '{other}'"),
        }),
    }
}

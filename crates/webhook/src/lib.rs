//! Message webhook delivery adapter.
//!
//! Implements [`interceptor::EventDispatcher`] by POSTing each event as JSON
//! to the configured endpoint.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request timeouts, the worker pool, and
//! outcome reporting all live here. The [`interceptor`] crate sees only
//! [`interceptor::EventDispatcher`].
//!
//! ## Execution model
//!
//! The host calls into the dispatcher from its own packet-processing threads,
//! which are not async. [`WebhookDispatcher`] therefore owns a small tokio
//! runtime and a single shared `reqwest::Client`; every delivery is spawned
//! onto that runtime and the caller returns immediately.
//!
//! Delivery is at-most-once and best-effort: no retries, no queueing, no
//! ordering between events. When diagnostics are enabled, an observer task
//! (also on the dispatcher's workers, never the caller's thread) awaits each
//! delivery and logs its outcome.
//!
//! | Operation | Blocks caller? |
//! |-----------|----------------|
//! | [`WebhookDispatcher::dispatch_async`] | No |
//! | [`WebhookDispatcher::observe`] | No |
//! | [`DispatchHandle::wait`] | Yes (explicit opt-in) |
//! | [`WebhookDispatcher::shutdown`] | Up to the grace period |

mod config;
mod dispatcher;
mod handle;

pub use config::{WebhookConfig, DEFAULT_WORKER_THREADS};
pub use dispatcher::{parse_endpoint, WebhookDispatcher};
pub use handle::{DeliveryOutcome, DispatchHandle};

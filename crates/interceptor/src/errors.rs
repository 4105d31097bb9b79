//! Error types shared between the domain and its adapter crates.
//!
//! None of these ever escape [`crate::MessageWebhook::intercept_packet`]: the
//! entrypoint logs them and lets the packet through. They exist so that the
//! adapters can report precisely what went wrong and so the composition root
//! can fail fast at start-up.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Reasons a string cannot be parsed as a [`crate::Jid`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JidError {
    /// The input was empty.
    #[error("address is empty")]
    Empty,

    /// The domain part (between `@` and `/`) was empty.
    #[error("address '{0}' has an empty domain")]
    EmptyDomain(String),

    /// An `@` was present but nothing preceded it.
    #[error("address '{0}' has an empty node")]
    EmptyNode(String),

    /// A `/` was present but nothing followed it.
    #[error("address '{0}' has an empty resource")]
    EmptyResource(String),
}

// ---------------------------------------------------------------------------
// Property store
// ---------------------------------------------------------------------------

/// Failures reported by a [`crate::PropertyStore`].
///
/// The configuration provider treats every variant as non-fatal and falls back
/// to the default value; the error is only logged.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be read or written.
    #[error("property store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store exists but its content is not a valid property table.
    #[error("property store is corrupt: {message}")]
    Corrupt {
        /// Parser diagnostic.
        message: String,
    },

    /// The value could not be encoded for persistence.
    #[error("property '{key}' could not be persisted: {message}")]
    Encode {
        /// Key being written.
        key: String,
        /// Encoder diagnostic.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Failures that prevent an event from being *submitted* for delivery.
///
/// Delivery failures (network errors, non-2xx responses, timeouts) are not
/// errors from the submitter's point of view; they surface only as a
/// `DeliveryOutcome` to the optional diagnostic observer.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The configured endpoint is not a usable absolute URL.
    #[error("invalid webhook url '{url}': {message}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The payload could not be encoded as JSON.
    #[error("payload serialisation failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport client or its worker pool could not be created.
    #[error("webhook transport could not be initialised: {message}")]
    Transport {
        /// Underlying error text.
        message: String,
    },

    /// The dispatcher has been shut down; no further events are accepted.
    #[error("webhook dispatcher is shut down")]
    ShutDown,
}

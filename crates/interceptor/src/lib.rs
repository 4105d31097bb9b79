//! Core domain for the message webhook.
//!
//! Observes every packet passing through a chat server's processing pipeline
//! and forwards qualifying inbound chat messages, as a small JSON event, to an
//! external HTTP endpoint. Delivery never blocks or alters the pipeline.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed ([`PropertyStore`], [`EventDispatcher`],
//! [`InterceptorRegistry`]); the `properties` and `webhook` crates define
//! *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`jid`] | Chat addresses and their bare form |
//! | [`packet`] | Stanza model handed over by the host |
//! | [`config`] | `Settings`, `ConfigurationProvider`, `PropertyStore` port |
//! | [`filter`] | The forwarding decision |
//! | [`payload`] | Outbound `EventPayload` |
//! | [`entrypoint`] | `MessageWebhook` interceptor and `EventDispatcher` port |
//! | [`host`] | Interceptor registration contracts and `InterceptorChain` |
//! | [`identifiers`] | Newtype identifiers (`RegistrationId`, `StreamId`) |
//! | [`errors`] | Error types |

pub mod config;
pub mod entrypoint;
pub mod errors;
pub mod filter;
pub mod host;
pub mod identifiers;
pub mod jid;
pub mod packet;
pub mod payload;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{
    generate_token, ConfigurationProvider, InMemoryPropertyStore, PropertyStore, Settings,
    DEFAULT_TIMEOUT, DEFAULT_URL, KEY_DEBUG, KEY_SEND_BODY, KEY_TIMEOUT_SECS, KEY_TOKEN, KEY_URL,
};
pub use entrypoint::{EventDispatcher, MessageWebhook};
pub use errors::{DispatchError, JidError, StoreError};
pub use filter::should_forward;
pub use host::{InterceptorChain, InterceptorRegistry, PacketInterceptor};
pub use identifiers::{RegistrationId, StreamId};
pub use jid::{BareJid, Jid};
pub use packet::{
    Extension, InterceptDecision, Iq, Message, MessageType, Packet, Presence, Session,
    DELAY_ELEMENT, DELAY_NAMESPACE,
};
pub use payload::EventPayload;

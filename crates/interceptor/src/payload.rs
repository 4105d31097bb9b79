//! The event record posted to the webhook.

use serde::{Deserialize, Serialize};

use crate::Message;

/// Wire body of one forwarded message: `{ token, from, to, body }`.
///
/// `from` and `to` are bare addresses; `body` is the raw text.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub token: String,
    pub from: String,
    pub to: String,
    pub body: String,
}

impl EventPayload {
    /// Builds the payload for a message that passed the filter.
    ///
    /// Returns `None` only if the message lacks a sender, destination, or
    /// body, which the filter already rules out.
    pub fn build(token: &str, msg: &Message) -> Option<Self> {
        Some(Self {
            token: token.to_string(),
            from: msg.from.as_ref()?.to_bare().to_string(),
            to: msg.to.as_ref()?.to_bare().to_string(),
            body: msg.body.clone()?,
        })
    }
}

impl std::fmt::Debug for EventPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPayload")
            .field("token", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("body_len", &self.body.len())
            .finish()
    }
}

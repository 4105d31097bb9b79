//! Read-only view of the stanzas the host pipeline hands to interceptors.
//!
//! The host owns parsing and routing; these types carry only what the filter
//! and payload builder look at. All of them deserialise from JSON so that test
//! harnesses can replay captured traffic.

use serde::{Deserialize, Serialize};

use crate::{Jid, StreamId};

/// Namespace of the XEP-0203 delayed-delivery extension.
pub const DELAY_NAMESPACE: &str = "urn:xmpp:delay";

/// Element name of the delayed-delivery extension.
pub const DELAY_ELEMENT: &str = "delay";

// ---------------------------------------------------------------------------
// Stanzas
// ---------------------------------------------------------------------------

/// One unit of chat-protocol traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Packet {
    Message(Message),
    Presence(Presence),
    Iq(Iq),
}

impl Packet {
    pub fn from(&self) -> Option<&Jid> {
        match self {
            Packet::Message(m) => m.from.as_ref(),
            Packet::Presence(p) => p.from.as_ref(),
            Packet::Iq(i) => i.from.as_ref(),
        }
    }

    pub fn to(&self) -> Option<&Jid> {
        match self {
            Packet::Message(m) => m.to.as_ref(),
            Packet::Presence(p) => p.to.as_ref(),
            Packet::Iq(i) => i.to.as_ref(),
        }
    }

    /// Returns the message stanza, or `None` for presence and IQ traffic.
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Packet::Message(m) => Some(m),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------

/// The `type` attribute of a message stanza.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Standalone message; the protocol default when no type is given.
    #[default]
    Normal,
    /// One-to-one conversation.
    Chat,
    /// Multi-user room traffic.
    Groupchat,
    /// Alerts and notifications that expect no reply.
    Headline,
    /// Error bounced back to the sender.
    Error,
}

impl MessageType {
    /// Returns `true` for conversational traffic (`chat` and `groupchat`).
    pub fn is_conversational(self) -> bool {
        matches!(self, MessageType::Chat | MessageType::Groupchat)
    }
}

/// A child element of a stanza, identified by its qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    pub namespace: String,
}

impl Extension {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// The delayed-delivery marker attached to messages replayed from offline storage.
    pub fn delay() -> Self {
        Self::new(DELAY_ELEMENT, DELAY_NAMESPACE)
    }
}

/// A message stanza.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub from: Option<Jid>,
    #[serde(default)]
    pub to: Option<Jid>,
    #[serde(default, rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub extensions: Vec<Extension>,
}

impl Message {
    /// Returns `true` if the message carries a delayed-delivery marker.
    pub fn is_delayed(&self) -> bool {
        self.extensions
            .iter()
            .any(|e| e.name == DELAY_ELEMENT && e.namespace == DELAY_NAMESPACE)
    }

    /// Returns the body text when present and non-empty.
    pub fn non_empty_body(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }
}

/// A presence stanza. Never forwarded; carried so the filter can see it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Presence {
    #[serde(default)]
    pub from: Option<Jid>,
    #[serde(default)]
    pub to: Option<Jid>,
}

/// An IQ stanza. Never forwarded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Iq {
    #[serde(default)]
    pub from: Option<Jid>,
    #[serde(default)]
    pub to: Option<Jid>,
}

// ---------------------------------------------------------------------------
// Session and decision
// ---------------------------------------------------------------------------

/// The host session a packet was observed on. Opaque to the core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub stream_id: Option<StreamId>,
    #[serde(default)]
    pub address: Option<Jid>,
}

/// What an interceptor tells the host to do with a packet.
///
/// The message webhook always answers [`InterceptDecision::Allow`]; `Reject`
/// exists because the host contract supports it for other interceptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptDecision {
    Allow,
    Reject {
        /// Human-readable reason returned to the host.
        reason: String,
    },
}

impl InterceptDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, InterceptDecision::Allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_marker_requires_matching_namespace() {
        let mut msg = Message::default();
        assert!(!msg.is_delayed());

        msg.extensions.push(Extension::new("delay", "jabber:x:delay"));
        assert!(!msg.is_delayed());

        msg.extensions.push(Extension::delay());
        assert!(msg.is_delayed());
    }

    #[test]
    fn empty_body_is_treated_as_absent() {
        let mut msg = Message {
            body: Some(String::new()),
            ..Message::default()
        };
        assert_eq!(msg.non_empty_body(), None);

        msg.body = Some("hi".to_string());
        assert_eq!(msg.non_empty_body(), Some("hi"));
    }

    #[test]
    fn message_deserialises_from_tagged_json() {
        let packet: Packet = serde_json::from_str(
            r#"{
                "kind": "message",
                "from": "alice@example.com/phone",
                "to": "bob@example.com",
                "type": "groupchat",
                "body": "hi",
                "extensions": [{ "name": "delay", "namespace": "urn:xmpp:delay" }]
            }"#,
        )
        .unwrap();

        let msg = packet.as_message().unwrap();
        assert_eq!(msg.message_type, MessageType::Groupchat);
        assert!(msg.is_delayed());
        assert_eq!(packet.to().unwrap().to_string(), "bob@example.com");
    }

    #[test]
    fn missing_type_defaults_to_normal() {
        let packet: Packet = serde_json::from_str(r#"{ "kind": "message" }"#).unwrap();
        assert_eq!(packet.as_message().unwrap().message_type, MessageType::Normal);
    }

    #[test]
    fn presence_is_not_a_message() {
        let packet: Packet =
            serde_json::from_str(r#"{ "kind": "presence", "from": "a@b" }"#).unwrap();
        assert!(packet.as_message().is_none());
        assert!(packet.from().is_some());
    }

    #[test]
    fn session_with_empty_stream_id_is_rejected() {
        assert!(serde_json::from_str::<Session>(r#"{ "stream_id": "" }"#).is_err());
        let session: Session = serde_json::from_str(r#"{ "stream_id": "s-9" }"#).unwrap();
        assert_eq!(session.stream_id.unwrap().as_str(), "s-9");
    }
}

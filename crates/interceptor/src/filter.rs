//! Forwarding decision.
//!
//! A packet qualifies only if every rule below holds; the first failing rule
//! short-circuits. The function is pure and total: no input makes it fail.
//!
//! 1. The host has finished processing the packet and it is inbound.
//! 2. It is a message stanza with a destination.
//! 3. Body forwarding is enabled.
//! 4. The body is present and non-empty.
//! 5. It is not a delayed (offline replay) message.
//! 6. Its type is `chat` or `groupchat`.
//! 7. It has a sender whose bare address differs from the destination's.

use crate::{Message, Packet};

/// Returns the message to forward, or `None` if the packet does not qualify.
pub fn qualifying_message(
    packet: &Packet,
    incoming: bool,
    processed: bool,
    send_body: bool,
) -> Option<&Message> {
    if !(processed && incoming && send_body) {
        return None;
    }
    let msg = packet.as_message()?;
    let to = msg.to.as_ref()?;
    let from = msg.from.as_ref()?;

    let qualifies = msg.non_empty_body().is_some()
        && !msg.is_delayed()
        && msg.message_type.is_conversational()
        && from.to_bare() != to.to_bare();

    qualifies.then_some(msg)
}

/// Returns `true` if the packet should be forwarded to the webhook.
pub fn should_forward(packet: &Packet, incoming: bool, processed: bool, send_body: bool) -> bool {
    qualifying_message(packet, incoming, processed, send_body).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Extension, Iq, Jid, MessageType, Presence};

    fn jid(s: &str) -> Option<Jid> {
        Some(Jid::parse(s).unwrap())
    }

    fn scenario_a() -> Message {
        Message {
            from: jid("alice@example.com/phone"),
            to: jid("bob@example.com"),
            message_type: MessageType::Chat,
            body: Some("hi".to_string()),
            extensions: Vec::new(),
        }
    }

    fn forwards(msg: Message) -> bool {
        should_forward(&Packet::Message(msg), true, true, true)
    }

    #[test]
    fn live_chat_between_distinct_users_qualifies() {
        assert!(forwards(scenario_a()));
    }

    #[test]
    fn groupchat_qualifies() {
        let msg = Message {
            to: jid("room@muc.example.com"),
            message_type: MessageType::Groupchat,
            ..scenario_a()
        };
        assert!(forwards(msg));
    }

    #[test]
    fn unprocessed_or_outgoing_views_are_ignored() {
        let packet = Packet::Message(scenario_a());
        for (incoming, processed) in [(true, false), (false, true), (false, false)] {
            assert!(!should_forward(&packet, incoming, processed, true));
        }
    }

    #[test]
    fn disabled_body_forwarding_suppresses_every_event() {
        let packet = Packet::Message(scenario_a());
        assert!(!should_forward(&packet, true, true, false));
    }

    #[test]
    fn missing_or_empty_body_does_not_qualify() {
        assert!(!forwards(Message { body: None, ..scenario_a() }));
        assert!(!forwards(Message { body: Some(String::new()), ..scenario_a() }));
    }

    #[test]
    fn delayed_message_does_not_qualify() {
        let msg = Message {
            extensions: vec![Extension::delay()],
            ..scenario_a()
        };
        assert!(!forwards(msg));
    }

    #[test]
    fn non_conversational_types_do_not_qualify() {
        for message_type in [MessageType::Normal, MessageType::Headline, MessageType::Error] {
            assert!(!forwards(Message { message_type, ..scenario_a() }), "{message_type:?}");
        }
    }

    #[test]
    fn message_to_same_bare_address_does_not_qualify() {
        let msg = Message {
            to: jid("alice@example.com/laptop"),
            ..scenario_a()
        };
        assert!(!forwards(msg));
    }

    #[test]
    fn message_without_addresses_does_not_qualify() {
        assert!(!forwards(Message { to: None, ..scenario_a() }));
        assert!(!forwards(Message { from: None, ..scenario_a() }));
    }

    #[test]
    fn non_message_packets_do_not_qualify() {
        let presence = Packet::Presence(Presence {
            from: jid("alice@example.com/phone"),
            to: jid("bob@example.com"),
        });
        let iq = Packet::Iq(Iq {
            from: jid("alice@example.com/phone"),
            to: jid("bob@example.com"),
        });
        assert!(!should_forward(&presence, true, true, true));
        assert!(!should_forward(&iq, true, true, true));
    }
}

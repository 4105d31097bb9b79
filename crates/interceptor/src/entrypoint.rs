//! The per-packet callback that ties filter, payload builder and dispatcher
//! together.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::filter::qualifying_message;
use crate::{
    DispatchError, EventPayload, InterceptDecision, Packet, PacketInterceptor, Session, Settings,
};

/// Outbound side of the message webhook.
///
/// `dispatch` only *submits* the event. It must return without waiting for
/// the network; delivery failures are the implementation's to log or drop.
pub trait EventDispatcher: Send + Sync {
    fn dispatch(&self, payload: EventPayload) -> Result<(), DispatchError>;
}

/// Interceptor that forwards qualifying inbound chat messages to a webhook.
///
/// Never rejects or mutates a packet. Internal failures, including panics in
/// the dispatcher, are logged and swallowed.
pub struct MessageWebhook {
    settings: Arc<Settings>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl MessageWebhook {
    pub fn new(settings: Arc<Settings>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            settings,
            dispatcher,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn forward(
        &self,
        packet: &Packet,
        incoming: bool,
        processed: bool,
    ) -> Result<bool, DispatchError> {
        let Some(msg) = qualifying_message(packet, incoming, processed, self.settings.send_body)
        else {
            return Ok(false);
        };
        let Some(payload) = EventPayload::build(&self.settings.token, msg) else {
            return Ok(false);
        };

        if self.settings.debug {
            debug!(
                from = %payload.from,
                to = %payload.to,
                url = %self.settings.url,
                "Forwarding intercepted message"
            );
        }

        self.dispatcher.dispatch(payload)?;
        Ok(true)
    }
}

impl PacketInterceptor for MessageWebhook {
    fn intercept_packet(
        &self,
        packet: &Packet,
        session: &Session,
        incoming: bool,
        processed: bool,
    ) -> InterceptDecision {
        match catch_unwind(AssertUnwindSafe(|| self.forward(packet, incoming, processed))) {
            Ok(Ok(_)) => {}
            Ok(Err(error)) => {
                warn!(
                    %error,
                    url = %self.settings.url,
                    stream_id = session.stream_id.as_ref().map(|s| s.as_str()),
                    "Failed to submit webhook event; message delivered without forwarding"
                );
            }
            Err(_) => {
                error!(
                    url = %self.settings.url,
                    stream_id = session.stream_id.as_ref().map(|s| s.as_str()),
                    "Webhook forwarding panicked; message delivered without forwarding"
                );
            }
        }
        InterceptDecision::Allow
    }
}

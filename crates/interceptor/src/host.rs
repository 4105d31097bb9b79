//! Host-side contracts: per-packet callbacks and their registration.
//!
//! In production the host server supplies the [`InterceptorRegistry`]; tests and
//! the development harness use [`InterceptorChain`], which invokes interceptors
//! in registration order the way the host does.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::{InterceptDecision, Packet, RegistrationId, Session};

/// Callback invoked by the host for every packet it processes.
///
/// Implementations run on the host's packet-processing thread and must return
/// promptly.
pub trait PacketInterceptor: Send + Sync {
    fn intercept_packet(
        &self,
        packet: &Packet,
        session: &Session,
        incoming: bool,
        processed: bool,
    ) -> InterceptDecision;
}

/// Where interceptors are registered with the host.
pub trait InterceptorRegistry: Send + Sync {
    fn add_interceptor(&self, interceptor: Arc<dyn PacketInterceptor>) -> RegistrationId;

    /// Removes a registration. Returns `false` if it was not registered.
    fn remove_interceptor(&self, id: RegistrationId) -> bool;
}

// ---------------------------------------------------------------------------

/// In-process [`InterceptorRegistry`] that can also drive its interceptors.
#[derive(Default)]
pub struct InterceptorChain {
    next_id: AtomicU64,
    interceptors: RwLock<Vec<(RegistrationId, Arc<dyn PacketInterceptor>)>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.interceptors.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every registered interceptor against the packet and returns the
    /// first rejection, or [`InterceptDecision::Allow`].
    pub fn invoke(
        &self,
        packet: &Packet,
        session: &Session,
        incoming: bool,
        processed: bool,
    ) -> InterceptDecision {
        // Snapshot so interceptors may (un)register without deadlocking.
        let interceptors: Vec<_> = self
            .interceptors
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, i)| Arc::clone(i))
            .collect();

        for interceptor in interceptors {
            let decision = interceptor.intercept_packet(packet, session, incoming, processed);
            if !decision.is_allow() {
                return decision;
            }
        }
        InterceptDecision::Allow
    }
}

impl InterceptorRegistry for InterceptorChain {
    fn add_interceptor(&self, interceptor: Arc<dyn PacketInterceptor>) -> RegistrationId {
        let id = RegistrationId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.interceptors
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, interceptor));
        id
    }

    fn remove_interceptor(&self, id: RegistrationId) -> bool {
        let mut interceptors = self.interceptors.write().unwrap_or_else(|e| e.into_inner());
        let before = interceptors.len();
        interceptors.retain(|(existing, _)| *existing != id);
        interceptors.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Counting(AtomicUsize);

    impl PacketInterceptor for Counting {
        fn intercept_packet(&self, _: &Packet, _: &Session, _: bool, _: bool) -> InterceptDecision {
            self.0.fetch_add(1, Ordering::SeqCst);
            InterceptDecision::Allow
        }
    }

    struct Rejecting;

    impl PacketInterceptor for Rejecting {
        fn intercept_packet(&self, _: &Packet, _: &Session, _: bool, _: bool) -> InterceptDecision {
            InterceptDecision::Reject {
                reason: "blocked".to_string(),
            }
        }
    }

    fn presence() -> Packet {
        Packet::Presence(Default::default())
    }

    #[test]
    fn removed_interceptor_is_no_longer_invoked() {
        let chain = InterceptorChain::new();
        let counter = Arc::new(Counting(AtomicUsize::new(0)));
        let id = chain.add_interceptor(counter.clone());

        chain.invoke(&presence(), &Session::default(), true, true);
        assert!(chain.remove_interceptor(id));
        assert!(!chain.remove_interceptor(id));
        chain.invoke(&presence(), &Session::default(), true, true);

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert!(chain.is_empty());
    }

    #[test]
    fn first_rejection_stops_the_chain() {
        let chain = InterceptorChain::new();
        let counter = Arc::new(Counting(AtomicUsize::new(0)));
        chain.add_interceptor(Arc::new(Rejecting));
        chain.add_interceptor(counter.clone());

        let decision = chain.invoke(&presence(), &Session::default(), true, true);
        assert_eq!(
            decision,
            InterceptDecision::Reject {
                reason: "blocked".to_string()
            }
        );
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn registrations_get_distinct_ids() {
        let chain = InterceptorChain::new();
        let a = chain.add_interceptor(Arc::new(Rejecting));
        let b = chain.add_interceptor(Arc::new(Rejecting));
        assert_ne!(a, b);
        assert_eq!(chain.len(), 2);
    }
}

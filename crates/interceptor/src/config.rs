//! Operating settings and the idempotent bootstrap that produces them.
//!
//! Settings live in a host-provided [`PropertyStore`]. The first time a key is
//! read and found missing, the default is written back so that subsequent reads
//! (in this process or after a restart) see the same value. This matters for
//! the shared token: it is generated once and then stays stable.
//!
//! Configuration problems are never fatal. A store that cannot be read or
//! written, or a duration that cannot be parsed, resolves to the default and
//! is logged. A boolean that is not `true` reads as `false`.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use crate::StoreError;

/// Property key of the diagnostic-mode switch.
pub const KEY_DEBUG: &str = "debug";
/// Property key of the body-forwarding switch.
pub const KEY_SEND_BODY: &str = "send_body";
/// Property key of the webhook endpoint.
pub const KEY_URL: &str = "url";
/// Property key of the shared secret token.
pub const KEY_TOKEN: &str = "token";
/// Property key of the outbound request timeout, in whole seconds.
pub const KEY_TIMEOUT_SECS: &str = "timeout_secs";

/// Endpoint used until an operator configures a real one.
pub const DEFAULT_URL: &str = "http://localhost:8080/user/callback/url";
/// Outbound request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Persistent string-keyed settings store supplied by the host.
pub trait PropertyStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never set.
    fn get_property(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_property(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// A [`PropertyStore`] that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryPropertyStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl PropertyStore for InMemoryPropertyStore {
    fn get_property(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set_property(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Reads settings from a [`PropertyStore`], persisting defaults on first read.
///
/// This is a bootstrap helper, not a cache: every call goes to the store.
pub struct ConfigurationProvider<'a> {
    store: &'a dyn PropertyStore,
}

impl<'a> ConfigurationProvider<'a> {
    pub fn new(store: &'a dyn PropertyStore) -> Self {
        Self { store }
    }

    /// Returns the value stored under `key`, or writes `default` back and
    /// returns it if the key is absent or empty.
    pub fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_or_default_with(key, || default.to_string())
    }

    /// Like [`Self::get_or_default`], but only computes the default when it is
    /// needed.
    pub fn get_or_default_with(&self, key: &str, default: impl FnOnce() -> String) -> String {
        match self.read(key) {
            Some(value) => value,
            None => {
                let value = default();
                self.write(key, &value);
                value
            }
        }
    }

    /// Reads a boolean setting.
    ///
    /// Only `true` (any case) is true. An absent key persists `default`. Any
    /// other value reads as `false` and is left untouched in the store, so a
    /// mistyped switch fails closed.
    pub fn get_boolean(&self, key: &str, default: bool) -> bool {
        let raw = self.get_or_default(key, if default { "true" } else { "false" });
        let value = raw.trim();
        if value.eq_ignore_ascii_case("true") {
            true
        } else {
            if !value.eq_ignore_ascii_case("false") {
                warn!(key, value = %raw, "Malformed boolean property read as false");
            }
            false
        }
    }

    /// Reads a whole-seconds duration setting, persisting `default` if absent.
    pub fn get_duration_secs(&self, key: &str, default: Duration) -> Duration {
        let raw = self.get_or_default(key, &default.as_secs().to_string());
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    key,
                    value = %raw,
                    default_secs = default.as_secs(),
                    "Ignoring malformed duration property"
                );
                default
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get_property(key) {
            Ok(Some(value)) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(error) => {
                warn!(key, %error, "Property store read failed; using default");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(error) = self.store.set_property(key, value) {
            warn!(key, %error, "Property store write failed; default not persisted");
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Immutable settings resolved once at start-up and passed to every component.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Diagnostic mode: per-message logging and delivery outcome observation.
    pub debug: bool,
    /// Body-forwarding switch. When off, no event is forwarded at all.
    pub send_body: bool,
    /// Webhook endpoint.
    pub url: String,
    /// Shared secret included in every payload.
    pub token: String,
    /// Bound on each outbound request.
    pub timeout: Duration,
}

impl Settings {
    /// Resolves every setting, persisting defaults for the ones never set.
    pub fn load(provider: &ConfigurationProvider<'_>) -> Self {
        Self {
            debug: provider.get_boolean(KEY_DEBUG, false),
            send_body: provider.get_boolean(KEY_SEND_BODY, true),
            url: provider.get_or_default(KEY_URL, DEFAULT_URL),
            token: provider.get_or_default_with(KEY_TOKEN, generate_token),
            timeout: provider.get_duration_secs(KEY_TIMEOUT_SECS, DEFAULT_TIMEOUT),
        }
    }
}

// The token is a shared secret; keep it out of logs and panic messages.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("debug", &self.debug)
            .field("send_body", &self.send_body)
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Generates a fresh random token.
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

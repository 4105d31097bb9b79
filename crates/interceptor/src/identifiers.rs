//! Newtype identifiers used at the host boundary.
//!
//! Registration handles and stream identifiers are both plain primitives under
//! the hood; wrapping them keeps a [`RegistrationId`] from being passed where a
//! stanza count or port number was expected.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Non-empty string newtypes. Deserialisation goes through `new()` so the
// non-empty check cannot be bypassed by a host payload.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String")]
        pub struct $name(String);

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
                    .ok_or_else(|| format!("{} must not be empty", stringify!($name)))
            }
        }

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes.
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

u64_id! {
    /// Handle returned by an [`crate::InterceptorRegistry`] when an interceptor
    /// is added. Passing it back to `remove_interceptor` unregisters exactly
    /// that interceptor.
    RegistrationId
}

string_id! {
    /// Identifies the XML stream a session is bound to.
    ///
    /// Assigned by the host; the core only carries it into log fields.
    StreamId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stream_id_is_rejected() {
        assert!(StreamId::new("").is_none());
        assert_eq!(StreamId::new("s-1").unwrap().as_str(), "s-1");
    }

    #[test]
    fn empty_stream_id_is_rejected_when_deserialised() {
        assert!(serde_json::from_str::<StreamId>("\"\"").is_err());
        let id: StreamId = serde_json::from_str("\"s-1\"").unwrap();
        assert_eq!(id.as_str(), "s-1");
    }

    #[test]
    fn registration_id_displays_raw_value() {
        assert_eq!(RegistrationId::new(7).to_string(), "7");
        assert_eq!(RegistrationId::new(7).as_u64(), 7);
    }
}

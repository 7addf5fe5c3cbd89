//! Opaque identity newtypes.
//!
//! Every identity on the wire is a plain JSON string. They are kept as distinct
//! types so a context can never be passed where an action UUID is expected.
//! The empty value stands for "absent" in routing headers.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id! {
    /// Identity the host assigns to the running plugin process.
    PluginUuid
}

string_id! {
    /// Author-assigned identity of one action type, unique within a plugin.
    ActionUuid
}

string_id! {
    /// Host-assigned identity of one placed instance of an action.
    ///
    /// Stable for the lifetime of the placement.
    EventContext
}

/// Plugin-scoped commands (global settings) are addressed to the plugin itself.
impl From<&PluginUuid> for EventContext {
    fn from(uuid: &PluginUuid) -> Self {
        Self(uuid.0.clone())
    }
}

string_id! {
    /// Identity of a physical or virtual control surface.
    DeviceUuid
}

string_id! {
    /// Name of an event, e.g. `keyDown` or `setTitle`.
    EventName
}

string_id! {
    /// Human readable device name reported on connect.
    DeviceName
}

string_id! {
    /// Name of a host profile, used by `switchToProfile`.
    ProfileName
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let ctx = EventContext::from("ctx-1");
        assert_eq!(serde_json::to_string(&ctx).unwrap(), "\"ctx-1\"");

        let back: EventContext = serde_json::from_str("\"ctx-1\"").unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(ActionUuid::default().is_empty());
        assert!(!ActionUuid::from("a1").is_empty());
    }

    #[test]
    fn test_display_and_str_comparison() {
        let uuid = ActionUuid::new("dev.keydeck.counter");
        assert_eq!(uuid.to_string(), "dev.keydeck.counter");
        assert_eq!(uuid, "dev.keydeck.counter");
        assert_eq!(uuid.as_str(), "dev.keydeck.counter");
    }
}

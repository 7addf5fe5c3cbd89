//! Payloads of outbound commands.
//!
//! Addressing (`context`, `action`, `device`) is added by the publisher that
//! sends them, never by the caller.

use serde::{Deserialize, Serialize};

use crate::common::Target;
use crate::ids::ProfileName;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTitlePayload {
    pub title: String,
    #[serde(default)]
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<u32>,
}

impl SetTitlePayload {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn for_state(mut self, state: u32) -> Self {
        self.state = Some(state);
        self
    }
}

/// `image` is a data URL (`data:image/png;base64,...` or an SVG data URL).
/// An empty string restores the image from the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetImagePayload {
    pub image: String,
    #[serde(default)]
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<u32>,
}

impl SetImagePayload {
    #[must_use]
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn for_state(mut self, state: u32) -> Self {
        self.state = Some(state);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetStatePayload {
    pub state: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchToProfilePayload {
    pub profile: ProfileName,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessagePayload {
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenUrlPayload {
    pub url: String,
}

/// First message on a new connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub event: crate::ids::EventName,
    pub uuid: crate::ids::PluginUuid,
}

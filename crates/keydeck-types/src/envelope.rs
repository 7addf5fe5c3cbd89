//! The wire envelope and the tables of known event names.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ids::{ActionUuid, DeviceUuid, EventContext, EventName};

/// The object wrapping every inbound or outbound event.
///
/// Only `event` is always present. `action` appears on action-scoped events,
/// `context` on instance-scoped ones. `payload` depends on `event`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: EventName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionUuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<EventContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceUuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    #[must_use]
    pub fn new(event: impl Into<EventName>) -> Self {
        Self {
            event: event.into(),
            ..Self::default()
        }
    }

    /// Address the envelope. Plugin-scoped commands pass the plugin UUID.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<EventContext>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: ActionUuid) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn with_device(mut self, device: DeviceUuid) -> Self {
        self.device = Some(device);
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Deserialize a field that may be null or missing (both become the default)
fn deserialize_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let opt: Option<T> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Routing fields of an envelope, parsed without touching the payload.
///
/// Absent (or null) `action` and `context` decode as empty identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EnvelopeHeader {
    pub event: EventName,
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub action: ActionUuid,
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub context: EventContext,
}

impl EnvelopeHeader {
    #[must_use]
    pub fn new(
        event: impl Into<EventName>,
        action: impl Into<ActionUuid>,
        context: impl Into<EventContext>,
    ) -> Self {
        Self {
            event: event.into(),
            action: action.into(),
            context: context.into(),
        }
    }
}

/// Events the host sends to the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundEvent {
    DidReceiveSettings,
    DidReceiveGlobalSettings,
    KeyDown,
    KeyUp,
    WillAppear,
    WillDisappear,
    DeviceDidConnect,
    DeviceDidDisconnect,
    ApplicationDidLaunch,
    ApplicationDidTerminate,
    SystemDidWakeUp,
    TitleParametersDidChange,
    PropertyInspectorDidAppear,
    PropertyInspectorDidDisappear,
    SendToPlugin,
}

impl InboundEvent {
    pub const ALL: [InboundEvent; 15] = [
        InboundEvent::DidReceiveSettings,
        InboundEvent::DidReceiveGlobalSettings,
        InboundEvent::KeyDown,
        InboundEvent::KeyUp,
        InboundEvent::WillAppear,
        InboundEvent::WillDisappear,
        InboundEvent::DeviceDidConnect,
        InboundEvent::DeviceDidDisconnect,
        InboundEvent::ApplicationDidLaunch,
        InboundEvent::ApplicationDidTerminate,
        InboundEvent::SystemDidWakeUp,
        InboundEvent::TitleParametersDidChange,
        InboundEvent::PropertyInspectorDidAppear,
        InboundEvent::PropertyInspectorDidDisappear,
        InboundEvent::SendToPlugin,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InboundEvent::DidReceiveSettings => "didReceiveSettings",
            InboundEvent::DidReceiveGlobalSettings => "didReceiveGlobalSettings",
            InboundEvent::KeyDown => "keyDown",
            InboundEvent::KeyUp => "keyUp",
            InboundEvent::WillAppear => "willAppear",
            InboundEvent::WillDisappear => "willDisappear",
            InboundEvent::DeviceDidConnect => "deviceDidConnect",
            InboundEvent::DeviceDidDisconnect => "deviceDidDisconnect",
            InboundEvent::ApplicationDidLaunch => "applicationDidLaunch",
            InboundEvent::ApplicationDidTerminate => "applicationDidTerminate",
            InboundEvent::SystemDidWakeUp => "systemDidWakeUp",
            InboundEvent::TitleParametersDidChange => "titleParametersDidChange",
            InboundEvent::PropertyInspectorDidAppear => "propertyInspectorDidAppear",
            InboundEvent::PropertyInspectorDidDisappear => "propertyInspectorDidDisappear",
            InboundEvent::SendToPlugin => "sendToPlugin",
        }
    }

    /// Look up a known inbound event by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.as_str() == name)
    }
}

impl std::fmt::Display for InboundEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands the plugin sends to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboundEvent {
    GetGlobalSettings,
    GetSettings,
    SetGlobalSettings,
    SetSettings,
    SetTitle,
    SetImage,
    SetState,
    ShowAlert,
    ShowOk,
    SwitchToProfile,
    LogMessage,
    OpenUrl,
    SendToPropertyInspector,
}

impl OutboundEvent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OutboundEvent::GetGlobalSettings => "getGlobalSettings",
            OutboundEvent::GetSettings => "getSettings",
            OutboundEvent::SetGlobalSettings => "setGlobalSettings",
            OutboundEvent::SetSettings => "setSettings",
            OutboundEvent::SetTitle => "setTitle",
            OutboundEvent::SetImage => "setImage",
            OutboundEvent::SetState => "setState",
            OutboundEvent::ShowAlert => "showAlert",
            OutboundEvent::ShowOk => "showOk",
            OutboundEvent::SwitchToProfile => "switchToProfile",
            OutboundEvent::LogMessage => "logMessage",
            OutboundEvent::OpenUrl => "openUrl",
            OutboundEvent::SendToPropertyInspector => "sendToPropertyInspector",
        }
    }
}

impl std::fmt::Display for OutboundEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OutboundEvent> for EventName {
    fn from(event: OutboundEvent) -> Self {
        EventName::from(event.as_str())
    }
}

impl From<InboundEvent> for EventName {
    fn from(event: InboundEvent) -> Self {
        EventName::from(event.as_str())
    }
}

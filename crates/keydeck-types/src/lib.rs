//! Shared wire types for keydeck plugin components.
//!
//! This crate provides the identities, the envelope every message travels in,
//! the typed inbound events and the outbound command payloads. It carries no
//! behaviour; routing and publishing live in `keydeck-core`.

pub mod common;
pub mod envelope;
pub mod ids;
pub mod received;
pub mod sent;

pub use common::{
    Coordinates, DeviceInfo, DeviceSize, DeviceType, Target, TitleParameters, VerticalAlignment,
};
pub use envelope::{Envelope, EnvelopeHeader, InboundEvent, OutboundEvent};
pub use ids::{ActionUuid, DeviceName, DeviceUuid, EventContext, EventName, PluginUuid, ProfileName};
pub use received::{
    AppearancePayload, ApplicationDidLaunch, ApplicationDidTerminate, ApplicationPayload,
    DeviceDidConnect, DeviceDidDisconnect, DidReceiveGlobalSettings, DidReceiveSettings,
    GlobalSettingsPayload, KeyDown, KeyPayload, KeyUp, PropertyInspectorDidAppear,
    PropertyInspectorDidDisappear, SendToPlugin, SettingsPayload, SystemDidWakeUp,
    TitleParametersDidChange, TitleParametersPayload, WillAppear, WillDisappear,
};
pub use sent::{
    LogMessagePayload, OpenUrlPayload, Registration, SetImagePayload, SetStatePayload,
    SetTitlePayload, SwitchToProfilePayload,
};

//! Typed inbound events.
//!
//! Each struct is the full envelope for one event kind, so it can be decoded
//! straight from the raw message once the dispatcher knows a handler wants it.
//! `event` itself is not repeated; the dispatcher already routed on it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Coordinates, DeviceInfo, TitleParameters};
use crate::ids::{ActionUuid, DeviceUuid, EventContext};

/// Payload shared by `keyDown` and `keyUp`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyPayload {
    pub settings: Value,
    pub coordinates: Coordinates,
    pub state: u32,
    pub user_desired_state: u32,
    pub is_in_multi_action: bool,
}

/// Payload shared by `willAppear` and `willDisappear`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppearancePayload {
    pub settings: Value,
    pub coordinates: Coordinates,
    pub state: u32,
    pub is_in_multi_action: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPayload {
    pub settings: Value,
    pub coordinates: Coordinates,
    pub is_in_multi_action: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettingsPayload {
    pub settings: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleParametersPayload {
    pub coordinates: Coordinates,
    pub settings: Value,
    pub state: u32,
    pub title: String,
    pub title_parameters: TitleParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationPayload {
    pub application: String,
}

// Fields every instance-scoped event carries. Routing fields missing from a
// broadcast decode as empty, the same as in the header.
macro_rules! instance_event {
    ($(#[$meta:meta])* $name:ident, $payload:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            #[serde(default)]
            pub action: ActionUuid,
            #[serde(default)]
            pub context: EventContext,
            #[serde(default)]
            pub device: DeviceUuid,
            #[serde(default)]
            pub payload: $payload,
        }
    };
}

instance_event! {
    /// A key was pressed.
    KeyDown, KeyPayload
}

instance_event! {
    /// A key was released.
    KeyUp, KeyPayload
}

instance_event! {
    /// An instance became visible, either on plugin start or when its page was shown.
    WillAppear, AppearancePayload
}

instance_event! {
    /// An instance is about to be hidden or removed.
    WillDisappear, AppearancePayload
}

instance_event! {
    /// Reply to `getSettings`, or the property inspector changed settings.
    DidReceiveSettings, SettingsPayload
}

instance_event! {
    TitleParametersDidChange, TitleParametersPayload
}

/// Reply to `getGlobalSettings`, or global settings changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DidReceiveGlobalSettings {
    #[serde(default)]
    pub payload: GlobalSettingsPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDidConnect {
    #[serde(default)]
    pub device: DeviceUuid,
    #[serde(default)]
    pub device_info: DeviceInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDidDisconnect {
    #[serde(default)]
    pub device: DeviceUuid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDidLaunch {
    #[serde(default)]
    pub payload: ApplicationPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDidTerminate {
    #[serde(default)]
    pub payload: ApplicationPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDidWakeUp {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInspectorDidAppear {
    #[serde(default)]
    pub action: ActionUuid,
    #[serde(default)]
    pub context: EventContext,
    #[serde(default)]
    pub device: DeviceUuid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInspectorDidDisappear {
    #[serde(default)]
    pub action: ActionUuid,
    #[serde(default)]
    pub context: EventContext,
    #[serde(default)]
    pub device: DeviceUuid,
}

/// Free-form message from the property inspector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendToPlugin {
    #[serde(default)]
    pub action: ActionUuid,
    #[serde(default)]
    pub context: EventContext,
    #[serde(default)]
    pub payload: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_down_full() {
        let raw = r#"{
            "event": "keyDown",
            "action": "dev.keydeck.counter",
            "context": "c1",
            "device": "d1",
            "payload": {
                "settings": {"count": 3},
                "coordinates": {"column": 2, "row": 1},
                "state": 1,
                "userDesiredState": 0,
                "isInMultiAction": false
            }
        }"#;
        let event: KeyDown = serde_json::from_str(raw).unwrap();
        assert_eq!(event.action, "dev.keydeck.counter");
        assert_eq!(event.context, "c1");
        assert_eq!(event.device, "d1");
        assert_eq!(event.payload.settings, json!({"count": 3}));
        assert_eq!(event.payload.coordinates, Coordinates { column: 2, row: 1 });
        assert_eq!(event.payload.state, 1);
    }

    #[test]
    fn test_will_appear_without_payload() {
        let event: WillAppear =
            serde_json::from_str(r#"{"event":"willAppear","action":"a1","context":"c1"}"#)
                .unwrap();
        assert!(event.payload.settings.is_null());
        assert!(event.device.is_empty());
    }

    #[test]
    fn test_instance_event_without_routing_fields() {
        let event: KeyUp = serde_json::from_str(r#"{"event":"keyUp","action":"a1"}"#).unwrap();
        assert_eq!(event.action, "a1");
        assert!(event.context.is_empty());

        let event: SendToPlugin = serde_json::from_str(r#"{"event":"sendToPlugin"}"#).unwrap();
        assert!(event.action.is_empty());
        assert!(event.context.is_empty());
        assert!(event.payload.is_null());
    }

    #[test]
    fn test_global_settings_payload() {
        let event: DidReceiveGlobalSettings = serde_json::from_str(
            r#"{"event":"didReceiveGlobalSettings","payload":{"settings":{"theme":"dark"}}}"#,
        )
        .unwrap();
        assert_eq!(event.payload.settings, json!({"theme": "dark"}));
    }

    #[test]
    fn test_device_did_connect() {
        let event: DeviceDidConnect = serde_json::from_str(
            r#"{"event":"deviceDidConnect","device":"d1","deviceInfo":{"type":1,"size":{"columns":3,"rows":2},"name":"Mini"}}"#,
        )
        .unwrap();
        assert_eq!(event.device, "d1");
        assert_eq!(event.device_info.size.columns, 3);
    }

    #[test]
    fn test_title_parameters_did_change() {
        let event: TitleParametersDidChange = serde_json::from_str(
            r#"{"event":"titleParametersDidChange","action":"a1","context":"c1","device":"d1",
                "payload":{"title":"Hi","state":0,"titleParameters":{"fontSize":9,"showTitle":true}}}"#,
        )
        .unwrap();
        assert_eq!(event.payload.title, "Hi");
        assert_eq!(event.payload.title_parameters.font_size, 9);
        assert!(event.payload.title_parameters.show_title);
    }

    #[test]
    fn test_send_to_plugin_keeps_opaque_payload() {
        let event: SendToPlugin = serde_json::from_str(
            r#"{"event":"sendToPlugin","action":"a1","context":"c1","payload":{"refresh":true}}"#,
        )
        .unwrap();
        assert_eq!(event.payload, json!({"refresh": true}));
    }
}

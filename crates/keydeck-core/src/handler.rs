//! Handler capabilities and the action instance contract.
//!
//! An instance declares which events it cares about by overriding the matching
//! accessor on [`ActionInstance`] to return `Some(self)`. The dispatcher only
//! decodes a payload when the accessor says the capability is there.
//!
//! ```
//! use keydeck_core::{ActionInstance, KeyDown, KeyDownHandler};
//!
//! struct Beeper;
//!
//! impl KeyDownHandler for Beeper {
//!     fn handle_key_down(&mut self, _event: KeyDown) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! impl ActionInstance for Beeper {
//!     fn key_down(&mut self) -> Option<&mut dyn KeyDownHandler> {
//!         Some(self)
//!     }
//! }
//! ```

use keydeck_types::{
    ApplicationDidLaunch, ApplicationDidTerminate, DeviceDidConnect, DeviceDidDisconnect,
    DidReceiveGlobalSettings, DidReceiveSettings, EnvelopeHeader, KeyDown, KeyUp,
    PropertyInspectorDidAppear, PropertyInspectorDidDisappear, SendToPlugin, SystemDidWakeUp,
    TitleParametersDidChange, WillAppear, WillDisappear,
};

macro_rules! handler_trait {
    ($(#[$meta:meta])* $trait_name:ident, $method:ident, $event:ty) => {
        $(#[$meta])*
        pub trait $trait_name {
            /// # Errors
            ///
            /// Any error is reported to the dispatch caller with the event's
            /// routing identity attached.
            fn $method(&mut self, event: $event) -> anyhow::Result<()>;
        }
    };
}

handler_trait!(DidReceiveSettingsHandler, handle_did_receive_settings, DidReceiveSettings);
handler_trait!(
    DidReceiveGlobalSettingsHandler,
    handle_did_receive_global_settings,
    DidReceiveGlobalSettings
);
handler_trait!(KeyDownHandler, handle_key_down, KeyDown);
handler_trait!(KeyUpHandler, handle_key_up, KeyUp);
handler_trait!(
    /// Called for the placement's first appearance too, after lazy creation.
    WillAppearHandler,
    handle_will_appear,
    WillAppear
);
handler_trait!(WillDisappearHandler, handle_will_disappear, WillDisappear);
handler_trait!(DeviceDidConnectHandler, handle_device_did_connect, DeviceDidConnect);
handler_trait!(
    DeviceDidDisconnectHandler,
    handle_device_did_disconnect,
    DeviceDidDisconnect
);
handler_trait!(
    ApplicationDidLaunchHandler,
    handle_application_did_launch,
    ApplicationDidLaunch
);
handler_trait!(
    ApplicationDidTerminateHandler,
    handle_application_did_terminate,
    ApplicationDidTerminate
);
handler_trait!(SystemDidWakeUpHandler, handle_system_did_wake_up, SystemDidWakeUp);
handler_trait!(
    TitleParametersDidChangeHandler,
    handle_title_parameters_did_change,
    TitleParametersDidChange
);
handler_trait!(
    PropertyInspectorDidAppearHandler,
    handle_property_inspector_did_appear,
    PropertyInspectorDidAppear
);
handler_trait!(
    PropertyInspectorDidDisappearHandler,
    handle_property_inspector_did_disappear,
    PropertyInspectorDidDisappear
);
handler_trait!(SendToPluginHandler, handle_send_to_plugin, SendToPlugin);

/// Fallback for events with no typed handler: unknown event names, and known
/// ones whose capability the instance does not declare.
pub trait RawEventHandler {
    /// # Errors
    ///
    /// Reported like a typed handler failure.
    fn handle_raw_event(&mut self, header: &EnvelopeHeader, raw: &str) -> anyhow::Result<()>;
}

/// One placed instance of an action.
///
/// Every accessor defaults to `None`. An instance owns its state and is only
/// ever driven by one dispatch at a time.
pub trait ActionInstance: Send {
    fn did_receive_settings(&mut self) -> Option<&mut dyn DidReceiveSettingsHandler> {
        None
    }

    fn did_receive_global_settings(&mut self) -> Option<&mut dyn DidReceiveGlobalSettingsHandler> {
        None
    }

    fn key_down(&mut self) -> Option<&mut dyn KeyDownHandler> {
        None
    }

    fn key_up(&mut self) -> Option<&mut dyn KeyUpHandler> {
        None
    }

    fn will_appear(&mut self) -> Option<&mut dyn WillAppearHandler> {
        None
    }

    fn will_disappear(&mut self) -> Option<&mut dyn WillDisappearHandler> {
        None
    }

    fn device_did_connect(&mut self) -> Option<&mut dyn DeviceDidConnectHandler> {
        None
    }

    fn device_did_disconnect(&mut self) -> Option<&mut dyn DeviceDidDisconnectHandler> {
        None
    }

    fn application_did_launch(&mut self) -> Option<&mut dyn ApplicationDidLaunchHandler> {
        None
    }

    fn application_did_terminate(&mut self) -> Option<&mut dyn ApplicationDidTerminateHandler> {
        None
    }

    fn system_did_wake_up(&mut self) -> Option<&mut dyn SystemDidWakeUpHandler> {
        None
    }

    fn title_parameters_did_change(
        &mut self,
    ) -> Option<&mut dyn TitleParametersDidChangeHandler> {
        None
    }

    fn property_inspector_did_appear(
        &mut self,
    ) -> Option<&mut dyn PropertyInspectorDidAppearHandler> {
        None
    }

    fn property_inspector_did_disappear(
        &mut self,
    ) -> Option<&mut dyn PropertyInspectorDidDisappearHandler> {
        None
    }

    fn send_to_plugin(&mut self) -> Option<&mut dyn SendToPluginHandler> {
        None
    }

    fn raw_events(&mut self) -> Option<&mut dyn RawEventHandler> {
        None
    }
}

//! Outbound command publishing.
//!
//! Three layers, each adding identity to the one below:
//!
//! - [`CorePublisher`] writes fully addressed envelopes to the sink, one at a time.
//! - [`ActionPublisher`] knows the plugin and the action, and takes the target
//!   context per call.
//! - [`ActionInstancePublisher`] is bound to one context. It is the only
//!   publisher an instance gets, so an instance cannot address another one.
//!
//! Every call produces exactly one outbound message. Nothing is cached.

use std::sync::{Arc, Mutex};

use keydeck_types::{
    ActionUuid, DeviceUuid, Envelope, EventContext, LogMessagePayload, OpenUrlPayload,
    OutboundEvent, PluginUuid, ProfileName, Registration, SetImagePayload, SetStatePayload,
    SetTitlePayload, SwitchToProfilePayload,
};
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::error::PublishError;
use crate::sink::EventSink;

pub type PublishResult = Result<(), PublishError>;

/// Shared handle over the connection's sink. Clones write to the same sink.
#[derive(Clone)]
pub struct CorePublisher {
    sink: Arc<Mutex<Box<dyn EventSink>>>,
}

impl std::fmt::Debug for CorePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorePublisher").finish_non_exhaustive()
    }
}

impl CorePublisher {
    #[must_use]
    pub fn new(sink: impl EventSink + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Serialize and write one envelope.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Serialize` if the envelope cannot be encoded,
    /// otherwise whatever the sink reports.
    pub fn publish(&self, envelope: &Envelope) -> PublishResult {
        let raw = serde_json::to_string(envelope).map_err(|source| PublishError::Serialize {
            event: envelope.event.clone(),
            source,
        })?;
        trace!(event = %envelope.event, "Publishing");
        self.publish_raw(raw)
    }

    /// Write an already serialized message.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Poisoned` if a previous writer panicked, or the
    /// sink's own error.
    pub fn publish_raw(&self, raw: String) -> PublishResult {
        let mut sink = self.sink.lock().map_err(|_| PublishError::Poisoned)?;
        sink.write(raw)
    }

    /// Send the registration handshake. Must be the first message written.
    ///
    /// # Errors
    ///
    /// Same as [`CorePublisher::publish`].
    pub fn register(&self, registration: &Registration) -> PublishResult {
        let raw = serde_json::to_string(registration).map_err(|source| {
            PublishError::Serialize {
                event: registration.event.clone(),
                source,
            }
        })?;
        self.publish_raw(raw)
    }
}

fn encode(event: OutboundEvent, payload: &impl Serialize) -> Result<Value, PublishError> {
    serde_json::to_value(payload).map_err(|source| PublishError::Serialize {
        event: event.into(),
        source,
    })
}

/// Publishes on behalf of one action, to any of its contexts.
#[derive(Debug, Clone)]
pub struct ActionPublisher {
    plugin_uuid: PluginUuid,
    action_uuid: ActionUuid,
    core: CorePublisher,
}

impl ActionPublisher {
    #[must_use]
    pub fn new(plugin_uuid: PluginUuid, action_uuid: ActionUuid, core: CorePublisher) -> Self {
        Self {
            plugin_uuid,
            action_uuid,
            core,
        }
    }

    #[must_use]
    pub fn plugin_uuid(&self) -> &PluginUuid {
        &self.plugin_uuid
    }

    #[must_use]
    pub fn action_uuid(&self) -> &ActionUuid {
        &self.action_uuid
    }

    /// Narrow to a single context.
    #[must_use]
    pub fn for_context(&self, context: EventContext) -> ActionInstancePublisher {
        ActionInstancePublisher {
            context,
            action: self.clone(),
        }
    }

    fn addressed(&self, event: OutboundEvent, context: &EventContext) -> Envelope {
        Envelope::new(event)
            .with_context(context.clone())
            .with_action(self.action_uuid.clone())
    }

    fn send(&self, envelope: &Envelope) -> PublishResult {
        self.core.publish(envelope)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn get_settings(&self, context: &EventContext) -> PublishResult {
        self.send(&self.addressed(OutboundEvent::GetSettings, context))
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn set_settings(&self, context: &EventContext, settings: Value) -> PublishResult {
        self.send(
            &self
                .addressed(OutboundEvent::SetSettings, context)
                .with_payload(settings),
        )
    }

    /// Global settings are addressed to the plugin, not to a placement.
    ///
    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn get_global_settings(&self) -> PublishResult {
        self.send(&Envelope::new(OutboundEvent::GetGlobalSettings).with_context(&self.plugin_uuid))
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn set_global_settings(&self, settings: Value) -> PublishResult {
        self.send(
            &Envelope::new(OutboundEvent::SetGlobalSettings)
                .with_context(&self.plugin_uuid)
                .with_payload(settings),
        )
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn set_title(&self, context: &EventContext, payload: &SetTitlePayload) -> PublishResult {
        let payload = encode(OutboundEvent::SetTitle, payload)?;
        self.send(
            &self
                .addressed(OutboundEvent::SetTitle, context)
                .with_payload(payload),
        )
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn set_image(&self, context: &EventContext, payload: &SetImagePayload) -> PublishResult {
        let payload = encode(OutboundEvent::SetImage, payload)?;
        self.send(
            &self
                .addressed(OutboundEvent::SetImage, context)
                .with_payload(payload),
        )
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn set_state(&self, context: &EventContext, state: u32) -> PublishResult {
        let payload = encode(OutboundEvent::SetState, &SetStatePayload { state })?;
        self.send(
            &self
                .addressed(OutboundEvent::SetState, context)
                .with_payload(payload),
        )
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn show_alert(&self, context: &EventContext) -> PublishResult {
        self.send(&self.addressed(OutboundEvent::ShowAlert, context))
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn show_ok(&self, context: &EventContext) -> PublishResult {
        self.send(&self.addressed(OutboundEvent::ShowOk, context))
    }

    /// Switch `device` to `profile`. An empty profile returns to the previous one.
    ///
    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn switch_to_profile(
        &self,
        context: &EventContext,
        device: DeviceUuid,
        profile: ProfileName,
    ) -> PublishResult {
        let payload = encode(
            OutboundEvent::SwitchToProfile,
            &SwitchToProfilePayload { profile },
        )?;
        self.send(
            &self
                .addressed(OutboundEvent::SwitchToProfile, context)
                .with_device(device)
                .with_payload(payload),
        )
    }

    /// Write a line to the host's plugin log.
    ///
    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn log_message(&self, message: impl Into<String>) -> PublishResult {
        let payload = encode(
            OutboundEvent::LogMessage,
            &LogMessagePayload {
                message: message.into(),
            },
        )?;
        self.send(&Envelope::new(OutboundEvent::LogMessage).with_payload(payload))
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn open_url(&self, url: impl Into<String>) -> PublishResult {
        let payload = encode(OutboundEvent::OpenUrl, &OpenUrlPayload { url: url.into() })?;
        self.send(&Envelope::new(OutboundEvent::OpenUrl).with_payload(payload))
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn send_to_property_inspector(
        &self,
        context: &EventContext,
        payload: Value,
    ) -> PublishResult {
        self.send(
            &self
                .addressed(OutboundEvent::SendToPropertyInspector, context)
                .with_payload(payload),
        )
    }
}

/// Publishes on behalf of one placed instance.
///
/// Cheap to clone; an instance can hand a clone to its own background task.
#[derive(Debug, Clone)]
pub struct ActionInstancePublisher {
    context: EventContext,
    action: ActionPublisher,
}

impl ActionInstancePublisher {
    #[must_use]
    pub fn context(&self) -> &EventContext {
        &self.context
    }

    #[must_use]
    pub fn action_uuid(&self) -> &ActionUuid {
        self.action.action_uuid()
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn get_settings(&self) -> PublishResult {
        self.action.get_settings(&self.context)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn set_settings(&self, settings: Value) -> PublishResult {
        self.action.set_settings(&self.context, settings)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn get_global_settings(&self) -> PublishResult {
        self.action.get_global_settings()
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn set_global_settings(&self, settings: Value) -> PublishResult {
        self.action.set_global_settings(settings)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn set_title(&self, payload: &SetTitlePayload) -> PublishResult {
        self.action.set_title(&self.context, payload)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn set_image(&self, payload: &SetImagePayload) -> PublishResult {
        self.action.set_image(&self.context, payload)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn set_state(&self, state: u32) -> PublishResult {
        self.action.set_state(&self.context, state)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn show_alert(&self) -> PublishResult {
        self.action.show_alert(&self.context)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn show_ok(&self) -> PublishResult {
        self.action.show_ok(&self.context)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn switch_to_profile(&self, device: DeviceUuid, profile: ProfileName) -> PublishResult {
        self.action.switch_to_profile(&self.context, device, profile)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn log_message(&self, message: impl Into<String>) -> PublishResult {
        self.action.log_message(message)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn open_url(&self, url: impl Into<String>) -> PublishResult {
        self.action.open_url(url)
    }

    /// # Errors
    ///
    /// Any [`PublishError`] from the core publisher.
    pub fn send_to_property_inspector(&self, payload: Value) -> PublishResult {
        self.action.send_to_property_inspector(&self.context, payload)
    }
}

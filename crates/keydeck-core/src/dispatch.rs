//! Capability-checked delivery of one envelope to one instance.

use keydeck_types::{EnvelopeHeader, InboundEvent};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{DecodeError, DispatchError, Result};
use crate::handler::ActionInstance;

/// Deliver `raw` to `target`.
///
/// A known event goes to its typed handler when `target` declares the
/// capability; the payload is decoded only in that case. Anything else falls
/// back to the raw handler, and is dropped when there is none.
///
/// # Errors
///
/// Returns `DispatchError::Decode` if the typed payload does not parse and
/// `DispatchError::Handler` if the handler fails.
pub fn invoke(target: &mut dyn ActionInstance, header: &EnvelopeHeader, raw: &str) -> Result<()> {
    let delivered = match InboundEvent::from_name(header.event.as_str()) {
        Some(InboundEvent::DidReceiveSettings) => {
            deliver(target.did_receive_settings(), header, raw, |h, event| {
                h.handle_did_receive_settings(event)
            })
        }
        Some(InboundEvent::DidReceiveGlobalSettings) => {
            deliver(target.did_receive_global_settings(), header, raw, |h, event| {
                h.handle_did_receive_global_settings(event)
            })
        }
        Some(InboundEvent::KeyDown) => deliver(target.key_down(), header, raw, |h, event| {
            h.handle_key_down(event)
        }),
        Some(InboundEvent::KeyUp) => {
            deliver(target.key_up(), header, raw, |h, event| h.handle_key_up(event))
        }
        Some(InboundEvent::WillAppear) => deliver(target.will_appear(), header, raw, |h, event| {
            h.handle_will_appear(event)
        }),
        Some(InboundEvent::WillDisappear) => {
            deliver(target.will_disappear(), header, raw, |h, event| {
                h.handle_will_disappear(event)
            })
        }
        Some(InboundEvent::DeviceDidConnect) => {
            deliver(target.device_did_connect(), header, raw, |h, event| {
                h.handle_device_did_connect(event)
            })
        }
        Some(InboundEvent::DeviceDidDisconnect) => {
            deliver(target.device_did_disconnect(), header, raw, |h, event| {
                h.handle_device_did_disconnect(event)
            })
        }
        Some(InboundEvent::ApplicationDidLaunch) => {
            deliver(target.application_did_launch(), header, raw, |h, event| {
                h.handle_application_did_launch(event)
            })
        }
        Some(InboundEvent::ApplicationDidTerminate) => {
            deliver(target.application_did_terminate(), header, raw, |h, event| {
                h.handle_application_did_terminate(event)
            })
        }
        Some(InboundEvent::SystemDidWakeUp) => {
            deliver(target.system_did_wake_up(), header, raw, |h, event| {
                h.handle_system_did_wake_up(event)
            })
        }
        Some(InboundEvent::TitleParametersDidChange) => {
            deliver(target.title_parameters_did_change(), header, raw, |h, event| {
                h.handle_title_parameters_did_change(event)
            })
        }
        Some(InboundEvent::PropertyInspectorDidAppear) => {
            deliver(target.property_inspector_did_appear(), header, raw, |h, event| {
                h.handle_property_inspector_did_appear(event)
            })
        }
        Some(InboundEvent::PropertyInspectorDidDisappear) => {
            deliver(target.property_inspector_did_disappear(), header, raw, |h, event| {
                h.handle_property_inspector_did_disappear(event)
            })
        }
        Some(InboundEvent::SendToPlugin) => {
            deliver(target.send_to_plugin(), header, raw, |h, event| {
                h.handle_send_to_plugin(event)
            })
        }
        None => None,
    };

    if let Some(result) = delivered {
        return result;
    }

    match target.raw_events() {
        Some(handler) => {
            trace!(event = %header.event, context = %header.context, "Delivering raw event");
            handler
                .handle_raw_event(header, raw)
                .map_err(|source| handler_error(header, source))
        }
        None => {
            trace!(event = %header.event, context = %header.context, "No handler, dropping");
            Ok(())
        }
    }
}

/// Decode and call when the capability is present. `None` means fall back.
fn deliver<H, E>(
    handler: Option<&mut H>,
    header: &EnvelopeHeader,
    raw: &str,
    call: impl FnOnce(&mut H, E) -> anyhow::Result<()>,
) -> Option<Result<()>>
where
    H: ?Sized,
    E: DeserializeOwned,
{
    let handler = handler?;
    trace!(event = %header.event, context = %header.context, "Delivering typed event");
    let outcome = decode_payload::<E>(header, raw)
        .and_then(|event| call(handler, event).map_err(|source| handler_error(header, source)));
    Some(outcome)
}

fn decode_payload<E: DeserializeOwned>(header: &EnvelopeHeader, raw: &str) -> Result<E> {
    serde_json::from_str(raw).map_err(|source| {
        DispatchError::from(DecodeError::Payload {
            event: header.event.clone(),
            context: header.context.clone(),
            source,
        })
    })
}

fn handler_error(header: &EnvelopeHeader, source: anyhow::Error) -> DispatchError {
    DispatchError::Handler {
        event: header.event.clone(),
        action: header.action.clone(),
        context: header.context.clone(),
        source,
    }
}

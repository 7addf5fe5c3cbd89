//! Error types for event dispatch, registration and publishing.

use keydeck_types::{ActionUuid, EventContext, EventName};

/// A message or payload that could not be decoded.
///
/// Reported for the one message only; the receive loop carries on.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("Malformed {event} payload (context '{context}'): {source}")]
    Payload {
        event: EventName,
        context: EventContext,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by `Plugin::dispatch` and `Action::dispatch`.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The envelope names an action that was never registered.
    #[error("Unknown action {action} for {event} (context '{context}')")]
    UnknownAction {
        event: EventName,
        action: ActionUuid,
        context: EventContext,
    },

    /// A handler returned an error. Deliveries already made in the same
    /// broadcast are not undone.
    #[error("Handler for {event} failed (action '{action}', context '{context}'): {source}")]
    Handler {
        event: EventName,
        action: ActionUuid,
        context: EventContext,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    /// The event the failing message carried, when known.
    #[must_use]
    pub fn event(&self) -> Option<&EventName> {
        match self {
            DispatchError::Decode(DecodeError::Payload { event, .. })
            | DispatchError::UnknownAction { event, .. }
            | DispatchError::Handler { event, .. } => Some(event),
            DispatchError::Decode(DecodeError::Envelope(_)) => None,
        }
    }

    /// The context the failure belongs to, when known.
    #[must_use]
    pub fn context(&self) -> Option<&EventContext> {
        match self {
            DispatchError::Decode(DecodeError::Payload { context, .. })
            | DispatchError::UnknownAction { context, .. }
            | DispatchError::Handler { context, .. } => Some(context),
            DispatchError::Decode(DecodeError::Envelope(_)) => None,
        }
    }

    /// Fill in the identity of the instance that actually failed. A broadcast
    /// header carries an empty action or context, the instance does not.
    pub(crate) fn attributed_to(mut self, action: &ActionUuid, context: &EventContext) -> Self {
        match &mut self {
            DispatchError::Handler {
                action: failed_action,
                context: failed_context,
                ..
            } => {
                if failed_action.is_empty() {
                    *failed_action = action.clone();
                }
                if failed_context.is_empty() {
                    *failed_context = context.clone();
                }
            }
            DispatchError::Decode(DecodeError::Payload {
                context: failed_context,
                ..
            }) => {
                if failed_context.is_empty() {
                    *failed_context = context.clone();
                }
            }
            DispatchError::Decode(DecodeError::Envelope(_))
            | DispatchError::UnknownAction { .. } => {}
        }
        self
    }
}

/// Invalid plugin setup. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Duplicate action UUID: {0}")]
    DuplicateAction(ActionUuid),
}

/// Errors from the outbound publishing path.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to serialize {event}: {source}")]
    Serialize {
        event: EventName,
        #[source]
        source: serde_json::Error,
    },

    #[error("Connection closed")]
    Closed,

    #[error("Publisher lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, DispatchError>;

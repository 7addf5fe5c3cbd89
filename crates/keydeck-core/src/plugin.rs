//! The plugin: a fixed registry of actions and the top-level router.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use keydeck_types::{ActionUuid, PluginUuid};
use tracing::{debug, trace};

use crate::action::{Action, ActionDefinition};
use crate::dispatch::invoke;
use crate::error::{ConfigurationError, DispatchError, Result};
use crate::handler::ActionInstance;
use crate::header::decode_header;
use crate::publisher::CorePublisher;

#[derive(Debug)]
pub struct Plugin {
    uuid: PluginUuid,
    actions: HashMap<ActionUuid, Action>,
}

impl Plugin {
    /// Register every action up front. Nothing can be added later.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::DuplicateAction` if two definitions share
    /// a UUID.
    pub fn new(
        uuid: PluginUuid,
        core: CorePublisher,
        definitions: impl IntoIterator<Item = ActionDefinition>,
    ) -> std::result::Result<Self, ConfigurationError> {
        let mut actions = HashMap::new();
        for definition in definitions {
            match actions.entry(definition.uuid().clone()) {
                Entry::Occupied(entry) => {
                    return Err(ConfigurationError::DuplicateAction(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    debug!("Registering action: {}", definition.uuid());
                    entry.insert(Action::new(definition, uuid.clone(), core.clone()));
                }
            }
        }
        Ok(Self { uuid, actions })
    }

    #[must_use]
    pub fn plugin_uuid(&self) -> &PluginUuid {
        &self.uuid
    }

    #[must_use]
    pub fn action(&self, uuid: &ActionUuid) -> Option<&Action> {
        self.actions.get(uuid)
    }

    /// Registered action UUIDs, in no particular order.
    pub fn action_uuids(&self) -> impl Iterator<Item = &ActionUuid> {
        self.actions.keys()
    }

    /// Route one raw inbound message.
    ///
    /// Messages without an action go to every registered action (and from
    /// there to every live instance, or to the one named by the context).
    /// Messages for a known action go to that action only.
    ///
    /// # Errors
    ///
    /// - `DispatchError::Decode` if the message has no readable header, or its
    ///   payload does not fit the handler that wanted it.
    /// - `DispatchError::UnknownAction` if it names an unregistered action; no
    ///   instance is created anywhere.
    /// - `DispatchError::Handler` for the first handler that failed.
    pub fn dispatch(&mut self, raw: &str) -> Result<()> {
        let header = decode_header(raw)?;
        trace!(
            event = %header.event,
            action = %header.action,
            context = %header.context,
            "Routing"
        );

        if header.action.is_empty() {
            for action in self.actions.values_mut() {
                action.dispatch(&header, raw)?;
            }
            return Ok(());
        }

        match self.actions.get_mut(&header.action) {
            Some(action) => action.dispatch(&header, raw),
            None => Err(DispatchError::UnknownAction {
                event: header.event,
                action: header.action,
                context: header.context,
            }),
        }
    }
}

/// Deliver a raw message straight to an instance outside any plugin, e.g. an
/// instance built by hand in a test harness.
///
/// # Errors
///
/// Same as [`Plugin::dispatch`], minus `UnknownAction`.
pub fn dispatch_to(target: &mut dyn ActionInstance, raw: &str) -> Result<()> {
    let header = decode_header(raw)?;
    invoke(target, &header, raw)
}

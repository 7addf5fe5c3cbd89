//! Actions and their per-context instance tables.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use keydeck_types::{ActionUuid, EnvelopeHeader, EventContext, InboundEvent, PluginUuid};
use tracing::{debug, trace};

use crate::dispatch::invoke;
use crate::error::Result;
use crate::handler::ActionInstance;
use crate::publisher::{ActionInstancePublisher, ActionPublisher, CorePublisher};

/// Builds one instance for a newly seen context.
pub type InstanceFactory =
    Box<dyn Fn(EventContext, ActionInstancePublisher) -> Box<dyn ActionInstance> + Send>;

/// What happens to an instance once its placement goes away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstanceRetention {
    /// Keep it until the plugin exits. A placement that comes back finds its
    /// old instance.
    #[default]
    Retain,
    /// Drop it right after its `willDisappear` has been delivered.
    EvictOnDisappear,
}

/// Registration of an action type, before it is bound to a plugin.
pub struct ActionDefinition {
    uuid: ActionUuid,
    factory: InstanceFactory,
    retention: InstanceRetention,
}

impl std::fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("uuid", &self.uuid)
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

impl ActionDefinition {
    #[must_use]
    pub fn new<F>(uuid: impl Into<ActionUuid>, factory: F) -> Self
    where
        F: Fn(EventContext, ActionInstancePublisher) -> Box<dyn ActionInstance> + Send + 'static,
    {
        Self {
            uuid: uuid.into(),
            factory: Box::new(factory),
            retention: InstanceRetention::default(),
        }
    }

    #[must_use]
    pub fn with_retention(mut self, retention: InstanceRetention) -> Self {
        self.retention = retention;
        self
    }

    #[must_use]
    pub fn uuid(&self) -> &ActionUuid {
        &self.uuid
    }
}

/// One action type bound to a plugin, owning an instance per context.
pub struct Action {
    uuid: ActionUuid,
    factory: InstanceFactory,
    retention: InstanceRetention,
    publisher: ActionPublisher,
    instances: HashMap<EventContext, Box<dyn ActionInstance>>,
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("uuid", &self.uuid)
            .field("retention", &self.retention)
            .field("instances", &self.instances.len())
            .finish_non_exhaustive()
    }
}

impl Action {
    /// Bind a definition. The action's publisher is derived from the
    /// definition's own UUID.
    #[must_use]
    pub fn new(definition: ActionDefinition, plugin_uuid: PluginUuid, core: CorePublisher) -> Self {
        let ActionDefinition {
            uuid,
            factory,
            retention,
        } = definition;
        let publisher = ActionPublisher::new(plugin_uuid, uuid.clone(), core);
        Self {
            uuid,
            factory,
            retention,
            publisher,
            instances: HashMap::new(),
        }
    }

    #[must_use]
    pub fn uuid(&self) -> &ActionUuid {
        &self.uuid
    }

    #[must_use]
    pub fn retention(&self) -> InstanceRetention {
        self.retention
    }

    #[must_use]
    pub fn publisher(&self) -> &ActionPublisher {
        &self.publisher
    }

    /// Construct an instance for `context` without storing it.
    #[must_use]
    pub fn create_instance(&self, context: EventContext) -> Box<dyn ActionInstance> {
        build_instance(&self.factory, &self.publisher, context)
    }

    /// Route an envelope addressed to this action.
    ///
    /// An empty context goes to every live instance and never creates one.
    /// Otherwise the context's instance is looked up, or created on first
    /// sight, and receives the envelope once. Envelopes naming a different
    /// action are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first decode or handler error, naming this action and the
    /// failing instance's context. During a broadcast the instances already
    /// reached keep what they received and the rest are skipped.
    pub fn dispatch(&mut self, header: &EnvelopeHeader, raw: &str) -> Result<()> {
        if !header.action.is_empty() && header.action != self.uuid {
            debug!(
                action = %self.uuid,
                target = %header.action,
                event = %header.event,
                "Ignoring envelope for another action"
            );
            return Ok(());
        }

        if header.context.is_empty() {
            trace!(
                action = %self.uuid,
                event = %header.event,
                instances = self.instances.len(),
                "Broadcasting"
            );
            for (context, instance) in &mut self.instances {
                invoke(&mut **instance, header, raw)
                    .map_err(|e| e.attributed_to(&self.uuid, context))?;
            }
            return Ok(());
        }

        let instance = match self.instances.entry(header.context.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!(action = %self.uuid, context = %header.context, "Creating instance");
                entry.insert(build_instance(
                    &self.factory,
                    &self.publisher,
                    header.context.clone(),
                ))
            }
        };
        let result = invoke(&mut **instance, header, raw)
            .map_err(|e| e.attributed_to(&self.uuid, &header.context));

        if self.retention == InstanceRetention::EvictOnDisappear
            && header.event == InboundEvent::WillDisappear.as_str()
        {
            self.evict(&header.context);
        }

        result
    }

    /// Drop the instance for `context`. Returns whether there was one.
    pub fn evict(&mut self, context: &EventContext) -> bool {
        let removed = self.instances.remove(context).is_some();
        if removed {
            debug!(action = %self.uuid, context = %context, "Evicted instance");
        }
        removed
    }

    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn contains(&self, context: &EventContext) -> bool {
        self.instances.contains_key(context)
    }

    /// Contexts with a live instance, in no particular order.
    pub fn contexts(&self) -> impl Iterator<Item = &EventContext> {
        self.instances.keys()
    }
}

fn build_instance(
    factory: &InstanceFactory,
    publisher: &ActionPublisher,
    context: EventContext,
) -> Box<dyn ActionInstance> {
    let publisher = publisher.for_context(context.clone());
    factory(context, publisher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;
    use crate::handler::{WillAppearHandler, WillDisappearHandler};
    use crate::header::decode_header;
    use crate::sink::MemorySink;
    use keydeck_types::{WillAppear, WillDisappear};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        context: EventContext,
        log: Log,
        fail_disappear: bool,
    }

    impl WillAppearHandler for Recorder {
        fn handle_will_appear(&mut self, _event: WillAppear) -> anyhow::Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("appear:{}", self.context));
            Ok(())
        }
    }

    impl WillDisappearHandler for Recorder {
        fn handle_will_disappear(&mut self, _event: WillDisappear) -> anyhow::Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("disappear:{}", self.context));
            if self.fail_disappear {
                anyhow::bail!("still pressed");
            }
            Ok(())
        }
    }

    impl ActionInstance for Recorder {
        fn will_appear(&mut self) -> Option<&mut dyn WillAppearHandler> {
            Some(self)
        }

        fn will_disappear(&mut self) -> Option<&mut dyn WillDisappearHandler> {
            Some(self)
        }
    }

    fn recorder_action(retention: InstanceRetention) -> (Action, Log) {
        failing_action(retention, &[])
    }

    /// Instances for the listed contexts fail their `willDisappear`.
    fn failing_action(
        retention: InstanceRetention,
        failing: &'static [&'static str],
    ) -> (Action, Log) {
        let log = Log::default();
        let factory_log = log.clone();
        let definition = ActionDefinition::new("a1", move |context, _publisher| {
            let fail_disappear = failing.contains(&context.as_str());
            Box::new(Recorder {
                context,
                log: factory_log.clone(),
                fail_disappear,
            })
        })
        .with_retention(retention);
        let action = Action::new(
            definition,
            "plugin".into(),
            CorePublisher::new(MemorySink::new()),
        );
        (action, log)
    }

    fn send(action: &mut Action, event: &str, context: &str) -> Result<()> {
        let raw = format!(r#"{{"event":"{event}","action":"a1","context":"{context}"}}"#);
        let header = EnvelopeHeader::new(event, "a1", context);
        action.dispatch(&header, &raw)
    }

    #[test]
    fn test_publisher_identity_follows_definition() {
        let (action, _) = recorder_action(InstanceRetention::Retain);
        assert_eq!(action.uuid(), "a1");
        assert_eq!(action.publisher().action_uuid(), "a1");
        assert_eq!(action.publisher().plugin_uuid(), "plugin");
    }

    #[test]
    fn test_lazy_creation_once_per_context() {
        let (mut action, log) = recorder_action(InstanceRetention::Retain);
        send(&mut action, "willAppear", "c1").unwrap();
        send(&mut action, "willAppear", "c1").unwrap();
        send(&mut action, "willAppear", "c2").unwrap();

        assert_eq!(action.instance_count(), 2);
        assert!(action.contains(&"c1".into()));
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_create_instance_does_not_store() {
        let (action, _) = recorder_action(InstanceRetention::Retain);
        let _instance = action.create_instance("c1".into());
        assert_eq!(action.instance_count(), 0);
    }

    #[test]
    fn test_empty_context_broadcasts_without_creating() {
        let (mut action, log) = recorder_action(InstanceRetention::Retain);
        send(&mut action, "willAppear", "").unwrap();
        assert_eq!(action.instance_count(), 0);
        assert!(log.lock().unwrap().is_empty());

        send(&mut action, "willAppear", "c1").unwrap();
        send(&mut action, "willAppear", "c2").unwrap();
        log.lock().unwrap().clear();

        send(&mut action, "willDisappear", "").unwrap();
        let mut seen = log.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["disappear:c1", "disappear:c2"]);
        assert_eq!(action.instance_count(), 2);
    }

    #[test]
    fn test_other_action_is_ignored() {
        let (mut action, log) = recorder_action(InstanceRetention::Retain);
        let header = EnvelopeHeader::new("willAppear", "a2", "c1");
        action
            .dispatch(&header, r#"{"event":"willAppear","action":"a2","context":"c1"}"#)
            .unwrap();

        assert_eq!(action.instance_count(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_retain_keeps_instance_after_disappear() {
        let (mut action, _) = recorder_action(InstanceRetention::Retain);
        send(&mut action, "willAppear", "c1").unwrap();
        send(&mut action, "willDisappear", "c1").unwrap();
        assert!(action.contains(&"c1".into()));
    }

    #[test]
    fn test_evict_on_disappear() {
        let (mut action, log) = recorder_action(InstanceRetention::EvictOnDisappear);
        send(&mut action, "willAppear", "c1").unwrap();
        send(&mut action, "willAppear", "c2").unwrap();
        send(&mut action, "willDisappear", "c1").unwrap();

        assert!(!action.contains(&"c1".into()));
        assert!(action.contains(&"c2".into()));
        assert_eq!(
            log.lock().unwrap().last().map(String::as_str),
            Some("disappear:c1")
        );
    }

    #[test]
    fn test_explicit_evict() {
        let (mut action, _) = recorder_action(InstanceRetention::Retain);
        send(&mut action, "willAppear", "c1").unwrap();

        assert!(action.evict(&"c1".into()));
        assert!(!action.evict(&"c1".into()));
        assert_eq!(action.contexts().count(), 0);
    }

    fn appear_all(action: &mut Action, log: &Log) {
        for context in ["c1", "c2", "c3"] {
            send(action, "willAppear", context).unwrap();
        }
        log.lock().unwrap().clear();
    }

    #[test]
    fn test_broadcast_stops_at_first_failure() {
        let (mut action, log) =
            failing_action(InstanceRetention::Retain, &["c1", "c2", "c3"]);
        appear_all(&mut action, &log);

        let err = send(&mut action, "willDisappear", "").unwrap_err();

        let seen = log.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        match err {
            DispatchError::Handler {
                event,
                action: failed_action,
                context,
                ..
            } => {
                assert_eq!(event, "willDisappear");
                assert_eq!(failed_action, "a1");
                assert_eq!(seen[0], format!("disappear:{context}"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_broadcast_failure_keeps_earlier_deliveries() {
        let (mut action, log) = failing_action(InstanceRetention::Retain, &["c2"]);
        appear_all(&mut action, &log);

        let err = send(&mut action, "willDisappear", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Handler for willDisappear failed (action 'a1', context 'c2'): still pressed"
        );

        let seen = log.lock().unwrap().clone();
        let (last, earlier) = seen.split_last().unwrap();
        assert_eq!(last, "disappear:c2");
        assert!(
            earlier
                .iter()
                .all(|entry| entry == "disappear:c1" || entry == "disappear:c3")
        );
        assert_eq!(action.instance_count(), 3);
    }

    #[test]
    fn test_addressed_failure_names_instance() {
        let (mut action, _) = failing_action(InstanceRetention::EvictOnDisappear, &["c2"]);
        send(&mut action, "willAppear", "c2").unwrap();

        let err = send(&mut action, "willDisappear", "c2").unwrap_err();
        assert_eq!(err.context().map(EventContext::as_str), Some("c2"));
        assert!(!action.contains(&"c2".into()));
    }

    #[test]
    fn test_broadcast_without_context_key() {
        let (mut action, log) = recorder_action(InstanceRetention::Retain);
        appear_all(&mut action, &log);

        let raw = r#"{"event":"willDisappear","action":"a1"}"#;
        action.dispatch(&decode_header(raw).unwrap(), raw).unwrap();

        let mut seen = log.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["disappear:c1", "disappear:c2", "disappear:c3"]);
        assert_eq!(action.instance_count(), 3);
    }
}

//! A counter per key. The count survives restarts through the key's settings.

use keydeck_core::{
    ActionDefinition, ActionInstance, ActionInstancePublisher, DidReceiveSettings,
    DidReceiveSettingsHandler, KeyDown, KeyDownHandler, SetTitlePayload, WillAppear,
    WillAppearHandler,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const ACTION_UUID: &str = "dev.keydeck.counter";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct CounterSettings {
    #[serde(default)]
    count: u64,
}

impl CounterSettings {
    /// Missing or unreadable settings start from zero.
    fn from_value(settings: &Value) -> Self {
        Self::deserialize(settings).unwrap_or_default()
    }
}

#[must_use]
pub fn definition() -> ActionDefinition {
    ActionDefinition::new(ACTION_UUID, |_, publisher| Box::new(Counter::new(publisher)))
}

pub struct Counter {
    count: u64,
    publisher: ActionInstancePublisher,
}

impl Counter {
    fn new(publisher: ActionInstancePublisher) -> Self {
        Self {
            count: 0,
            publisher,
        }
    }

    fn show(&self) -> anyhow::Result<()> {
        self.publisher
            .set_title(&SetTitlePayload::new(self.count.to_string()))?;
        Ok(())
    }

    fn adopt(&mut self, settings: &Value) -> anyhow::Result<()> {
        self.count = CounterSettings::from_value(settings).count;
        debug!("{} now at {}", self.publisher.context(), self.count);
        self.show()
    }
}

impl WillAppearHandler for Counter {
    fn handle_will_appear(&mut self, event: WillAppear) -> anyhow::Result<()> {
        self.adopt(&event.payload.settings)
    }
}

impl DidReceiveSettingsHandler for Counter {
    fn handle_did_receive_settings(&mut self, event: DidReceiveSettings) -> anyhow::Result<()> {
        self.adopt(&event.payload.settings)
    }
}

impl KeyDownHandler for Counter {
    fn handle_key_down(&mut self, _event: KeyDown) -> anyhow::Result<()> {
        self.count = self.count.saturating_add(1);
        self.show()?;
        let settings = serde_json::to_value(CounterSettings { count: self.count })?;
        self.publisher.set_settings(settings)?;
        Ok(())
    }
}

impl ActionInstance for Counter {
    fn will_appear(&mut self) -> Option<&mut dyn WillAppearHandler> {
        Some(self)
    }

    fn did_receive_settings(&mut self) -> Option<&mut dyn DidReceiveSettingsHandler> {
        Some(self)
    }

    fn key_down(&mut self) -> Option<&mut dyn KeyDownHandler> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keydeck_core::{CorePublisher, Envelope, MemorySink, Plugin};
    use serde_json::json;

    fn plugin() -> (Plugin, MemorySink) {
        let sink = MemorySink::new();
        let plugin = Plugin::new("p1".into(), CorePublisher::new(sink.clone()), [definition()])
            .unwrap();
        (plugin, sink)
    }

    fn event(name: &str, context: &str, settings: &Value) -> String {
        json!({
            "event": name,
            "action": ACTION_UUID,
            "context": context,
            "payload": {"settings": settings}
        })
        .to_string()
    }

    fn titles(envelopes: &[Envelope]) -> Vec<String> {
        envelopes
            .iter()
            .filter(|e| e.event == "setTitle")
            .map(|e| e.payload.as_ref().unwrap()["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_settings_parse() {
        assert_eq!(CounterSettings::from_value(&json!({"count": 4})).count, 4);
        assert_eq!(CounterSettings::from_value(&Value::Null).count, 0);
        assert_eq!(CounterSettings::from_value(&json!({"count": "x"})).count, 0);
        assert_eq!(CounterSettings::from_value(&json!({})).count, 0);
    }

    #[test]
    fn test_restores_from_settings_and_counts_up() {
        let (mut plugin, sink) = plugin();
        plugin
            .dispatch(&event("willAppear", "c1", &json!({"count": 7})))
            .unwrap();
        plugin.dispatch(&event("keyDown", "c1", &json!({}))).unwrap();

        let envelopes = sink.envelopes();
        assert_eq!(titles(&envelopes), vec!["7", "8"]);

        let saved = envelopes.iter().find(|e| e.event == "setSettings").unwrap();
        assert_eq!(saved.context, Some("c1".into()));
        assert_eq!(saved.payload, Some(json!({"count": 8})));
    }

    #[test]
    fn test_counts_are_per_key() {
        let (mut plugin, sink) = plugin();
        plugin.dispatch(&event("keyDown", "c1", &Value::Null)).unwrap();
        plugin.dispatch(&event("keyDown", "c1", &Value::Null)).unwrap();
        plugin.dispatch(&event("keyDown", "c2", &Value::Null)).unwrap();

        assert_eq!(titles(&sink.envelopes()), vec!["1", "2", "1"]);
    }

    #[test]
    fn test_property_inspector_change_is_adopted() {
        let (mut plugin, sink) = plugin();
        plugin.dispatch(&event("keyDown", "c1", &Value::Null)).unwrap();
        plugin
            .dispatch(&event("didReceiveSettings", "c1", &json!({"count": 41})))
            .unwrap();
        plugin.dispatch(&event("keyDown", "c1", &Value::Null)).unwrap();

        assert_eq!(titles(&sink.envelopes()), vec!["1", "41", "42"]);
    }
}

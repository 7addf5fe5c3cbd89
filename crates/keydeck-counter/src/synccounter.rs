//! One count shared by every key showing this action.

use std::sync::{Arc, Mutex, PoisonError};

use keydeck_core::{
    ActionDefinition, ActionInstance, ActionInstancePublisher, EventContext, InstanceRetention,
    KeyDown, KeyDownHandler, SetTitlePayload, WillAppear, WillAppearHandler, WillDisappear,
    WillDisappearHandler,
};
use tracing::warn;

pub const ACTION_UUID: &str = "dev.keydeck.synccounter";

#[derive(Default)]
struct Shared {
    count: u64,
    visible: Vec<ActionInstancePublisher>,
}

impl Shared {
    fn show_all(&self) {
        let title = SetTitlePayload::new(self.count.to_string());
        for publisher in &self.visible {
            if let Err(e) = publisher.set_title(&title) {
                warn!("Failed to update {}: {}", publisher.context(), e);
            }
        }
    }
}

/// Keys are dropped when they disappear, so the shared list only holds what
/// is on screen.
#[must_use]
pub fn definition() -> ActionDefinition {
    let shared = Arc::new(Mutex::new(Shared::default()));
    ActionDefinition::new(ACTION_UUID, move |_, publisher| {
        Box::new(SyncCounter {
            publisher,
            shared: shared.clone(),
        })
    })
    .with_retention(InstanceRetention::EvictOnDisappear)
}

pub struct SyncCounter {
    publisher: ActionInstancePublisher,
    shared: Arc<Mutex<Shared>>,
}

impl SyncCounter {
    fn context(&self) -> &EventContext {
        self.publisher.context()
    }
}

impl WillAppearHandler for SyncCounter {
    fn handle_will_appear(&mut self, _event: WillAppear) -> anyhow::Result<()> {
        let mut shared = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        if !shared.visible.iter().any(|p| p.context() == self.context()) {
            shared.visible.push(self.publisher.clone());
        }
        self.publisher
            .set_title(&SetTitlePayload::new(shared.count.to_string()))?;
        Ok(())
    }
}

impl WillDisappearHandler for SyncCounter {
    fn handle_will_disappear(&mut self, _event: WillDisappear) -> anyhow::Result<()> {
        let mut shared = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        let context = self.publisher.context();
        shared.visible.retain(|p| p.context() != context);
        Ok(())
    }
}

impl KeyDownHandler for SyncCounter {
    fn handle_key_down(&mut self, _event: KeyDown) -> anyhow::Result<()> {
        let mut shared = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        shared.count = shared.count.saturating_add(1);
        shared.show_all();
        Ok(())
    }
}

impl ActionInstance for SyncCounter {
    fn will_appear(&mut self) -> Option<&mut dyn WillAppearHandler> {
        Some(self)
    }

    fn will_disappear(&mut self) -> Option<&mut dyn WillDisappearHandler> {
        Some(self)
    }

    fn key_down(&mut self) -> Option<&mut dyn KeyDownHandler> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keydeck_core::{ActionUuid, CorePublisher, MemorySink, Plugin};
    use serde_json::json;

    fn plugin() -> (Plugin, MemorySink) {
        let sink = MemorySink::new();
        let plugin = Plugin::new("p1".into(), CorePublisher::new(sink.clone()), [definition()])
            .unwrap();
        (plugin, sink)
    }

    fn event(name: &str, context: &str) -> String {
        json!({"event": name, "action": ACTION_UUID, "context": context}).to_string()
    }

    /// (context, title) of every setTitle sent since the last call.
    fn titles(sink: &MemorySink) -> Vec<(String, String)> {
        let mut titles: Vec<_> = sink
            .take()
            .iter()
            .filter_map(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
            .filter(|m| m["event"] == "setTitle")
            .map(|m| {
                (
                    m["context"].as_str().unwrap().to_string(),
                    m["payload"]["title"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        titles.sort();
        titles
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(c, t)| ((*c).to_string(), (*t).to_string()))
            .collect()
    }

    #[test]
    fn test_press_updates_every_visible_key() {
        let (mut plugin, sink) = plugin();
        plugin.dispatch(&event("willAppear", "c1")).unwrap();
        plugin.dispatch(&event("willAppear", "c2")).unwrap();
        assert_eq!(titles(&sink), pairs(&[("c1", "0"), ("c2", "0")]));

        plugin.dispatch(&event("keyDown", "c2")).unwrap();
        assert_eq!(titles(&sink), pairs(&[("c1", "1"), ("c2", "1")]));
    }

    #[test]
    fn test_disappeared_key_is_evicted_and_skipped() {
        let (mut plugin, sink) = plugin();
        plugin.dispatch(&event("willAppear", "c1")).unwrap();
        plugin.dispatch(&event("willAppear", "c2")).unwrap();
        plugin.dispatch(&event("willDisappear", "c1")).unwrap();
        sink.take();

        plugin.dispatch(&event("keyDown", "c2")).unwrap();
        assert_eq!(titles(&sink), pairs(&[("c2", "1")]));

        let action = plugin.action(&ActionUuid::from(ACTION_UUID)).unwrap();
        assert!(!action.contains(&"c1".into()));
        assert!(action.contains(&"c2".into()));
    }

    #[test]
    fn test_returning_key_shows_shared_count() {
        let (mut plugin, sink) = plugin();
        plugin.dispatch(&event("willAppear", "c1")).unwrap();
        plugin.dispatch(&event("keyDown", "c1")).unwrap();
        plugin.dispatch(&event("keyDown", "c1")).unwrap();
        plugin.dispatch(&event("willDisappear", "c1")).unwrap();
        sink.take();

        plugin.dispatch(&event("willAppear", "c1")).unwrap();
        assert_eq!(titles(&sink), pairs(&[("c1", "2")]));
    }
}

//! Destinations for serialized outbound messages.

use std::sync::{Arc, Mutex, PoisonError};

use keydeck_types::Envelope;
use tokio::sync::mpsc;

use crate::error::PublishError;

/// Where the core publisher writes finished messages.
///
/// Calls are already serialized by the publisher's lock, so an implementation
/// never sees two writes at once.
pub trait EventSink: Send {
    /// # Errors
    ///
    /// Returns `PublishError::Closed` once the destination can no longer
    /// accept messages.
    fn write(&mut self, raw: String) -> Result<(), PublishError>;
}

/// Hands messages to the connection's writer task.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
    /// Create a sink and the receiver its writer task should drain.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn write(&mut self, raw: String) -> Result<(), PublishError> {
        self.tx.send(raw).map_err(|_| PublishError::Closed)
    }
}

/// Records every message in memory. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the record.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Messages parsed back into envelopes. Anything unparseable is skipped.
    #[must_use]
    pub fn envelopes(&self) -> Vec<Envelope> {
        self.messages()
            .iter()
            .filter_map(|raw| serde_json::from_str(raw).ok())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn write(&mut self, raw: String) -> Result<(), PublishError> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(raw);
        Ok(())
    }
}

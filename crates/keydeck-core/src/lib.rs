//! Event routing and instance lifecycle for control-surface plugins.
//!
//! A [`Plugin`] owns a fixed set of [`Action`]s. Each action lazily creates one
//! [`ActionInstance`] per placement context and routes envelopes to it through
//! the capability-checked [`invoke`]. Instances talk back through an
//! [`ActionInstancePublisher`] scoped to their own context.
//!
//! ```
//! use keydeck_core::{
//!     ActionDefinition, ActionInstance, ActionInstancePublisher, CorePublisher, KeyDown,
//!     KeyDownHandler, MemorySink, Plugin, SetTitlePayload,
//! };
//!
//! struct Hello(ActionInstancePublisher);
//!
//! impl KeyDownHandler for Hello {
//!     fn handle_key_down(&mut self, _event: KeyDown) -> anyhow::Result<()> {
//!         self.0.set_title(&SetTitlePayload::new("hi"))?;
//!         Ok(())
//!     }
//! }
//!
//! impl ActionInstance for Hello {
//!     fn key_down(&mut self) -> Option<&mut dyn KeyDownHandler> {
//!         Some(self)
//!     }
//! }
//!
//! let sink = MemorySink::new();
//! let mut plugin = Plugin::new(
//!     "plugin".into(),
//!     CorePublisher::new(sink.clone()),
//!     [ActionDefinition::new("dev.example.hello", |_, publisher| {
//!         Box::new(Hello(publisher))
//!     })],
//! )?;
//!
//! plugin.dispatch(r#"{"event":"keyDown","action":"dev.example.hello","context":"c1"}"#)?;
//! assert_eq!(sink.len(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod action;
pub mod dispatch;
pub mod handler;
pub mod header;
pub mod plugin;
pub mod publisher;
pub mod sink;

mod error;

pub use action::{Action, ActionDefinition, InstanceFactory, InstanceRetention};
pub use dispatch::invoke;
pub use error::{ConfigurationError, DecodeError, DispatchError, PublishError, Result};
pub use handler::{
    ActionInstance, ApplicationDidLaunchHandler, ApplicationDidTerminateHandler,
    DeviceDidConnectHandler, DeviceDidDisconnectHandler, DidReceiveGlobalSettingsHandler,
    DidReceiveSettingsHandler, KeyDownHandler, KeyUpHandler, PropertyInspectorDidAppearHandler,
    PropertyInspectorDidDisappearHandler, RawEventHandler, SendToPluginHandler,
    SystemDidWakeUpHandler, TitleParametersDidChangeHandler, WillAppearHandler,
    WillDisappearHandler,
};
pub use header::decode_header;
pub use plugin::{Plugin, dispatch_to};
pub use publisher::{ActionInstancePublisher, ActionPublisher, CorePublisher, PublishResult};
pub use sink::{ChannelSink, EventSink, MemorySink};

pub use keydeck_types::*;

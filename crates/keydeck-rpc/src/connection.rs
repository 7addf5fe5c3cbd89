//! The WebSocket connection to the host and the receive loop.

use std::borrow::Cow;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use keydeck_core::{
    ActionDefinition, ChannelSink, CorePublisher, DispatchError, Plugin, Registration,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::LaunchConfig;
use crate::error::{ConnectionError, Result};

/// Connect to the host, register, and route events until the connection
/// closes or `shutdown` is cancelled.
///
/// The action set is checked before the host is dialled, so an invalid
/// plugin never registers.
///
/// # Errors
///
/// Fails if the action set is invalid, the host cannot be reached, or the
/// connection breaks. Per-message dispatch failures are logged, not returned.
pub async fn serve(
    config: &LaunchConfig,
    definitions: impl IntoIterator<Item = ActionDefinition>,
    shutdown: CancellationToken,
) -> Result<()> {
    let session = Session::new(config, definitions)?;

    let url = config.url();
    info!("Plugin {} connecting to {}", config.plugin_uuid, url);
    let (ws, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|source| ConnectionError::Connect {
            url: url.clone(),
            source: Box::new(source),
        })?;
    info!("Connected to {}", url);

    session.drive(ws, config, shutdown).await
}

/// Drive an already established WebSocket.
///
/// # Errors
///
/// Same as [`serve`], minus the connect step. An invalid action set fails
/// before anything is written to `ws`.
pub async fn run<S>(
    ws: WebSocketStream<S>,
    config: &LaunchConfig,
    definitions: impl IntoIterator<Item = ActionDefinition>,
    shutdown: CancellationToken,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    Session::new(config, definitions)?
        .drive(ws, config, shutdown)
        .await
}

/// A validated plugin and the outbound queue its publishers feed.
struct Session {
    plugin: Plugin,
    core: CorePublisher,
    rx: mpsc::UnboundedReceiver<String>,
}

impl Session {
    /// Building the plugin publishes nothing, so the registration queued
    /// later is still the first message out.
    fn new(
        config: &LaunchConfig,
        definitions: impl IntoIterator<Item = ActionDefinition>,
    ) -> Result<Self> {
        let (sink, rx) = ChannelSink::new();
        let core = CorePublisher::new(sink);
        let plugin = Plugin::new(config.plugin_uuid(), core.clone(), definitions)?;
        Ok(Self { plugin, core, rx })
    }

    async fn drive<S>(
        self,
        ws: WebSocketStream<S>,
        config: &LaunchConfig,
        shutdown: CancellationToken,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let Session {
            mut plugin,
            core,
            rx,
        } = self;
        let (write, mut read) = ws.split();

        let closing = shutdown.child_token();
        let writer = tokio::spawn(write_task(write, rx, closing.clone()));

        let registration = Registration {
            event: config.register_event(),
            uuid: config.plugin_uuid(),
        };
        let outcome = match core.register(&registration) {
            Ok(()) => {
                debug!("Registered as {}", registration.uuid);
                read_loop(&mut plugin, &mut read, &shutdown).await
            }
            Err(e) => Err(ConnectionError::from(e)),
        };

        closing.cancel();
        if let Err(e) = writer.await {
            warn!("Writer task failed: {}", e);
        }

        outcome
    }
}

type WsRead<S> = SplitStream<WebSocketStream<S>>;

async fn read_loop<S>(
    plugin: &mut Plugin,
    read: &mut WsRead<S>,
    shutdown: &CancellationToken,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let frame = tokio::select! {
            () = shutdown.cancelled() => {
                info!("Shutdown requested");
                return Ok(());
            }
            frame = read.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(raw))) => {
                trace!("Received: {}", raw);
                if let Err(e) = plugin.dispatch(&raw) {
                    report(&e);
                }
            }
            Some(Ok(Message::Binary(data))) => {
                warn!("Ignoring binary frame ({} bytes)", data.len());
            }
            Some(Ok(Message::Close(frame))) => {
                info!("Host closed the connection: {:?}", frame);
                return Ok(());
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                error!("Read error: {}", e);
                return Err(ConnectionError::Read(Box::new(e)));
            }
            None => {
                info!("Connection ended");
                return Ok(());
            }
        }
    }
}

type WsWrite<S> = SplitSink<WebSocketStream<S>, Message>;

/// Forward queued messages to the socket. On cancellation, flush what is
/// already queued and send a close frame.
async fn write_task<S>(
    mut write: WsWrite<S>,
    mut rx: mpsc::UnboundedReceiver<String>,
    closing: CancellationToken,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    trace!("Writer started");
    loop {
        let raw = tokio::select! {
            biased;
            raw = rx.recv() => raw,
            () = closing.cancelled() => break,
        };
        let Some(raw) = raw else {
            break;
        };
        trace!("Sending: {}", raw);
        if let Err(e) = write.send(Message::Text(raw)).await {
            warn!("Failed to send to host: {}", e);
            return;
        }
    }

    while let Ok(raw) = rx.try_recv() {
        if let Err(e) = write.send(Message::Text(raw)).await {
            debug!("Dropping queued message after close: {}", e);
            return;
        }
    }

    let close = Message::Close(Some(CloseFrame {
        code: CloseCode::Normal,
        reason: Cow::Borrowed(""),
    }));
    if let Err(e) = write.send(close).await {
        debug!("Close frame not sent: {}", e);
    }
    // Flushes a pending close reply when the host closed first.
    if let Err(e) = write.close().await {
        trace!("Close after shutdown: {}", e);
    }
    trace!("Writer ended");
}

fn report(err: &DispatchError) {
    match err {
        DispatchError::Handler { .. } => error!("{}", err),
        DispatchError::Decode(_) | DispatchError::UnknownAction { .. } => warn!("{}", err),
    }
}

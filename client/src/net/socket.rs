//! Websocket transport over tokio-tungstenite.
//!
//! DESIGN
//! ======
//! `WsConnector::open` returns immediately with a [`WsHandle`] and spawns one
//! task per socket. The task owns the stream; the handle only enqueues
//! commands. Everything the socket does comes back on the connector's event
//! channel as [`SocketEvent`]s tagged with the handle's id, in order:
//!
//! ```text
//! Opened, Message*, (Closed | Error)
//! Error            (handshake failed)
//! Closed           (closed before the handshake finished)
//! ```

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tracing::{debug, info, warn};

use crate::net::transport::{Connector, HandleId, SocketEvent, Transport, TransportError, TransportEvent};

enum Command {
    Text(String),
    Close,
}

/// Opens websocket connections and reports their events on one channel.
pub struct WsConnector {
    events: mpsc::UnboundedSender<SocketEvent>,
    next_id: u64,
}

impl WsConnector {
    /// Create a connector and the receiver its sockets report to.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SocketEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events, next_id: 0 }, rx)
    }
}

impl Connector for WsConnector {
    type Handle = WsHandle;

    fn open(&mut self, endpoint: &str) -> Result<WsHandle, TransportError> {
        let request = endpoint
            .into_client_request()
            .map_err(|e| TransportError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        self.next_id += 1;
        let id = HandleId(self.next_id);
        let events = EventSink { handle: id, events: self.events.clone() };
        let (commands, rx) = mpsc::unbounded_channel();
        runtime.spawn(run_socket(request, events, rx));
        Ok(WsHandle { id, commands })
    }
}

/// Write half handed to the engine.
pub struct WsHandle {
    id: HandleId,
    commands: mpsc::UnboundedSender<Command>,
}

impl Transport for WsHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.commands.send(Command::Text(text)).map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        if self.commands.send(Command::Close).is_err() {
            debug!("ws: close on finished socket");
        }
    }
}

/// One socket's view of the connector channel; stamps its handle id.
struct EventSink {
    handle: HandleId,
    events: mpsc::UnboundedSender<SocketEvent>,
}

impl EventSink {
    fn emit(&self, event: TransportEvent) {
        if self.events.send(SocketEvent { handle: self.handle, event }).is_err() {
            debug!(handle = self.handle.0, "ws: event receiver dropped");
        }
    }
}

async fn run_socket(
    request: Request,
    events: EventSink,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let uri = request.uri().to_string();
    let connect = connect_async(request);
    tokio::pin!(connect);

    // Handshake, racing an early close from the engine.
    let stream = loop {
        tokio::select! {
            result = &mut connect => match result {
                Ok((stream, _)) => break stream,
                Err(e) => {
                    warn!(%uri, error = %e, "ws: connect failed");
                    events.emit(TransportEvent::Error(e.to_string()));
                    return;
                }
            },
            command = commands.recv() => match command {
                Some(Command::Text(_)) => debug!("ws: dropping frame queued before open"),
                Some(Command::Close) | None => {
                    events.emit(TransportEvent::Closed);
                    return;
                }
            },
        }
    };

    info!(%uri, "ws: connected");
    events.emit(TransportEvent::Opened);
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Text(text)) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        warn!(error = %e, "ws: send failed");
                        events.emit(TransportEvent::Error(e.to_string()));
                        return;
                    }
                }
                Some(Command::Close) | None => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        debug!(error = %e, "ws: close frame not sent");
                    }
                    events.emit(TransportEvent::Closed);
                    return;
                }
            },
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => events.emit(TransportEvent::Message(text.as_str().to_owned())),
                Some(Ok(Message::Binary(bytes))) => {
                    events.emit(TransportEvent::Message(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!(%uri, "ws: closed by peer");
                    events.emit(TransportEvent::Closed);
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "ws: recv failed");
                    events.emit(TransportEvent::Error(e.to_string()));
                    return;
                }
            },
        }
    }
}

#[cfg(test)]
#[path = "socket_test.rs"]
mod tests;

//! Per-connection client lifecycle.
//!
//! A joined client runs two tasks that only share its bounded outbound queue:
//! the receive loop wraps inbound frames in envelopes and fans them out to the
//! room, and the send loop drains the queue to the socket. Whichever loop ends
//! first triggers teardown. The room holds the only sender for the queue, so
//! leaving the room is what closes it, and it can only happen after removal.

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{timeout, timeout_at, Duration, Instant};
use uuid::Uuid;

use crate::config::defaults::MAX_QUEUE_CAPACITY;
use crate::hub::{Member, Room};
use crate::protocol::{now_nanos, ClientId};
use crate::server::RelayServer;

/// One stream connection's session: identity plus room membership.
#[derive(Debug)]
pub struct Client {
    id: ClientId,
    username: Arc<str>,
    room: Arc<Room>,
    server: Arc<RelayServer>,
}

impl Client {
    /// Resolve the room and join it, returning the client and the receiving
    /// half of its outbound queue.
    pub async fn join(
        server: Arc<RelayServer>,
        room_name: &str,
        username: &str,
    ) -> (Self, mpsc::Receiver<Bytes>) {
        let room = server.hub().get_or_create_room(room_name);
        let capacity = server.settings().queue_capacity.clamp(1, MAX_QUEUE_CAPACITY);
        let (tx, rx) = mpsc::channel(capacity);
        let id = Uuid::new_v4();
        let username: Arc<str> = Arc::from(username);

        room.join(id, Member::new(Arc::clone(&username), tx)).await;
        server.metrics().increment_connections();
        tracing::info!(
            client_id = %id,
            room = room.name(),
            username = %username,
            "Client joined"
        );

        (
            Self {
                id,
                username,
                room,
                server,
            },
            rx,
        )
    }

    /// Run both loops until either ends, then tear down exactly once.
    pub async fn run<W, R>(self, sink: W, stream: R, outbound: mpsc::Receiver<Bytes>)
    where
        W: Sink<Message> + Unpin + Send + 'static,
        W::Error: Display,
        R: Stream<Item = Result<Message, axum::Error>> + Unpin + Send + 'static,
    {
        let settings = self.server.settings();
        let mut send_task = tokio::spawn(send_loop(
            sink,
            outbound,
            settings.write_timeout,
            self.id,
        ));
        let mut receive_task = tokio::spawn(receive_loop(
            stream,
            Arc::clone(&self.room),
            Arc::clone(&self.server),
            self.id,
            Arc::clone(&self.username),
        ));

        tokio::select! {
            _ = &mut receive_task => {
                // Leaving drops the queue's only sender; the send loop drains and exits.
                self.room.leave(&self.id).await;
                let _ = send_task.await;
            }
            _ = &mut send_task => {
                receive_task.abort();
                self.room.leave(&self.id).await;
            }
        }

        self.server.metrics().increment_disconnections();
        tracing::info!(
            client_id = %self.id,
            room = self.room.name(),
            username = %self.username,
            "Client left"
        );
    }
}

pub(super) async fn handle_socket(
    socket: WebSocket,
    server: Arc<RelayServer>,
    room_name: String,
    username: String,
) {
    let (sink, stream) = socket.split();
    let (client, outbound) = Client::join(server, &room_name, &username).await;
    client.run(sink, stream, outbound).await;
}

async fn send_loop<W>(
    mut sink: W,
    mut outbound: mpsc::Receiver<Bytes>,
    write_timeout: Duration,
    client_id: ClientId,
) where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    while let Some(frame) = outbound.recv().await {
        match timeout(write_timeout, sink.send(Message::Binary(frame))).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::debug!(%client_id, error = %err, "Write failed, closing connection");
                return;
            }
            Err(_) => {
                tracing::warn!(
                    %client_id,
                    timeout_ms = write_timeout.as_millis() as u64,
                    "Write timed out, closing connection"
                );
                return;
            }
        }
    }

    let _ = timeout(write_timeout, sink.close()).await;
}

async fn receive_loop<R>(
    mut stream: R,
    room: Arc<Room>,
    server: Arc<RelayServer>,
    client_id: ClientId,
    username: Arc<str>,
) where
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let read_timeout = server.settings().read_timeout;
    let codec = server.settings().envelope_codec;
    let metrics = server.metrics();

    // Control frames do not extend the deadline; only data frames do.
    let mut deadline = Instant::now() + read_timeout;

    loop {
        let message = match timeout_at(deadline, stream.next()).await {
            Ok(Some(Ok(message))) => message,
            Ok(Some(Err(err))) => {
                tracing::debug!(%client_id, error = %err, "Read failed, closing connection");
                break;
            }
            Ok(None) => break,
            Err(_) => {
                tracing::debug!(
                    %client_id,
                    timeout_ms = read_timeout.as_millis() as u64,
                    "Read timed out, closing connection"
                );
                break;
            }
        };

        let payload = match message {
            Message::Binary(data) => data,
            Message::Text(text) => Bytes::copy_from_slice(text.as_str().as_bytes()),
            Message::Ping(_) | Message::Pong(_) => continue,
            Message::Close(_) => break,
        };
        deadline = Instant::now() + read_timeout;
        metrics.increment_frames_received();

        let frame = match codec.encode_parts(room.name(), &username, now_nanos(), &payload) {
            Ok(frame) => frame,
            Err(err) => {
                metrics.increment_encode_failures();
                tracing::warn!(%client_id, error = %err, "Failed to encode envelope");
                continue;
            }
        };

        let report = room.broadcast(Some(&client_id), frame).await;
        metrics.record_fanout(report.delivered, report.dropped);
    }
}

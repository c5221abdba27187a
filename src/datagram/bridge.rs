use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;

use super::header::parse_frame;
use super::peers::PeerTable;
use crate::hub::FanoutReport;
use crate::protocol::{ephemeral_datagram_username, now_nanos};
use crate::server::RelayServer;

#[derive(Debug, Error)]
pub enum DatagramError {
    #[error("failed to bind datagram socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("datagram receive failed: {0}")]
    Receive(#[source] io::Error),
}

/// What the bridge did with one datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatagramDispatch {
    pub room: String,
    pub username: String,
    pub forwarded: usize,
    pub injected: FanoutReport,
}

/// Relays datagrams among known peers of a room and injects each payload into
/// the stream room of the same name.
#[derive(Debug)]
pub struct DatagramBridge {
    socket: UdpSocket,
    server: Arc<RelayServer>,
    peers: PeerTable,
}

impl DatagramBridge {
    pub async fn bind(addr: SocketAddr, server: Arc<RelayServer>) -> Result<Self, DatagramError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| DatagramError::Bind { addr, source })?;
        Ok(Self::from_socket(socket, server))
    }

    pub fn from_socket(socket: UdpSocket, server: Arc<RelayServer>) -> Self {
        Self {
            socket,
            server,
            peers: PeerTable::new(),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn peers(&self) -> &PeerTable {
        &self.peers
    }

    /// Single receive loop shared by all peers; each datagram is handled inline.
    ///
    /// ICMP-induced reset/refused errors are skipped. Any other receive error
    /// ends the loop.
    pub async fn run(self) -> Result<(), DatagramError> {
        let mut buf = vec![0u8; self.server.settings().max_datagram_size.max(1)];
        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, from)) => {
                    self.handle_datagram(&buf[..len], from).await;
                }
                Err(err)
                    if matches!(
                        err.kind(),
                        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionRefused
                    ) =>
                {
                    tracing::debug!(error = %err, "Ignoring transient datagram receive error");
                }
                Err(err) => {
                    tracing::error!(error = %err, "Datagram receive failed, stopping bridge");
                    return Err(DatagramError::Receive(err));
                }
            }
        }
    }

    pub async fn handle_datagram(&self, datagram: &[u8], from: SocketAddr) -> DatagramDispatch {
        let metrics = self.server.metrics();
        let hub = self.server.hub();
        metrics.increment_datagrams_received();

        let frame = parse_frame(datagram);
        let room = frame
            .room
            .unwrap_or_else(|| hub.default_room().to_string());
        let username = frame.username.unwrap_or_else(ephemeral_datagram_username);

        let targets = self.peers.upsert(&room, &username, from).await;

        let mut forwarded = 0;
        let mut failed = 0;
        for target in targets {
            match self.socket.send_to(frame.payload, target).await {
                Ok(_) => forwarded += 1,
                Err(err) => {
                    failed += 1;
                    tracing::debug!(
                        peer_addr = %target,
                        %room,
                        error = %err,
                        "Failed to forward datagram"
                    );
                }
            }
        }
        metrics.record_datagram_forwards(forwarded, failed);

        let codec = self.server.settings().envelope_codec;
        let injected = match codec.encode_parts(&room, &username, now_nanos(), frame.payload) {
            Ok(envelope) => {
                let report = hub.get_or_create_room(&room).broadcast(None, envelope).await;
                metrics.record_fanout(report.delivered, report.dropped);
                metrics.increment_datagrams_injected();
                report
            }
            Err(err) => {
                metrics.increment_encode_failures();
                tracing::warn!(%room, %username, error = %err, "Failed to encode datagram envelope");
                FanoutReport::default()
            }
        };

        tracing::trace!(
            peer_addr = %from,
            %room,
            %username,
            forwarded,
            delivered = injected.delivered,
            "Relayed datagram"
        );

        DatagramDispatch {
            room,
            username,
            forwarded,
            injected,
        }
    }
}

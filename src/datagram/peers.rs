use smallvec::SmallVec;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::Mutex;

/// Number of forward targets kept inline before spilling to the heap.
pub const TYPICAL_ROOM_SIZE: usize = 8;

pub type ForwardTargets = SmallVec<[SocketAddr; TYPICAL_ROOM_SIZE]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerEntry {
    pub addr: SocketAddr,
    pub last_seen: Instant,
}

/// Datagram peers per room, keyed by username.
///
/// A single lock covers every room. Entries are never evicted.
#[derive(Debug, Default)]
pub struct PeerTable {
    rooms: Mutex<HashMap<String, HashMap<String, PeerEntry>>>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `username`'s latest address in `room` and return the addresses of
    /// every other peer in that room. The lock is released on return.
    pub async fn upsert(&self, room: &str, username: &str, addr: SocketAddr) -> ForwardTargets {
        let mut rooms = self.rooms.lock().await;
        let peers = rooms.entry(room.to_string()).or_default();
        peers.insert(
            username.to_string(),
            PeerEntry {
                addr,
                last_seen: Instant::now(),
            },
        );

        peers
            .iter()
            .filter(|(name, _)| name.as_str() != username)
            .map(|(_, peer)| peer.addr)
            .collect()
    }

    pub async fn peer(&self, room: &str, username: &str) -> Option<PeerEntry> {
        let rooms = self.rooms.lock().await;
        rooms.get(room).and_then(|peers| peers.get(username)).copied()
    }

    pub async fn peer_count(&self, room: &str) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.get(room).map_or(0, HashMap::len)
    }
}

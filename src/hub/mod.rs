//! Registry of rooms keyed by name.
//!
//! The hub is constructed once at startup and handed to every component that
//! resolves rooms. Rooms are created lazily on first reference and are never
//! removed.

mod room;

pub use room::{FanoutReport, Member, Room};

use dashmap::DashMap;
use std::sync::Arc;

use crate::protocol::DEFAULT_ROOM;

#[derive(Debug)]
pub struct Hub {
    rooms: DashMap<String, Arc<Room>>,
    default_room: String,
}

impl Hub {
    pub fn new() -> Self {
        Self::with_default_room(DEFAULT_ROOM)
    }

    /// Build a hub whose fallback room for blank names is `default_room`.
    pub fn with_default_room(default_room: impl Into<String>) -> Self {
        Self {
            rooms: DashMap::new(),
            default_room: default_room.into(),
        }
    }

    pub fn default_room(&self) -> &str {
        &self.default_room
    }

    /// Resolve `name` to its room, creating it on first use.
    ///
    /// Concurrent callers racing on the same name all receive the same
    /// instance: creation happens under the map's shard lock via `entry`.
    pub fn get_or_create_room(&self, name: &str) -> Arc<Room> {
        let name = self.resolve_name(name);

        if let Some(room) = self.rooms.get(name) {
            return Arc::clone(room.value());
        }

        let entry = self.rooms.entry(name.to_string()).or_insert_with(|| {
            tracing::info!(room = name, "Created room");
            Arc::new(Room::new(name))
        });
        Arc::clone(entry.value())
    }

    /// Look up an existing room without creating it. Names resolve the same
    /// way as in [`Hub::get_or_create_room`].
    pub fn room(&self, name: &str) -> Option<Arc<Room>> {
        self.rooms
            .get(self.resolve_name(name))
            .map(|room| Arc::clone(room.value()))
    }

    /// Trimmed name, or the default room when blank.
    fn resolve_name<'a>(&'a self, name: &'a str) -> &'a str {
        match name.trim() {
            "" => self.default_room.as_str(),
            trimmed => trimmed,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_names(&self) -> Vec<String> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

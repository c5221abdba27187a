use crate::hub::Hub;
use crate::protocol::anonymous_username;
use crate::server::RelayServer;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::Response;
use std::sync::Arc;

use super::connection::handle_socket;

/// `/ws`: default room, anonymous username.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(server): State<Arc<RelayServer>>,
) -> Response {
    upgrade(ws, server, None, None)
}

/// `/ws/{room}`: anonymous username.
pub async fn websocket_room_handler(
    ws: WebSocketUpgrade,
    State(server): State<Arc<RelayServer>>,
    Path(room): Path<String>,
) -> Response {
    upgrade(ws, server, Some(room), None)
}

/// `/ws/{room}/{username}`
pub async fn websocket_room_user_handler(
    ws: WebSocketUpgrade,
    State(server): State<Arc<RelayServer>>,
    Path((room, username)): Path<(String, String)>,
) -> Response {
    upgrade(ws, server, Some(room), Some(username))
}

fn upgrade(
    ws: WebSocketUpgrade,
    server: Arc<RelayServer>,
    room: Option<String>,
    username: Option<String>,
) -> Response {
    let (room, username) = resolve_identity(server.hub(), room, username);
    ws.on_upgrade(move |socket| handle_socket(socket, server, room, username))
}

/// Fill in the default room and a generated username for blank path segments.
pub(crate) fn resolve_identity(
    hub: &Hub,
    room: Option<String>,
    username: Option<String>,
) -> (String, String) {
    let room = room
        .map(|room| room.trim().to_string())
        .filter(|room| !room.is_empty())
        .unwrap_or_else(|| hub.default_room().to_string());
    let username = username
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(anonymous_username);
    (room, username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_segments_get_defaults() {
        let hub = Hub::new();
        let (room, username) = resolve_identity(&hub, None, None);
        assert_eq!(room, "global");
        assert!(username.starts_with("anon-"));

        let (room, username) = resolve_identity(&hub, Some(" ".into()), Some("".into()));
        assert_eq!(room, "global");
        assert!(username.starts_with("anon-"));
    }

    #[test]
    fn supplied_segments_are_kept() {
        let hub = Hub::new();
        let (room, username) =
            resolve_identity(&hub, Some("alpha".into()), Some("bob".into()));
        assert_eq!(room, "alpha");
        assert_eq!(username, "bob");
    }
}

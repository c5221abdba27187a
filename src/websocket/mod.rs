// WebSocket module - the stream transport
//
// - handler: upgrade handlers for /ws, /ws/{room}, /ws/{room}/{username}
// - connection: client lifecycle (receive loop, send loop, teardown)
// - routes: router setup (websocket, health, metrics, CORS)

mod connection;
mod handler;
mod routes;

pub use connection::Client;
pub use handler::{websocket_handler, websocket_room_handler, websocket_room_user_handler};
pub use routes::{create_router, HealthResponse, MetricsResponse};

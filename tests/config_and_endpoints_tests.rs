
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use fanout_relay::config::{self, Config};
use fanout_relay::protocol::EnvelopeCodec;
use fanout_relay::server::RelayServer;
use fanout_relay::websocket::create_router;
use serde_json::Value;
use serial_test::serial;
use test_helpers::{create_test_server, test_settings};
use tower::ServiceExt;

async fn get_json(server: std::sync::Arc<RelayServer>, uri: &str) -> (StatusCode, Value) {
    let response = create_router("*")
        .with_state(server)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_endpoint_reports_ok() {
    let (status, body) = get_json(create_test_server(test_settings()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["server_time"].as_str().is_some_and(|t| t.ends_with('Z')));
}

#[tokio::test]
async fn test_metrics_endpoint_reflects_rooms_and_counters() {
    let server = create_test_server(test_settings());
    server.hub().get_or_create_room("alpha");
    server.hub().get_or_create_room("beta");
    server.metrics().record_fanout(3, 1);

    let (status, body) = get_json(server, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rooms"], 2);
    assert_eq!(body["deliveries"], 3);
    assert_eq!(body["drops"], 1);
    assert_eq!(body["active_connections"], 0);
}

#[tokio::test]
async fn test_plain_http_request_to_ws_is_rejected() {
    let response = create_router("*")
        .with_state(create_test_server(test_settings()))
        .oneshot(Request::builder().uri("/ws/alpha").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let response = create_router("https://game.example")
        .with_state(create_test_server(test_settings()))
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "https://game.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://game.example")
    );
}

#[test]
#[serial]
fn test_loaded_defaults_without_overrides() {
    std::env::remove_var("FANOUT_RELAY_CONFIG_PATH");
    std::env::remove_var("FANOUT_RELAY_CONFIG_JSON");

    let cfg = config::load();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.udp_port, 8081);
    assert_eq!(cfg.allowed_origin, "*");
    assert_eq!(cfg.relay.default_room, "global");
    assert_eq!(cfg.relay.envelope_encoding, EnvelopeCodec::Json);
    assert!(config::validate_config(&cfg).is_ok());
}

#[test]
#[serial]
fn test_inline_json_config_drives_server_settings() {
    std::env::set_var(
        "FANOUT_RELAY_CONFIG_JSON",
        r#"{"relay":{"default_room":"lobby","queue_capacity":8,"envelope_encoding":"msgpack"}}"#,
    );
    let cfg = config::load();
    std::env::remove_var("FANOUT_RELAY_CONFIG_JSON");

    let server = RelayServer::from_config(&cfg);
    assert_eq!(server.hub().default_room(), "lobby");
    assert_eq!(server.settings().queue_capacity, 8);
    assert_eq!(server.settings().envelope_codec, EnvelopeCodec::MessagePack);
}

#[test]
fn test_default_config_serializes() {
    let json = serde_json::to_value(Config::default()).unwrap();
    assert_eq!(json["relay"]["envelope_encoding"], "json");
    assert_eq!(json["relay"]["queue_capacity"], 256);
}

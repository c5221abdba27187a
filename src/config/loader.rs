//! Configuration loading and environment parsing.

use super::Config;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix for nested field overrides, e.g. `FANOUT_RELAY__RELAY__QUEUE_CAPACITY=512`.
const ENV_OVERRIDE_PREFIX: &str = "FANOUT_RELAY__";

/// Load configuration with the following precedence (highest first):
/// 1) `FANOUT_RELAY__*` field overrides, using "__" as the nested separator
/// 2) `FANOUT_RELAY_CONFIG_JSON` env var containing raw JSON
/// 3) File pointed to by the `FANOUT_RELAY_CONFIG_PATH` env var
/// 4) config.json in the current working directory
/// 5) Defaults compiled into the binary
///
/// Read and parse errors are printed to stderr and the affected source is
/// skipped; `load()` always returns a `Config`. Validation is left to the
/// caller (see [`validate_config`](super::validation::validate_config)).
#[must_use]
pub fn load() -> Config {
    let defaults = Config::default();
    let mut merged =
        serde_json::to_value(&defaults).unwrap_or_else(|_| Value::Object(Map::new()));

    // Lowest precedence first; later merges win.
    merge_file_source(&mut merged, Path::new("config.json"));

    if let Ok(path) = std::env::var("FANOUT_RELAY_CONFIG_PATH") {
        merge_file_source(&mut merged, &PathBuf::from(path));
    }

    if let Ok(json) = std::env::var("FANOUT_RELAY_CONFIG_JSON") {
        if let Some(value) = parse_json_document(&json, "FANOUT_RELAY_CONFIG_JSON") {
            merge_values(&mut merged, value);
        }
    }

    apply_env_overrides(&mut merged, std::env::vars());

    match serde_json::from_value::<Config>(merged) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to deserialize config; using defaults: {e}");
            defaults
        }
    }
}

fn parse_json_document(raw: &str, label: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("Failed to parse config from {label}: {err}");
            None
        }
    }
}

fn merge_file_source(target: &mut Value, path: &Path) {
    if path.as_os_str().is_empty() || !path.exists() {
        return;
    }

    match fs::read_to_string(path) {
        Ok(contents) => {
            if let Some(value) = parse_json_document(&contents, &format!("file {}", path.display()))
            {
                merge_values(target, value);
            }
        }
        Err(err) => {
            eprintln!("Failed to read config from {}: {}", path.display(), err);
        }
    }
}

fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target_slot, source_value) => {
            *target_slot = source_value;
        }
    }
}

fn apply_env_overrides(root: &mut Value, vars: impl Iterator<Item = (String, String)>) {
    for (key, raw_value) in vars {
        let Some(stripped) = key.strip_prefix(ENV_OVERRIDE_PREFIX) else {
            continue;
        };

        let segments: Vec<String> = stripped
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        if segments.is_empty() {
            continue;
        }

        set_nested_value(root, &segments, parse_scalar(raw_value.trim()));
    }
}

// Origins lists are comma-separated strings, so values are never split into arrays.
fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }

    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn set_nested_value(target: &mut Value, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        *target = value;
        return;
    };

    let mut cursor = target;
    for segment in parents {
        let Some(map) = ensure_object(cursor) else {
            return;
        };
        cursor = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if let Some(map) = ensure_object(cursor) {
        map.insert(last.clone(), value);
    }
}

fn ensure_object(value: &mut Value) -> Option<&mut Map<String, Value>> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn defaults_value() -> Value {
        serde_json::to_value(Config::default()).unwrap()
    }

    #[test]
    fn env_overrides_set_nested_fields() {
        let mut value = defaults_value();
        let vars = vec![
            ("FANOUT_RELAY__PORT".to_string(), "9000".to_string()),
            (
                "FANOUT_RELAY__RELAY__QUEUE_CAPACITY".to_string(),
                "32".to_string(),
            ),
            (
                "FANOUT_RELAY__ALLOWED_ORIGIN".to_string(),
                "http://a.test,http://b.test".to_string(),
            ),
            ("UNRELATED".to_string(), "x".to_string()),
        ];
        apply_env_overrides(&mut value, vars.into_iter());

        let config: Config = serde_json::from_value(value).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.relay.queue_capacity, 32);
        assert_eq!(config.allowed_origin, "http://a.test,http://b.test");
    }

    #[test]
    fn merge_keeps_unspecified_fields() {
        let mut value = defaults_value();
        merge_values(
            &mut value,
            serde_json::json!({ "relay": { "default_room": "lobby" } }),
        );
        let config: Config = serde_json::from_value(value).unwrap();
        assert_eq!(config.relay.default_room, "lobby");
        assert_eq!(config.relay.queue_capacity, 256);
    }

    #[test]
    #[serial]
    fn load_reads_json_env_and_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "udp_port": 9101, "relay": {{ "read_timeout_secs": 5 }} }}"#)
            .unwrap();

        std::env::set_var("FANOUT_RELAY_CONFIG_PATH", file.path());
        std::env::set_var("FANOUT_RELAY_CONFIG_JSON", r#"{ "udp_port": 9202 }"#);
        std::env::set_var("FANOUT_RELAY__RELAY__ENVELOPE_ENCODING", "msgpack");

        let config = load();

        std::env::remove_var("FANOUT_RELAY_CONFIG_PATH");
        std::env::remove_var("FANOUT_RELAY_CONFIG_JSON");
        std::env::remove_var("FANOUT_RELAY__RELAY__ENVELOPE_ENCODING");

        assert_eq!(config.udp_port, 9202);
        assert_eq!(config.relay.read_timeout_secs, 5);
        assert_eq!(
            config.relay.envelope_encoding,
            crate::protocol::EnvelopeCodec::MessagePack
        );
    }

    #[test]
    #[serial]
    fn load_falls_back_to_defaults_on_bad_json() {
        std::env::set_var("FANOUT_RELAY_CONFIG_JSON", "{ not json");
        let config = load();
        std::env::remove_var("FANOUT_RELAY_CONFIG_JSON");

        assert_eq!(config.port, 8080);
        assert_eq!(config.relay.default_room, "global");
    }
}

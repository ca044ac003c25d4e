use crate::commands::fetch::{FetchOptions, SnapshotSource};
use crate::error::{PulseError, PulseResult};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_SCHEMA_VERSION: i64 = 1;
const SETTINGS_FILE: &str = "settings.json";

pub const MIN_TOP_N: u64 = 3;
pub const MAX_TOP_N: u64 = 30;

#[derive(Debug, Clone)]
pub struct EffectiveSettings {
    pub source: SnapshotSource,
    pub overview_top_n: usize,
    pub category_top_n: usize,
    pub fetch: FetchOptions,
}

/// Directory holding `settings.json`, registered with the shell at startup.
#[derive(Debug, Clone)]
pub struct SettingsDir(pub PathBuf);

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn get_settings(dir: tauri::State<'_, SettingsDir>) -> Result<Value, String> {
    load_settings_from_disk(&dir.0).map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn save_settings(dir: tauri::State<'_, SettingsDir>, settings: Value) -> Result<Value, String> {
    save_settings_to_disk(&dir.0, settings).map_err(|e| e.to_string())
}

pub fn load_effective_settings(config_dir: &Path) -> PulseResult<EffectiveSettings> {
    let settings = load_settings_from_disk(config_dir)?;
    Ok(effective_from_value(&settings))
}

pub fn effective_from_value(settings: &Value) -> EffectiveSettings {
    let source = match settings.get("historyPath").and_then(Value::as_str) {
        Some(path) if !path.trim().is_empty() => SnapshotSource::File(PathBuf::from(path)),
        _ => SnapshotSource::Url(
            settings
                .get("historyUrl")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_HISTORY_URL)
                .to_string(),
        ),
    };

    let top_n = |key: &str, default: u64| {
        settings
            .get(key)
            .and_then(Value::as_u64)
            .unwrap_or(default)
            .clamp(MIN_TOP_N, MAX_TOP_N) as usize
    };

    let defaults = FetchOptions::default();
    let timeout_secs = settings
        .get("requestTimeoutSecs")
        .and_then(Value::as_u64)
        .unwrap_or(defaults.timeout.as_secs())
        .clamp(1, 120);
    let user_agent = settings
        .get("userAgent")
        .and_then(Value::as_str)
        .filter(|ua| !ua.trim().is_empty())
        .map(str::to_string)
        .unwrap_or(defaults.user_agent);

    EffectiveSettings {
        source,
        overview_top_n: top_n("overviewTopN", 20),
        category_top_n: top_n("categoryTopN", 30),
        fetch: FetchOptions {
            timeout: Duration::from_secs(timeout_secs),
            user_agent,
        },
    }
}

pub fn load_settings_from_disk(config_dir: &Path) -> PulseResult<Value> {
    let path = settings_path(config_dir);
    ensure_config_dir(config_dir)?;

    let original = if path.exists() {
        let raw = fs::read_to_string(&path)
            .map_err(|e| PulseError::settings(format!("Failed to read settings.json: {e}")))?;
        serde_json::from_str::<Value>(&raw).unwrap_or_else(|err| {
            log::warn!("settings.json is not valid JSON, falling back to defaults: {err}");
            json!({})
        })
    } else {
        json!({})
    };

    let migrated = migrate_settings(original.clone());
    if migrated != original || !path.exists() {
        write_settings_file(&path, &migrated)?;
    }

    Ok(migrated)
}

pub fn save_settings_to_disk(config_dir: &Path, settings: Value) -> PulseResult<Value> {
    let path = settings_path(config_dir);
    ensure_config_dir(config_dir)?;

    let mut merged = load_settings_from_disk(config_dir).unwrap_or_else(|_| default_settings());
    merge_settings(&mut merged, &settings);

    let migrated = migrate_settings(merged);
    write_settings_file(&path, &migrated)?;
    Ok(migrated)
}

const DEFAULT_HISTORY_URL: &str = "http://127.0.0.1:8000/history.json";

fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILE)
}

fn ensure_config_dir(config_dir: &Path) -> PulseResult<()> {
    fs::create_dir_all(config_dir)
        .map_err(|e| PulseError::settings(format!("Failed to create config directory: {e}")))
}

fn write_settings_file(path: &Path, settings: &Value) -> PulseResult<()> {
    let raw = serde_json::to_string_pretty(settings)
        .map_err(|e| PulseError::settings(format!("Failed to serialize settings: {e}")))?;
    fs::write(path, raw).map_err(|e| PulseError::settings(format!("Failed to write settings.json: {e}")))
}

fn migrate_settings(input: Value) -> Value {
    let defaults = default_settings();
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    deep_merge_defaults(&mut out, &defaults);
    sanitize_settings(&mut out);
    if let Some(obj) = out.as_object_mut() {
        obj.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));
    }

    out
}

fn default_settings() -> Value {
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "historyUrl": DEFAULT_HISTORY_URL,
        "historyPath": null,
        "overviewTopN": 20,
        "categoryTopN": 30,
        "requestTimeoutSecs": 20,
        "userAgent": FetchOptions::default().user_agent
    })
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let (Some(target_obj), Some(default_obj)) = (target.as_object_mut(), defaults.as_object()) else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn merge_settings(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                if let Some(existing) = target_obj.get_mut(key) {
                    merge_settings(existing, value);
                } else {
                    target_obj.insert(key.clone(), value.clone());
                }
            }
        }
        (target_slot, incoming_value) => {
            *target_slot = incoming_value.clone();
        }
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    clamp_u64(obj, "overviewTopN", MIN_TOP_N, MAX_TOP_N, 20);
    clamp_u64(obj, "categoryTopN", MIN_TOP_N, MAX_TOP_N, 30);
    clamp_u64(obj, "requestTimeoutSecs", 1, 120, 20);

    ensure_string(obj, "historyUrl", DEFAULT_HISTORY_URL);
    ensure_string(obj, "userAgent", &FetchOptions::default().user_agent);

    // A blank or non-string path means "use the URL".
    let path_is_usable = obj
        .get("historyPath")
        .and_then(Value::as_str)
        .is_some_and(|path| !path.trim().is_empty());
    if !path_is_usable {
        obj.insert("historyPath".to_string(), Value::Null);
    }
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn ensure_string(map: &mut Map<String, Value>, key: &str, default: &str) {
    let valid = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(default)
        .to_string();
    map.insert(key.to_string(), json!(valid));
}

//! Key/value store for fighter collections. Mirrors the browser storage the bookie tools
//! keep: entries are wrapped as `{ "v": value, "t": written_ms, "e": expires_ms|null }`.
//! Reads are infallible; anything missing, expired, or malformed reads as absent.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::data::fighter::{fighters_from_value, Fighter};
use crate::error::StoreError;

/// Logical key holding the fighter collection.
pub const FIGHTERS_KEY: &str = "fighters";
pub const DEFAULT_STORE_DIR: &str = "data";
const KEY_PREFIX: &str = "sbbt_";

/// Read side of the persistence provider the draft engine depends on.
pub trait FighterStore: Send + Sync {
    fn get_json(&self, key: &str) -> Option<Value>;

    /// The ordered fighter collection, or empty when absent.
    fn get_fighters(&self) -> Vec<Fighter> {
        self.get_json(FIGHTERS_KEY)
            .map(|value| fighters_from_value(&value))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    v: Value,
    #[serde(default)]
    t: Option<i64>,
    #[serde(default)]
    e: Option<i64>,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Unwraps an envelope, or accepts a bare value written by hand. Returns None when the
/// envelope has expired.
fn unwrap_entry(raw: Value, now: i64) -> Option<Value> {
    if let Value::Object(map) = &raw {
        if map.contains_key("v") {
            let envelope: Envelope = serde_json::from_value(raw).ok()?;
            if envelope.e.is_some_and(|expires| now > expires) {
                return None;
            }
            return match envelope.v {
                Value::Null => None,
                value => Some(value),
            };
        }
    }
    Some(raw)
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{KEY_PREFIX}{safe}.json"))
    }

    /// Writes `value` under `key`, expiring after `ttl` when given.
    pub fn set_json(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), StoreError> {
        let written = now_ms();
        let envelope = Envelope {
            v: value.clone(),
            t: Some(written),
            e: ttl.map(|ttl| written.saturating_add(ttl.as_millis() as i64)),
        };
        let payload = serde_json::to_string_pretty(&envelope)?;
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Write {
            key: key.to_string(),
            source,
        })?;
        fs::write(self.entry_path(key), payload).map_err(|source| StoreError::Write {
            key: key.to_string(),
            source,
        })?;
        debug!(key, dir = %self.dir.display(), "store entry written");
        Ok(())
    }

    pub fn set_fighters(&self, fighters: &[Fighter]) -> Result<(), StoreError> {
        let value = serde_json::to_value(fighters)?;
        self.set_json(FIGHTERS_KEY, &value, None)
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Remove {
                key: key.to_string(),
                source,
            }),
        }
    }
}

impl FighterStore for JsonFileStore {
    fn get_json(&self, key: &str) -> Option<Value> {
        let path = self.entry_path(key);
        let raw = fs::read_to_string(&path).ok()?;
        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(path = %path.display(), "ignoring malformed store entry: {err}");
                return None;
            }
        };
        let value = unwrap_entry(parsed, now_ms());
        if value.is_none() {
            debug!(key, "store entry expired");
            let _ = fs::remove_file(&path);
        }
        value
    }
}

/// In-memory store; entries never expire.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fighters(fighters: &[Fighter]) -> Self {
        let store = Self::new();
        if let Ok(value) = serde_json::to_value(fighters) {
            store.set_json(FIGHTERS_KEY, value);
        }
        store
    }

    pub fn set_json(&self, key: &str, value: Value) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value);
    }
}

impl FighterStore for MemoryStore {
    fn get_json(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

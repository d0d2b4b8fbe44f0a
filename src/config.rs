//! Draft settings: optional YAML file plus environment overrides. A bad or missing file
//! falls back to defaults; settings never stop a run.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::data::DEFAULT_STORE_DIR;
use crate::draft::clock::clamp_pick_delay;
use crate::draft::LiveOptions;
use crate::error::ConfigError;
use crate::volatility::VolatilityConfig;

pub const DEFAULT_CONFIG_PATH: &str = "draftroom.yaml";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_SESSION_GRACE_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    pub bind: String,
    pub store_dir: PathBuf,
    /// Seconds between live picks. Clamped when read through [DraftConfig::pick_delay_secs].
    pub pick_delay_secs: Option<f64>,
    /// RFC 3339 start time for live drafts; unparseable values mean "start now".
    pub start_at: Option<String>,
    pub use_override: bool,
    /// Seconds a finished live session stays readable on the server before it is dropped.
    pub session_grace_secs: u64,
    pub volatility: VolatilityConfig,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDR.to_string(),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            pick_delay_secs: None,
            start_at: None,
            use_override: true,
            session_grace_secs: DEFAULT_SESSION_GRACE_SECS,
            volatility: VolatilityConfig::default(),
        }
    }
}

impl DraftConfig {
    /// Parses YAML settings. Out-of-range volatility settings are clamped, not rejected.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(raw)?;
        config.volatility = config.volatility.clamped();
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// `$DRAFTROOM_CONFIG` or `draftroom.yaml` when present, then `DRAFTROOM_BIND` and
    /// `DRAFTROOM_STORE` overrides.
    pub fn load() -> Self {
        let explicit = env::var("DRAFTROOM_CONFIG").ok();
        let path = explicit.clone().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let mut config = if explicit.is_some() || Path::new(&path).exists() {
            match Self::from_file(&path) {
                Ok(config) => config,
                Err(err) => {
                    warn!(path = %path, "using default draft config: {err}");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| env::var(key).ok());
        config
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("DRAFTROOM_BIND").filter(|v| !v.trim().is_empty()) {
            self.bind = bind;
        }
        if let Some(store) = lookup("DRAFTROOM_STORE").filter(|v| !v.trim().is_empty()) {
            self.store_dir = PathBuf::from(store);
        }
    }

    pub fn pick_delay_secs(&self) -> f64 {
        clamp_pick_delay(self.pick_delay_secs)
    }

    pub fn start_at(&self) -> Option<DateTime<Utc>> {
        parse_start_at(self.start_at.as_deref())
    }

    pub fn live_options(&self) -> LiveOptions {
        LiveOptions::from_settings(self.pick_delay_secs, self.start_at())
    }
}

pub fn parse_start_at(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
}

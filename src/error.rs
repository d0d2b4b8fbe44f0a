use thiserror::Error;

/// Failures writing to the fighter store. Reads never fail: unreadable data is absent data.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write store entry '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove store entry '{key}': {source}")]
    Remove {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode store entry: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode export JSON: {0}")]
    Json(#[from] serde_json::Error),
}

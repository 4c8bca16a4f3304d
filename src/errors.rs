use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Remote lookup timed out after {0} seconds")]
    FetchTimeout(u64),

    #[error("JSON serialization/deserialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Invalid barcode '{0}': expected 8-13 digits")]
    InvalidBarcode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Storage-layer failures are a separate type on purpose: the cache and
/// history features are best-effort, so these are caught and logged at the
/// component boundary instead of being converted into an `AppError`.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded for key '{0}'")]
    QuotaExceeded(String),

    #[error("Storage backend unavailable: {0}")]
    Backend(String),

    #[error("Stored value under '{key}' could not be decoded: {reason}")]
    Corrupt { key: String, reason: String },
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

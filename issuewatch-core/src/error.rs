use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Unexpected status {status_code} from {url}")]
    UnexpectedStatus { url: String, status_code: u16 },

    #[error("Request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Failed to read response body: {reason}")]
    BodyUnreadable { reason: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug, Clone)]
pub enum NotifyError {
    #[error("{target} responded with {status_code}, expected {expected}")]
    UnexpectedStatus {
        target: String,
        status_code: u16,
        expected: u16,
    },

    #[error("Error sending to {target}: {reason}")]
    Transport { target: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Configuration file unreadable: {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

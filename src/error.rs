use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Username or password is not valid")]
    InvalidCredentials,

    #[error("Login failed")]
    LoginFailed,

    /// Any non-2xx response. The body is discarded.
    #[error("Request failed ({0})")]
    RequestFailed(StatusCode),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Please select all required fields")]
    MissingSelections,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Unknown bot '{0}'")]
    UnknownBot(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

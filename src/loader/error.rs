use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("request for {locator} failed: {message}")]
    Network { locator: String, message: String },

    #[error("{locator} answered with status {status}")]
    Status { locator: String, status: u16 },

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("local storage is unavailable")]
    StorageUnavailable,

    #[error("local storage rejected write to {0}")]
    StorageWrite(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Malformed(e.to_string())
    }
}

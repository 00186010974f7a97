use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Media server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl BridgeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BridgeError::NotFound(_))
            || matches!(self, BridgeError::Status { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

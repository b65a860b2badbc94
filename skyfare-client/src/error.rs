use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-success status and a `message` body.
    #[error("{message} ({status})")]
    Api { status: StatusCode, message: String },

    #[error("Please login to continue")]
    LoginRequired,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("session store error: {0}")]
    Session(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

pub mod auth;
pub mod flight;
pub mod repository;
pub mod search;
pub mod sensitive;
pub mod user;

pub use auth::{AuthResponse, AuthService, Session, TokenKeys};
pub use flight::{format_duration, Currency, Flight, FlightService, NewFlight};
pub use repository::{FlightRepository, RepoError, UserRepository};
pub use search::FlightSearchQuery;
pub use sensitive::Sensitive;
pub use user::{ProfilePatch, PublicProfile, User};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Internal service error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<RepoError> for CoreError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateEmail => {
                CoreError::Conflict("User already exists with this email".to_string())
            }
            RepoError::Backend(e) => CoreError::Internal(e.to_string()),
        }
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::search::FlightSearchQuery;
use crate::{Flight, User};

pub mod memory;

pub use memory::{MemoryFlightRepository, MemoryUserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepoError {
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        RepoError::Backend(err.into())
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository trait for user account access
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`RepoError::DuplicateEmail`] if the email is taken.
    async fn insert(&self, user: &User) -> RepoResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    /// `email` is expected in normalized (trimmed, lower-case) form.
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Replaces the stored record with the same id. Returns `false` when no
    /// such record exists.
    async fn update(&self, user: &User) -> RepoResult<bool>;
}

/// Repository trait for flight data access
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn insert(&self, flight: &Flight) -> RepoResult<()>;

    async fn insert_many(&self, flights: &[Flight]) -> RepoResult<u64>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Flight>>;

    /// Matching flights ordered by ascending price.
    async fn search(&self, query: &FlightSearchQuery) -> RepoResult<Vec<Flight>>;

    /// Drops every flight. Used by the seed loader.
    async fn delete_all(&self) -> RepoResult<u64>;
}

//! In-process repositories. Used by the test suites and by the `memory`
//! database backend for local runs without Postgres.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FlightRepository, RepoError, RepoResult, UserRepository};
use crate::search::FlightSearchQuery;
use crate::{Flight, User};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> RepoResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::DuplicateEmail);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, user: &User) -> RepoResult<bool> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email && u.id != user.id) {
            return Err(RepoError::DuplicateEmail);
        }
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryFlightRepository {
    flights: RwLock<Vec<Flight>>,
}

impl MemoryFlightRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlightRepository for MemoryFlightRepository {
    async fn insert(&self, flight: &Flight) -> RepoResult<()> {
        self.flights.write().await.push(flight.clone());
        Ok(())
    }

    async fn insert_many(&self, flights: &[Flight]) -> RepoResult<u64> {
        self.flights.write().await.extend_from_slice(flights);
        Ok(flights.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Flight>> {
        let flights = self.flights.read().await;
        Ok(flights.iter().find(|f| f.id == id).cloned())
    }

    async fn search(&self, query: &FlightSearchQuery) -> RepoResult<Vec<Flight>> {
        let flights = self.flights.read().await;
        let mut matched: Vec<Flight> = flights.iter().filter(|f| query.matches(f)).cloned().collect();
        // stable: equal prices keep insertion order
        matched.sort_by(|a, b| a.price.total_cmp(&b.price));
        Ok(matched)
    }

    async fn delete_all(&self) -> RepoResult<u64> {
        let mut flights = self.flights.write().await;
        let removed = flights.len() as u64;
        flights.clear();
        Ok(removed)
    }
}

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::repository::{RepoError, UserRepository};
use crate::user::{validate_email, validate_name, validate_password, normalize_email};
use crate::{CoreError, CoreResult, ProfilePatch, PublicProfile, Sensitive, User};

pub mod password;
pub mod token;

pub use token::{Claims, TokenKeys, DEFAULT_TOKEN_TTL_SECONDS};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// The authenticated caller, resolved from a bearer token and carried in the
/// request context of protected routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicProfile,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenKeys) -> Self {
        Self { users, tokens }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &Sensitive<String>,
    ) -> CoreResult<AuthResponse> {
        let name = validate_name(name)?;
        let email = validate_email(email)?;
        validate_password(password.expose())?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(CoreError::Conflict(
                "User already exists with this email".to_string(),
            ));
        }

        let password_hash = password::hash_password_blocking(password.expose().clone()).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash: Sensitive::new(password_hash),
            created_at: now,
            updated_at: now,
        };

        // a concurrent registration can still win the race; the store reports it
        self.users.insert(&user).await?;
        info!("Registered user {}", user.id);

        let token = self.tokens.issue(user.id)?;
        Ok(AuthResponse {
            token,
            user: user.profile(),
        })
    }

    pub async fn login(&self, email: &str, password: &Sensitive<String>) -> CoreResult<AuthResponse> {
        let email = normalize_email(email);
        if email.is_empty() || password.expose().is_empty() {
            return Err(CoreError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let matches = password::verify_password_blocking(
            password.expose().clone(),
            user.password_hash.expose().clone(),
        )
        .await?;
        if !matches {
            warn!("Failed login for user {}", user.id);
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.tokens.issue(user.id)?;
        Ok(AuthResponse {
            token,
            user: user.profile(),
        })
    }

    pub fn authenticate(&self, token: &str) -> CoreResult<Session> {
        self.tokens.verify(token)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> CoreResult<PublicProfile> {
        self.load(user_id).await.map(|user| user.profile())
    }

    /// Applies the non-blank fields of `patch`. The email check ignores the
    /// caller's own record, so re-submitting the current email is not a
    /// conflict.
    pub async fn update_profile(&self, user_id: Uuid, patch: ProfilePatch) -> CoreResult<PublicProfile> {
        let mut user = self.load(user_id).await?;

        if let Some(name) = patch.name.as_deref().filter(|n| !n.trim().is_empty()) {
            user.name = validate_name(name)?;
        }

        if let Some(email) = patch.email.as_deref().filter(|e| !e.trim().is_empty()) {
            let email = validate_email(email)?;
            if let Some(owner) = self.users.find_by_email(&email).await? {
                if owner.id != user.id {
                    return Err(CoreError::Conflict("Email already in use".to_string()));
                }
            }
            user.email = email;
        }

        if let Some(password) = patch.password.filter(|p| !p.expose().is_empty()) {
            validate_password(password.expose())?;
            let hash = password::hash_password_blocking(password.into_inner()).await?;
            user.password_hash = Sensitive::new(hash);
        }

        user.updated_at = Utc::now();
        match self.users.update(&user).await {
            Ok(true) => {}
            Ok(false) => return Err(CoreError::NotFound("User not found".to_string())),
            Err(RepoError::DuplicateEmail) => {
                return Err(CoreError::Conflict("Email already in use".to_string()))
            }
            Err(e) => return Err(e.into()),
        }

        info!("Updated profile of user {}", user.id);
        Ok(user.profile())
    }

    async fn load(&self, user_id: Uuid) -> CoreResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("User not found".to_string()))
    }
}

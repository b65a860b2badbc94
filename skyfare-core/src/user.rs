use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult, Sensitive};

pub const MIN_PASSWORD_LEN: usize = 6;

/// A stored account. `password_hash` is an Argon2id PHC string.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Sensitive<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// What the API hands back for a user: never the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Sensitive<String>>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn validate_name(name: &str) -> CoreResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Name is required".to_string()));
    }
    Ok(name.to_string())
}

pub(crate) fn validate_email(email: &str) -> CoreResult<String> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(CoreError::Validation("Email is required".to_string()));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(CoreError::Validation("Please provide a valid email".to_string()));
    }
    Ok(email)
}

pub(crate) fn validate_password(password: &str) -> CoreResult<()> {
    if password.is_empty() {
        return Err(CoreError::Validation("Password is required".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(validate_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
    }

    #[test]
    fn test_email_rejects_garbage() {
        for bad in ["", "no-at-sign", "@example.com", "ada@", "a@b@c", "a da@example.com"] {
            assert!(
                matches!(validate_email(bad), Err(CoreError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_profile_omits_password() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: Sensitive::new("$argon2id$...".into()),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 3);
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}

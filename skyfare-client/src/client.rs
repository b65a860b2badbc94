use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use skyfare_core::{AuthResponse, Flight, NewFlight, ProfilePatch, PublicProfile, Sensitive};

use crate::error::{ClientError, ClientResult};
use crate::session::{SessionStore, StoredSession};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Search form input.
#[derive(Debug, Clone, Serialize)]
pub struct SearchForm {
    pub from: String,
    pub to: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub passengers: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Typed access to the HTTP API. The bearer token comes from the injected
/// [`SessionStore`] on every call.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn is_authenticated(&self) -> ClientResult<bool> {
        Ok(self.session.read()?.is_some())
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        Ok(match self.session.read()? {
            Some(stored) => builder.bearer_auth(stored.token.expose()),
            None => builder,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        Err(ClientError::Api { status, message })
    }

    fn remember(&self, auth: &AuthResponse) -> ClientResult<()> {
        self.session.write(&StoredSession {
            token: Sensitive::new(auth.token.clone()),
            user: Some(auth.user.clone()),
        })
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn register(&self, name: &str, email: &str, password: &Sensitive<String>) -> ClientResult<PublicProfile> {
        let response = self
            .request(Method::POST, "/auth/register")?
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        let auth: AuthResponse = Self::decode(response).await?;
        self.remember(&auth)?;
        Ok(auth.user)
    }

    pub async fn login(&self, email: &str, password: &Sensitive<String>) -> ClientResult<PublicProfile> {
        let response = self
            .request(Method::POST, "/auth/login")?
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let auth: AuthResponse = Self::decode(response).await?;
        self.remember(&auth)?;
        Ok(auth.user)
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.session.clear()
    }

    /// Loads the profile behind the stored token. A rejected token is dropped
    /// from the store so the next call starts out logged out.
    pub async fn current_user(&self) -> ClientResult<PublicProfile> {
        if !self.is_authenticated()? {
            return Err(ClientError::LoginRequired);
        }
        let response = self.request(Method::GET, "/users/me")?.send().await?;
        match Self::decode::<PublicProfile>(response).await {
            Err(err) if err.is_unauthorized() => {
                tracing::debug!("Stored token rejected, clearing session");
                self.session.clear()?;
                Err(err)
            }
            other => other,
        }
    }

    pub async fn update_profile(&self, patch: &ProfilePatch) -> ClientResult<PublicProfile> {
        let body = json!({
            "name": patch.name,
            "email": patch.email,
            "password": patch.password,
        });
        let response = self.request(Method::PUT, "/users/me")?.json(&body).send().await?;
        let profile: PublicProfile = Self::decode(response).await?;
        if let Some(mut stored) = self.session.read()? {
            stored.user = Some(profile.clone());
            self.session.write(&stored)?;
        }
        Ok(profile)
    }

    // ========================================================================
    // Flights
    // ========================================================================

    pub async fn search_flights(&self, form: &SearchForm) -> ClientResult<Vec<Flight>> {
        let response = self
            .request(Method::GET, "/flights/search")?
            .query(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn get_flight(&self, id: &str) -> ClientResult<Flight> {
        let response = self.request(Method::GET, &format!("/flights/{}", id))?.send().await?;
        Self::decode(response).await
    }

    pub async fn create_flight(&self, record: &NewFlight) -> ClientResult<Flight> {
        let response = self.request(Method::POST, "/flights")?.json(record).send().await?;
        Self::decode(response).await
    }

    /// Picking a flight from the results needs a logged-in user; without one
    /// the caller gets [`ClientError::LoginRequired`] and should prompt.
    pub async fn select_flight(&self, id: &str) -> ClientResult<Flight> {
        if !self.is_authenticated()? {
            return Err(ClientError::LoginRequired);
        }
        self.get_flight(id).await
    }
}

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use skyfare_api::{app, AppState};
use skyfare_client::{ApiClient, ClientError, MemorySessionStore, SearchForm, SessionStore};
use skyfare_core::{NewFlight, ProfilePatch, Sensitive, TokenKeys};
use skyfare_store::Repositories;

/// Serves the API on an ephemeral local port and returns its base URL.
async fn spawn_server() -> String {
    let tokens = TokenKeys::new("client-test-secret", 3600).unwrap();
    let router = app(AppState::new(Repositories::in_memory(), tokens));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn client(base_url: &str) -> (ApiClient, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    (ApiClient::new(base_url, store.clone()), store)
}

fn pw(s: &str) -> Sensitive<String> {
    Sensitive::new(s.to_string())
}

#[tokio::test]
async fn test_register_stores_session_and_logout_clears_it() {
    let base = spawn_server().await;
    let (api, store) = client(&base);

    let user = api.register("Ada", "ada@example.com", &pw("secret123")).await.unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert!(store.read().unwrap().is_some());

    let me = api.current_user().await.unwrap();
    assert_eq!(me.id, user.id);

    api.logout().unwrap();
    assert!(store.read().unwrap().is_none());
    assert!(matches!(api.current_user().await, Err(ClientError::LoginRequired)));
}

#[tokio::test]
async fn test_bad_login_surfaces_server_message() {
    let base = spawn_server().await;
    let (api, store) = client(&base);
    api.register("Ada", "ada@example.com", &pw("secret123")).await.unwrap();
    api.logout().unwrap();

    match api.login("ada@example.com", &pw("secret124")).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("unexpected result: {:?}", other.map(|u| u.id)),
    }
    assert!(store.read().unwrap().is_none());
}

#[tokio::test]
async fn test_rejected_token_is_cleared() {
    let base = spawn_server().await;
    let (api, store) = client(&base);
    store
        .write(&skyfare_client::StoredSession {
            token: Sensitive::new("stale.token.value".to_string()),
            user: None,
        })
        .unwrap();

    let err = api.current_user().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(store.read().unwrap().is_none());
}

#[tokio::test]
async fn test_select_flight_requires_login() {
    let base = spawn_server().await;
    let (api, _) = client(&base);
    api.register("Ada", "ada@example.com", &pw("secret123")).await.unwrap();

    let departure = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let flight = api
        .create_flight(&NewFlight {
            airline: Some("Vistara".into()),
            flight_number: Some("UK811".into()),
            departure_airport: Some("Delhi".into()),
            arrival_airport: Some("Jaipur".into()),
            departure_time: Some(departure),
            arrival_time: Some(departure + Duration::minutes(55)),
            price: Some(1500.0),
            currency: Some("INR".into()),
        })
        .await
        .unwrap();

    let selected = api.select_flight(&flight.id.to_string()).await.unwrap();
    assert_eq!(selected.id, flight.id);

    api.logout().unwrap();
    assert!(matches!(
        api.select_flight(&flight.id.to_string()).await,
        Err(ClientError::LoginRequired)
    ));

    // browsing stays open
    let results = api
        .search_flights(&SearchForm {
            from: "del".into(),
            to: "jai".into(),
            date: "2025-06-01".into(),
            passengers: 2,
        })
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].duration, "0h 55m");
}

#[tokio::test]
async fn test_update_profile_refreshes_stored_user() {
    let base = spawn_server().await;
    let (api, store) = client(&base);
    api.register("Ada", "ada@example.com", &pw("secret123")).await.unwrap();

    let patch = ProfilePatch {
        name: Some("Ada Lovelace".into()),
        ..Default::default()
    };
    let updated = api.update_profile(&patch).await.unwrap();
    assert_eq!(updated.name, "Ada Lovelace");
    assert_eq!(store.read().unwrap().unwrap().user.unwrap().name, "Ada Lovelace");
}

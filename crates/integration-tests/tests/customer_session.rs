//! Integration tests for customer sign-in and the stored session.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use secrecy::SecretString;
use serde_json::json;
use shine_core::AuthState;
use shine_integration_tests::{GRAPHQL_PATH, customer_client, customer_node, graphql_ok};
use shine_storefront::services::session::{NewCustomer, SessionError, SessionStore};
use shine_storefront::storage::{KeyValueStore, MemoryStore, keys};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMAIL: &str = "sam@example.com";

fn password() -> SecretString {
    SecretString::from("correct-horse-battery")
}

fn future_expiry() -> String {
    (Utc::now() + Duration::days(30)).to_rfc3339()
}

async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("CustomerAccessTokenCreate"))
        .and(body_partial_json(json!({ "variables": { "input": { "email": EMAIL } } })))
        .respond_with(graphql_ok(json!({
            "customerAccessTokenCreate": {
                "customerAccessToken": { "accessToken": token, "expiresAt": future_expiry() },
                "customerUserErrors": []
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_customer(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("GetCustomer"))
        .and(body_partial_json(json!({ "variables": { "customerAccessToken": token } })))
        .respond_with(graphql_ok(json!({ "customer": customer_node(EMAIL, "Sam", "Rivera") })))
        .mount(server)
        .await;
}

fn stored_session(token: &str, expiry: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.set(keys::ACCESS_TOKEN, token).unwrap();
    store.set(keys::TOKEN_EXPIRY, expiry).unwrap();
    store
}

// ============================================================================
// Sign In / Sign Up
// ============================================================================

#[tokio::test]
async fn test_sign_in_loads_customer_and_stores_token() {
    let server = MockServer::start().await;
    mount_token(&server, "tok-123").await;
    mount_customer(&server, "tok-123").await;

    let store = Arc::new(MemoryStore::new());
    let mut session = SessionStore::new(store.clone());
    let backend = customer_client(&server);

    let customer = session.sign_in(&backend, EMAIL, &password()).await.unwrap();

    assert_eq!(customer.display_name(), "Sam Rivera");
    assert_eq!(customer.orders.len(), 1);
    assert_eq!(customer.orders[0].formatted_order_number(), "#AP-1042");
    assert_eq!(session.state(), AuthState::SignedIn);
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok-123"));
    assert!(session.token_expiry().is_some());
}

#[tokio::test]
async fn test_wrong_password_is_rejected_with_shopify_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("CustomerAccessTokenCreate"))
        .respond_with(graphql_ok(json!({
            "customerAccessTokenCreate": {
                "customerAccessToken": null,
                "customerUserErrors": [{
                    "field": ["input"],
                    "message": "Unidentified customer",
                    "code": "UNIDENTIFIED_CUSTOMER"
                }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut session = SessionStore::new(store.clone());

    let err = session
        .sign_in(&customer_client(&server), EMAIL, &password())
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Rejected(ref message) if message == "Unidentified customer"));
    assert_eq!(session.state(), AuthState::SignedOut);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_malformed_email_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = SessionStore::new(Arc::new(MemoryStore::new()));
    let result = session
        .sign_in(&customer_client(&server), "not-an-email", &password())
        .await;

    assert!(matches!(result, Err(SessionError::InvalidEmail(_))));
}

#[tokio::test]
async fn test_sign_up_creates_account_then_signs_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("mutation CustomerCreate"))
        .and(body_partial_json(json!({
            "variables": { "input": { "email": EMAIL, "firstName": "Sam", "acceptsMarketing": true } }
        })))
        .respond_with(graphql_ok(json!({
            "customerCreate": {
                "customer": {
                    "id": "gid://shopify/Customer/7001",
                    "email": EMAIL,
                    "firstName": "Sam",
                    "lastName": "Rivera"
                },
                "customerUserErrors": []
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_token(&server, "tok-new").await;
    mount_customer(&server, "tok-new").await;

    let mut session = SessionStore::new(Arc::new(MemoryStore::new()));
    let profile = NewCustomer {
        first_name: Some("Sam".to_owned()),
        last_name: Some("Rivera".to_owned()),
        accepts_marketing: true,
    };

    let customer = session
        .sign_up(&customer_client(&server), EMAIL, &password(), profile)
        .await
        .unwrap();

    assert_eq!(customer.initials(), "SR");
    assert!(session.is_signed_in());
}

#[tokio::test]
async fn test_taken_email_is_rejected_on_sign_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("mutation CustomerCreate"))
        .respond_with(graphql_ok(json!({
            "customerCreate": {
                "customer": null,
                "customerUserErrors": [{
                    "field": ["input", "email"],
                    "message": "Email has already been taken",
                    "code": "TAKEN"
                }]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("CustomerAccessTokenCreate"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = SessionStore::new(Arc::new(MemoryStore::new()));
    let err = session
        .sign_up(&customer_client(&server), EMAIL, &password(), NewCustomer::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Email has already been taken");
    assert_eq!(session.state(), AuthState::SignedOut);
}

#[tokio::test]
async fn test_recover_password_posts_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("CustomerRecover"))
        .and(body_partial_json(json!({ "variables": { "email": EMAIL } })))
        .respond_with(graphql_ok(json!({ "customerRecover": { "customerUserErrors": [] } })))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::new(Arc::new(MemoryStore::new()));
    session
        .recover_password(&customer_client(&server), EMAIL)
        .await
        .unwrap();
}

// ============================================================================
// Restore
// ============================================================================

#[tokio::test]
async fn test_restore_resumes_stored_session() {
    let server = MockServer::start().await;
    mount_customer(&server, "tok-stored").await;

    let store = stored_session("tok-stored", &future_expiry());
    let mut session = SessionStore::new(store);

    let state = session.restore(&customer_client(&server)).await.unwrap();

    assert_eq!(state, AuthState::SignedIn);
    assert_eq!(session.customer().unwrap().email, EMAIL);
}

#[tokio::test]
async fn test_expired_token_signs_out_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let expired = (Utc::now() - Duration::hours(1)).to_rfc3339();
    let store = stored_session("tok-old", &expired);
    let mut session = SessionStore::new(store.clone());

    let state = session.restore(&customer_client(&server)).await.unwrap();

    assert_eq!(state, AuthState::SignedOut);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_revoked_token_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("GetCustomer"))
        .respond_with(graphql_ok(json!({ "customer": null })))
        .expect(1)
        .mount(&server)
        .await;

    let store = stored_session("tok-revoked", &future_expiry());
    let mut session = SessionStore::new(store.clone());

    let state = session.restore(&customer_client(&server)).await.unwrap();

    assert_eq!(state, AuthState::SignedOut);
    assert!(store.get(keys::ACCESS_TOKEN).unwrap().is_none());
}

#[tokio::test]
async fn test_network_failure_keeps_token_for_next_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_customer(&server, "tok-stored").await;

    let store = stored_session("tok-stored", &future_expiry());
    let mut session = SessionStore::new(store.clone());
    let backend = customer_client(&server);

    let first = session.restore(&backend).await;
    assert!(matches!(first, Err(SessionError::Network(_))));
    assert_eq!(session.state(), AuthState::SignedOut);
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok-stored"));

    let second = session.restore(&backend).await.unwrap();
    assert_eq!(second, AuthState::SignedIn);
}

#[tokio::test]
async fn test_sign_out_forgets_stored_token() {
    let server = MockServer::start().await;
    mount_customer(&server, "tok-stored").await;

    let store = stored_session("tok-stored", &future_expiry());
    let mut session = SessionStore::new(store.clone());
    session.restore(&customer_client(&server)).await.unwrap();

    session.sign_out();

    assert_eq!(session.state(), AuthState::SignedOut);
    assert!(session.customer().is_none());
    assert!(store.is_empty());
}

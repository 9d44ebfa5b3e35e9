mod support;

use client_lib::interaction::auth::{self, SessionStatus};
use client_lib::interaction::FlowError;
use coach_core::domain::{Credentials, SessionToken, SignupDetails};
use coach_core::ports::TokenStore;
use serde_json::json;
use support::{Harness, Step};

fn credentials() -> Credentials {
    Credentials {
        email: "sam@example.com".into(),
        password: "hunter2".into(),
    }
}

#[tokio::test]
async fn login_stores_the_token_for_later_calls() {
    let harness = Harness::new(vec![
        Step::Respond(200, json!({"access_token": "fresh", "token_type": "bearer"})),
        Step::Respond(200, json!({"id": 1, "email": "sam@example.com"})),
    ])
    .await;

    auth::login(&harness.state, &credentials()).await.unwrap();

    assert_eq!(
        harness.store.get().await.unwrap(),
        Some(SessionToken::new("fresh"))
    );
    assert_eq!(
        auth::check_session(&harness.state).await.unwrap(),
        SessionStatus::SignedIn
    );

    let calls = harness.transport.calls();
    assert_eq!(calls[0].operation.path, "/api/auth/login");
    assert!(calls[0].token.is_none());
    assert_eq!(calls[1].token, Some(SessionToken::new("fresh")));
}

#[tokio::test]
async fn wrong_credentials_show_the_server_detail() {
    let mut harness = Harness::new(vec![Step::Respond(
        401,
        json!({"detail": "Incorrect email or password"}),
    )])
    .await;

    let err = auth::login(&harness.state, &credentials()).await.unwrap_err();

    assert_eq!(err.to_string(), "Incorrect email or password");
    assert!(harness.store.get().await.unwrap().is_none());
    assert!(harness.drain_events().is_empty());
}

#[tokio::test]
async fn a_mistyped_password_keeps_the_current_session() {
    let mut harness = Harness::signed_in(
        vec![Step::Respond(
            401,
            json!({"detail": "Incorrect email or password"}),
        )],
        "still-valid",
    )
    .await;

    let err = auth::login(&harness.state, &credentials()).await.unwrap_err();

    assert_eq!(err.to_string(), "Incorrect email or password");
    assert!(harness.transport.calls()[0].token.is_none());
    assert_eq!(harness.store.clears(), 0);
    assert!(harness.state.tokens.is_signed_in().await);
    assert_eq!(
        harness.store.get().await.unwrap(),
        Some(SessionToken::new("still-valid"))
    );
    assert!(harness.drain_events().is_empty());
}

#[tokio::test]
async fn blank_fields_are_rejected_locally() {
    let harness = Harness::new(vec![]).await;

    let err = auth::signup(
        &harness.state,
        &SignupDetails {
            name: "Sam".into(),
            email: " ".into(),
            password: "pw".into(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FlowError::Invalid(_)));
    assert_eq!(err.to_string(), "Please fill in all fields");
    assert_eq!(harness.transport.call_count(), 0);
}

#[tokio::test]
async fn signup_does_not_sign_in() {
    let harness = Harness::new(vec![Step::Respond(200, json!({"id": 3}))]).await;

    auth::signup(
        &harness.state,
        &SignupDetails {
            name: "Sam".into(),
            email: "sam@example.com".into(),
            password: "pw".into(),
        },
    )
    .await
    .unwrap();

    assert!(!harness.state.tokens.is_signed_in().await);
    assert_eq!(harness.transport.calls()[0].operation.path, "/api/auth/register");
}

#[tokio::test]
async fn a_failed_session_check_signs_out() {
    let harness = Harness::signed_in(vec![Step::Respond(500, json!({}))], "old").await;

    let status = auth::check_session(&harness.state).await.unwrap();

    assert_eq!(status, SessionStatus::SignedOut);
    assert!(harness.store.get().await.unwrap().is_none());
}

#[tokio::test]
async fn no_token_means_no_session_check() {
    let harness = Harness::new(vec![]).await;

    assert_eq!(
        auth::check_session(&harness.state).await.unwrap(),
        SessionStatus::SignedOut
    );
    assert_eq!(harness.transport.call_count(), 0);
}

#[tokio::test]
async fn logout_clears_the_store() {
    let harness = Harness::signed_in(vec![], "tok").await;

    auth::logout(&harness.state).await.unwrap();

    assert!(harness.store.get().await.unwrap().is_none());
    assert_eq!(harness.store.clears(), 1);
}

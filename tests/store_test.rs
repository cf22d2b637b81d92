use chrono::{TimeZone, Utc};
use guessthebeat::{
    management::TokenStore,
    types::{Token, TokenError},
};

fn sample() -> Token {
    Token {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
        error: None,
    }
}

#[tokio::test]
async fn persist_creates_missing_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TokenStore::at(dir.path().join("nested/cache/token.json"));

    store.persist(&sample()).await.expect("persist");
    assert_eq!(store.load().await.expect("load"), sample());
}

#[tokio::test]
async fn errored_token_keeps_its_marker() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TokenStore::at(dir.path().join("token.json"));
    let dead = Token {
        error: Some(TokenError::RefreshFailed),
        ..sample()
    };

    store.persist(&dead).await.expect("persist");
    let raw = std::fs::read_to_string(store.path()).expect("read");
    assert!(raw.contains("RefreshAccessTokenError"));
    assert_eq!(
        store.load().await.expect("load").error,
        Some(TokenError::RefreshFailed)
    );
}

#[tokio::test]
async fn clear_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TokenStore::at(dir.path().join("token.json"));

    store.clear().await.expect("clear missing");
    store.persist(&sample()).await.expect("persist");
    store.clear().await.expect("clear");
    assert!(store.load().await.is_err());
}

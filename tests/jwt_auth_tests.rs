// SPDX-License-Identifier: MIT

//! JWT session tests.
//!
//! These verify that tokens minted by the auth routes can be decoded by the
//! auth middleware, and that the router rejects bad tokens.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use smartmark::middleware::auth::{create_jwt, Claims};
use tower::ServiceExt;

mod common;

#[test]
fn test_jwt_roundtrip() {
    let signing_key = b"test_signing_key_32_bytes_long!!";

    let token = create_jwt("a@example.com", Some("u1".to_string()), signing_key).unwrap();

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, "a@example.com");
    assert_eq!(token_data.claims.uid.as_deref(), Some("u1"));
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_jwt_without_resolved_user_id() {
    // Sessions can exist before the identity bridge resolves an id.
    let signing_key = b"test_signing_key_32_bytes_long!!";

    let token = create_jwt("a@example.com", None, signing_key).unwrap();

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(&token, &key, &validation).unwrap();

    assert_eq!(token_data.claims.uid, None);
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/bookmarks?userId=u1")
                .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_wrong_key_is_unauthorized() {
    let (app, _state) = common::create_test_app();

    let token = create_jwt("a@example.com", Some("u1".to_string()), b"some_other_key").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/bookmarks?userId=u1")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_without_resolved_id_fails_closed() {
    let (app, state) = common::create_test_app();

    // Valid session, but the identity bridge never resolved a user id.
    let token = create_jwt("a@example.com", None, &state.config.jwt_signing_key).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/bookmarks?userId=u1")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

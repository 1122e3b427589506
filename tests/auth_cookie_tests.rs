// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie attribute tests.
//!
//! These tests verify that the session cookie set at login and the removal
//! cookie sent on logout carry matching attributes for localhost and
//! production-style hosts.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use strava_dashboard::middleware::auth::{create_session_token, SESSION_COOKIE};
use tower::ServiceExt;
use wiremock::MockServer;

mod common;

fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

async fn login_cookie(host: &str) -> String {
    let server = MockServer::start().await;
    let (app, _) = common::create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/auth/strava")
                .header(header::HOST, host)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    find_cookie(&set_cookie_headers(&response), SESSION_COOKIE)
}

async fn logout_cookie(host: &str) -> String {
    let server = MockServer::start().await;
    let (app, _) = common::create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::HOST, host)
                .header(header::COOKIE, format!("{SESSION_COOKIE}=stale"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    find_cookie(&set_cookie_headers(&response), SESSION_COOKIE)
}

#[tokio::test]
async fn test_login_cookie_localhost_attributes() {
    let cookie = login_cookie("localhost:8050").await;

    assert!(cookie.contains("HttpOnly"), "{cookie}");
    assert!(cookie.contains("SameSite=Lax"), "{cookie}");
    assert!(cookie.contains("Path=/"), "{cookie}");
    assert!(cookie.contains("Max-Age=2592000"), "{cookie}");
    assert!(!cookie.contains("Secure"), "{cookie}");
}

#[tokio::test]
async fn test_login_cookie_production_attributes() {
    let cookie = login_cookie("dashboard.example.com").await;

    assert!(cookie.contains("HttpOnly"), "{cookie}");
    assert!(cookie.contains("Secure"), "{cookie}");
}

#[tokio::test]
async fn test_logout_cookie_removal_localhost_attributes() {
    let cookie = logout_cookie("localhost:8050").await;

    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=;")), "{cookie}");
    assert!(cookie.contains("Max-Age=0"), "{cookie}");
    assert!(cookie.contains("Path=/"), "{cookie}");
    assert!(cookie.contains("HttpOnly"), "{cookie}");
    assert!(cookie.contains("SameSite=Lax"), "{cookie}");
    assert!(!cookie.contains("Secure"), "{cookie}");
}

#[tokio::test]
async fn test_logout_cookie_removal_production_attributes() {
    let cookie = logout_cookie("dashboard.example.com").await;

    assert!(cookie.contains("Max-Age=0"), "{cookie}");
    assert!(cookie.contains("Secure"), "{cookie}");
}

#[tokio::test]
async fn test_logout_drops_server_session() {
    let server = MockServer::start().await;
    let (app, state) = common::create_test_app(&server);

    let id = state.sessions.create().unwrap();
    assert!(state
        .sessions
        .update(&id, common::authenticated_session(common::now() + 3600)));
    let token = create_session_token(&id, &state.config.session_signing_key).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/auth/logout")
                .header(header::COOKIE, format!("{SESSION_COOKIE}={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(state.sessions.get(&id).is_none());
}

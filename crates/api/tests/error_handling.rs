//! Tests for `AppError` -> HTTP response mapping.
//!
//! These tests verify that each `AppError` variant produces the correct
//! HTTP status code, error code, and message. They do NOT need an HTTP
//! server -- they call `IntoResponse` directly on `AppError` values.

use axum::response::IntoResponse;
use http_body_util::BodyExt;
use tagalong_api::error::AppError;
use tagalong_core::error::LobbyError;
use tagalong_core::status::RideStatus;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (axum::http::StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: NotFound maps to 404 with NOT_FOUND code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Lobby(LobbyError::NotFound {
        entity: "Ride",
        key: "42".to_string(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Ride not found: 42");
}

// ---------------------------------------------------------------------------
// Test: Capacity and membership violations map to 409
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lobby_full_returns_409() {
    let err = AppError::Lobby(LobbyError::LobbyFull { max_passengers: 4 });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(json["code"], "LOBBY_FULL");
}

#[tokio::test]
async fn lobby_closed_returns_409() {
    let err = AppError::Lobby(LobbyError::LobbyClosed {
        status: RideStatus::InTransit,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(json["code"], "LOBBY_CLOSED");
    assert!(json["error"].as_str().unwrap().contains("in_transit"));
}

#[tokio::test]
async fn already_member_returns_409() {
    let (status, json) = error_to_response(AppError::Lobby(LobbyError::AlreadyMember)).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(json["code"], "ALREADY_MEMBER");
}

#[tokio::test]
async fn invalid_transition_returns_409() {
    let err = AppError::Lobby(LobbyError::InvalidTransition {
        status: RideStatus::Completed,
        operation: "cancel",
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_TRANSITION");
}

// ---------------------------------------------------------------------------
// Test: Role and permission violations map to 403
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creator_cannot_leave_returns_403() {
    let (status, json) = error_to_response(AppError::Lobby(LobbyError::CreatorCannotLeave)).await;

    assert_eq!(status, axum::http::StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "CREATOR_CANNOT_LEAVE");
}

#[tokio::test]
async fn not_authorized_for_transition_returns_403() {
    let err = AppError::Lobby(LobbyError::NotAuthorizedForTransition(
        "only the assigned driver can start transport".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "NOT_AUTHORIZED");
}

// ---------------------------------------------------------------------------
// Test: Configuration and identity errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_configuration_returns_400() {
    let err = AppError::Lobby(LobbyError::InvalidConfiguration(
        "max_passengers must be between 1 and 4, got 9".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_CONFIGURATION");
}

#[tokio::test]
async fn unauthorized_returns_401() {
    let err = AppError::Unauthorized("Missing Authorization header".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

// ---------------------------------------------------------------------------
// Test: Internal errors are sanitized
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

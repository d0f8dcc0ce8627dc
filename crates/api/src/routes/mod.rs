pub mod health;
pub mod rides;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /rides                           list active lobbies, create
/// /rides/mine                      rides involving the caller
/// /rides/{id}                      ride + members
/// /rides/code/{code}               share-code lookup
/// /rides/{id}/join                 join as passenger (POST)
/// /rides/{id}/leave                leave the lobby (POST)
/// /rides/{id}/accept               accept transport duty (POST)
/// /rides/{id}/start                start transport (POST)
/// /rides/{id}/complete             complete the trip (POST)
/// /rides/{id}/cancel               cancel the ride (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/rides", rides::router())
}

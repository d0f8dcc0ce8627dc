//! Route definitions for the `/rides` resource.
//!
//! All endpoints require an authenticated identity.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rides;
use crate::state::AppState;

/// Routes mounted at `/rides`.
///
/// ```text
/// GET    /                 -> list_active
/// POST   /                 -> create_ride
/// GET    /mine             -> list_mine
/// GET    /{id}             -> get_ride
/// GET    /code/{code}      -> get_by_share_code
/// POST   /{id}/join        -> join_ride
/// POST   /{id}/leave       -> leave_ride
/// POST   /{id}/accept      -> accept_transport
/// POST   /{id}/start       -> start_transport
/// POST   /{id}/complete    -> complete_ride
/// POST   /{id}/cancel      -> cancel_ride
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rides::list_active).post(rides::create_ride))
        .route("/mine", get(rides::list_mine))
        .route("/{id}", get(rides::get_ride))
        .route("/code/{code}", get(rides::get_by_share_code))
        .route("/{id}/join", post(rides::join_ride))
        .route("/{id}/leave", post(rides::leave_ride))
        .route("/{id}/accept", post(rides::accept_transport))
        .route("/{id}/start", post(rides::start_transport))
        .route("/{id}/complete", post(rides::complete_ride))
        .route("/{id}/cancel", post(rides::cancel_ride))
}

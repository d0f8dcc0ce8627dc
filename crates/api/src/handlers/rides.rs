//! Handlers for the `/rides` resource.
//!
//! All endpoints require an authenticated identity via [`AuthUser`]. The
//! handlers are thin: guard evaluation and every mutation run inside the
//! repository layer's transactions; here we only translate HTTP in and
//! out. Polling clients re-read these endpoints freely -- every read is a
//! plain point-in-time snapshot.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tagalong_core::error::LobbyError;
use tagalong_core::types::DbId;
use tagalong_db::models::ride::{CreateRide, Ride, RideDetail};
use tagalong_db::repositories::{RideMemberRepo, RideRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a ride by ID or return `NotFound`.
async fn find_ride(pool: &sqlx::PgPool, ride_id: DbId) -> AppResult<Ride> {
    RideRepo::find_by_id(pool, ride_id)
        .await?
        .ok_or(AppError::Lobby(LobbyError::NotFound {
            entity: "Ride",
            key: ride_id.to_string(),
        }))
}

/// Attach the current member list to a ride.
async fn with_members(pool: &sqlx::PgPool, ride: Ride) -> AppResult<RideDetail> {
    let members = RideMemberRepo::list_for_ride(pool, ride.id).await?;
    Ok(RideDetail { ride, members })
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/rides
///
/// Open a new lobby. Returns 201 with the ride and its member list (the
/// creator, auto-joined). The share code in the response is the
/// out-of-band invitation token.
pub async fn create_ride(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRide>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let ride = RideRepo::create(&state.pool, auth.user_id, &auth.display_name, &input).await?;

    tracing::info!(
        ride_id = ride.id,
        share_code = %ride.share_code,
        user_id = %auth.user_id,
        "Ride created",
    );

    let detail = with_members(&state.pool, ride).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/rides
///
/// List open lobbies (status `waiting` or `accepted`), newest first.
pub async fn list_active(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rides = RideRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: rides }))
}

/// GET /api/v1/rides/mine
///
/// List every ride the caller participates in, as creator, driver, or
/// passenger.
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rides = RideRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: rides }))
}

/// GET /api/v1/rides/{id}
///
/// Get a single ride with its member list.
pub async fn get_ride(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(ride_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ride = find_ride(&state.pool, ride_id).await?;
    let detail = with_members(&state.pool, ride).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/rides/code/{code}
///
/// Resolve a share code (any letter case) to its ride.
pub async fn get_by_share_code(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let ride = RideRepo::find_by_share_code(&state.pool, &code)
        .await?
        .ok_or(AppError::Lobby(LobbyError::NotFound {
            entity: "Ride",
            key: code,
        }))?;

    let detail = with_members(&state.pool, ride).await?;
    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// POST /api/v1/rides/{id}/join
///
/// Join the lobby as a passenger. Capacity is enforced atomically; when
/// two callers race for the last seat, exactly one succeeds and the other
/// receives 409 `LOBBY_FULL`.
pub async fn join_ride(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ride_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    RideMemberRepo::join(&state.pool, ride_id, auth.user_id, &auth.display_name).await?;

    tracing::info!(ride_id, user_id = %auth.user_id, "Passenger joined");

    let ride = find_ride(&state.pool, ride_id).await?;
    let detail = with_members(&state.pool, ride).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/rides/{id}/leave
///
/// Leave the lobby. The creator cannot leave (403); a second leave by the
/// same user yields 404 `NOT_A_MEMBER`. Returns 204 on success.
pub async fn leave_ride(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ride_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    RideMemberRepo::leave(&state.pool, ride_id, auth.user_id).await?;

    tracing::info!(ride_id, user_id = %auth.user_id, "Passenger left");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/rides/{id}/accept
///
/// Accept transport duty. Assigns the caller as the ride's driver (set
/// exactly once) and moves the ride to `accepted`.
pub async fn accept_transport(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ride_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ride =
        RideRepo::accept_transport(&state.pool, ride_id, auth.user_id, &auth.display_name).await?;

    tracing::info!(ride_id, driver_id = %auth.user_id, "Transport accepted");

    Ok(Json(DataResponse { data: ride }))
}

/// POST /api/v1/rides/{id}/start
///
/// Start transport. Only the assigned driver may call this; membership is
/// frozen from here until the ride reaches a terminal state.
pub async fn start_transport(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ride_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ride = RideRepo::start_transport(&state.pool, ride_id, auth.user_id).await?;

    tracing::info!(ride_id, driver_id = %auth.user_id, "Transport started");

    Ok(Json(DataResponse { data: ride }))
}

/// POST /api/v1/rides/{id}/complete
///
/// Complete the trip. Allowed for the driver or the creator, only from
/// `in_transit`.
pub async fn complete_ride(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ride_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ride = RideRepo::complete(&state.pool, ride_id, auth.user_id).await?;

    tracing::info!(ride_id, user_id = %auth.user_id, "Ride completed");

    Ok(Json(DataResponse { data: ride }))
}

/// POST /api/v1/rides/{id}/cancel
///
/// Cancel the ride from any non-terminal state. Allowed for the creator
/// or the driver.
pub async fn cancel_ride(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ride_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ride = RideRepo::cancel(&state.pool, ride_id, auth.user_id).await?;

    tracing::info!(ride_id, user_id = %auth.user_id, "Ride cancelled");

    Ok(Json(DataResponse { data: ride }))
}

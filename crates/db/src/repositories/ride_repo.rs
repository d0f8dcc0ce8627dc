//! Repository for the `rides` table: creation, lookup, and every
//! state-machine transition.
//!
//! Transitions follow one shape: begin a transaction, lock the ride row
//! with `SELECT ... FOR UPDATE`, evaluate the pure guard from
//! `tagalong_core::lobby` against the locked snapshot, apply the update,
//! commit. The row lock serializes concurrent writers to one ride;
//! operations on different rides never contend.

use sqlx::{PgPool, Postgres, Transaction};
use tagalong_core::error::LobbyError;
use tagalong_core::lobby::{self, RideState};
use tagalong_core::share_code;
use tagalong_core::status::RideStatus;
use tagalong_core::types::{DbId, Timestamp, UserId};

use crate::error::{RepoError, RepoResult};
use crate::models::ride::{CreateRide, Ride};

/// Column list for `rides` queries.
const COLUMNS: &str = "\
    id, share_code, creator_id, driver_id, driver_name, \
    origin_name, origin_lat, origin_lng, \
    destination_name, destination_lat, destination_lng, \
    max_passengers, status_id, note, created_at, updated_at";

/// How many share codes to try before giving up on collisions.
///
/// With a 32-character alphabet and 6 positions, even one retry is rare
/// until the table holds hundreds of millions of rides.
const MAX_SHARE_CODE_ATTEMPTS: u32 = 8;

/// Provides storage operations for rides and their state machine.
pub struct RideRepo;

impl RideRepo {
    /// Create a new ride in `waiting` with the creator auto-joined as the
    /// sole member, both inserted in one transaction.
    ///
    /// The share code is regenerated on a `uq_rides_share_code` collision.
    pub async fn create(
        pool: &PgPool,
        creator_id: UserId,
        creator_name: &str,
        input: &CreateRide,
    ) -> RepoResult<Ride> {
        lobby::validate_max_passengers(input.max_passengers)?;

        for attempt in 1..=MAX_SHARE_CODE_ATTEMPTS {
            let code = share_code::generate();
            match Self::try_insert(pool, creator_id, creator_name, input, &code).await {
                Ok(ride) => return Ok(ride),
                Err(e) if is_share_code_collision(&e) => {
                    tracing::debug!(attempt, "Share code collision, regenerating");
                }
                Err(e) => return Err(RepoError::Db(e)),
            }
        }

        Err(RepoError::ShareCodeExhausted {
            attempts: MAX_SHARE_CODE_ATTEMPTS,
        })
    }

    /// One creation attempt with a fixed share code.
    async fn try_insert(
        pool: &PgPool,
        creator_id: UserId,
        creator_name: &str,
        input: &CreateRide,
        code: &str,
    ) -> Result<Ride, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO rides \
                 (share_code, creator_id, origin_name, origin_lat, origin_lng, \
                  destination_name, destination_lat, destination_lng, \
                  max_passengers, status_id, note) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        let ride = sqlx::query_as::<_, Ride>(&query)
            .bind(code)
            .bind(creator_id)
            .bind(&input.origin.name)
            .bind(input.origin.lat)
            .bind(input.origin.lng)
            .bind(&input.destination.name)
            .bind(input.destination.lat)
            .bind(input.destination.lng)
            .bind(input.max_passengers)
            .bind(RideStatus::Waiting.id())
            .bind(&input.note)
            .fetch_one(&mut *tx)
            .await?;

        // The creator holds a membership row from the instant the ride
        // exists; `leave` can never remove it.
        sqlx::query(
            "INSERT INTO ride_members (ride_id, user_id, display_name) VALUES ($1, $2, $3)",
        )
        .bind(ride.id)
        .bind(creator_id)
        .bind(creator_name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ride)
    }

    /// Find a ride by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ride>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rides WHERE id = $1");
        sqlx::query_as::<_, Ride>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a ride by its share code, case-insensitively.
    pub async fn find_by_share_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<Ride>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rides WHERE share_code = $1");
        sqlx::query_as::<_, Ride>(&query)
            .bind(share_code::normalize(code))
            .fetch_optional(pool)
            .await
    }

    /// List open lobbies (status `waiting` or `accepted`), newest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Ride>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rides \
             WHERE status_id IN ($1, $2) \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Ride>(&query)
            .bind(RideStatus::Waiting.id())
            .bind(RideStatus::Accepted.id())
            .fetch_all(pool)
            .await
    }

    /// List every ride the user participates in, as creator, driver, or
    /// passenger, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: UserId) -> Result<Vec<Ride>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rides \
             WHERE creator_id = $1 \
                OR driver_id = $1 \
                OR id IN (SELECT ride_id FROM ride_members WHERE user_id = $1) \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Ride>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Assign the caller as driver and move the ride to `accepted`.
    pub async fn accept_transport(
        pool: &PgPool,
        ride_id: DbId,
        user_id: UserId,
        user_name: &str,
    ) -> RepoResult<Ride> {
        let mut tx = pool.begin().await?;
        let ride = Self::lock_ride(&mut tx, ride_id).await?;
        lobby::check_accept_transport(&ride.state()?, user_id)?;

        let query = format!(
            "UPDATE rides \
             SET driver_id = $2, driver_name = $3, status_id = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Ride>(&query)
            .bind(ride_id)
            .bind(user_id)
            .bind(user_name)
            .bind(RideStatus::Accepted.id())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Move the ride to `in_transit`. Membership is frozen from here on.
    pub async fn start_transport(
        pool: &PgPool,
        ride_id: DbId,
        user_id: UserId,
    ) -> RepoResult<Ride> {
        Self::transition(
            pool,
            ride_id,
            user_id,
            RideStatus::InTransit,
            lobby::check_start_transport,
        )
        .await
    }

    /// Move the ride to the terminal `completed` state.
    pub async fn complete(pool: &PgPool, ride_id: DbId, user_id: UserId) -> RepoResult<Ride> {
        Self::transition(
            pool,
            ride_id,
            user_id,
            RideStatus::Completed,
            lobby::check_complete,
        )
        .await
    }

    /// Move the ride to the terminal `cancelled` state.
    pub async fn cancel(pool: &PgPool, ride_id: DbId, user_id: UserId) -> RepoResult<Ride> {
        Self::transition(
            pool,
            ride_id,
            user_id,
            RideStatus::Cancelled,
            lobby::check_cancel,
        )
        .await
    }

    /// Delete terminal rides whose `updated_at` is older than `cutoff`.
    ///
    /// Housekeeping only: the status filter guarantees a non-terminal ride
    /// is never swept, regardless of age.
    pub async fn delete_terminal_older_than(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM rides WHERE status_id IN ($1, $2) AND updated_at < $3",
        )
        .bind(RideStatus::Completed.id())
        .bind(RideStatus::Cancelled.id())
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Shared guard-then-update sequence for pure status transitions.
    async fn transition(
        pool: &PgPool,
        ride_id: DbId,
        user_id: UserId,
        to: RideStatus,
        guard: fn(&RideState, UserId) -> Result<(), LobbyError>,
    ) -> RepoResult<Ride> {
        let mut tx = pool.begin().await?;
        let ride = Self::lock_ride(&mut tx, ride_id).await?;
        guard(&ride.state()?, user_id)?;

        let query = format!(
            "UPDATE rides SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Ride>(&query)
            .bind(ride_id)
            .bind(to.id())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Lock a ride row for the duration of a guard-then-mutate sequence.
    pub(crate) async fn lock_ride(
        tx: &mut Transaction<'_, Postgres>,
        ride_id: DbId,
    ) -> RepoResult<Ride> {
        let query = format!("SELECT {COLUMNS} FROM rides WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Ride>(&query)
            .bind(ride_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| {
                RepoError::Lobby(LobbyError::NotFound {
                    entity: "Ride",
                    key: ride_id.to_string(),
                })
            })
    }
}

/// Whether an insert failed on the share-code uniqueness constraint
/// (PostgreSQL SQLSTATE 23505).
fn is_share_code_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("uq_rides_share_code")
        }
        _ => false,
    }
}

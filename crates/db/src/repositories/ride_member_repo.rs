//! Repository for the `ride_members` table: passenger membership.
//!
//! The capacity invariant (`count(members) <= max_passengers`) is enforced
//! here. Reading the count and inserting the row happen inside one
//! transaction that holds a `FOR UPDATE` lock on the ride, so the
//! check-then-insert sequence is atomic: two joins racing for the last
//! seat cannot both pass the check. The count is always derived from the
//! membership rows, never cached.

use sqlx::PgPool;
use tagalong_core::lobby;
use tagalong_core::types::{DbId, UserId};

use crate::error::RepoResult;
use crate::models::ride::RideMember;
use crate::repositories::RideRepo;

/// Column list for `ride_members` queries.
const COLUMNS: &str = "id, ride_id, user_id, display_name, joined_at";

/// Provides membership operations for rides.
pub struct RideMemberRepo;

impl RideMemberRepo {
    /// List a ride's members in join order.
    pub async fn list_for_ride(
        pool: &PgPool,
        ride_id: DbId,
    ) -> Result<Vec<RideMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ride_members \
             WHERE ride_id = $1 \
             ORDER BY joined_at ASC, id ASC"
        );
        sqlx::query_as::<_, RideMember>(&query)
            .bind(ride_id)
            .fetch_all(pool)
            .await
    }

    /// Count a ride's members.
    pub async fn count_for_ride(pool: &PgPool, ride_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ride_members WHERE ride_id = $1")
            .bind(ride_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Add a passenger to a ride.
    pub async fn join(
        pool: &PgPool,
        ride_id: DbId,
        user_id: UserId,
        display_name: &str,
    ) -> RepoResult<RideMember> {
        let mut tx = pool.begin().await?;
        let ride = RideRepo::lock_ride(&mut tx, ride_id).await?;

        let already_member: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM ride_members WHERE ride_id = $1 AND user_id = $2)",
        )
        .bind(ride_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let member_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ride_members WHERE ride_id = $1")
                .bind(ride_id)
                .fetch_one(&mut *tx)
                .await?;

        lobby::check_join(&ride.state()?, user_id, already_member, member_count)?;

        let query = format!(
            "INSERT INTO ride_members (ride_id, user_id, display_name) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let member = sqlx::query_as::<_, RideMember>(&query)
            .bind(ride_id)
            .bind(user_id)
            .bind(display_name)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE rides SET updated_at = NOW() WHERE id = $1")
            .bind(ride_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(member)
    }

    /// Remove a passenger from a ride.
    ///
    /// The status re-check runs under the same row lock as the delete, so
    /// a leave racing a `start_transport` or `cancel` observes the final
    /// status. Leaving twice reports `NotAMember` the second time.
    pub async fn leave(pool: &PgPool, ride_id: DbId, user_id: UserId) -> RepoResult<()> {
        let mut tx = pool.begin().await?;
        let ride = RideRepo::lock_ride(&mut tx, ride_id).await?;

        let is_member: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM ride_members WHERE ride_id = $1 AND user_id = $2)",
        )
        .bind(ride_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        lobby::check_leave(&ride.state()?, user_id, is_member)?;

        sqlx::query("DELETE FROM ride_members WHERE ride_id = $1 AND user_id = $2")
            .bind(ride_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE rides SET updated_at = NOW() WHERE id = $1")
            .bind(ride_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

//! Ride and membership entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tagalong_core::lobby::RideState;
use tagalong_core::status::{RideStatus, StatusId};
use tagalong_core::types::{DbId, Timestamp, UserId};
use validator::Validate;

/// A row from the `rides` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ride {
    pub id: DbId,
    pub share_code: String,
    pub creator_id: UserId,
    pub driver_id: Option<UserId>,
    pub driver_name: Option<String>,
    pub origin_name: String,
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub destination_name: String,
    pub destination_lat: f64,
    pub destination_lng: f64,
    pub max_passengers: i16,
    pub status_id: StatusId,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ride {
    /// Decode `status_id` into the domain enum.
    ///
    /// The foreign key to `ride_statuses` means an unknown id can only
    /// appear if the seed data and the enum disagree.
    pub fn status(&self) -> Result<RideStatus, sqlx::Error> {
        RideStatus::from_id(self.status_id).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown ride status id {}", self.status_id).into())
        })
    }

    /// Snapshot of the state-machine fields for guard evaluation.
    pub fn state(&self) -> Result<RideState, sqlx::Error> {
        Ok(RideState {
            creator_id: self.creator_id,
            driver_id: self.driver_id,
            status: self.status()?,
            max_passengers: self.max_passengers,
        })
    }
}

/// A row from the `ride_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RideMember {
    pub id: DbId,
    pub ride_id: DbId,
    pub user_id: UserId,
    pub display_name: String,
    pub joined_at: Timestamp,
}

/// A named coordinate used for ride origin and destination.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Place {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

/// DTO for creating a ride via `POST /api/v1/rides`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRide {
    #[validate(nested)]
    pub origin: Place,
    #[validate(nested)]
    pub destination: Place,
    /// Seats available, including the creator's. Range-checked by the
    /// lobby engine (1 to 4), not by the DTO validator.
    pub max_passengers: i16,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// A ride together with its current passenger list.
#[derive(Debug, Serialize)]
pub struct RideDetail {
    pub ride: Ride,
    pub members: Vec<RideMember>,
}

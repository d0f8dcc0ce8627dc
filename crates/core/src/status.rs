//! Ride lifecycle status mapping to the `ride_statuses` SMALLINT lookup table.
//!
//! Discriminants match the seed data order (1-based) in the database.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Ride lifecycle status.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    /// Lobby is open: waiting for passengers and a driver.
    Waiting = 1,
    /// A driver accepted transport duty; passengers may still join or leave.
    Accepted = 2,
    /// Transport started. Membership is frozen.
    InTransit = 3,
    /// Trip finished. Terminal.
    Completed = 4,
    /// Lobby abandoned by the creator or driver. Terminal.
    Cancelled = 5,
}

impl RideStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Waiting),
            2 => Some(Self::Accepted),
            3 => Some(Self::InTransit),
            4 => Some(Self::Completed),
            5 => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Terminal states permit no further mutation.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether passengers may still join or leave.
    pub fn accepts_membership_changes(self) -> bool {
        matches!(self, Self::Waiting | Self::Accepted)
    }

    /// Lowercase name matching the `name` column of the lookup table.
    pub fn name(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Accepted => "accepted",
            Self::InTransit => "in_transit",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl From<RideStatus> for StatusId {
    fn from(value: RideStatus) -> Self {
        value as StatusId
    }
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

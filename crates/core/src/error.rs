use crate::status::RideStatus;

/// Domain errors for lobby operations.
///
/// Every guard violation maps to exactly one variant so the gateway can
/// hand the caller a specific, actionable failure. Storage errors are not
/// represented here; they stay in the repository layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Invalid ride configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Lobby is closed to membership changes (status: {status})")]
    LobbyClosed { status: RideStatus },

    #[error("Ride is full ({max_passengers} passenger limit reached)")]
    LobbyFull { max_passengers: i16 },

    #[error("User is already a member of this ride")]
    AlreadyMember,

    #[error("User is not a member of this ride")]
    NotAMember,

    #[error("The ride creator cannot leave; cancel the ride instead")]
    CreatorCannotLeave,

    #[error("Role conflict: {0}")]
    RoleConflict(String),

    #[error("Not authorized: {0}")]
    NotAuthorizedForTransition(String),

    #[error("Cannot {operation} a ride in status {status}")]
    InvalidTransition {
        status: RideStatus,
        operation: &'static str,
    },
}

//! Transition guards for the ride lobby state machine.
//!
//! Each guard is pure: it looks only at a [`RideState`] snapshot plus the
//! caller's identity and answers whether an operation is allowed. The
//! repository layer evaluates these while holding a row lock on the ride,
//! so the snapshot cannot change between the check and the mutation.
//!
//! State machine: `waiting -> accepted -> in_transit -> completed`, with
//! `cancelled` reachable from any non-terminal state.

use crate::error::LobbyError;
use crate::status::RideStatus;
use crate::types::UserId;

/// Minimum passenger capacity a ride may be created with.
pub const MIN_PASSENGERS: i16 = 1;

/// Maximum passenger capacity a ride may be created with.
pub const MAX_PASSENGERS: i16 = 4;

/// Snapshot of the ride fields the guards need.
#[derive(Debug, Clone, Copy)]
pub struct RideState {
    pub creator_id: UserId,
    pub driver_id: Option<UserId>,
    pub status: RideStatus,
    pub max_passengers: i16,
}

impl RideState {
    /// Whether `user` holds the driver role on this ride.
    pub fn is_driver(&self, user: UserId) -> bool {
        self.driver_id == Some(user)
    }
}

/// Validate the passenger capacity chosen at creation.
pub fn validate_max_passengers(max_passengers: i16) -> Result<(), LobbyError> {
    if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&max_passengers) {
        return Err(LobbyError::InvalidConfiguration(format!(
            "max_passengers must be between {MIN_PASSENGERS} and {MAX_PASSENGERS}, got {max_passengers}"
        )));
    }
    Ok(())
}

/// Guard for `join`: the lobby must be open, the caller must not hold the
/// driver role, must not already be a member, and a seat must be free.
///
/// `member_count` is the current membership count read under the same row
/// lock as the eventual insert; it includes the creator's seat.
pub fn check_join(
    state: &RideState,
    user: UserId,
    already_member: bool,
    member_count: i64,
) -> Result<(), LobbyError> {
    if !state.status.accepts_membership_changes() {
        return Err(LobbyError::LobbyClosed {
            status: state.status,
        });
    }
    if state.is_driver(user) {
        return Err(LobbyError::RoleConflict(
            "the driver cannot join as a passenger".into(),
        ));
    }
    if already_member {
        return Err(LobbyError::AlreadyMember);
    }
    if member_count >= i64::from(state.max_passengers) {
        return Err(LobbyError::LobbyFull {
            max_passengers: state.max_passengers,
        });
    }
    Ok(())
}

/// Guard for `leave`: the lobby must be open, the caller must be a member,
/// and must not be the creator (the creator relinquishes a ride only by
/// cancelling it).
pub fn check_leave(state: &RideState, user: UserId, is_member: bool) -> Result<(), LobbyError> {
    if !state.status.accepts_membership_changes() {
        return Err(LobbyError::LobbyClosed {
            status: state.status,
        });
    }
    if user == state.creator_id {
        return Err(LobbyError::CreatorCannotLeave);
    }
    if !is_member {
        return Err(LobbyError::NotAMember);
    }
    Ok(())
}

/// Guard for `accept_transport`: only from `waiting`, never by the
/// creator, and only while no driver is assigned. The driver role is
/// exclusive and set exactly once per ride.
pub fn check_accept_transport(state: &RideState, user: UserId) -> Result<(), LobbyError> {
    if state.status != RideStatus::Waiting {
        return Err(LobbyError::InvalidTransition {
            status: state.status,
            operation: "accept transport for",
        });
    }
    if user == state.creator_id {
        return Err(LobbyError::RoleConflict(
            "the creator cannot drive their own ride".into(),
        ));
    }
    if state.driver_id.is_some() {
        return Err(LobbyError::RoleConflict(
            "a driver is already assigned to this ride".into(),
        ));
    }
    Ok(())
}

/// Guard for `start_transport`: only from `accepted`, only by the
/// assigned driver. Once started, membership is frozen.
pub fn check_start_transport(state: &RideState, user: UserId) -> Result<(), LobbyError> {
    if state.status != RideStatus::Accepted {
        return Err(LobbyError::InvalidTransition {
            status: state.status,
            operation: "start transport for",
        });
    }
    if !state.is_driver(user) {
        return Err(LobbyError::NotAuthorizedForTransition(
            "only the assigned driver can start transport".into(),
        ));
    }
    Ok(())
}

/// Guard for `complete`: only from `in_transit`, by the driver or the
/// creator.
pub fn check_complete(state: &RideState, user: UserId) -> Result<(), LobbyError> {
    if state.status != RideStatus::InTransit {
        return Err(LobbyError::InvalidTransition {
            status: state.status,
            operation: "complete",
        });
    }
    if !state.is_driver(user) && user != state.creator_id {
        return Err(LobbyError::NotAuthorizedForTransition(
            "only the driver or the creator can complete the ride".into(),
        ));
    }
    Ok(())
}

/// Guard for `cancel`: from any non-terminal state, by the creator or the
/// driver.
pub fn check_cancel(state: &RideState, user: UserId) -> Result<(), LobbyError> {
    if state.status.is_terminal() {
        return Err(LobbyError::InvalidTransition {
            status: state.status,
            operation: "cancel",
        });
    }
    if user != state.creator_id && !state.is_driver(user) {
        return Err(LobbyError::NotAuthorizedForTransition(
            "only the creator or the driver can cancel the ride".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn creator() -> UserId {
        Uuid::from_u128(1)
    }

    fn driver() -> UserId {
        Uuid::from_u128(2)
    }

    fn passenger() -> UserId {
        Uuid::from_u128(3)
    }

    fn waiting_state() -> RideState {
        RideState {
            creator_id: creator(),
            driver_id: None,
            status: RideStatus::Waiting,
            max_passengers: 4,
        }
    }

    fn accepted_state() -> RideState {
        RideState {
            driver_id: Some(driver()),
            status: RideStatus::Accepted,
            ..waiting_state()
        }
    }

    fn in_transit_state() -> RideState {
        RideState {
            status: RideStatus::InTransit,
            ..accepted_state()
        }
    }

    // -- Capacity validation -------------------------------------------------

    #[test]
    fn capacity_bounds_are_inclusive() {
        assert!(validate_max_passengers(1).is_ok());
        assert!(validate_max_passengers(4).is_ok());
    }

    #[test]
    fn capacity_out_of_range_is_invalid_configuration() {
        for n in [0, 5, -1, 100] {
            let err = validate_max_passengers(n).unwrap_err();
            assert!(matches!(err, LobbyError::InvalidConfiguration(_)));
        }
    }

    // -- Join ------------------------------------------------------------------

    #[test]
    fn join_waiting_lobby_with_free_seat() {
        assert!(check_join(&waiting_state(), passenger(), false, 1).is_ok());
    }

    #[test]
    fn join_accepted_lobby_is_still_allowed() {
        assert!(check_join(&accepted_state(), passenger(), false, 1).is_ok());
    }

    #[test]
    fn join_at_capacity_is_full() {
        let err = check_join(&waiting_state(), passenger(), false, 4).unwrap_err();
        assert_eq!(err, LobbyError::LobbyFull { max_passengers: 4 });
    }

    #[test]
    fn join_twice_is_already_member() {
        let err = check_join(&waiting_state(), passenger(), true, 2).unwrap_err();
        assert_eq!(err, LobbyError::AlreadyMember);
    }

    #[test]
    fn driver_cannot_join_as_passenger() {
        let err = check_join(&accepted_state(), driver(), false, 1).unwrap_err();
        assert!(matches!(err, LobbyError::RoleConflict(_)));
    }

    #[test]
    fn join_in_transit_is_closed() {
        let err = check_join(&in_transit_state(), passenger(), false, 1).unwrap_err();
        assert_eq!(
            err,
            LobbyError::LobbyClosed {
                status: RideStatus::InTransit
            }
        );
    }

    #[test]
    fn join_terminal_is_closed() {
        for status in [RideStatus::Completed, RideStatus::Cancelled] {
            let state = RideState {
                status,
                ..waiting_state()
            };
            let err = check_join(&state, passenger(), false, 1).unwrap_err();
            assert_eq!(err, LobbyError::LobbyClosed { status });
        }
    }

    // -- Leave -----------------------------------------------------------------

    #[test]
    fn member_can_leave_open_lobby() {
        assert!(check_leave(&waiting_state(), passenger(), true).is_ok());
        assert!(check_leave(&accepted_state(), passenger(), true).is_ok());
    }

    #[test]
    fn creator_cannot_leave() {
        let err = check_leave(&waiting_state(), creator(), true).unwrap_err();
        assert_eq!(err, LobbyError::CreatorCannotLeave);
    }

    #[test]
    fn non_member_leave_is_not_a_member() {
        let err = check_leave(&waiting_state(), passenger(), false).unwrap_err();
        assert_eq!(err, LobbyError::NotAMember);
    }

    #[test]
    fn leave_in_transit_is_closed() {
        let err = check_leave(&in_transit_state(), passenger(), true).unwrap_err();
        assert_eq!(
            err,
            LobbyError::LobbyClosed {
                status: RideStatus::InTransit
            }
        );
    }

    // -- Accept transport --------------------------------------------------------

    #[test]
    fn anyone_but_creator_can_accept_while_waiting() {
        assert!(check_accept_transport(&waiting_state(), driver()).is_ok());
    }

    #[test]
    fn creator_accepting_own_ride_is_role_conflict() {
        let err = check_accept_transport(&waiting_state(), creator()).unwrap_err();
        assert!(matches!(err, LobbyError::RoleConflict(_)));
    }

    #[test]
    fn second_driver_is_role_conflict() {
        let err = check_accept_transport(
            &RideState {
                driver_id: Some(driver()),
                ..waiting_state()
            },
            passenger(),
        )
        .unwrap_err();
        assert!(matches!(err, LobbyError::RoleConflict(_)));
    }

    #[test]
    fn accept_outside_waiting_is_invalid_transition() {
        for state in [accepted_state(), in_transit_state()] {
            let err = check_accept_transport(&state, passenger()).unwrap_err();
            assert!(matches!(err, LobbyError::InvalidTransition { .. }));
        }
    }

    // -- Start transport ----------------------------------------------------------

    #[test]
    fn assigned_driver_can_start_from_accepted() {
        assert!(check_start_transport(&accepted_state(), driver()).is_ok());
    }

    #[test]
    fn non_driver_cannot_start() {
        for user in [creator(), passenger()] {
            let err = check_start_transport(&accepted_state(), user).unwrap_err();
            assert!(matches!(err, LobbyError::NotAuthorizedForTransition(_)));
        }
    }

    #[test]
    fn start_outside_accepted_is_invalid_transition() {
        let err = check_start_transport(&waiting_state(), driver()).unwrap_err();
        assert!(matches!(err, LobbyError::InvalidTransition { .. }));
    }

    // -- Complete --------------------------------------------------------------

    #[test]
    fn driver_or_creator_can_complete_in_transit() {
        assert!(check_complete(&in_transit_state(), driver()).is_ok());
        assert!(check_complete(&in_transit_state(), creator()).is_ok());
    }

    #[test]
    fn passenger_cannot_complete() {
        let err = check_complete(&in_transit_state(), passenger()).unwrap_err();
        assert!(matches!(err, LobbyError::NotAuthorizedForTransition(_)));
    }

    #[test]
    fn complete_before_transit_is_invalid_transition() {
        // A driver completing straight from `accepted` must be rejected;
        // the trip has not started yet.
        let err = check_complete(&accepted_state(), driver()).unwrap_err();
        assert_eq!(
            err,
            LobbyError::InvalidTransition {
                status: RideStatus::Accepted,
                operation: "complete",
            }
        );
    }

    // -- Cancel ----------------------------------------------------------------

    #[test]
    fn creator_can_cancel_any_non_terminal_state() {
        for state in [waiting_state(), accepted_state(), in_transit_state()] {
            assert!(check_cancel(&state, creator()).is_ok());
        }
    }

    #[test]
    fn driver_can_cancel() {
        assert!(check_cancel(&accepted_state(), driver()).is_ok());
    }

    #[test]
    fn passenger_cannot_cancel() {
        let err = check_cancel(&waiting_state(), passenger()).unwrap_err();
        assert!(matches!(err, LobbyError::NotAuthorizedForTransition(_)));
    }

    #[test]
    fn cancel_terminal_is_invalid_transition() {
        for status in [RideStatus::Completed, RideStatus::Cancelled] {
            let state = RideState {
                status,
                ..waiting_state()
            };
            let err = check_cancel(&state, creator()).unwrap_err();
            assert!(matches!(err, LobbyError::InvalidTransition { .. }));
        }
    }
}

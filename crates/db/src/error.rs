//! Error type for repository operations.

use tagalong_core::error::LobbyError;

/// A repository operation failed either on a domain guard or in storage.
///
/// Guard violations surface typed so the gateway can map each one to a
/// specific response; storage failures stay generic and are never shown
/// to callers verbatim.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),

    /// Share-code generation kept colliding with existing rides.
    #[error("could not allocate a unique share code after {attempts} attempts")]
    ShareCodeExhausted { attempts: u32 },
}

/// Convenience alias for repository return values.
pub type RepoResult<T> = Result<T, RepoError>;

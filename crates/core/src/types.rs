/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// User identities are stable UUIDs supplied by the external identity
/// provider; this service never mints them.
pub type UserId = uuid::Uuid;

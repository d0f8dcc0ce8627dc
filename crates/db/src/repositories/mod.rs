//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Guard-then-mutate sequences
//! run inside a transaction holding a `FOR UPDATE` lock on the ride row.

pub mod ride_member_repo;
pub mod ride_repo;

pub use ride_member_repo::RideMemberRepo;
pub use ride_repo::RideRepo;

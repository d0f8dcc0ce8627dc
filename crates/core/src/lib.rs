//! Domain logic for the tagalong ride-lobby service.
//!
//! This crate is pure: no I/O, no database types. The repository layer
//! (`tagalong-db`) evaluates the guards in [`lobby`] inside row-locking
//! transactions, and the API layer maps the [`error::LobbyError`] taxonomy
//! onto HTTP responses.

pub mod error;
pub mod lobby;
pub mod share_code;
pub mod status;
pub mod types;

//! Identity-provider integration.

pub mod jwt;

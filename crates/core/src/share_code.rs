//! Share-code issuance for out-of-band ride invitations.
//!
//! Codes are short enough to read over the phone and drawn from an
//! alphabet without visually confusable characters (no `0`/`O`, no
//! `1`/`I`). Global uniqueness is the storage layer's job (the
//! `uq_rides_share_code` constraint); callers regenerate on collision.

use rand::Rng;

/// Characters a share code may contain.
pub const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of every share code.
pub const CODE_LENGTH: usize = 6;

/// Generate a random share code.
pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Normalize a user-supplied code for lookup: trim and uppercase.
///
/// Codes are stored uppercase, so lookup through this function is
/// case-insensitive.
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

//! Webhook signing-secret generation.

use rand::RngCore;

/// Prefix identifying a hookrelay signing secret.
pub const SECRET_PREFIX: &str = "whsec_";

/// Number of random bytes in a generated secret (hex-encoded on output).
pub const SECRET_RANDOM_BYTES: usize = 32;

/// Generate a new cryptographically random signing secret.
///
/// Format: [`SECRET_PREFIX`] followed by [`SECRET_RANDOM_BYTES`] bytes of
/// random hex. The secret is returned to the caller exactly once at
/// subscription creation and is never serialized again.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_RANDOM_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    format!("{SECRET_PREFIX}{}", hex::encode(bytes))
}

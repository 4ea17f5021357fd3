//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Service for authenticating management requests via a static Bearer token.
///
/// The configured admin token is kept only as an HMAC-SHA256 under a random
/// per-process key; presented tokens are MACed the same way and compared with
/// [`Mac::verify_slice`], which is constant-time.
pub struct AuthService {
    mac_key: [u8; 32],
    token_mac: Vec<u8>,
    fingerprint: String,
}

impl AuthService {
    /// Creates an authentication service for the given admin token.
    pub fn new(admin_token: &str) -> Self {
        let mut mac_key = [0u8; 32];
        getrandom::fill(&mut mac_key).expect("Failed to generate random bytes");

        let mut mac =
            HmacSha256::new_from_slice(&mac_key).expect("HMAC accepts any key length");
        mac.update(admin_token.as_bytes());
        let token_mac = mac.finalize().into_bytes().to_vec();

        // Derived from the token alone, so it stays stable across restarts
        // and identifies which token a deployment runs with.
        let fingerprint = hex::encode(Sha256::digest(admin_token.as_bytes()))[..8].to_string();

        Self {
            mac_key,
            token_mac,
            fingerprint,
        }
    }

    /// Authenticates a presented Bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token does not match.
    pub fn authenticate(&self, presented: &str) -> Result<(), AppError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.mac_key).expect("HMAC accepts any key length");
        mac.update(presented.as_bytes());

        mac.verify_slice(&self.token_mac).map_err(|_| {
            AppError::unauthorized("Unauthorized", json!({ "reason": "Invalid admin token" }))
        })
    }

    /// Short hex fingerprint of the admin token, safe to log at startup.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

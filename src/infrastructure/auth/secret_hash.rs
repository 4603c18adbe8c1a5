//! Cognito SECRET_HASH calculation

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the SECRET_HASH Cognito requires for app clients with a secret:
/// Base64(HMAC-SHA256(client_secret, username + client_id))
pub struct SecretHashCalculator;

impl SecretHashCalculator {
    pub fn calculate(username: &str, client_id: &str, client_secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
            .expect("HMAC accepts keys of any length");

        mac.update(username.as_bytes());
        mac.update(client_id.as_bytes());

        STANDARD.encode(mac.finalize().into_bytes())
    }
}

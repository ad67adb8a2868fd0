use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};

use argon2::password_hash::{SaltString, rand_core::OsRng};

/// Verify password using the Argon2 hash stored in DB.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(p) => p,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash a new password using Argon2id with a random salt.
/// Store the returned string in mobile_user.password_hash.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| format!("argon2 hash error: {e}"))
}

/// Opaque bearer token returned to the mobile client: base64 of
/// "<user id>:<issue millis>". Not verifiable server-side.
// TODO: replace with a signed token scheme before any client other than the
// bundled app is allowed to call this API.
pub fn issue_token(mobile_user_id: i64, issued_at: DateTime<Utc>) -> String {
    URL_SAFE_NO_PAD.encode(format!(
        "{mobile_user_id}:{}",
        issued_at.timestamp_millis()
    ))
}

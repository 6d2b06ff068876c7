use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// hash_password
///
/// Hashes a plaintext password with Argon2id and a freshly generated salt.
/// The salt is embedded in the returned PHC string, so nothing besides the hash
/// needs to be stored.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("failed to hash password: {e}"))
}

/// verify_password
///
/// Checks a plaintext password against a stored PHC hash string. An unparsable
/// stored hash counts as a mismatch rather than an error; the caller only ever
/// sees "credentials valid or not".
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

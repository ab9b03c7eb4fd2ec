/// Argon2id password hashing
///
/// Hashes are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
/// the parameters travel with the hash and [`verify_password`] needs no
/// configuration.
///
/// # Example
///
/// ```
/// use staffdesk_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Corr3ct-Horse")?;
/// assert!(verify_password("Corr3ct-Horse", &hash)?);
/// assert!(!verify_password("corr3ct-horse", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Minimum password length accepted by [`validate_password_strength`]
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory in KiB
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    /// 64 MiB, 3 passes, 4 lanes
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl HashParams {
    /// Cheap parameters for bulk fixture loading and tests
    pub fn fast() -> Self {
        Self {
            memory_kib: 8192,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Hashes with [`HashParams::default`]
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with(password, HashParams::default())
}

/// Hashes with explicit parameters and a fresh random salt
pub fn hash_password_with(password: &str, params: HashParams) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Constant-time check of `password` against a PHC hash
///
/// Returns `Ok(false)` on a mismatch and an error only for unusable hashes.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Minimum password policy: length, mixed case, a digit and a symbol
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }

    let checks: [(fn(char) -> bool, &str); 4] = [
        (char::is_uppercase, "an uppercase letter"),
        (char::is_lowercase, "a lowercase letter"),
        (|c| c.is_ascii_digit(), "a digit"),
        (|c| !c.is_alphanumeric(), "a special character"),
    ];

    for (check, what) in checks {
        if !password.chars().any(check) {
            return Err(format!("Password must contain at least {}", what));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id_phc() {
        let hash = hash_password_with("S3cure!pass", HashParams::fast()).unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=8192,t=1,p=1$"));
    }

    #[test]
    fn test_default_params_are_embedded() {
        let hash = hash_password("S3cure!pass").unwrap();
        assert!(hash.contains("m=65536,t=3,p=4"));
        assert!(verify_password("S3cure!pass", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password_with("S3cure!pass", HashParams::fast()).unwrap();
        let b = hash_password_with("S3cure!pass", HashParams::fast()).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("S3cure!pass", &a).unwrap());
        assert!(verify_password("S3cure!pass", &b).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = hash_password_with("S3cure!pass", HashParams::fast()).unwrap();
        assert!(!verify_password("S3cure!pasS", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("MyP@ssw0rd").is_ok());
        assert!(validate_password_strength("Sh0rt!").is_err());
        assert!(validate_password_strength("myp@ssw0rd").is_err());
        assert!(validate_password_strength("MYP@SSW0RD").is_err());
        assert!(validate_password_strength("MyP@ssword").is_err());
        assert_eq!(
            validate_password_strength("MyPassw0rd").unwrap_err(),
            "Password must contain at least a special character"
        );
    }
}

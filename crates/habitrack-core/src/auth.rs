//! Password digests and account management.

use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{AuthError, Result, TrackingError};
use crate::storage::UserStore;

/// Lowercase hex SHA-256 of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Create an account.
///
/// # Errors
/// `DuplicateName` if the user exists, `InvalidValue` for a blank user name.
pub fn register<S: UserStore>(store: &mut S, user: &str, password: &str) -> Result<()> {
    if user.trim().is_empty() {
        return Err(TrackingError::InvalidValue {
            field: "user",
            message: "user name must not be empty".into(),
        }
        .into());
    }
    store.register_user(user, &hash_password(password))?;
    info!(%user, "registered user");
    Ok(())
}

/// Whether `password` matches the stored digest. Unknown users never verify.
pub fn verify<S: UserStore>(store: &S, user: &str, password: &str) -> Result<bool> {
    Ok(store
        .password_digest(user)?
        .is_some_and(|digest| digest == hash_password(password)))
}

/// [`verify`], failing with `InvalidCredentials` on mismatch.
pub fn login<S: UserStore>(store: &S, user: &str, password: &str) -> Result<()> {
    if verify(store, user, password)? {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials(user.to_string()).into())
    }
}

/// Delete an account and everything it owns, after checking the password.
pub fn delete_account<S: UserStore>(store: &mut S, user: &str, password: &str) -> Result<()> {
    login(store, user, password)?;
    store.delete_user(user)?;
    info!(%user, "deleted user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;

    #[test]
    fn digest_is_sha256_hex() {
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn register_then_verify() {
        let mut store = MemoryStore::new();
        register(&mut store, "ann", "secret").unwrap();
        assert!(verify(&store, "ann", "secret").unwrap());
        assert!(!verify(&store, "ann", "Secret").unwrap());
        assert!(!verify(&store, "bob", "secret").unwrap());
        assert!(register(&mut store, "ann", "again").is_err());
        assert!(register(&mut store, " ", "x").is_err());
    }

    #[test]
    fn delete_needs_password() {
        let mut store = MemoryStore::new();
        register(&mut store, "ann", "secret").unwrap();
        assert!(matches!(
            delete_account(&mut store, "ann", "wrong"),
            Err(CoreError::Auth(AuthError::InvalidCredentials(_)))
        ));
        delete_account(&mut store, "ann", "secret").unwrap();
        assert!(!verify(&store, "ann", "secret").unwrap());
    }
}

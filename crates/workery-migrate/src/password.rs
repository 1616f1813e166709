//! Operator utility: set a migrated user's password.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use tracing::info;

use crate::error::{MigrateError, Result};
use crate::model::User;
use crate::resolver::Resolver;
use crate::store::{DocumentStore, Repository};

/// Hash a password with Argon2id (m=19456, t=2, p=1) into a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| MigrateError::Password(format!("argon2 params error: {}", e)))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| MigrateError::Password(format!("password hash error: {}", e)))?;
    Ok(hash.to_string())
}

/// Store a fresh hash of `password` on the user with `email`.
pub async fn change_password(store: &dyn DocumentStore, email: &str, password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(MigrateError::Config("password must not be empty".to_string()));
    }
    let mut user = Resolver::new(store)
        .by_email::<User>(email)
        .await?
        .ok_or_else(|| MigrateError::NotFound {
            entity: format!("User <{}>", email),
            legacy_id: 0,
        })?;
    user.password_hash = hash_password(password)?;
    Repository::<User>::new(store).replace(&user).await?;
    info!("Changed password of User ID# {}", user.id);
    Ok(())
}

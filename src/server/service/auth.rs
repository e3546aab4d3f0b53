use crate::server::controller::error::CustomError;
use crate::server::database::store::Store;
use crate::server::model::config::AdminBootstrap;
use crate::server::service::session::SessionRegistry;
use anyhow::Context;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use derive_more::{Display, Error};
use log::{info, warn};
use tokio::sync::OnceCell;
use tokio::task;

/// verified against when the username is unknown, so both failures cost the same
static DECOY_HASH: OnceCell<String> = OnceCell::const_new();

#[cfg(test)]
thread_local! {
    static VERIFICATIONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

#[derive(Debug, Display, Error, PartialEq)]
pub(crate) enum AuthError {
    #[display("failed to hash password")]
    HashingError,
    #[display("failed to verify password")]
    VerificationError,
}

/// Salted argon2 hash in PHC string form.
pub(crate) async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_string();

    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::HashingError)
    })
    .await
    .map_err(|_| AuthError::HashingError)?
}

pub(crate) async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    #[cfg(test)]
    VERIFICATIONS.with(|count| count.set(count.get() + 1));
    let password = password.to_string();
    let hash = hash.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&hash).map_err(|_| AuthError::VerificationError)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::VerificationError),
        }
    })
    .await
    .map_err(|_| AuthError::VerificationError)?
}

async fn decoy_hash() -> Result<&'static String, AuthError> {
    DECOY_HASH.get_or_try_init(|| hash_password("decoy password")).await
}

/// Hash the decoy up front so the first unknown-user login is not the slow one.
pub(crate) async fn prepare() -> Result<(), anyhow::Error> {
    decoy_hash().await?;
    Ok(())
}

/// `true` iff `username` exists and `password` matches its stored hash.
pub(crate) async fn authenticate<S: Store>(store: &S, username: &str, password: &str) -> Result<bool, CustomError> {
    let stored = store.find_admin_password(username).await.map_err(|e| {
        warn!("authenticate failed, {}", e);
        CustomError::from(e)
    })?;
    let Some(hash) = stored else {
        let decoy = decoy_hash().await.map_err(|e| {
            warn!("failed to prepare decoy hash, {}", e);
            CustomError::Unauthorized
        })?;
        // same argon2 cost as a wrong password, the outcome is discarded
        let _ = verify_password(password, decoy).await;
        return Ok(false);
    };
    match verify_password(password, &hash).await {
        Ok(verified) => Ok(verified),
        Err(e) => {
            warn!("stored credential of {} is unusable, {}", username, e);
            Ok(false)
        }
    }
}

/// Log an admin in. Every failure looks the same to the caller.
pub(crate) async fn login<S: Store>(
    store: &S,
    sessions: &SessionRegistry,
    username: &str,
    password: &str,
) -> Result<String, CustomError> {
    if !authenticate(store, username, password).await? {
        info!("login rejected for {}", username);
        return Err(CustomError::Unauthorized);
    }
    info!("admin {} logged in", username);
    Ok(sessions.issue(username))
}

/// Create the configured admin account when it does not exist yet.
pub(crate) async fn bootstrap_admin<S: Store>(store: &S, admin: &AdminBootstrap) -> Result<(), anyhow::Error> {
    let hash = hash_password(&admin.password).await?;
    let created = store
        .ensure_admin(&admin.username, &hash)
        .await
        .context("failed to bootstrap admin account")?;
    if created {
        info!("admin {} created", admin.username);
    }
    Ok(())
}

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        gravatar::avatar_url,
        password::{hash_password, verify_password},
        repo_types::{NewUser, User},
    },
    profiles::repo_types::Profile,
    error::{AppError, AppResult},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Emails are matched case-insensitively by storing them lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registers a user. The raw password only ever reaches the hasher.
pub async fn create_user(
    state: &AppState,
    name: &str,
    email: &str,
    raw_password: &str,
) -> AppResult<User> {
    let email = normalize_email(email);
    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let new_user = NewUser {
        name: name.trim().to_string(),
        avatar: avatar_url(&email),
        password_hash: hash_password(raw_password)?,
        email,
    };
    // A concurrent sign-up can still win the race; the unique insert catches it.
    let user = state
        .users
        .insert(new_user)
        .await?
        .ok_or(AppError::DuplicateEmail)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Unknown email and wrong password produce the same error.
pub async fn authenticate(state: &AppState, email: &str, raw_password: &str) -> AppResult<Uuid> {
    let email = normalize_email(email);
    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(raw_password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user.id)
}

/// Creates the user together with its empty profile. If the profile cannot
/// be written the user is removed again, so the email stays free.
pub async fn register(
    state: &AppState,
    name: &str,
    email: &str,
    raw_password: &str,
) -> AppResult<(User, Profile)> {
    let user = create_user(state, name, email, raw_password).await?;
    match state.profiles.create_empty(user.id).await {
        Ok(profile) => {
            info!(user_id = %user.id, "profile created for new user");
            Ok((user, profile))
        }
        Err(e) => {
            error!(user_id = %user.id, error = ?e, "profile creation failed; removing user");
            if let Err(cleanup) = state.users.delete(user.id).await {
                error!(user_id = %user.id, error = ?cleanup, "orphan user left behind");
            }
            Err(e.into())
        }
    }
}

pub async fn current_user(state: &AppState, user_id: Uuid) -> AppResult<User> {
    state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found"))
}

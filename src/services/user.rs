//! User service
//!
//! Implements business logic for accounts and authentication:
//! - Registration with username/password length rules (first user becomes admin)
//! - Login/logout backed by server-side sessions
//! - Session validation and expiry sweeps

use crate::db::repositories::{is_unique_violation, SessionRepository, UserRepository};
use crate::models::{Session, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::Duration;
use std::sync::Arc;

/// Default session lifetime in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Username length bounds, in characters
pub const USERNAME_MIN_CHARS: usize = 1;
pub const USERNAME_MAX_CHARS: usize = 15;

/// Password length bounds, in characters
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_MAX_CHARS: usize = 16;

/// Error types for user service operations
///
/// The display strings are the user-facing messages returned by the auth
/// endpoints.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Registration input failed a length rule
    #[error("{0}")]
    ValidationError(String),

    /// Username is already registered
    #[error("username already exist")]
    UserExists,

    /// No account with that username
    #[error("user does not exist")]
    UserNotFound,

    /// Password did not match
    #[error("incorrect password")]
    BadCredentials,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the default session lifetime
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self::with_session_expiration(user_repo, session_repo, DEFAULT_SESSION_EXPIRATION_DAYS)
    }

    /// Create a new user service with a custom session lifetime
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Register a new user
    ///
    /// The first account ever created is made an admin; everyone after that
    /// is an author.
    ///
    /// # Errors
    ///
    /// - `ValidationError("invalid username")` / `ValidationError("invalid password")`
    /// - `UserExists` if the username is taken, including when a concurrent
    ///   registration wins the race to the unique index
    /// - `InternalError` for database errors
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        validate_credentials(&input.username, &input.password)?;

        if self.get_by_username(&input.username).await?.is_some() {
            return Err(UserServiceError::UserExists);
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(input.username, password_hash, UserRole::Author);

        let mut created = match self.user_repo.create(&user).await {
            Ok(created) => created,
            Err(e) if is_unique_violation(&e) => return Err(UserServiceError::UserExists),
            Err(e) => return Err(e.context("Failed to create user").into()),
        };

        // Every account starts as an author; the oldest one is promoted.
        if self
            .user_repo
            .claim_admin(created.id)
            .await
            .context("Failed to assign first user role")?
        {
            created.role = UserRole::Admin;
        }

        tracing::info!(user_id = created.id, role = %created.role, "Registered user {}", created.username);
        Ok(created)
    }

    /// Login with credentials
    ///
    /// Returns the user together with a freshly stored session.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if no account has that username
    /// - `BadCredentials` if the password does not match
    /// - `InternalError` for database errors
    pub async fn login(&self, input: LoginInput) -> Result<(User, Session), UserServiceError> {
        let user = match self.get_by_username(&input.username).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Login failed: unknown user {}", input.username);
                return Err(UserServiceError::UserNotFound);
            }
        };

        let valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            tracing::warn!(user_id = user.id, "Login failed: incorrect password");
            return Err(UserServiceError::BadCredentials);
        }

        let lifetime = Duration::try_days(self.session_expiration_days).unwrap_or(Duration::MAX);
        let session = Session::start(user.id, lifetime);
        let session = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        tracing::info!(user_id = user.id, "User {} logged in", user.username);
        Ok((user, session))
    }

    /// Logout (invalidate session)
    ///
    /// Returns whether a session was actually removed.
    pub async fn logout(&self, session_id: &str) -> Result<bool, UserServiceError> {
        let removed = self
            .session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;

        if removed {
            tracing::debug!("Session ended");
        }
        Ok(removed)
    }

    /// Validate session token and return the associated user
    ///
    /// Unknown and expired tokens both yield `None`; expired rows are deleted
    /// on sight.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to drop expired session: {:#}", e);
            }
            return Ok(None);
        }

        self.get_by_id(session.user_id).await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?;

        Ok(user)
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?;

        Ok(user)
    }

    /// `true` while no account exists yet
    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        let count = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?;

        Ok(count == 0)
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, UserServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;

        Ok(count)
    }
}

/// Check registration credentials against the length rules
///
/// Lengths are counted in characters, not bytes.
pub fn validate_credentials(username: &str, password: &str) -> Result<(), UserServiceError> {
    let username_len = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&username_len) {
        return Err(UserServiceError::ValidationError(
            "invalid username".to_string(),
        ));
    }

    let password_len = password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&password_len) {
        return Err(UserServiceError::ValidationError(
            "invalid password".to_string(),
        ));
    }

    Ok(())
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
}

impl RegisterInput {
    /// Create a new registration input
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Input for user login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    /// Create a new login input
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

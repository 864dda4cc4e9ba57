//! User model
//!
//! This module defines the User entity and its role type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Avatar image URL
    pub avatar: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed; see `services::password::hash_password()`.
    /// The avatar is derived from the username.
    pub fn new(username: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        let avatar = Self::avatar_for(&username);
        Self {
            id: 0, // Will be set by the database
            username,
            password_hash,
            role,
            avatar,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gravatar identicon URL for a username
    pub fn avatar_for(username: &str) -> String {
        let hash = format!("{:x}", md5::compute(username.trim().to_lowercase()));
        format!("https://www.gravatar.com/avatar/{}?d=identicon&s=80", hash)
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins can edit anything, authors only their own posts
    pub fn can_edit(&self, author_id: i64) -> bool {
        self.is_admin() || self.id == author_id
    }
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - may manage every post
    Admin,
    /// Author - may manage own posts
    #[default]
    Author,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Author => write!(f, "author"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "author" => Ok(UserRole::Author),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

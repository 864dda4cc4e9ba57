//! User repository
//!
//! Database operations for users.
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL

use crate::db::{Backend, DynDatabasePool};
use crate::models::{User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

const SELECT_USER: &str = r#"
    SELECT id, username, password_hash, role, avatar, created_at, updated_at
    FROM users
"#;

const INSERT_USER: &str = r#"
    INSERT INTO users (username, password_hash, role, avatar, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?)
"#;

const CLAIM_ADMIN_SQLITE: &str = r#"
    UPDATE users SET role = ?, updated_at = ?
    WHERE id = ? AND id = (SELECT MIN(id) FROM users)
"#;

// MySQL refuses a subquery on the table being updated unless it is
// materialized through a derived table.
const CLAIM_ADMIN_MYSQL: &str = r#"
    UPDATE users SET role = ?, updated_at = ?
    WHERE id = ? AND id = (SELECT first_id FROM (SELECT MIN(id) AS first_id FROM users) AS oldest)
"#;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; fails when the username is taken
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Count total users
    async fn count(&self) -> Result<i64>;

    /// Make `id` an admin if it is the oldest account
    ///
    /// Returns `true` when the role was granted. The check and the update
    /// run as one statement, so of several accounts created at once only
    /// the lowest id can win.
    async fn claim_admin(&self, id: i64) -> Result<bool>;
}

/// SQLx-based user repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        match self.pool.backend()? {
            Backend::Sqlite(p) => create_user_sqlite(p, user).await,
            Backend::Mysql(p) => create_user_mysql(p, user).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("{} WHERE id = ?", SELECT_USER);
        match self.pool.backend()? {
            Backend::Sqlite(p) => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(p)
                    .await
                    .context("Failed to get user by ID")?;
                row.map(|r| row_to_user_sqlite(&r)).transpose()
            }
            Backend::Mysql(p) => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(p)
                    .await
                    .context("Failed to get user by ID")?;
                row.map(|r| row_to_user_mysql(&r)).transpose()
            }
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("{} WHERE username = ?", SELECT_USER);
        match self.pool.backend()? {
            Backend::Sqlite(p) => {
                let row = sqlx::query(&sql)
                    .bind(username)
                    .fetch_optional(p)
                    .await
                    .context("Failed to get user by username")?;
                row.map(|r| row_to_user_sqlite(&r)).transpose()
            }
            Backend::Mysql(p) => {
                let row = sqlx::query(&sql)
                    .bind(username)
                    .fetch_optional(p)
                    .await
                    .context("Failed to get user by username")?;
                row.map(|r| row_to_user_mysql(&r)).transpose()
            }
        }
    }

    async fn count(&self) -> Result<i64> {
        const SQL: &str = "SELECT COUNT(*) FROM users";
        let count: i64 = match self.pool.backend()? {
            Backend::Sqlite(p) => sqlx::query_scalar(SQL).fetch_one(p).await,
            Backend::Mysql(p) => sqlx::query_scalar(SQL).fetch_one(p).await,
        }
        .context("Failed to count users")?;

        Ok(count)
    }

    async fn claim_admin(&self, id: i64) -> Result<bool> {
        let role = UserRole::Admin.to_string();
        let now = Utc::now();
        let result = match self.pool.backend()? {
            Backend::Sqlite(p) => sqlx::query(CLAIM_ADMIN_SQLITE)
                .bind(&role)
                .bind(now)
                .bind(id)
                .execute(p)
                .await
                .map(|r| r.rows_affected()),
            Backend::Mysql(p) => sqlx::query(CLAIM_ADMIN_MYSQL)
                .bind(&role)
                .bind(now)
                .bind(id)
                .execute(p)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to grant admin role")?;

        Ok(result > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let now = Utc::now();

    let result = sqlx::query(INSERT_USER)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.avatar)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..user.clone()
    })
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        role,
        avatar: row.get("avatar"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let now = Utc::now();

    let result = sqlx::query(INSERT_USER)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.avatar)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..user.clone()
    })
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        role,
        avatar: row.get("avatar"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

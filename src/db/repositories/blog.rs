//! Blog repository
//!
//! Database operations for blog posts.
//!
//! This module provides:
//! - `BlogRepository` trait defining the interface for blog data access
//! - `SqlxBlogRepository` implementing the trait for SQLite and MySQL
//!
//! Every read joins the author row so callers get the username and avatar
//! alongside the post.

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Blog, BlogAuthor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const SELECT_BLOG: &str = r#"
    SELECT b.id, b.title, b.description, b.content, b.user_id,
           b.created_at, b.updated_at,
           u.username AS author_username, u.avatar AS author_avatar
    FROM blogs b
    LEFT JOIN users u ON u.id = b.user_id
"#;

const ORDER_NEWEST: &str = "ORDER BY b.created_at DESC, b.id DESC";

const INSERT_BLOG: &str = r#"
    INSERT INTO blogs (title, description, content, user_id, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?)
"#;

const UPDATE_BLOG: &str = r#"
    UPDATE blogs
    SET title = ?, description = ?, content = ?, updated_at = ?
    WHERE id = ?
"#;

/// Blog repository trait
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// List posts newest first, optionally restricted to one author
    async fn list(&self, offset: i64, limit: i64, user_id: Option<i64>) -> Result<Vec<Blog>>;

    /// Count posts, optionally restricted to one author
    async fn count(&self, user_id: Option<i64>) -> Result<i64>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>>;

    /// Insert a post and return the stored row
    async fn create(
        &self,
        title: &str,
        content: &str,
        description: &str,
        user_id: i64,
    ) -> Result<Blog>;

    /// Overwrite title, content and description; `None` when no row matched
    async fn update(
        &self,
        id: i64,
        title: &str,
        content: &str,
        description: &str,
    ) -> Result<Option<Blog>>;

    /// Delete a post; returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based blog repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxBlogRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogRepository {
    /// Create a new SQLx blog repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BlogRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl BlogRepository for SqlxBlogRepository {
    async fn list(&self, offset: i64, limit: i64, user_id: Option<i64>) -> Result<Vec<Blog>> {
        match self.pool.backend()? {
            Backend::Sqlite(p) => list_blogs_sqlite(p, offset, limit, user_id).await,
            Backend::Mysql(p) => list_blogs_mysql(p, offset, limit, user_id).await,
        }
    }

    async fn count(&self, user_id: Option<i64>) -> Result<i64> {
        let count: i64 = match (self.pool.backend()?, user_id) {
            (Backend::Sqlite(p), None) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM blogs")
                    .fetch_one(p)
                    .await
            }
            (Backend::Sqlite(p), Some(uid)) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM blogs WHERE user_id = ?")
                    .bind(uid)
                    .fetch_one(p)
                    .await
            }
            (Backend::Mysql(p), None) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM blogs")
                    .fetch_one(p)
                    .await
            }
            (Backend::Mysql(p), Some(uid)) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM blogs WHERE user_id = ?")
                    .bind(uid)
                    .fetch_one(p)
                    .await
            }
        }
        .context("Failed to count blogs")?;

        Ok(count)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>> {
        match self.pool.backend()? {
            Backend::Sqlite(p) => get_blog_by_id_sqlite(p, id).await,
            Backend::Mysql(p) => get_blog_by_id_mysql(p, id).await,
        }
    }

    async fn create(
        &self,
        title: &str,
        content: &str,
        description: &str,
        user_id: i64,
    ) -> Result<Blog> {
        let now = Utc::now();
        let id = match self.pool.backend()? {
            Backend::Sqlite(p) => sqlx::query(INSERT_BLOG)
                .bind(title)
                .bind(description)
                .bind(content)
                .bind(user_id)
                .bind(now)
                .bind(now)
                .execute(p)
                .await
                .map(|r| r.last_insert_rowid()),
            Backend::Mysql(p) => sqlx::query(INSERT_BLOG)
                .bind(title)
                .bind(description)
                .bind(content)
                .bind(user_id)
                .bind(now)
                .bind(now)
                .execute(p)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to create blog")?;

        self.get_by_id(id)
            .await?
            .with_context(|| format!("Blog {} missing right after insert", id))
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        content: &str,
        description: &str,
    ) -> Result<Option<Blog>> {
        let now = Utc::now();
        let affected = match self.pool.backend()? {
            Backend::Sqlite(p) => sqlx::query(UPDATE_BLOG)
                .bind(title)
                .bind(description)
                .bind(content)
                .bind(now)
                .bind(id)
                .execute(p)
                .await
                .map(|r| r.rows_affected()),
            Backend::Mysql(p) => sqlx::query(UPDATE_BLOG)
                .bind(title)
                .bind(description)
                .bind(content)
                .bind(now)
                .bind(id)
                .execute(p)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to update blog")?;

        // MySQL reports zero affected rows when nothing changed, so re-read
        // instead of trusting the count there.
        if affected == 0 && matches!(self.pool.backend()?, Backend::Sqlite(_)) {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        const SQL: &str = "DELETE FROM blogs WHERE id = ?";
        let affected = match self.pool.backend()? {
            Backend::Sqlite(p) => sqlx::query(SQL)
                .bind(id)
                .execute(p)
                .await
                .map(|r| r.rows_affected()),
            Backend::Mysql(p) => sqlx::query(SQL)
                .bind(id)
                .execute(p)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to delete blog")?;

        Ok(affected > 0)
    }
}

fn list_sql(filtered: bool) -> String {
    if filtered {
        format!(
            "{} WHERE b.user_id = ? {} LIMIT ? OFFSET ?",
            SELECT_BLOG, ORDER_NEWEST
        )
    } else {
        format!("{} {} LIMIT ? OFFSET ?", SELECT_BLOG, ORDER_NEWEST)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_blogs_sqlite(
    pool: &SqlitePool,
    offset: i64,
    limit: i64,
    user_id: Option<i64>,
) -> Result<Vec<Blog>> {
    let sql = list_sql(user_id.is_some());
    let mut query = sqlx::query(&sql);
    if let Some(uid) = user_id {
        query = query.bind(uid);
    }

    let rows = query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list blogs")?;

    Ok(rows.iter().map(row_to_blog_sqlite).collect())
}

async fn get_blog_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Blog>> {
    let sql = format!("{} WHERE b.id = ?", SELECT_BLOG);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog by ID")?;

    Ok(row.as_ref().map(row_to_blog_sqlite))
}

fn row_to_blog_sqlite(row: &sqlx::sqlite::SqliteRow) -> Blog {
    let user_id: i64 = row.get("user_id");
    let username: Option<String> = row.get("author_username");
    let avatar: Option<String> = row.get("author_avatar");

    Blog {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        content: row.get("content"),
        user_id,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        author: username.map(|username| BlogAuthor {
            id: user_id,
            username,
            avatar: avatar.unwrap_or_default(),
        }),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_blogs_mysql(
    pool: &MySqlPool,
    offset: i64,
    limit: i64,
    user_id: Option<i64>,
) -> Result<Vec<Blog>> {
    let sql = list_sql(user_id.is_some());
    let mut query = sqlx::query(&sql);
    if let Some(uid) = user_id {
        query = query.bind(uid);
    }

    let rows = query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list blogs")?;

    Ok(rows.iter().map(row_to_blog_mysql).collect())
}

async fn get_blog_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Blog>> {
    let sql = format!("{} WHERE b.id = ?", SELECT_BLOG);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog by ID")?;

    Ok(row.as_ref().map(row_to_blog_mysql))
}

fn row_to_blog_mysql(row: &sqlx::mysql::MySqlRow) -> Blog {
    let user_id: i64 = row.get("user_id");
    let username: Option<String> = row.get("author_username");
    let avatar: Option<String> = row.get("author_avatar");

    Blog {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        content: row.get("content"),
        user_id,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        author: username.map(|username| BlogAuthor {
            id: user_id,
            username,
            avatar: avatar.unwrap_or_default(),
        }),
    }
}

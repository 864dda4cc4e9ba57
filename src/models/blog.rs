//! Blog model
//!
//! This module provides:
//! - `Blog` entity representing a blog post
//! - Input types for creating and updating posts
//! - Pagination types for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest page size a list query may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Blog post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Short summary shown in listings
    pub description: String,
    /// Full post body
    pub content: String,
    /// Author user ID
    pub user_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Author details, present when the author row still exists
    #[serde(default)]
    pub author: Option<BlogAuthor>,
}

/// Public author details embedded in a blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogAuthor {
    pub id: i64,
    pub username: String,
    pub avatar: String,
}

/// Input for creating a blog post
#[derive(Debug, Clone)]
pub struct CreateBlogInput {
    pub title: String,
    pub content: String,
    /// Optional summary; derived from the content when absent
    pub description: Option<String>,
}

/// Input for updating a blog post
#[derive(Debug, Clone)]
pub struct UpdateBlogInput {
    pub title: String,
    pub content: String,
    pub description: Option<String>,
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters, clamped to `1..=MAX_PAGE_SIZE`
    pub fn new(page: u32, page_size: u32) -> Self {
        Self::with_max(page, page_size, MAX_PAGE_SIZE)
    }

    /// Create pagination parameters with a caller-supplied page size ceiling
    pub fn with_max(page: u32, page_size: u32, max_page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, max_page_size.max(1)),
        }
    }

    /// Rows to skip: `(page - 1) * page_size`
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * (self.page_size as i64)
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            page_size: params.page_size,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 || self.total <= 0 {
            return 0;
        }
        let pages = (self.total + self.page_size as i64 - 1) / self.page_size as i64;
        pages.min(u32::MAX as i64) as u32
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

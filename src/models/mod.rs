//! Data models
//!
//! This module contains the data structures used throughout the Inkpost server:
//! - Database entities (User, Session, Blog)
//! - Input types for the service layer
//! - Pagination types

mod blog;
mod session;
mod user;

pub use blog::{
    Blog, BlogAuthor, CreateBlogInput, ListParams, PagedResult, UpdateBlogInput, MAX_PAGE_SIZE,
};
pub use session::Session;
pub use user::{User, UserRole};

//! Blog service
//!
//! Business rules for blog posts:
//! - Field validation and description excerpts
//! - Pagination over the repository's offset/limit queries
//! - Ownership checks for edits and deletes

use crate::db::repositories::BlogRepository;
use crate::models::{Blog, CreateBlogInput, ListParams, PagedResult, UpdateBlogInput, User};
use anyhow::Context;
use std::sync::Arc;

/// Title length bounds, in characters
pub const TITLE_MAX_CHARS: usize = 100;

/// Content length bound, in characters
pub const CONTENT_MAX_CHARS: usize = 10_000;

/// Description length bound, in characters
pub const DESCRIPTION_MAX_CHARS: usize = 300;

/// Characters of content used when no description is given
pub const EXCERPT_CHARS: usize = 60;

/// Error types for blog service operations
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    /// Input failed a validation rule
    #[error("{0}")]
    ValidationError(String),

    /// No post with that ID
    #[error("blog not found")]
    NotFound,

    /// Caller is neither the author nor an admin
    #[error("permission denied")]
    Forbidden,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Blog service for managing posts
pub struct BlogService {
    repo: Arc<dyn BlogRepository>,
}

impl BlogService {
    /// Create a new blog service
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    /// List a page of posts, newest first, optionally for a single author
    pub async fn list(
        &self,
        params: &ListParams,
        user_id: Option<i64>,
    ) -> Result<PagedResult<Blog>, BlogServiceError> {
        let items = self
            .repo
            .list(params.offset(), params.limit(), user_id)
            .await
            .context("Failed to list blogs")?;
        let total = self.count(user_id).await?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Count posts, optionally for a single author
    pub async fn count(&self, user_id: Option<i64>) -> Result<i64, BlogServiceError> {
        let total = self
            .repo
            .count(user_id)
            .await
            .context("Failed to count blogs")?;

        Ok(total)
    }

    /// Get post by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Blog>, BlogServiceError> {
        let blog = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get blog by ID")?;

        Ok(blog)
    }

    /// Create a post owned by `author`
    pub async fn create(
        &self,
        input: CreateBlogInput,
        author: &User,
    ) -> Result<Blog, BlogServiceError> {
        let fields = BlogFields::validate(&input.title, &input.content, input.description.as_deref())?;

        let blog = self
            .repo
            .create(&fields.title, &fields.content, &fields.description, author.id)
            .await
            .context("Failed to create blog")?;

        tracing::info!(blog_id = blog.id, user_id = author.id, "Created blog");
        Ok(blog)
    }

    /// Replace a post's title, content and description
    ///
    /// Only the author or an admin may edit.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateBlogInput,
        editor: &User,
    ) -> Result<Blog, BlogServiceError> {
        self.check_ownership(id, editor).await?;
        let fields = BlogFields::validate(&input.title, &input.content, input.description.as_deref())?;

        let blog = self
            .repo
            .update(id, &fields.title, &fields.content, &fields.description)
            .await
            .context("Failed to update blog")?
            .ok_or(BlogServiceError::NotFound)?;

        tracing::info!(blog_id = id, user_id = editor.id, "Updated blog");
        Ok(blog)
    }

    /// Delete a post
    ///
    /// Only the author or an admin may delete.
    pub async fn delete(&self, id: i64, editor: &User) -> Result<(), BlogServiceError> {
        self.check_ownership(id, editor).await?;

        let removed = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete blog")?;
        if !removed {
            return Err(BlogServiceError::NotFound);
        }

        tracing::info!(blog_id = id, user_id = editor.id, "Deleted blog");
        Ok(())
    }

    async fn check_ownership(&self, id: i64, editor: &User) -> Result<(), BlogServiceError> {
        let existing = self.get_by_id(id).await?.ok_or(BlogServiceError::NotFound)?;
        if !editor.can_edit(existing.user_id) {
            return Err(BlogServiceError::Forbidden);
        }
        Ok(())
    }
}

/// Validated, normalized post fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogFields {
    pub title: String,
    pub content: String,
    pub description: String,
}

impl BlogFields {
    /// Validate raw input and fill in a missing description
    ///
    /// The title is trimmed. A blank description becomes the first
    /// `EXCERPT_CHARS` characters of the content.
    pub fn validate(
        title: &str,
        content: &str,
        description: Option<&str>,
    ) -> Result<Self, BlogServiceError> {
        let title = title.trim();
        if title.is_empty() || title.chars().count() > TITLE_MAX_CHARS {
            return Err(BlogServiceError::ValidationError(format!(
                "title must be 1-{} characters",
                TITLE_MAX_CHARS
            )));
        }

        if content.trim().is_empty() || content.chars().count() > CONTENT_MAX_CHARS {
            return Err(BlogServiceError::ValidationError(format!(
                "content must be 1-{} characters",
                CONTENT_MAX_CHARS
            )));
        }

        let description = match description.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) if d.chars().count() > DESCRIPTION_MAX_CHARS => {
                return Err(BlogServiceError::ValidationError(format!(
                    "description must be at most {} characters",
                    DESCRIPTION_MAX_CHARS
                )));
            }
            Some(d) => d.to_string(),
            None => excerpt(content),
        };

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
            description,
        })
    }
}

/// First `EXCERPT_CHARS` characters of the content, trimmed
pub fn excerpt(content: &str) -> String {
    content
        .trim()
        .chars()
        .take(EXCERPT_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxBlogRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::UserRole;
    use proptest::prelude::*;

    async fn setup_test_service() -> (DynDatabasePool, BlogService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = BlogService::new(SqlxBlogRepository::boxed(pool.clone()));
        (pool, service)
    }

    async fn create_user(pool: &DynDatabasePool, username: &str, role: UserRole) -> User {
        SqlxUserRepository::new(pool.clone())
            .create(&User::new(username.to_string(), "hash".to_string(), role))
            .await
            .expect("Failed to create test user")
    }

    fn input(title: &str, content: &str, description: Option<&str>) -> CreateBlogInput {
        CreateBlogInput {
            title: title.to_string(),
            content: content.to_string(),
            description: description.map(str::to_string),
        }
    }

    fn update(title: &str, content: &str) -> UpdateBlogInput {
        UpdateBlogInput {
            title: title.to_string(),
            content: content.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (pool, service) = setup_test_service().await;
        let author = create_user(&pool, "writer", UserRole::Author).await;

        let created = service
            .create(input("  Hello  ", "Body text", Some("Summary")), &author)
            .await
            .expect("Failed to create blog");

        let found = service.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Hello");
        assert_eq!(found.content, "Body text");
        assert_eq!(found.description, "Summary");
        assert_eq!(found.user_id, author.id);
    }

    #[tokio::test]
    async fn test_create_derives_description() {
        let (pool, service) = setup_test_service().await;
        let author = create_user(&pool, "writer", UserRole::Author).await;
        let content = "x".repeat(200);

        let created = service
            .create(input("Long", &content, Some("   ")), &author)
            .await
            .unwrap();

        assert_eq!(created.description, "x".repeat(EXCERPT_CHARS));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let (pool, service) = setup_test_service().await;
        let author = create_user(&pool, "writer", UserRole::Author).await;

        let long_title = "t".repeat(TITLE_MAX_CHARS + 1);
        let long_desc = "d".repeat(DESCRIPTION_MAX_CHARS + 1);
        for bad in [
            input("", "body", None),
            input(&long_title, "body", None),
            input("title", "   ", None),
            input("title", "body", Some(&long_desc)),
        ] {
            let err = service.create(bad, &author).await.expect_err("should fail");
            assert!(matches!(err, BlogServiceError::ValidationError(_)));
        }

        assert_eq!(service.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let (pool, service) = setup_test_service().await;
        let author = create_user(&pool, "writer", UserRole::Author).await;
        for i in 1..=5 {
            service
                .create(input(&format!("Post {}", i), "body", None), &author)
                .await
                .unwrap();
        }

        let page = service.list(&ListParams::new(2, 2), None).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(
            page.items.iter().map(|b| b.title.as_str()).collect::<Vec<_>>(),
            vec!["Post 3", "Post 2"]
        );

        let by_author = service
            .list(&ListParams::new(1, 10), Some(author.id + 1))
            .await
            .unwrap();
        assert!(by_author.is_empty());
        assert_eq!(by_author.total, 0);
    }

    #[tokio::test]
    async fn test_update_by_author_and_admin() {
        let (pool, service) = setup_test_service().await;
        let admin = create_user(&pool, "admin", UserRole::Admin).await;
        let author = create_user(&pool, "writer", UserRole::Author).await;
        let blog = service
            .create(input("Draft", "body", None), &author)
            .await
            .unwrap();

        let edited = service
            .update(blog.id, update("Final", "new body"), &author)
            .await
            .unwrap();
        assert_eq!(edited.title, "Final");
        assert_eq!(edited.description, "new body");

        let moderated = service
            .update(blog.id, update("Moderated", "body"), &admin)
            .await
            .unwrap();
        assert_eq!(moderated.title, "Moderated");
    }

    #[tokio::test]
    async fn test_update_and_delete_forbidden_for_other_author() {
        let (pool, service) = setup_test_service().await;
        let owner = create_user(&pool, "owner", UserRole::Author).await;
        let other = create_user(&pool, "other", UserRole::Author).await;
        let blog = service
            .create(input("Mine", "body", None), &owner)
            .await
            .unwrap();

        let err = service
            .update(blog.id, update("Yours", "body"), &other)
            .await
            .expect_err("should be forbidden");
        assert!(matches!(err, BlogServiceError::Forbidden));

        let err = service.delete(blog.id, &other).await.expect_err("should be forbidden");
        assert!(matches!(err, BlogServiceError::Forbidden));

        assert!(service.get_by_id(blog.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_blog_is_not_found() {
        let (pool, service) = setup_test_service().await;
        let admin = create_user(&pool, "admin", UserRole::Admin).await;

        assert!(matches!(
            service.update(404, update("t", "c"), &admin).await,
            Err(BlogServiceError::NotFound)
        ));
        assert!(matches!(
            service.delete(404, &admin).await,
            Err(BlogServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_by_owner() {
        let (pool, service) = setup_test_service().await;
        let owner = create_user(&pool, "owner", UserRole::Author).await;
        let blog = service
            .create(input("Gone", "body", None), &owner)
            .await
            .unwrap();

        service.delete(blog.id, &owner).await.unwrap();
        assert!(service.get_by_id(blog.id).await.unwrap().is_none());
    }

    #[test]
    fn test_excerpt_counts_characters() {
        let content = "日本語".repeat(30);
        let e = excerpt(&content);
        assert_eq!(e.chars().count(), EXCERPT_CHARS);
        assert_eq!(excerpt("  short  "), "short");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn derived_description_is_bounded_prefix(content in "\\PC{1,500}") {
            prop_assume!(!content.trim().is_empty());
            let fields = BlogFields::validate("title", &content, None).unwrap();
            prop_assert!(fields.description.chars().count() <= EXCERPT_CHARS);
            prop_assert!(content.trim().starts_with(&fields.description));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn insert_then_get_preserves_fields(
            title in "[A-Za-z][A-Za-z0-9 ]{0,40}[A-Za-z0-9]",
            content in "[A-Za-z0-9 .,]{1,200}[a-z]",
            description in "[A-Za-z0-9]{1,50}",
        ) {
            let result: Result<(), TestCaseError> = tokio_test::block_on(async {
                let (pool, service) = setup_test_service().await;
                let author = create_user(&pool, "writer", UserRole::Author).await;

                let created = service
                    .create(input(&title, &content, Some(&description)), &author)
                    .await
                    .expect("create should succeed");
                let found = service
                    .get_by_id(created.id)
                    .await
                    .expect("get should not error")
                    .expect("blog should exist");

                prop_assert_eq!(found.title, title.clone());
                prop_assert_eq!(found.content, content.clone());
                prop_assert_eq!(found.description, description.clone());
                Ok(())
            });
            result?;
        }
    }
}

//! Common API utilities and shared types
//!
//! Query and body types shared by the blog endpoints, plus extractors that
//! turn malformed query strings and path ids into the `Failure` envelope.

use axum::{
    extract::{FromRequestParts, Path, Query},
    http::{request::Parts, StatusCode},
};
use serde::Deserialize;

use crate::api::results::Failure;
use crate::config::BlogConfig;
use crate::models::ListParams;

/// Query string for `GET /blog`
///
/// Page numbers are signed so that `page=-1` reaches the clamp instead of
/// failing to parse.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Restrict the listing to one author
    pub user_id: Option<i64>,
}

impl BlogListQuery {
    /// Resolve pagination against the configured defaults and ceiling
    pub fn list_params(&self, config: &BlogConfig) -> ListParams {
        ListParams::with_max(
            to_u32(self.page.unwrap_or(1)),
            self.page_size.map(to_u32).unwrap_or(config.default_page_size),
            config.max_page_size,
        )
    }
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// `GET /blog` query, rejected with a `Failure` when it doesn't parse
#[derive(Debug)]
pub struct ListQuery(pub BlogListQuery);

impl<S: Send + Sync> FromRequestParts<S> for ListQuery {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<BlogListQuery>::from_request_parts(parts, state).await {
            Ok(Query(query)) => Ok(ListQuery(query)),
            Err(e) => {
                tracing::debug!("Rejected blog list query: {}", e);
                Err(Failure::new(StatusCode::BAD_REQUEST, "invalid query"))
            }
        }
    }
}

/// Numeric blog id from the `/blog/{id}` path
#[derive(Debug, Clone, Copy)]
pub struct BlogId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for BlogId {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(BlogId(id)),
            Err(e) => {
                tracing::debug!("Rejected blog id: {}", e);
                Err(Failure::new(StatusCode::BAD_REQUEST, "invalid blog id"))
            }
        }
    }
}

/// Body for creating or replacing a blog post
///
/// Missing fields deserialize as empty so they fail validation with a
/// readable message instead of a JSON rejection.
#[derive(Debug, Default, Deserialize)]
pub struct BlogBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for `POST /auth/login` and `POST /auth/register`
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

//! Blog API endpoints
//!
//! - GET /blog - Paginated listing, optionally by author
//! - GET /blog/{id} - Single post
//! - POST /blog - Create (login required)
//! - PATCH /blog/{id} - Replace fields (author or admin)
//! - DELETE /blog/{id} - Delete (author or admin)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::api::common::{BlogBody, BlogId, ListQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::results::{BlogListResult, BlogResult, Failure};
use crate::models::{CreateBlogInput, UpdateBlogInput};
use crate::services::BlogServiceError;

/// Routes that anyone may call
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/blog", get(list_blogs))
        .route("/blog/{id}", get(get_blog))
}

/// Routes that need a logged-in user
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/blog", axum::routing::post(create_blog))
        .route(
            "/blog/{id}",
            axum::routing::patch(update_blog).delete(delete_blog),
        )
}

/// GET /blog
async fn list_blogs(
    State(state): State<AppState>,
    ListQuery(query): ListQuery,
) -> Result<BlogListResult, ApiError> {
    let params = query.list_params(&state.blog);
    let page = state
        .blog_service
        .list(&params, query.user_id)
        .await
        .map_err(ApiError::internal)?;

    Ok(page.into())
}

/// GET /blog/{id}
async fn get_blog(
    State(state): State<AppState>,
    BlogId(id): BlogId,
) -> Result<Response, ApiError> {
    match state.blog_service.get_by_id(id).await {
        Ok(Some(blog)) => Ok(BlogResult::ok("get blog success", Some(blog)).into_response()),
        Ok(None) => blog_failure(BlogServiceError::NotFound),
        Err(e) => blog_failure(e),
    }
}

/// POST /blog
async fn create_blog(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<BlogBody>,
) -> Result<Response, ApiError> {
    let input = CreateBlogInput {
        title: body.title,
        content: body.content,
        description: body.description,
    };

    match state.blog_service.create(input, &user).await {
        Ok(blog) => Ok(BlogResult::ok("created", Some(blog)).into_response()),
        Err(e) => blog_failure(e),
    }
}

/// PATCH /blog/{id}
async fn update_blog(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    BlogId(id): BlogId,
    Json(body): Json<BlogBody>,
) -> Result<Response, ApiError> {
    let input = UpdateBlogInput {
        title: body.title,
        content: body.content,
        description: body.description,
    };

    match state.blog_service.update(id, input, &user).await {
        Ok(blog) => Ok(BlogResult::ok("updated", Some(blog)).into_response()),
        Err(e) => blog_failure(e),
    }
}

/// DELETE /blog/{id}
async fn delete_blog(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    BlogId(id): BlogId,
) -> Result<Response, ApiError> {
    match state.blog_service.delete(id, &user).await {
        Ok(()) => Ok(BlogResult::ok("deleted", None).into_response()),
        Err(e) => blog_failure(e),
    }
}

fn blog_failure(err: BlogServiceError) -> Result<Response, ApiError> {
    let code = match &err {
        BlogServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
        BlogServiceError::NotFound => StatusCode::NOT_FOUND,
        BlogServiceError::Forbidden => StatusCode::FORBIDDEN,
        BlogServiceError::InternalError(e) => return Err(ApiError::internal(e)),
    };
    Ok(Failure::new(code, err.to_string()).into_response())
}

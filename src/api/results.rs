//! Result envelopes returned by the auth and blog endpoints
//!
//! Every envelope carries `status` (`"ok"` or `"fail"`) and a human-readable
//! `msg`. The HTTP status travels alongside but is never serialized.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Blog, BlogAuthor, PagedResult, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Fail,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub avatar: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            avatar: user.avatar,
            role: user.role.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Public view of a blog post
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<BlogAuthor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Blog> for BlogView {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            description: blog.description,
            content: blog.content,
            user_id: blog.user_id,
            user: blog.author,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }
}

/// `{status, msg, isLogin, data?}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    #[serde(skip)]
    code: StatusCode,
    pub status: ResultStatus,
    pub msg: String,
    pub is_login: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<UserView>,
}

impl AuthResult {
    pub fn logged_in(msg: impl Into<String>, user: User) -> Self {
        Self {
            code: StatusCode::OK,
            status: ResultStatus::Ok,
            msg: msg.into(),
            is_login: true,
            data: Some(user.into()),
        }
    }

    pub fn not_logged_in() -> Self {
        Self {
            code: StatusCode::OK,
            status: ResultStatus::Ok,
            msg: String::new(),
            is_login: false,
            data: None,
        }
    }

    pub fn logged_out(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            ..Self::not_logged_in()
        }
    }

    pub fn failed(code: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            status: ResultStatus::Fail,
            msg: msg.into(),
            is_login: false,
            data: None,
        }
    }
}

impl IntoResponse for AuthResult {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

/// `{status, msg, data?}`
#[derive(Debug, Clone, Serialize)]
pub struct BlogResult {
    pub status: ResultStatus,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BlogView>,
}

impl BlogResult {
    pub fn ok(msg: impl Into<String>, blog: Option<Blog>) -> Self {
        Self {
            status: ResultStatus::Ok,
            msg: msg.into(),
            data: blog.map(BlogView::from),
        }
    }
}

impl IntoResponse for BlogResult {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{status, msg, total, page, totalPage, data}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListResult {
    pub status: ResultStatus,
    pub msg: String,
    pub total: i64,
    pub page: u32,
    pub total_page: u32,
    pub data: Vec<BlogView>,
}

impl From<PagedResult<Blog>> for BlogListResult {
    fn from(result: PagedResult<Blog>) -> Self {
        Self {
            status: ResultStatus::Ok,
            msg: "get blog list success".to_string(),
            total: result.total,
            page: result.page,
            total_page: result.total_pages(),
            data: result.items.into_iter().map(BlogView::from).collect(),
        }
    }
}

impl IntoResponse for BlogListResult {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{status: "fail", msg}` with an error status code
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    #[serde(skip)]
    code: StatusCode,
    pub status: ResultStatus,
    pub msg: String,
}

impl Failure {
    pub fn new(code: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            status: ResultStatus::Fail,
            msg: msg.into(),
        }
    }

    pub fn not_logged_in() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "user not logged in")
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListParams, UserRole};

    fn sample_user() -> User {
        let mut user = User::new("alice".to_string(), "$argon2id$x".to_string(), UserRole::Author);
        user.id = 7;
        user
    }

    #[test]
    fn test_auth_result_shape() {
        let json = serde_json::to_value(AuthResult::logged_in("login success", sample_user())).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["msg"], "login success");
        assert_eq!(json["isLogin"], true);
        assert_eq!(json["data"]["id"], 7);
        assert_eq!(json["data"]["username"], "alice");
        assert_eq!(json["data"]["role"], "author");
        assert!(json["data"].get("createdAt").is_some());
        assert!(json["data"].get("passwordHash").is_none());
        assert!(json.get("code").is_none());
    }

    #[test]
    fn test_not_logged_in_omits_data() {
        let json = serde_json::to_value(AuthResult::not_logged_in()).unwrap();
        assert_eq!(json["isLogin"], false);
        assert!(json.get("data").is_none());

        let failed = AuthResult::failed(StatusCode::CONFLICT, "username already exist");
        assert_eq!(failed.code, StatusCode::CONFLICT);
        let json = serde_json::to_value(failed).unwrap();
        assert_eq!(json["status"], "fail");
    }

    #[test]
    fn test_blog_list_result_shape() {
        let now = Utc::now();
        let blog = Blog {
            id: 1,
            title: "t".to_string(),
            description: "d".to_string(),
            content: "c".to_string(),
            user_id: 7,
            created_at: now,
            updated_at: now,
            author: None,
        };
        let paged = PagedResult::new(vec![blog], 11, &ListParams::new(2, 5));
        let json = serde_json::to_value(BlogListResult::from(paged)).unwrap();

        assert_eq!(json["total"], 11);
        assert_eq!(json["page"], 2);
        assert_eq!(json["totalPage"], 3);
        assert_eq!(json["data"][0]["userId"], 7);
        assert!(json["data"][0].get("user").is_none());
    }

    #[test]
    fn test_failure_shape() {
        let failure = Failure::not_logged_in();
        assert_eq!(failure.code(), StatusCode::UNAUTHORIZED);
        let json = serde_json::to_value(failure).unwrap();
        assert_eq!(json["status"], "fail");
        assert_eq!(json["msg"], "user not logged in");
    }
}

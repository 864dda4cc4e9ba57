//! Authentication API endpoints
//!
//! - GET /auth - Current login state
//! - POST /auth/login - Login with username and password
//! - POST /auth/register - Create an account and log it in
//! - GET /auth/logout - End the current session

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::api::common::CredentialsBody;
use crate::api::middleware::{extract_session_token, ApiError, AppState, MaybeUser};
use crate::api::results::{AuthResult, Failure};
use crate::config::AuthConfig;
use crate::models::Session;
use crate::services::user::{LoginInput, RegisterInput, UserServiceError};

/// Build the auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth", get(status))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", get(logout))
}

/// GET /auth
async fn status(MaybeUser(user): MaybeUser) -> AuthResult {
    match user {
        Some(user) => AuthResult::logged_in("", user),
        None => AuthResult::not_logged_in(),
    }
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<Response, ApiError> {
    match state
        .user_service
        .login(LoginInput::new(body.username, body.password))
        .await
    {
        Ok((user, session)) => Ok(with_session(
            &state.auth,
            &session,
            AuthResult::logged_in("login success", user),
        )),
        Err(e) => auth_failure(e),
    }
}

/// POST /auth/register
///
/// A successful registration logs the new user straight in.
async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<Response, ApiError> {
    let password = body.password.clone();
    let user = match state
        .user_service
        .register(RegisterInput::new(body.username, body.password))
        .await
    {
        Ok(user) => user,
        Err(e) => return auth_failure(e),
    };

    let (user, session) = state
        .user_service
        .login(LoginInput::new(user.username, password))
        .await
        .map_err(ApiError::internal)?;

    Ok(with_session(
        &state.auth,
        &session,
        AuthResult::logged_in("register success", user),
    ))
}

/// GET /auth/logout
async fn logout(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&headers, &state.auth.cookie_name);
    let (Some(user), Some(token)) = (user, token) else {
        return Ok(Failure::not_logged_in().into_response());
    };

    state
        .user_service
        .logout(&token)
        .await
        .map_err(ApiError::internal)?;
    tracing::info!(user_id = user.id, "User {} logged out", user.username);

    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        state.auth.cookie_name
    );
    Ok((
        [(header::SET_COOKIE, cookie)],
        AuthResult::logged_out("logout success"),
    )
        .into_response())
}

/// Attach the session cookie to a successful auth response
fn with_session(config: &AuthConfig, session: &Session, result: AuthResult) -> Response {
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.cookie_name,
        session.id,
        config.session_max_age()
    );
    ([(header::SET_COOKIE, cookie)], result).into_response()
}

fn auth_failure(err: UserServiceError) -> Result<Response, ApiError> {
    let code = match &err {
        UserServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
        UserServiceError::UserExists => StatusCode::CONFLICT,
        UserServiceError::UserNotFound | UserServiceError::BadCredentials => {
            StatusCode::UNAUTHORIZED
        }
        UserServiceError::InternalError(e) => return Err(ApiError::internal(e)),
    };
    Ok(AuthResult::failed(code, err.to_string()).into_response())
}

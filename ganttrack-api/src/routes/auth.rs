/// Authentication endpoints
///
/// Session lifecycle: `login` signs a session token and sets it as an
/// `HttpOnly` cookie; `logout` overwrites the cookie; `me` returns the
/// session user's profile; `check` reports whether a session is active
/// without ever failing.
///
/// # Endpoints
///
/// - `POST /api/auth/login` - Establish a session
/// - `POST /api/auth/logout` - Clear the session
/// - `GET /api/auth/me` - Current user (session required)
/// - `GET /api/auth/check` - Session status (public)

use crate::{
    app::{session_token, AppState},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::AppendHeaders,
    Extension, Json,
};
use ganttrack_shared::{
    auth::{
        middleware::AuthContext,
        password, session,
        session::SessionClaims,
    },
    models::user::{User, UserProfile},
};
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    #[serde(default)]
    pub email: String,

    /// Password
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Confirmation message
    pub message: String,

    /// The logged-in user's profile
    pub user: UserProfile,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Confirmation message
    pub message: String,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    /// Whether a valid session is active
    pub authenticated: bool,

    /// The session user's profile, when authenticated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

/// Login endpoint
///
/// Verifies the credentials and establishes a session valid for a
/// fixed 30 days.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Email or password missing
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(AppendHeaders<[(header::HeaderName, String); 1]>, Json<LoginResponse>)> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let claims = SessionClaims::new(user.id, user.is_admin);
    let token = session::create_token(&claims, state.session_secret())?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok((
        AppendHeaders([(header::SET_COOKIE, session::session_cookie(&token))]),
        Json(LoginResponse {
            message: "Logged in successfully".to_string(),
            user: user.profile(),
        }),
    ))
}

/// Logout endpoint
///
/// Clears the session cookie. Always succeeds, with or without an
/// active session.
pub async fn logout(
) -> (AppendHeaders<[(header::HeaderName, String); 1]>, Json<LogoutResponse>) {
    (
        AppendHeaders([(header::SET_COOKIE, session::clear_session_cookie())]),
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Current-user endpoint
///
/// Requires a session. The profile is re-fetched from storage, so a
/// user deleted after login answers 404.
///
/// # Errors
///
/// - `401 Unauthorized`: No valid session
/// - `404 Not Found`: Session user no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.profile()))
}

/// Session status endpoint
///
/// Never fails: an absent, invalid, or expired session (or a deleted
/// session user) simply reports `authenticated: false`.
pub async fn check(State(state): State<AppState>, headers: HeaderMap) -> Json<CheckResponse> {
    match current_session_user(&state, &headers).await {
        Some(profile) => Json(CheckResponse {
            authenticated: true,
            user: Some(profile),
        }),
        None => Json(CheckResponse {
            authenticated: false,
            user: None,
        }),
    }
}

/// Resolves the session cookie to a live user profile, if any
async fn current_session_user(state: &AppState, headers: &HeaderMap) -> Option<UserProfile> {
    let token = session_token(headers)?;
    let claims = session::validate_token(&token, state.session_secret()).ok()?;

    match User::find_by_id(&state.db, claims.sub).await {
        Ok(user) => user.map(|u| u.profile()),
        Err(e) => {
            tracing::warn!("Session check storage lookup failed: {}", e);
            None
        }
    }
}

/// User management endpoints
///
/// Listing and detail are open to any session; creating, updating, and
/// deleting accounts are admin-only. Responses carry public profiles —
/// the password hash never leaves the storage layer, and the detail
/// view only reports whether a password is set.
///
/// # Endpoints
///
/// - `GET /api/users` - List all users
/// - `POST /api/users` - Create user (admin)
/// - `GET /api/users/:id` - User detail with has_password flag
/// - `PUT /api/users/:id` - Partial update (admin)
/// - `DELETE /api/users/:id` - Delete user (admin)

use crate::{
    app::AppState,
    error::{validation_message, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use ganttrack_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{CreateUser, UpdateUser, User, UserProfile},
};
use serde::Deserialize;
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Family name
    #[serde(default)]
    pub last_name: String,

    /// Given name
    #[serde(default)]
    pub first_name: String,

    /// Email address
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[serde(default)]
    pub password: String,

    /// Admin flag
    #[serde(default)]
    pub is_admin: bool,
}

/// Update user request
///
/// All fields optional; only supplied fields change. A supplied
/// password is re-hashed; an empty password is ignored.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// New family name
    pub last_name: Option<String>,

    /// New given name
    pub first_name: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New plaintext password
    pub password: Option<String>,

    /// New admin flag
    pub is_admin: Option<bool>,
}

/// List all users
///
/// Used by the front-end for assignee selection, so it is open to any
/// session, not just admins.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserProfile>>> {
    let users = User::list(&state.db).await?;
    Ok(Json(users.iter().map(User::profile).collect()))
}

/// Create a user (admin only)
///
/// # Errors
///
/// - `400 Bad Request`: Missing name/email/password, malformed email,
///   or email already registered
/// - `401 Unauthorized`: No valid session
/// - `403 Forbidden`: Session user is not an admin
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    auth.require_admin()?;

    if req.last_name.is_empty() || req.first_name.is_empty() {
        return Err(ApiError::BadRequest(
            "Last name and first name are required".to_string(),
        ));
    }
    if req.email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }

    req.validate()
        .map_err(|e| ApiError::BadRequest(validation_message(&e)))?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::BadRequest(
            "This email address is already in use".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            last_name: req.last_name,
            first_name: req.first_name,
            email: req.email,
            password_hash,
            is_admin: req.is_admin,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, admin_id = auth.user_id, "User created");

    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// User detail
///
/// The detail view carries `has_password` (a boolean, never the hash)
/// for the administration screen.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.profile_with_password_flag()))
}

/// Update a user (admin only)
///
/// Partial update: only supplied fields change. The email is checked
/// for collisions when it is actually changing; the password is
/// re-hashed only when a non-empty one is supplied.
///
/// # Errors
///
/// - `400 Bad Request`: New email already registered
/// - `401 Unauthorized` / `403 Forbidden`: Guard failures
/// - `404 Not Found`: Unknown user id
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    auth.require_admin()?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if let Some(ref email) = req.email {
        if *email != user.email && User::find_by_email(&state.db, email).await?.is_some() {
            return Err(ApiError::BadRequest(
                "This email address is already in use".to_string(),
            ));
        }
    }

    let password_hash = match req.password {
        Some(ref password) if !password.is_empty() => Some(password::hash_password(password)?),
        _ => None,
    };

    let updated = User::update(
        &state.db,
        user_id,
        UpdateUser {
            last_name: req.last_name,
            first_name: req.first_name,
            email: req.email,
            password_hash,
            is_admin: req.is_admin,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(updated.profile()))
}

/// Delete a user (admin only)
///
/// No cascade: projects owned by the user keep existing with a nulled
/// owner, and task assignee lists are left untouched.
///
/// # Errors
///
/// - `401 Unauthorized` / `403 Forbidden`: Guard failures
/// - `404 Not Found`: Unknown user id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    auth.require_admin()?;

    let deleted = User::delete(&state.db, user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id, admin_id = auth.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

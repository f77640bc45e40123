/// User model and database operations
///
/// Users are the accounts that authenticate against the API. The admin
/// flag gates user management; everything else only needs a session.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     last_name VARCHAR(80) NOT NULL,
///     first_name VARCHAR(80) NOT NULL,
///     email VARCHAR(120) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use ganttrack_shared::models::user::{CreateUser, User};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         last_name: "Yamada".to_string(),
///         first_name: "Taro".to_string(),
///         email: "taro@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         is_admin: false,
///     },
/// )
/// .await?;
/// println!("Created user: {}", user.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User model representing an account
///
/// The password hash never leaves this struct: API responses are built
/// through [`User::profile`], which omits it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id
    pub id: i64,

    /// Family name
    pub last_name: String,

    /// Given name
    pub first_name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Whether this account may manage other accounts
    pub is_admin: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Family name
    pub last_name: String,

    /// Given name
    pub first_name: String,

    /// Email address (must not already be registered)
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Admin flag
    pub is_admin: bool,
}

/// Input for updating an existing user
///
/// All fields are optional; only non-None fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// New family name
    pub last_name: Option<String>,

    /// New given name
    pub first_name: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New password hash (only set when the caller supplied a new password)
    pub password_hash: Option<String>,

    /// New admin flag
    pub is_admin: Option<bool>,
}

/// Public view of a user, safe to serialize into API responses
///
/// `full_name` is the display form "{last_name} {first_name}".
/// `has_password` is only populated for the single-user detail view and
/// reports whether a credential is set — never the hash itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User id
    pub id: i64,

    /// Family name
    pub last_name: String,

    /// Given name
    pub first_name: String,

    /// Display name
    pub full_name: String,

    /// Email address
    pub email: String,

    /// Admin flag
    pub is_admin: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// Whether a password is set (detail view only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_password: Option<bool>,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint)
    /// or the database is unreachable
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (last_name, first_name, email, password_hash, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, last_name, first_name, email, password_hash, is_admin,
                      created_at, updated_at
            "#,
        )
        .bind(data.last_name)
        .bind(data.first_name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.is_admin)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by id, None if absent
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, last_name, first_name, email, password_hash, is_admin,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address, None if absent
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, last_name, first_name, email, password_hash, is_admin,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users in id order
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, last_name, first_name, email, password_hash, is_admin,
                   created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` are written; `updated_at` is
    /// always bumped. Returns the updated user, or None if the id does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the new email collides with another user or
    /// the database is unreachable
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the UPDATE dynamically from the fields that are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.last_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", last_name = ${}", bind_count));
        }
        if data.first_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", first_name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.is_admin.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_admin = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, last_name, first_name, email, password_hash, \
             is_admin, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(last_name) = data.last_name {
            q = q.bind(last_name);
        }
        if let Some(first_name) = data.first_name {
            q = q.bind(first_name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(is_admin) = data.is_admin {
            q = q.bind(is_admin);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Deletes a user by id
    ///
    /// Returns true if a row was removed. Projects owned by the user
    /// are kept with their owner reference nulled; tasks that list the
    /// user as an assignee are left untouched.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Builds the public profile for API responses
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            full_name: format!("{} {}", self.last_name, self.first_name),
            email: self.email.clone(),
            is_admin: self.is_admin,
            created_at: self.created_at,
            updated_at: self.updated_at,
            has_password: None,
        }
    }

    /// Builds the detail profile including the has-password flag
    pub fn profile_with_password_flag(&self) -> UserProfile {
        UserProfile {
            has_password: Some(!self.password_hash.is_empty()),
            ..self.profile()
        }
    }
}

/// Startup bootstrap: default admin seeding
///
/// A freshly created database has no accounts, and only admins can
/// create accounts. To break that cycle, startup seeds a single default
/// admin when no admin user exists yet. The step is idempotent — once
/// any admin account is present it does nothing — and runs inside a
/// transaction so a half-written seed is never visible.
///
/// Callers treat a seeding failure as non-fatal: the error is logged
/// and the server starts anyway (an operator can still point the
/// service at a database that was seeded elsewhere).

use sqlx::postgres::PgPool;
use tracing::info;

use crate::auth::password::{hash_password, PasswordError};

/// Credentials for the seeded default admin account
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    /// Email of the default admin
    pub email: String,

    /// Plaintext password; hashed before it touches storage
    pub password: String,
}

/// Error type for the bootstrap step
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Storage failure while seeding
    #[error("Bootstrap storage error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failure
    #[error("Bootstrap password error: {0}")]
    Password(#[from] PasswordError),
}

/// Seeds the default admin account if no admin exists yet
///
/// Returns `true` when an account was created, `false` when the step
/// was a no-op because an admin already exists.
///
/// # Errors
///
/// Returns `BootstrapError` if the transaction or the password hash
/// fails; the transaction is rolled back on error.
pub async fn seed_default_admin(
    pool: &PgPool,
    admin: &BootstrapAdmin,
) -> Result<bool, BootstrapError> {
    let mut tx = pool.begin().await?;

    let (admin_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_admin = TRUE")
            .fetch_one(&mut *tx)
            .await?;

    if admin_count > 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    let password_hash = hash_password(&admin.password)?;

    sqlx::query(
        r#"
        INSERT INTO users (last_name, first_name, email, password_hash, is_admin)
        VALUES ($1, $2, $3, $4, TRUE)
        "#,
    )
    .bind("Admin")
    .bind("User")
    .bind(&admin.email)
    .bind(&password_hash)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(email = %admin.email, "Seeded default admin account");
    Ok(true)
}

/// Session token generation and validation
///
/// A session is a signed HS256 token carried in an `HttpOnly` cookie.
/// The token holds the user's id and a copy of the admin flag, and is
/// valid for a fixed 30 days from login — the expiry is not refreshed
/// by activity, so a session simply runs out 30 days after it was
/// established.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Validation**: Signature, expiration, and issuer checks
/// - **Secret Management**: Secrets should be at least 32 bytes
/// - **Cookie attributes**: `HttpOnly; SameSite=Lax; Path=/`
///
/// # Example
///
/// ```
/// use ganttrack_shared::auth::session::{create_token, validate_token, SessionClaims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = SessionClaims::new(42, false);
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "ganttrack_session";

/// Fixed session lifetime: 30 days from login
pub const SESSION_LIFETIME_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to create token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate session token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,
}

/// Claims signed into the session token
///
/// # Standard Claims
///
/// - `sub`: Subject (user id)
/// - `iss`: Issuer (always "ganttrack")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp (login time + 30 days)
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `admin`: Admin flag as it was at login time. Authorization guards
///   trust this cached copy for the life of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - user id
    pub sub: i64,

    /// Issuer - always "ganttrack"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Admin flag captured at login
    pub admin: bool,
}

impl SessionClaims {
    /// Creates claims for a fresh login with the fixed 30-day expiry
    pub fn new(user_id: i64, is_admin: bool) -> Self {
        Self::with_expiration(user_id, is_admin, Duration::seconds(SESSION_LIFETIME_SECONDS))
    }

    /// Creates claims with a custom expiration (used by tests)
    pub fn with_expiration(user_id: i64, is_admin: bool, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: "ganttrack".to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            admin: is_admin,
        }
    }

    /// Checks if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed session token from claims
///
/// # Errors
///
/// Returns `SessionError::CreateError` if token encoding fails
pub fn create_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a session token and extracts its claims
///
/// Verifies the signature, the expiration and not-before times, and
/// that the issuer is "ganttrack".
///
/// # Errors
///
/// Returns `SessionError::Expired` for a run-out session and
/// `SessionError::ValidationError` for any other invalid token
pub fn validate_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&["ganttrack"]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::ValidationError(format!("Token validation failed: {}", e)),
        }
    })?;

    Ok(token_data.claims)
}

/// Builds the `Set-Cookie` value that establishes a session
///
/// The cookie is `HttpOnly` (not readable from scripts) and
/// `SameSite=Lax`, with `Max-Age` matching the token's 30-day lifetime.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, token, SESSION_LIFETIME_SECONDS
    )
}

/// Builds the `Set-Cookie` value that clears the session on logout
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
        SESSION_COOKIE
    )
}

/// Extracts the session token from a `Cookie` request header value
///
/// Returns `None` when the header carries no session cookie.
pub fn token_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

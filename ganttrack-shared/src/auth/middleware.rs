/// Per-request authentication context
///
/// After the session middleware validates the session cookie it inserts
/// an `AuthContext` into the request extensions. Handlers extract it
/// with Axum's `Extension` extractor and, where an endpoint is
/// admin-only, call `require_admin` before doing anything else.
///
/// The admin flag is the copy signed into the session token at login;
/// guards trust it for the life of the session rather than re-reading
/// storage on every request.
///
/// # Example
///
/// ```
/// use ganttrack_shared::auth::middleware::AuthContext;
/// use ganttrack_shared::auth::session::SessionClaims;
///
/// let auth = AuthContext::from_claims(&SessionClaims::new(42, false));
/// assert!(auth.require_admin().is_err());
/// ```

use serde::{Deserialize, Serialize};

use super::session::SessionClaims;

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id
    pub user_id: i64,

    /// Admin flag as captured at login
    pub is_admin: bool,
}

/// Error type for guard checks
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No valid session on the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Session user lacks admin privileges
    #[error("Admin privileges required")]
    AdminRequired,
}

impl AuthContext {
    /// Creates auth context from validated session claims
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            is_admin: claims.admin,
        }
    }

    /// Rejects the request unless the session user is an admin
    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AuthError::AdminRequired)
        }
    }
}

/// Authentication and authorization utilities
///
/// This module provides the building blocks for session-cookie
/// authentication:
///
/// - `password`: Argon2id password hashing and verification
/// - `session`: Signed session tokens and the session cookie format
/// - `middleware`: Per-request auth context and guard checks

pub mod middleware;
pub mod password;
pub mod session;

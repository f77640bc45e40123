/// API route handlers
///
/// - `auth`: login/logout/me/check
/// - `users`: user management (mutation admin-only)
/// - `projects`: shared and personal project CRUD
/// - `tasks`: task CRUD scoped to projects
/// - `health`: health check

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

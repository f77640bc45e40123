//! # Ganttrack Shared Library
//!
//! This crate contains the data models, storage access, and authentication
//! primitives used by the Ganttrack API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing, session tokens, and auth context
//! - `db`: Connection pool, migrations, and startup bootstrap

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Ganttrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

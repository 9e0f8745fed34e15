//! Authentication middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`auth::CurrentSession`] -- Reads the optional `X-Session-Id` header.

pub mod auth;

//! Request handlers, grouped by resource.

pub mod auth;
pub mod recovery;
pub mod sessions;
pub mod workout_sync;

//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - DTO structs for inserts/updates consumed by the repositories

pub mod recovery_code;
pub mod session;
pub mod user;
pub mod workout;
pub mod workout_session;

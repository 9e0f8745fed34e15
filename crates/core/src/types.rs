/// Primary keys for internal rows (users, workouts) are PostgreSQL BIGSERIAL.
///
/// Sessions and workout drafts use UUID keys instead: their ids travel to
/// clients in headers and sync payloads, so they must be opaque.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

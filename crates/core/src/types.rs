/// All entity primary keys are UUIDs generated by PostgreSQL.
pub type DbId = uuid::Uuid;

/// Opaque user identifier issued by the authentication provider (JWT `sub`).
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

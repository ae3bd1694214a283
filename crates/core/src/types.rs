/// Opaque identity for batches, messages, recipients and images.
///
/// Tokens are random (v4) UUIDs and are never reused.
pub type Token = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh, never-reused token.
pub fn new_token() -> Token {
    uuid::Uuid::new_v4()
}

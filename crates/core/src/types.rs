/// Characters and images are identified by random UUIDv4 values.
pub type CharacterId = uuid::Uuid;
pub type ImageId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

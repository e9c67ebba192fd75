/// All database primary keys are SQLite INTEGER (rowid) columns.
pub type DbId = i64;

/// Timestamps are persisted as whole-second UNIX time.
pub type UnixTime = i64;

use rusqlite::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username already taken")]
    UsernameTaken,

    #[error("email already taken")]
    EmailTaken,

    #[error("record not found")]
    NotFound,

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Turn a UNIQUE violation on the users table into the matching typed
/// error; anything else passes through untouched.
pub(crate) fn classify_user_conflict(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, Some(msg)) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            if msg.contains("users.username") {
                return StoreError::UsernameTaken;
            }
            if msg.contains("users.email") {
                return StoreError::EmailTaken;
            }
        }
    }
    StoreError::Sqlite(err)
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Mapping error: {0}")]
    MappingError(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for domain::errors::DomainError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => domain::errors::DomainError::NotFound(msg),
            DbError::DatabaseError(e) => {
                domain::errors::DomainError::StorageUnavailable(format!("database error: {e}"))
            }
            DbError::MappingError(msg) => {
                domain::errors::DomainError::InternalError(format!("mapping error: {msg}"))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database open failed: {0}")]
    OpenFailed(String),
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
    #[error("Database query failed: {0}")]
    QueryFailed(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid object reference: {0}")]
    InvalidReference(String),

    #[error("object storage error: {0}")]
    Storage(#[source] object_store::Error),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<object_store::Error> for CatalogError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => {
                CatalogError::NotFound(format!("object {} not found", path))
            }
            other => CatalogError::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

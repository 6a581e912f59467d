use sea_orm::DbErr;
use thiserror::Error;

/// Failures of multi-step operations that go beyond a single query
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Db(#[from] DbErr),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

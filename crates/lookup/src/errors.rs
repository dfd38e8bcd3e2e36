use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Domain(#[from] domain::DomainError),

    #[error("No database configured")]
    DatabaseUnavailable,

    #[error(transparent)]
    ReadModel(#[from] read_model::ReadModelError),
}

pub type Result<T> = std::result::Result<T, LookupError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Username already registered")]
    AlreadyExists,
    #[error("Incorrect username or password")]
    InvalidCredentials,
    #[error("Could not validate credentials")]
    NotAuthenticated,
    #[error("Spelling errors found")]
    Spelling {
        title_errors: Vec<String>,
        content_errors: Vec<String>,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

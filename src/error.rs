use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown campus: {0}")]
    UnknownCampus(String),
    #[error("reading source error: {0}")]
    Source(String),
    #[error("preference store error: {0}")]
    Preference(String),
    #[error("state lock poisoned")]
    StateLock,
}

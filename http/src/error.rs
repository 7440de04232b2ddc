use thiserror::Error;

/// Failures that stop the server itself, as opposed to a single response.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("status pages transport failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid status pages configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("status pages server has already run; a stopped server cannot be resumed")]
    AlreadyRun,
}

use thiserror::Error;

pub type StatusResult<T> = Result<T, StatusError>;

/// Everything that can abort a single status page response.
///
/// None of these are fatal to the server: the router turns them into an
/// escaped error page and keeps serving.
#[derive(Error, Debug)]
pub enum StatusError {
    #[error("unknown service name {0:?}")]
    UnknownService(String),
    #[error("failed to render status page: {0}")]
    Render(#[from] askama::Error),
    #[error("malformed request: {0}")]
    Request(String),
    #[error(transparent)]
    Service(#[from] anyhow::Error),
}

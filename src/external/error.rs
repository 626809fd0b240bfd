use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExternalError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("watsonx request error: {0}")]
    RequestError(String),

    #[error("watsonx API error (status {status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Unexpected watsonx response shape: {0}")]
    ResponseError(String),

    #[error("Graph database error: {0}")]
    GraphDbError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

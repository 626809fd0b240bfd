use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Malformed triple line: {0}")]
    MalformedTriple(String),

    #[error("No triples found in extraction output")]
    EmptyExtraction,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

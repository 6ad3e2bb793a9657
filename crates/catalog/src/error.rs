use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog has no delivery zone entry for {0}")]
    MissingZone(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

pub type AdResult<T> = Result<T, AdSelectionError>;

#[derive(Error, Debug)]
pub enum AdSelectionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store lookup error: {0}")]
    Store(String),

    #[error("Predicate codec error: {message}. Value: {value}")]
    PredicateCodec { message: String, value: String },

    #[error("Unknown targeting predicate type: {0}")]
    UnknownPredicate(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AdSelectionError {
    fn from(err: config::ConfigError) -> Self {
        AdSelectionError::Config(err.to_string())
    }
}

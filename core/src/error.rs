use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("record '{record}' is missing required field '{field}'")]
    MissingField {
        record: String,
        field: &'static str,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PulseResult<T> = Result<T, PulseError>;

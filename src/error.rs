use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse data file: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize tasks: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Task not found: {0}")]
    NotFound(u64),

    #[error("No task ids left")]
    IdOverflow,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}

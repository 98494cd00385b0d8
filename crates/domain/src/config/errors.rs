use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {message}", .path.display())]
    FileRead { path: PathBuf, message: String },

    #[error("Invalid config file: {0}")]
    Parse(String),

    #[error("Invalid server '{server}': {reason}")]
    InvalidServer { server: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

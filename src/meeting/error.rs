use thiserror::Error;

use crate::config::ConfigError;
use crate::writers::WriterError;

#[derive(Debug, Error)]
pub enum MeetingError {
    #[error("Meeting in {0} is already over")]
    Finished(String),
    #[error("Meeting configuration rejected: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to save meeting: {0}")]
    Save(#[from] WriterError),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("A meeting is already in progress on {0}")]
    AlreadyActive(String),
    #[error("Meeting on {0} not found")]
    NotFound(String),
}

use std::io::Error;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Unable to locate a valid config directory")]
    NoConfigDir,
    #[error("Failed to create token file {0}: {1}")]
    FileCreationFailed(String, Error),
    #[error("Token path {0} is a directory")]
    NotAFile(String),
    #[error("Token path {0} contains invalid unicode")]
    InvalidUnicode(String),
}

//! Error types for Shellgate

use thiserror::Error;

use crate::runtime::RuntimeError;

/// Text sent to the peer when a message does not carry the mandatory fields.
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid message body format.\
Message should have 'instance_os', 'command', 'instance_hash', 'exec_command<optional>'";

/// Text sent to the peer for failures whose cause stays in the local logs.
pub const GENERIC_MESSAGE: &str = "Something went wrong";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Please provide proper json format: {0}")]
    Decode(String),

    #[error("{}", INVALID_FORMAT_MESSAGE)]
    InvalidFormat,

    #[error("Unsupported instance os: {0}")]
    UnsupportedOs(String),

    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),

    #[error("Invalid instance hash: {0}")]
    InvalidInstanceHash(String),

    #[error("exec_command is required for {0}")]
    MissingExecCommand(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Generic(String),
}

impl GatewayError {
    /// The text the remote peer receives for this error.
    pub fn peer_message(&self) -> String {
        match self {
            GatewayError::Io(_) | GatewayError::Generic(_) => GENERIC_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
